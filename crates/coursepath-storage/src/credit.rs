//! [`CreditStore`] over redb.
//!
//! A course's requirements are stored together as one JSON array so their
//! insertion order survives and a replacement is a single write.
//! Eligibility records are keyed by `"<username>\0<course>"`.

use async_trait::async_trait;
use coursepath_core::{CourseKey, Result};
use coursepath_credit::{CreditCourse, CreditEligibility, CreditRequirement, CreditStore};
use redb::{ReadableDatabase, ReadableTable};

use crate::database::{RedbStore, StorageResultExt};
use crate::tables::{
    CREDIT_COURSES, CREDIT_ELIGIBILITY, CREDIT_REQUIREMENTS, compound_key, compound_range,
};

#[async_trait]
impl CreditStore for RedbStore {
    async fn get_course(&self, course: &CourseKey) -> Result<Option<CreditCourse>> {
        let course = course.clone();
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let table = txn.open_table(CREDIT_COURSES).or_storage()?;
            let found = match table.get(course.as_str()).or_storage()? {
                Some(guard) => Some(serde_json::from_str(guard.value())?),
                None => None,
            };
            Ok(found)
        })
        .await
    }

    async fn put_course(&self, course: CreditCourse) -> Result<()> {
        self.run(move |db| {
            let json = serde_json::to_string(&course)?;
            let txn = db.begin_write().or_storage()?;
            {
                let mut table = txn.open_table(CREDIT_COURSES).or_storage()?;
                table
                    .insert(course.course_key.as_str(), json.as_str())
                    .or_storage()?;
            }
            txn.commit().or_storage()
        })
        .await
    }

    async fn requirements(&self, course: &CourseKey) -> Result<Vec<CreditRequirement>> {
        let course = course.clone();
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let table = txn.open_table(CREDIT_REQUIREMENTS).or_storage()?;
            let found = match table.get(course.as_str()).or_storage()? {
                Some(guard) => serde_json::from_str(guard.value())?,
                None => Vec::new(),
            };
            Ok(found)
        })
        .await
    }

    async fn upsert_requirement(&self, requirement: CreditRequirement) -> Result<()> {
        self.run(move |db| {
            let txn = db.begin_write().or_storage()?;
            {
                let mut table = txn.open_table(CREDIT_REQUIREMENTS).or_storage()?;
                let course = requirement.course_key.as_str();
                let mut requirements: Vec<CreditRequirement> =
                    match table.get(course).or_storage()? {
                        Some(guard) => serde_json::from_str(guard.value())?,
                        None => Vec::new(),
                    };

                let slot = requirements
                    .iter_mut()
                    .find(|r| r.matches(&requirement.namespace, &requirement.name));
                match slot {
                    Some(slot) => *slot = requirement.clone(),
                    None => requirements.push(requirement.clone()),
                }

                let json = serde_json::to_string(&requirements)?;
                table.insert(course, json.as_str()).or_storage()?;
            }
            txn.commit().or_storage()
        })
        .await
    }

    async fn replace_requirements(
        &self,
        course: &CourseKey,
        requirements: Vec<CreditRequirement>,
    ) -> Result<()> {
        let course = course.clone();
        self.run(move |db| {
            let json = serde_json::to_string(&requirements)?;
            let txn = db.begin_write().or_storage()?;
            {
                let mut table = txn.open_table(CREDIT_REQUIREMENTS).or_storage()?;
                table.insert(course.as_str(), json.as_str()).or_storage()?;
            }
            txn.commit().or_storage()
        })
        .await
    }

    async fn add_eligibility(&self, eligibility: CreditEligibility) -> Result<bool> {
        self.run(move |db| {
            let key = compound_key(&eligibility.username, eligibility.course_key.as_str());
            let txn = db.begin_write().or_storage()?;
            let added = {
                let mut table = txn.open_table(CREDIT_ELIGIBILITY).or_storage()?;
                if table.get(key.as_str()).or_storage()?.is_some() {
                    false
                } else {
                    let json = serde_json::to_string(&eligibility)?;
                    table.insert(key.as_str(), json.as_str()).or_storage()?;
                    true
                }
            };
            txn.commit().or_storage()?;
            Ok(added)
        })
        .await
    }

    async fn eligibilities(&self, username: &str) -> Result<Vec<CreditEligibility>> {
        let (start, end) = compound_range(username);
        self.run(move |db| {
            let txn = db.begin_read().or_storage()?;
            let table = txn.open_table(CREDIT_ELIGIBILITY).or_storage()?;
            let mut found: Vec<CreditEligibility> = Vec::new();
            for item in table.range(start.as_str()..end.as_str()).or_storage()? {
                let (_, value) = item.or_storage()?;
                found.push(serde_json::from_str(value.value())?);
            }
            Ok(found)
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use coursepath_credit::{CreditService, EligibilityStatus, RequirementInput};
    use serde_json::json;

    #[tokio::test]
    async fn test_credit_service_over_redb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.redb");
        let course = CourseKey::parse("course-v1:edX+DemoX+1T2015").unwrap();

        {
            let service = CreditService::new(Arc::new(RedbStore::open(&path).unwrap()));
            service.set_credit_course(&course, true).await.unwrap();
            service
                .set_credit_requirements(
                    &course,
                    &[
                        RequirementInput::new("grade", "grade", "Grade", json!({"min_grade": 0.8})),
                        RequirementInput::new("proctored_exam", "final", "Final Exam", json!({})),
                    ],
                )
                .await
                .unwrap();
            service
                .set_credit_requirements(
                    &course,
                    &[RequirementInput::new("grade", "grade", "Grade", json!({"min_grade": 0.7}))],
                )
                .await
                .unwrap();
        }

        let service = CreditService::new(Arc::new(RedbStore::open(&path).unwrap()));
        assert!(service.is_credit_course(&course).await.unwrap());
        let found = service.get_credit_requirements(&course, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].criteria, json!({"min_grade": 0.7}));
    }

    #[tokio::test]
    async fn test_replace_requirements_overwrites_course_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("cache.redb")).unwrap();
        let course = CourseKey::parse("course-v1:edX+DemoX+1T2015").unwrap();
        let requirement = |name: &str, active: bool| CreditRequirement {
            course_key: course.clone(),
            namespace: "grade".to_string(),
            name: name.to_string(),
            display_name: name.to_string(),
            criteria: json!({}),
            active,
        };

        store.upsert_requirement(requirement("first", true)).await.unwrap();
        let replacement = vec![requirement("second", true), requirement("first", false)];
        store
            .replace_requirements(&course, replacement.clone())
            .await
            .unwrap();

        assert_eq!(store.requirements(&course).await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_credit_eligibility_over_redb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.redb");
        let demo = CourseKey::parse("course-v1:edX+DemoX+1T2015").unwrap();
        let other = CourseKey::parse("course-v1:edX+Other+2015").unwrap();

        let first_created = {
            let store = Arc::new(RedbStore::open(&path).unwrap());
            let service = CreditService::new(store.clone());
            service.set_credit_course(&demo, true).await.unwrap();
            service.set_credit_course(&other, true).await.unwrap();
            assert!(service.add_credit_eligibility("ann", &other).await.unwrap());
            assert!(service.add_credit_eligibility("ann", &demo).await.unwrap());
            assert!(service.add_credit_eligibility("anna", &demo).await.unwrap());
            assert!(!service.add_credit_eligibility("ann", &demo).await.unwrap());
            store.eligibilities("ann").await.unwrap()[0].created
        };

        let store = Arc::new(RedbStore::open(&path).unwrap());
        let records = store.eligibilities("ann").await.unwrap();
        let courses: Vec<_> = records.iter().map(|e| e.course_key.clone()).collect();
        assert_eq!(courses, vec![demo.clone(), other.clone()]);

        let report = CreditService::new(store).get_credit_eligibility("ann").await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[&demo].created_at, first_created);
        assert_eq!(report[&demo].status, EligibilityStatus::RequirementsMeet);
    }
}
