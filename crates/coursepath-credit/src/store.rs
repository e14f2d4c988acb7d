//! CreditStore trait and in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use coursepath_core::{CourseKey, Result};
use tokio::sync::RwLock;

use crate::{CreditCourse, CreditEligibility, CreditRequirement};

/// Persistence for credit courses and their requirements.
#[async_trait]
pub trait CreditStore: Send + Sync {
    /// Fetch a credit course.
    async fn get_course(&self, course: &CourseKey) -> Result<Option<CreditCourse>>;

    /// Insert or replace a credit course.
    async fn put_course(&self, course: CreditCourse) -> Result<()>;

    /// All requirements of a course, active or not, in insertion order.
    async fn requirements(&self, course: &CourseKey) -> Result<Vec<CreditRequirement>>;

    /// Insert a requirement, or replace the one with the same course,
    /// namespace, and name in place.
    async fn upsert_requirement(&self, requirement: CreditRequirement) -> Result<()>;

    /// Replace every requirement of a course with `requirements`, in order.
    ///
    /// The default implementation upserts one requirement at a time, which
    /// is not atomic and keeps stored requirements missing from the list.
    /// Stores that can apply the whole list at once should override it.
    async fn replace_requirements(
        &self,
        course: &CourseKey,
        requirements: Vec<CreditRequirement>,
    ) -> Result<()> {
        log::trace!("Replacing {} requirements of {course}", requirements.len());
        for requirement in requirements {
            self.upsert_requirement(requirement).await?;
        }
        Ok(())
    }

    /// Record that a learner is eligible for credit in a course.
    ///
    /// Returns `false`, keeping the existing record, if the learner was
    /// already eligible.
    async fn add_eligibility(&self, eligibility: CreditEligibility) -> Result<bool>;

    /// Eligibility records of a learner, ordered by course key.
    async fn eligibilities(&self, username: &str) -> Result<Vec<CreditEligibility>>;
}

/// Credit data held in memory.
#[derive(Default)]
pub struct MemoryCreditStore {
    courses: RwLock<HashMap<CourseKey, CreditCourse>>,
    requirements: RwLock<Vec<CreditRequirement>>,
    eligibilities: RwLock<Vec<CreditEligibility>>,
}

impl MemoryCreditStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CreditStore for MemoryCreditStore {
    async fn get_course(&self, course: &CourseKey) -> Result<Option<CreditCourse>> {
        Ok(self.courses.read().await.get(course).cloned())
    }

    async fn put_course(&self, course: CreditCourse) -> Result<()> {
        self.courses
            .write()
            .await
            .insert(course.course_key.clone(), course);
        Ok(())
    }

    async fn requirements(&self, course: &CourseKey) -> Result<Vec<CreditRequirement>> {
        Ok(self
            .requirements
            .read()
            .await
            .iter()
            .filter(|r| &r.course_key == course)
            .cloned()
            .collect())
    }

    async fn upsert_requirement(&self, requirement: CreditRequirement) -> Result<()> {
        let mut requirements = self.requirements.write().await;
        let existing = requirements.iter_mut().find(|r| {
            r.course_key == requirement.course_key
                && r.matches(&requirement.namespace, &requirement.name)
        });
        match existing {
            Some(slot) => *slot = requirement,
            None => requirements.push(requirement),
        }
        Ok(())
    }

    async fn replace_requirements(
        &self,
        course: &CourseKey,
        replacement: Vec<CreditRequirement>,
    ) -> Result<()> {
        let mut requirements = self.requirements.write().await;
        requirements.retain(|r| &r.course_key != course);
        requirements.extend(replacement);
        Ok(())
    }

    async fn add_eligibility(&self, eligibility: CreditEligibility) -> Result<bool> {
        let mut eligibilities = self.eligibilities.write().await;
        let exists = eligibilities.iter().any(|e| {
            e.username == eligibility.username && e.course_key == eligibility.course_key
        });
        if !exists {
            eligibilities.push(eligibility);
        }
        Ok(!exists)
    }

    async fn eligibilities(&self, username: &str) -> Result<Vec<CreditEligibility>> {
        let mut found: Vec<CreditEligibility> = self
            .eligibilities
            .read()
            .await
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.course_key.cmp(&b.course_key));
        Ok(found)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn requirement(course: &CourseKey, name: &str, min_grade: f64) -> CreditRequirement {
        CreditRequirement {
            course_key: course.clone(),
            namespace: "grade".to_string(),
            name: name.to_string(),
            display_name: name.to_string(),
            criteria: json!({ "min_grade": min_grade }),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = MemoryCreditStore::new();
        let course = CourseKey::parse("course-v1:edX+Demo+2015").unwrap();
        store.upsert_requirement(requirement(&course, "first", 0.5)).await.unwrap();
        store.upsert_requirement(requirement(&course, "second", 0.6)).await.unwrap();
        store.upsert_requirement(requirement(&course, "first", 0.9)).await.unwrap();

        let found = store.requirements(&course).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "first");
        assert_eq!(found[0].criteria, json!({ "min_grade": 0.9 }));
    }

    #[tokio::test]
    async fn test_requirements_scoped_to_course() {
        let store = MemoryCreditStore::new();
        let a = CourseKey::parse("course-v1:edX+A+2015").unwrap();
        let b = CourseKey::parse("course-v1:edX+B+2015").unwrap();
        store.upsert_requirement(requirement(&a, "grade", 0.5)).await.unwrap();
        store.upsert_requirement(requirement(&b, "grade", 0.7)).await.unwrap();

        assert_eq!(store.requirements(&a).await.unwrap().len(), 1);
        assert_eq!(store.requirements(&b).await.unwrap()[0].criteria, json!({ "min_grade": 0.7 }));
    }

    #[tokio::test]
    async fn test_replace_requirements_keeps_other_courses() {
        let store = MemoryCreditStore::new();
        let a = CourseKey::parse("course-v1:edX+A+2015").unwrap();
        let b = CourseKey::parse("course-v1:edX+B+2015").unwrap();
        store.upsert_requirement(requirement(&a, "first", 0.5)).await.unwrap();
        store.upsert_requirement(requirement(&b, "grade", 0.7)).await.unwrap();

        let mut retired = requirement(&a, "first", 0.5);
        retired.active = false;
        store
            .replace_requirements(&a, vec![requirement(&a, "second", 0.6), retired])
            .await
            .unwrap();

        let names: Vec<_> = store
            .requirements(&a)
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.name, r.active))
            .collect();
        assert_eq!(
            names,
            vec![("second".to_string(), true), ("first".to_string(), false)]
        );
        assert_eq!(store.requirements(&b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_eligibility_added_once_and_listed_by_course() {
        let store = MemoryCreditStore::new();
        let eligibility = |user: &str, course: &str, day: u32| CreditEligibility {
            username: user.to_string(),
            course_key: CourseKey::parse(course).unwrap(),
            created: chrono::Utc.with_ymd_and_hms(2015, 12, day, 0, 0, 0).unwrap(),
        };

        assert!(store.add_eligibility(eligibility("staff", "course-v1:edX+B+2015", 1)).await.unwrap());
        assert!(store.add_eligibility(eligibility("staff", "course-v1:edX+A+2015", 2)).await.unwrap());
        assert!(store.add_eligibility(eligibility("other", "course-v1:edX+A+2015", 3)).await.unwrap());
        assert!(!store.add_eligibility(eligibility("staff", "course-v1:edX+B+2015", 9)).await.unwrap());

        let found = store.eligibilities("staff").await.unwrap();
        let courses: Vec<_> = found.iter().map(|e| e.course_key.to_string()).collect();
        assert_eq!(courses, vec!["course-v1:edX+A+2015", "course-v1:edX+B+2015"]);
        assert_eq!(found[1], eligibility("staff", "course-v1:edX+B+2015", 1));
        assert!(store.eligibilities("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_courses() {
        let store = MemoryCreditStore::new();
        let course = CourseKey::parse("course-v1:edX+Demo+2015").unwrap();
        assert!(store.get_course(&course).await.unwrap().is_none());

        store.put_course(CreditCourse::enabled(course.clone())).await.unwrap();
        assert!(store.get_course(&course).await.unwrap().unwrap().enabled);
    }
}
