//! Credit requirement operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use coursepath_core::{CourseKey, Error, Result};

use crate::{
    CourseEligibility, CreditCourse, CreditEligibility, CreditRequirement, CreditStore,
    RequirementInput,
};

/// Credit requirement API over a [`CreditStore`].
pub struct CreditService {
    store: Arc<dyn CreditStore>,
}

impl CreditService {
    /// Create the service.
    pub fn new(store: Arc<dyn CreditStore>) -> Self {
        Self { store }
    }

    /// Register a course as offering credit, or withdraw it.
    pub async fn set_credit_course(&self, course: &CourseKey, enabled: bool) -> Result<()> {
        self.store
            .put_course(CreditCourse {
                course_key: course.clone(),
                enabled,
            })
            .await
    }

    /// Whether the course is an enabled credit course.
    pub async fn is_credit_course(&self, course: &CourseKey) -> Result<bool> {
        Ok(self
            .store
            .get_course(course)
            .await?
            .is_some_and(|c| c.enabled))
    }

    /// Replace the requirements of a credit course.
    ///
    /// Active requirements absent from `requirements` (matched by namespace
    /// and name) are deactivated. Each given requirement is added, or updated
    /// and reactivated. The result is written with a single
    /// [`CreditStore::replace_requirements`] call.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCreditRequirements`] listing every requirement with
    ///   missing parameters; nothing is written
    /// - [`Error::InvalidCreditCourse`] when the course is not an enabled
    ///   credit course
    pub async fn set_credit_requirements(
        &self,
        course: &CourseKey,
        requirements: &[RequirementInput],
    ) -> Result<()> {
        let valid = validate(requirements)?;

        if !self.is_credit_course(course).await? {
            return Err(Error::InvalidCreditCourse(course.to_string()));
        }

        let mut updated = self.store.requirements(course).await?;
        for old in updated.iter_mut().filter(|r| r.active) {
            let kept = valid
                .iter()
                .any(|(namespace, name, _, _)| old.matches(namespace, name));
            if !kept {
                log::debug!("Deactivating credit requirement {}/{}", old.namespace, old.name);
                old.active = false;
            }
        }

        for (namespace, name, display_name, criteria) in valid {
            let requirement = CreditRequirement {
                course_key: course.clone(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                display_name: display_name.to_string(),
                criteria: criteria.clone(),
                active: true,
            };
            match updated.iter_mut().find(|r| r.matches(namespace, name)) {
                Some(slot) => *slot = requirement,
                None => updated.push(requirement),
            }
        }

        self.store.replace_requirements(course, updated).await?;

        log::info!(
            "Set {} credit requirements for {course}",
            requirements.len()
        );
        Ok(())
    }

    /// Active requirements of a course, optionally limited to one namespace,
    /// in insertion order.
    pub async fn get_credit_requirements(
        &self,
        course: &CourseKey,
        namespace: Option<&str>,
    ) -> Result<Vec<CreditRequirement>> {
        Ok(self
            .store
            .requirements(course)
            .await?
            .into_iter()
            .filter(|r| r.active)
            .filter(|r| namespace.is_none_or(|ns| r.namespace == ns))
            .collect())
    }

    /// Record that a learner met every requirement of a credit course.
    ///
    /// Returns `false` if the learner was already eligible; the original
    /// record and its timestamp are kept.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCreditCourse`] when the course is not an enabled
    /// credit course.
    pub async fn add_credit_eligibility(
        &self,
        username: &str,
        course: &CourseKey,
    ) -> Result<bool> {
        if !self.is_credit_course(course).await? {
            return Err(Error::InvalidCreditCourse(course.to_string()));
        }

        let added = self
            .store
            .add_eligibility(CreditEligibility {
                username: username.to_string(),
                course_key: course.clone(),
                created: Utc::now(),
            })
            .await?;
        if added {
            log::info!("User {username} is eligible for credit in {course}");
        }
        Ok(added)
    }

    /// Courses a learner is eligible for credit in, keyed by course.
    ///
    /// Courses that no longer offer credit are left out.
    pub async fn get_credit_eligibility(
        &self,
        username: &str,
    ) -> Result<BTreeMap<CourseKey, CourseEligibility>> {
        let mut report = BTreeMap::new();
        for eligibility in self.store.eligibilities(username).await? {
            if self.is_credit_course(&eligibility.course_key).await? {
                report.insert(
                    eligibility.course_key.clone(),
                    CourseEligibility::from(&eligibility),
                );
            }
        }
        Ok(report)
    }
}

type ValidRequirement<'a> = (&'a str, &'a str, &'a str, &'a serde_json::Value);

fn validate(requirements: &[RequirementInput]) -> Result<Vec<ValidRequirement<'_>>> {
    let mut invalid = Vec::new();
    let mut valid = Vec::with_capacity(requirements.len());

    for requirement in requirements {
        match (
            requirement.namespace.as_deref(),
            requirement.name.as_deref(),
            requirement.display_name.as_deref(),
            requirement.criteria.as_ref(),
        ) {
            (Some(namespace), Some(name), Some(display_name), Some(criteria))
                if requirement.missing_params().is_empty() =>
            {
                valid.push((namespace, name, display_name, criteria));
            }
            _ => {
                let shown = serde_json::to_string(requirement)?;
                invalid.push(format!(
                    "{shown} has missing/invalid parameters: {:?}",
                    requirement.missing_params()
                ));
            }
        }
    }

    if invalid.is_empty() {
        Ok(valid)
    } else {
        Err(Error::InvalidCreditRequirements(invalid.join(", ")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{EligibilityStatus, MemoryCreditStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn course() -> CourseKey {
        CourseKey::parse("course-v1:edX+DemoX+1T2015").unwrap()
    }

    fn demo_requirements() -> Vec<RequirementInput> {
        vec![
            RequirementInput::new(
                "reverification",
                "i4x://edX/DemoX/edx-reverification-block/assessment_uuid",
                "Assessment 1",
                json!({}),
            ),
            RequirementInput::new(
                "proctored_exam",
                "i4x://edX/DemoX/proctoring-block/final_uuid",
                "Final Exam",
                json!({}),
            ),
            RequirementInput::new("grade", "grade", "Grade", json!({"min_grade": 0.8})),
        ]
    }

    async fn credit_service() -> CreditService {
        let service = CreditService::new(Arc::new(MemoryCreditStore::new()));
        service.set_credit_course(&course(), true).await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_set_and_get_requirements() {
        let service = credit_service().await;
        service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap();

        let found = service.get_credit_requirements(&course(), None).await.unwrap();
        let namespaces: Vec<_> = found.iter().map(|r| r.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["reverification", "proctored_exam", "grade"]);

        let grade = service
            .get_credit_requirements(&course(), Some("grade"))
            .await
            .unwrap();
        assert_eq!(grade.len(), 1);
        assert_eq!(grade[0].criteria, json!({"min_grade": 0.8}));
    }

    #[tokio::test]
    async fn test_invalid_requirements_are_all_reported() {
        let service = credit_service().await;
        let requirements = vec![
            RequirementInput::new("grade", "grade", "Grade", json!({})),
            RequirementInput {
                namespace: Some("grade".to_string()),
                ..Default::default()
            },
            RequirementInput {
                name: Some("final".to_string()),
                display_name: Some(String::new()),
                criteria: Some(json!({})),
                ..Default::default()
            },
        ];

        let err = service
            .set_credit_requirements(&course(), &requirements)
            .await
            .unwrap_err();
        let Error::InvalidCreditRequirements(message) = err else {
            unreachable!("expected InvalidCreditRequirements, got {err:?}");
        };
        assert!(message.contains(
            r#"{"namespace":"grade"} has missing/invalid parameters: ["name", "display_name", "criteria"]"#
        ));
        assert!(message.contains(r#"has missing/invalid parameters: ["namespace", "display_name"]"#));
        assert!(service
            .get_credit_requirements(&course(), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_requires_enabled_credit_course() {
        let service = CreditService::new(Arc::new(MemoryCreditStore::new()));
        let err = service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCreditCourse(_)));

        service.set_credit_course(&course(), false).await.unwrap();
        assert!(!service.is_credit_course(&course()).await.unwrap());
        let err = service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCreditCourse(_)));
    }

    #[tokio::test]
    async fn test_removed_requirements_are_deactivated() {
        let service = credit_service().await;
        service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap();

        let mut updated = demo_requirements();
        updated.remove(0);
        updated[1] = RequirementInput::new("grade", "grade", "Grade", json!({"min_grade": 0.9}));
        service
            .set_credit_requirements(&course(), &updated)
            .await
            .unwrap();

        let found = service.get_credit_requirements(&course(), None).await.unwrap();
        let namespaces: Vec<_> = found.iter().map(|r| r.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["proctored_exam", "grade"]);
        assert_eq!(found[1].criteria, json!({"min_grade": 0.9}));
        assert!(service
            .get_credit_requirements(&course(), Some("reverification"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_readded_requirement_is_reactivated() {
        let service = credit_service().await;
        service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap();
        service
            .set_credit_requirements(&course(), &demo_requirements()[2..])
            .await
            .unwrap();
        assert_eq!(
            service.get_credit_requirements(&course(), None).await.unwrap().len(),
            1
        );

        service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap();
        let found = service.get_credit_requirements(&course(), None).await.unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].namespace, "reverification");
    }

    /// Accepts only whole-course replacement and counts those calls.
    #[derive(Default)]
    struct ReplaceOnlyStore {
        inner: MemoryCreditStore,
        replaces: AtomicUsize,
        fail_replace: bool,
    }

    #[async_trait]
    impl CreditStore for ReplaceOnlyStore {
        async fn get_course(&self, course: &CourseKey) -> Result<Option<CreditCourse>> {
            self.inner.get_course(course).await
        }

        async fn put_course(&self, course: CreditCourse) -> Result<()> {
            self.inner.put_course(course).await
        }

        async fn requirements(&self, course: &CourseKey) -> Result<Vec<CreditRequirement>> {
            self.inner.requirements(course).await
        }

        async fn upsert_requirement(&self, _requirement: CreditRequirement) -> Result<()> {
            Err(Error::storage("single requirement writes are not allowed"))
        }

        async fn replace_requirements(
            &self,
            course: &CourseKey,
            requirements: Vec<CreditRequirement>,
        ) -> Result<()> {
            self.replaces.fetch_add(1, Ordering::SeqCst);
            if self.fail_replace {
                return Err(Error::storage("disk full"));
            }
            self.inner.replace_requirements(course, requirements).await
        }

        async fn add_eligibility(&self, eligibility: CreditEligibility) -> Result<bool> {
            self.inner.add_eligibility(eligibility).await
        }

        async fn eligibilities(&self, username: &str) -> Result<Vec<CreditEligibility>> {
            self.inner.eligibilities(username).await
        }
    }

    #[tokio::test]
    async fn test_requirements_written_in_one_replace() {
        let store = Arc::new(ReplaceOnlyStore::default());
        let service = CreditService::new(store.clone());
        service.set_credit_course(&course(), true).await.unwrap();

        service
            .set_credit_requirements(&course(), &demo_requirements())
            .await
            .unwrap();
        service
            .set_credit_requirements(&course(), &demo_requirements()[1..])
            .await
            .unwrap();

        assert_eq!(store.replaces.load(Ordering::SeqCst), 2);
        let all = store.requirements(&course()).await.unwrap();
        let states: Vec<_> = all.iter().map(|r| (r.namespace.as_str(), r.active)).collect();
        assert_eq!(
            states,
            vec![("reverification", false), ("proctored_exam", true), ("grade", true)]
        );
    }

    #[tokio::test]
    async fn test_failed_replace_leaves_requirements_unchanged() {
        let store = Arc::new(ReplaceOnlyStore {
            fail_replace: true,
            ..Default::default()
        });
        store
            .inner
            .replace_requirements(
                &course(),
                vec![CreditRequirement {
                    course_key: course(),
                    namespace: "grade".to_string(),
                    name: "grade".to_string(),
                    display_name: "Grade".to_string(),
                    criteria: json!({"min_grade": 0.8}),
                    active: true,
                }],
            )
            .await
            .unwrap();
        let service = CreditService::new(store.clone());
        service.set_credit_course(&course(), true).await.unwrap();

        let err = service
            .set_credit_requirements(&course(), &demo_requirements()[..1])
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let found = service.get_credit_requirements(&course(), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].namespace, "grade");
    }

    #[tokio::test]
    async fn test_credit_eligibility() {
        let service = credit_service().await;
        let other = CourseKey::parse("course-v1:edX+Other+2015").unwrap();
        service.set_credit_course(&other, true).await.unwrap();

        assert!(service.add_credit_eligibility("staff", &course()).await.unwrap());
        assert!(service.add_credit_eligibility("staff", &other).await.unwrap());
        assert!(!service.add_credit_eligibility("staff", &course()).await.unwrap());

        let report = service.get_credit_eligibility("staff").await.unwrap();
        assert_eq!(report.len(), 2);
        let demo = &report[&course()];
        assert!(demo.is_eligible);
        assert_eq!(demo.status, EligibilityStatus::RequirementsMeet);
        assert!(service.get_credit_eligibility("learner").await.unwrap().is_empty());

        service.set_credit_course(&other, false).await.unwrap();
        let report = service.get_credit_eligibility("staff").await.unwrap();
        assert_eq!(report.keys().cloned().collect::<Vec<_>>(), vec![course()]);
    }

    #[tokio::test]
    async fn test_eligibility_requires_credit_course() {
        let service = CreditService::new(Arc::new(MemoryCreditStore::new()));
        let err = service
            .add_credit_eligibility("staff", &course())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCreditCourse(_)));
        assert!(service.get_credit_eligibility("staff").await.unwrap().is_empty());
    }
}
