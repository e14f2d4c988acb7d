//! Credit course and requirement types.

use chrono::{DateTime, Utc};
use coursepath_core::CourseKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A course that may offer credit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCourse {
    /// The course.
    pub course_key: CourseKey,
    /// Whether credit is currently offered.
    pub enabled: bool,
}

impl CreditCourse {
    /// An enabled credit course.
    pub fn enabled(course_key: CourseKey) -> Self {
        Self {
            course_key,
            enabled: true,
        }
    }
}

/// A criterion a learner must satisfy for course credit.
///
/// Unique by `(course_key, namespace, name)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditRequirement {
    /// The course the requirement belongs to.
    pub course_key: CourseKey,
    /// Requirement family, e.g. `grade` or `proctored_exam`.
    pub namespace: String,
    /// Unique name within the namespace, often a block location.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
    /// Free-form criteria, e.g. `{"min_grade": 0.8}`.
    pub criteria: Value,
    /// Inactive requirements are kept but no longer reported.
    pub active: bool,
}

impl CreditRequirement {
    /// Whether this requirement has the given namespace and name.
    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }
}

/// A requirement as submitted by a caller, before validation.
///
/// Every field is optional so that incomplete submissions can be reported
/// in full rather than failing on the first missing field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementInput {
    /// Requirement family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Unique name within the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Criteria object; `{}` is valid, absence is not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Value>,
}

impl RequirementInput {
    /// A fully specified requirement.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
        criteria: Value,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: Some(name.into()),
            display_name: Some(display_name.into()),
            criteria: Some(criteria),
        }
    }

    /// Names of the parameters that are missing or empty.
    pub fn missing_params(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.namespace) {
            missing.push("namespace");
        }
        if is_blank(&self.name) {
            missing.push("name");
        }
        if is_blank(&self.display_name) {
            missing.push("display_name");
        }
        if self.criteria.is_none() {
            missing.push("criteria");
        }
        missing
    }
}

/// A learner who has met every requirement of a credit course.
///
/// Unique by `(username, course_key)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditEligibility {
    /// The learner.
    pub username: String,
    /// The credit course.
    pub course_key: CourseKey,
    /// When the learner became eligible.
    pub created: DateTime<Utc>,
}

/// Progress of a learner's credit for one course.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    /// Every requirement is met and no credit request has been made.
    RequirementsMeet,
}

/// One course in a learner's eligibility report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEligibility {
    /// Always `true` for reported courses.
    pub is_eligible: bool,
    /// When the learner became eligible.
    pub created_at: DateTime<Utc>,
    /// Credit progress.
    pub status: EligibilityStatus,
}

impl From<&CreditEligibility> for CourseEligibility {
    fn from(eligibility: &CreditEligibility) -> Self {
        Self {
            is_eligible: true,
            created_at: eligibility.created,
            status: EligibilityStatus::RequirementsMeet,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
