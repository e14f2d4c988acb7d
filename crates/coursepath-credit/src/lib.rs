//! Course credit requirements for Coursepath.
//!
//! A credit course lists the requirements (namespace + name, with free-form
//! criteria) a learner must satisfy for credit. Requirements that disappear
//! from the courseware are deactivated rather than deleted. Learners who
//! meet every requirement get an eligibility record per course.

pub mod api;
pub mod store;
pub mod types;

pub use api::CreditService;
pub use store::{CreditStore, MemoryCreditStore};
pub use types::{
    CourseEligibility, CreditCourse, CreditEligibility, CreditRequirement, EligibilityStatus,
    RequirementInput,
};
