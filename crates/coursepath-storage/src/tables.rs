//! redb table definitions.
//!
//! Values are JSON documents; keys are the string form of the owning key.

use coursepath_core::{CourseKey, UsageKey};
use redb::TableDefinition;

/// usage key -> `PathCacheEntry` JSON
pub const PATH_ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("path_entries");

/// `"<course>\0<usage>"` -> (), enumerates a course's entries in key order
pub const PATHS_BY_COURSE: TableDefinition<&str, ()> = TableDefinition::new("paths_by_course");

/// `"<username>\0<usage>"` -> `Bookmark` JSON, so a user's bookmarks are one key range
pub const BOOKMARKS: TableDefinition<&str, &str> = TableDefinition::new("bookmarks");

/// course key -> `CreditCourse` JSON
pub const CREDIT_COURSES: TableDefinition<&str, &str> = TableDefinition::new("credit_courses");

/// course key -> JSON array of `CreditRequirement`, in insertion order
pub const CREDIT_REQUIREMENTS: TableDefinition<&str, &str> =
    TableDefinition::new("credit_requirements");

/// `"<username>\0<course>"` -> `CreditEligibility` JSON
pub const CREDIT_ELIGIBILITY: TableDefinition<&str, &str> =
    TableDefinition::new("credit_eligibility");

const SEPARATOR: char = '\0';

/// Two-part key that sorts by its first part.
pub fn compound_key(first: &str, second: &str) -> String {
    format!("{first}{SEPARATOR}{second}")
}

/// Half-open key range covering every compound key starting with `first`.
pub fn compound_range(first: &str) -> (String, String) {
    (format!("{first}\0"), format!("{first}\u{1}"))
}

/// Index key of a block within its course.
pub fn course_index_key(course: &CourseKey, usage: &UsageKey) -> String {
    compound_key(course.as_str(), usage.as_str())
}

/// Half-open key range covering every index key of a course.
pub fn course_index_range(course: &CourseKey) -> (String, String) {
    compound_range(course.as_str())
}

/// Split an index key into its course and usage parts.
pub fn split_index_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(SEPARATOR)
}
