//! Path cache entry types.

use coursepath_core::{CourseKey, UsageKey};
use serde::{Deserialize, Serialize};

/// One crumb of a breadcrumb path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    /// Key of the ancestor block.
    pub usage_key: UsageKey,
    /// Display name of the ancestor block.
    pub display_name: String,
}

impl PathItem {
    /// Create a path item.
    pub fn new(usage_key: UsageKey, display_name: impl Into<String>) -> Self {
        Self {
            usage_key,
            display_name: display_name.into(),
        }
    }
}

/// Ancestors of a block from the first level below the course root down to
/// the block's parent.
pub type BreadcrumbPath = Vec<PathItem>;

/// Cached breadcrumb paths of one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCacheEntry {
    /// The block.
    pub usage_key: UsageKey,
    /// Course the block belongs to.
    pub course_key: CourseKey,
    /// Display name of the block.
    pub display_name: String,
    /// One path per route from the course root, in pre-order.
    pub paths: Vec<BreadcrumbPath>,
}

impl PathCacheEntry {
    /// The first breadcrumb path, or an empty path for top-level blocks.
    pub fn first_path(&self) -> BreadcrumbPath {
        self.paths.first().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_path() {
        let course = CourseKey::parse("course-v1:a+b+c").unwrap();
        let chapter = PathItem::new(UsageKey::parse("lib:chapter").unwrap(), "Chapter");
        let mut entry = PathCacheEntry {
            usage_key: UsageKey::parse("lib:vertical").unwrap(),
            course_key: course,
            display_name: "Vertical".into(),
            paths: vec![vec![chapter.clone()], vec![]],
        };
        assert_eq!(entry.first_path(), vec![chapter]);

        entry.paths.clear();
        assert!(entry.first_path().is_empty());
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = PathCacheEntry {
            usage_key: UsageKey::parse("lib:v").unwrap(),
            course_key: CourseKey::parse("course-v1:a+b+c").unwrap(),
            display_name: "V".into(),
            paths: vec![vec![PathItem::new(UsageKey::parse("lib:c").unwrap(), "C")]],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["paths"][0][0]["usage_key"], "lib:c");
        assert_eq!(json["paths"][0][0]["display_name"], "C");
    }
}
