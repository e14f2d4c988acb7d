//! Bookmark types.

use chrono::{DateTime, Utc};
use coursepath_cache::BreadcrumbPath;
use coursepath_core::{CourseKey, UsageKey};
use serde::{Deserialize, Serialize};

/// A learner's bookmark on a content block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// `"<username>,<usage_key>"`.
    pub id: String,
    /// Owner of the bookmark.
    pub username: String,
    /// Course of the bookmarked block.
    pub course_key: CourseKey,
    /// The bookmarked block.
    pub usage_key: UsageKey,
    /// Display name of the block when bookmarked.
    pub display_name: String,
    /// Breadcrumb path of the block when bookmarked.
    pub path: BreadcrumbPath,
    /// Creation time.
    pub created: DateTime<Utc>,
}

impl Bookmark {
    /// The bookmark id for a user and block.
    pub fn id_for(username: &str, usage_key: &UsageKey) -> String {
        format!("{username},{usage_key}")
    }
}
