//! Content block types.

use coursepath_core::{CourseKey, UsageKey};
use serde::{Deserialize, Serialize};

/// A node in a course's content tree, as served by a [`ContentStore`].
///
/// Children are referenced by key in display order; resolving them into
/// blocks is the store's job.
///
/// [`ContentStore`]: crate::ContentStore
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Unique key of this block.
    pub key: UsageKey,
    /// Course the block belongs to.
    pub course_key: CourseKey,
    /// Block type (`course`, `chapter`, `sequential`, `vertical`, ...).
    pub block_type: String,
    /// Human-readable name shown in breadcrumbs.
    pub display_name: String,
    /// Child keys in display order.
    pub children: Vec<UsageKey>,
}

impl Block {
    /// Create a childless block.
    ///
    /// The block type is taken from the key when it encodes one, otherwise
    /// it is left empty.
    pub fn new(key: UsageKey, course_key: CourseKey, display_name: impl Into<String>) -> Self {
        let block_type = key.block_type().unwrap_or_default().to_string();
        Self {
            key,
            course_key,
            block_type,
            display_name: display_name.into(),
            children: Vec::new(),
        }
    }

    /// Override the block type.
    pub fn with_block_type(mut self, block_type: impl Into<String>) -> Self {
        self.block_type = block_type.into();
        self
    }

    /// Append a child key.
    pub fn with_child(mut self, child: UsageKey) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child keys.
    pub fn with_children(mut self, children: impl IntoIterator<Item = UsageKey>) -> Self {
        self.children.extend(children);
        self
    }

    /// Whether the block has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
