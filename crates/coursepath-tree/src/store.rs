//! ContentStore trait: the boundary to the course content system.
//!
//! Coursepath never owns course content. A `ContentStore` serves blocks by
//! key and, when the backing system can do it cheaply, the whole block set of
//! a course in one round trip.

use async_trait::async_trait;
use coursepath_core::{CourseKey, Error, Result, UsageKey};

use crate::Block;

/// Read-only access to course content trees.
///
/// Every method call is one round trip to the backing system.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the root (course) block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the course does not exist.
    async fn get_root(&self, course: &CourseKey) -> Result<Block>;

    /// Fetch several blocks by key, in the order requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] naming the first key that does not resolve.
    async fn get_blocks(&self, keys: &[UsageKey]) -> Result<Vec<Block>>;

    /// Fetch every block of a course in one round trip.
    ///
    /// Returns `Ok(None)` when the store cannot bulk-fetch; callers then fall
    /// back to fetching the tree one level at a time.
    async fn get_course_blocks(&self, _course: &CourseKey) -> Result<Option<Vec<Block>>> {
        Ok(None)
    }

    /// Fetch a single block.
    async fn get_block(&self, key: &UsageKey) -> Result<Block> {
        self.get_blocks(std::slice::from_ref(key))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Block {key} does not exist")))
    }

    /// Fetch the children of a block in display order.
    async fn get_children(&self, block: &Block) -> Result<Vec<Block>> {
        if block.children.is_empty() {
            return Ok(Vec::new());
        }
        self.get_blocks(&block.children).await
    }

    /// Returns the name of this store for logging/debugging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
