//! Course outline files.
//!
//! An outline is the JSON export of one course's block tree:
//!
//! ```json
//! {
//!   "course_key": "course-v1:edX+Demo+2015",
//!   "root": "block-v1:edX+Demo+2015+type@course+block@course",
//!   "blocks": [
//!     {
//!       "key": "block-v1:edX+Demo+2015+type@course+block@course",
//!       "display_name": "Demo Course",
//!       "children": ["block-v1:edX+Demo+2015+type@chapter+block@intro"]
//!     },
//!     {
//!       "key": "block-v1:edX+Demo+2015+type@chapter+block@intro",
//!       "display_name": "Introduction"
//!     }
//!   ]
//! }
//! ```
//!
//! Outlines feed [`MemoryContentStore`](crate::MemoryContentStore), which is
//! how the CLI and the tests stand in for a real content system.

use std::collections::HashSet;
use std::path::Path;

use coursepath_core::{CourseKey, Error, Result, UsageKey};
use serde::{Deserialize, Serialize};

use crate::Block;

// ============================================================================
// Serializable types
// ============================================================================

/// One block entry in an outline file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutlineBlock {
    /// Block key.
    pub key: UsageKey,
    /// Display name.
    pub display_name: String,
    /// Block type; derived from the key when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    /// Child keys in display order.
    #[serde(default)]
    pub children: Vec<UsageKey>,
}

/// Serializable representation of a course tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseOutline {
    /// The course.
    pub course_key: CourseKey,
    /// Key of the root (course) block.
    pub root: UsageKey,
    /// Every block of the course.
    pub blocks: Vec<OutlineBlock>,
}

impl CourseOutline {
    /// Build an outline from blocks. The first block is the root.
    pub fn from_blocks(course_key: CourseKey, blocks: Vec<Block>) -> Result<Self> {
        let root = blocks
            .first()
            .map(|b| b.key.clone())
            .ok_or_else(|| Error::invalid_data(format!("Outline for {course_key} has no blocks")))?;

        let outline = Self {
            course_key,
            root,
            blocks: blocks
                .into_iter()
                .map(|b| OutlineBlock {
                    key: b.key,
                    display_name: b.display_name,
                    block_type: Some(b.block_type),
                    children: b.children,
                })
                .collect(),
        };
        outline.validate()?;
        Ok(outline)
    }

    /// Check that the root is present and keys are unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !seen.insert(&block.key) {
                return Err(Error::invalid_data(format!(
                    "Duplicate block {} in outline for {}",
                    block.key, self.course_key
                )));
            }
        }
        if !seen.contains(&self.root) {
            return Err(Error::invalid_data(format!(
                "Root block {} missing from outline for {}",
                self.root, self.course_key
            )));
        }
        Ok(())
    }

    /// Convert the outline entries into content blocks.
    pub fn to_blocks(&self) -> Vec<Block> {
        self.blocks
            .iter()
            .map(|entry| {
                let block = Block::new(
                    entry.key.clone(),
                    self.course_key.clone(),
                    entry.display_name.clone(),
                )
                .with_children(entry.children.iter().cloned());
                match &entry.block_type {
                    Some(block_type) => block.with_block_type(block_type.clone()),
                    None => block,
                }
            })
            .collect()
    }
}

// ============================================================================
// Save / Load
// ============================================================================

/// Save an outline to a JSON file.
pub fn save_outline(outline: &CourseOutline, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(outline)
        .map_err(|e| Error::serialization(format!("Failed to serialize outline: {e}")))?;

    std::fs::write(path.as_ref(), json).map_err(|e| Error::io_with_path(e, path.as_ref()))?;

    Ok(())
}

/// Load an outline from a JSON file.
pub fn load_outline(path: impl AsRef<Path>) -> Result<CourseOutline> {
    let json = std::fs::read_to_string(path.as_ref())
        .map_err(|e| Error::io_with_path(e, path.as_ref()))?;

    load_outline_from_str(&json)
}

/// Load an outline from a JSON string.
pub fn load_outline_from_str(json: &str) -> Result<CourseOutline> {
    let outline: CourseOutline = serde_json::from_str(json)
        .map_err(|e| Error::serialization(format!("Failed to parse outline JSON: {e}")))?;
    outline.validate()?;
    Ok(outline)
}

/// Load every `*.json` outline in a directory, sorted by file name.
pub fn load_outline_dir(dir: impl AsRef<Path>) -> Result<Vec<CourseOutline>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::io_with_path(e, dir))? {
        let path = entry.map_err(Error::Io)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(load_outline).collect()
}

// ============================================================================
// Tests
// ============================================================================
