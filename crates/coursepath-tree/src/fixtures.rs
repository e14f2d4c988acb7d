//! Course fixtures for tests.
//!
//! Enabled for this crate's tests and, through the `test-utils` feature, for
//! downstream crates' tests.

#![allow(missing_docs)]

use coursepath_core::{CourseKey, UsageKey};

use crate::{Block, CourseOutline};

/// Build a `block-v1` usage key inside `course`.
pub fn block_key(course: &CourseKey, block_type: &str, name: &str) -> UsageKey {
    let locator = course
        .as_str()
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(course.as_str());
    match UsageKey::parse(format!("block-v1:{locator}+type@{block_type}+block@{name}")) {
        Ok(key) => key,
        Err(err) => unreachable!("fixture key must be valid: {err}"),
    }
}

fn course_key(raw: &str) -> CourseKey {
    match CourseKey::parse(raw) {
        Ok(key) => key,
        Err(err) => unreachable!("fixture key must be valid: {err}"),
    }
}

fn outline(course: CourseKey, blocks: Vec<Block>) -> CourseOutline {
    match CourseOutline::from_blocks(course, blocks) {
        Ok(outline) => outline,
        Err(err) => unreachable!("fixture outline must be valid: {err}"),
    }
}

/// Keys of [`demo_course`].
#[derive(Clone, Debug)]
pub struct DemoKeys {
    pub course: UsageKey,
    pub chapter_1: UsageKey,
    pub chapter_2: UsageKey,
    pub sequential_1: UsageKey,
    pub sequential_2: UsageKey,
    pub vertical_1: UsageKey,
    pub vertical_2: UsageKey,
    pub vertical_3: UsageKey,
}

/// A plain tree with no shared blocks.
///
/// ```text
/// course
/// ├── chapter_1
/// │   ├── sequential_1
/// │   │   └── vertical_1
/// │   └── sequential_2
/// │       ├── vertical_2
/// │       └── vertical_3
/// └── chapter_2
/// ```
pub fn demo_course() -> (CourseOutline, DemoKeys) {
    let course = course_key("course-v1:edX+Demo+2015");
    let key = |t: &str, n: &str| block_key(&course, t, n);
    let keys = DemoKeys {
        course: key("course", "course"),
        chapter_1: key("chapter", "chapter_1"),
        chapter_2: key("chapter", "chapter_2"),
        sequential_1: key("sequential", "sequential_1"),
        sequential_2: key("sequential", "sequential_2"),
        vertical_1: key("vertical", "vertical_1"),
        vertical_2: key("vertical", "vertical_2"),
        vertical_3: key("vertical", "vertical_3"),
    };

    let block = |k: &UsageKey, name: &str| Block::new(k.clone(), course.clone(), name);
    let blocks = vec![
        block(&keys.course, "Demo Course")
            .with_children([keys.chapter_1.clone(), keys.chapter_2.clone()]),
        block(&keys.chapter_1, "Chapter 1")
            .with_children([keys.sequential_1.clone(), keys.sequential_2.clone()]),
        block(&keys.chapter_2, "Chapter 2"),
        block(&keys.sequential_1, "Sequential 1").with_child(keys.vertical_1.clone()),
        block(&keys.sequential_2, "Sequential 2")
            .with_children([keys.vertical_2.clone(), keys.vertical_3.clone()]),
        block(&keys.vertical_1, "Vertical 1"),
        block(&keys.vertical_2, "Vertical 2"),
        block(&keys.vertical_3, "Vertical 3"),
    ];

    (outline(course.clone(), blocks), keys)
}

/// Keys of [`shared_course`].
#[derive(Clone, Debug)]
pub struct SharedKeys {
    pub course: UsageKey,
    pub chapter_1: UsageKey,
    pub sequential_1: UsageKey,
    pub sequential_2: UsageKey,
    pub vertical_1: UsageKey,
    pub vertical_2: UsageKey,
}

/// A tree where `vertical_1` is included under both sequentials.
///
/// ```text
/// course
/// └── chapter_1
///     ├── sequential_1
///     │   ├── vertical_1
///     │   └── vertical_2
///     └── sequential_2
///         └── vertical_1
/// ```
pub fn shared_course() -> (CourseOutline, SharedKeys) {
    let course = course_key("course-v1:edX+Shared+2015");
    let key = |t: &str, n: &str| block_key(&course, t, n);
    let keys = SharedKeys {
        course: key("course", "course"),
        chapter_1: key("chapter", "chapter_1"),
        sequential_1: key("sequential", "sequential_1"),
        sequential_2: key("sequential", "sequential_2"),
        vertical_1: key("vertical", "vertical_1"),
        vertical_2: key("vertical", "vertical_2"),
    };

    let block = |k: &UsageKey, name: &str| Block::new(k.clone(), course.clone(), name);
    let blocks = vec![
        block(&keys.course, "Shared Course").with_child(keys.chapter_1.clone()),
        block(&keys.chapter_1, "Chapter 1")
            .with_children([keys.sequential_1.clone(), keys.sequential_2.clone()]),
        block(&keys.sequential_1, "Sequential 1")
            .with_children([keys.vertical_1.clone(), keys.vertical_2.clone()]),
        block(&keys.sequential_2, "Sequential 2").with_child(keys.vertical_1.clone()),
        block(&keys.vertical_1, "Vertical 1"),
        block(&keys.vertical_2, "Vertical 2"),
    ];

    (outline(course.clone(), blocks), keys)
}

/// A complete tree with `children_per_block` children under every block,
/// `depth` levels below the root.
pub fn generated_course(
    course: &CourseKey,
    children_per_block: usize,
    depth: usize,
) -> CourseOutline {
    const TYPES: [&str; 4] = ["course", "chapter", "sequential", "vertical"];
    let type_at = |level: usize| TYPES.get(level).copied().unwrap_or("html");

    let root = block_key(course, "course", "root");
    let mut blocks = vec![Block::new(root, course.clone(), "Generated Course")];
    let mut frontier = vec![0usize];

    for level in 1..=depth {
        let mut next = Vec::with_capacity(frontier.len() * children_per_block);
        for parent_idx in frontier {
            for _ in 0..children_per_block {
                let name = format!("l{level}_{}", next.len());
                let child = block_key(course, type_at(level), &name);
                blocks[parent_idx].children.push(child.clone());
                next.push(blocks.len());
                blocks.push(Block::new(child, course.clone(), format!("Block {name}")));
            }
        }
        frontier = next;
    }

    outline(course.clone(), blocks)
}

/// Copy of `outline` with `key` removed, including every reference to it.
pub fn without_block(outline: &CourseOutline, key: &UsageKey) -> CourseOutline {
    let mut pruned = outline.clone();
    pruned.blocks.retain(|b| &b.key != key);
    for block in &mut pruned.blocks {
        block.children.retain(|c| c != key);
    }
    pruned
}
