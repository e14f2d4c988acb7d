//! Index-based course trees.
//!
//! [`CourseTree`] holds the blocks reachable from a course root in a petgraph
//! `DiGraph`. Edges run parent → child and carry the child's position in the
//! parent's display order. A block included under several parents is a single
//! node with several incoming edges.

use std::collections::{HashMap, HashSet, VecDeque};

use coursepath_core::{CourseKey, Error, Result, UsageKey};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::{Block, ContentStore};

/// Blocks reachable from one course root.
#[derive(Debug)]
pub struct CourseTree {
    /// The course.
    pub course_key: CourseKey,
    /// Parent → child graph, edge weight = child position.
    pub graph: DiGraph<Block, usize>,
    /// Block key → node index.
    pub node_indices: HashMap<UsageKey, NodeIndex>,
    /// Index of the root block.
    pub root: NodeIndex,
}

impl CourseTree {
    /// Fetch the tree of `course` from `store`.
    ///
    /// Uses a whole-course bulk fetch when the store supports one (two round
    /// trips in total), otherwise fetches one level of the tree per round
    /// trip.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when the course or a referenced child does not
    ///   exist
    /// - whatever the store returns for backing-system failures
    pub async fn fetch<S: ContentStore + ?Sized>(store: &S, course: &CourseKey) -> Result<Self> {
        let root = store.get_root(course).await?;

        let blocks = match store.get_course_blocks(course).await? {
            Some(all) => {
                log::debug!(
                    "Bulk-fetched {} blocks of {course} from {}",
                    all.len(),
                    store.name()
                );
                all.into_iter().map(|b| (b.key.clone(), b)).collect()
            }
            None => Self::fetch_by_level(store, &root).await?,
        };

        Self::build(course.clone(), root, blocks)
    }

    /// Fetch blocks breadth-first, one round trip per level.
    async fn fetch_by_level<S: ContentStore + ?Sized>(
        store: &S,
        root: &Block,
    ) -> Result<HashMap<UsageKey, Block>> {
        let mut blocks = HashMap::new();
        blocks.insert(root.key.clone(), root.clone());

        let mut frontier = unseen_children(std::slice::from_ref(root), &blocks);
        let mut levels = 0usize;
        while !frontier.is_empty() {
            let fetched = store.get_blocks(&frontier).await?;
            levels += 1;
            for block in fetched {
                blocks.insert(block.key.clone(), block);
            }
            let level: Vec<Block> = frontier
                .iter()
                .filter_map(|key| blocks.get(key).cloned())
                .collect();
            frontier = unseen_children(&level, &blocks);
        }

        log::debug!(
            "Fetched {} blocks of {} in {levels} level(s) from {}",
            blocks.len(),
            root.course_key,
            store.name()
        );
        Ok(blocks)
    }

    /// Build the graph of blocks reachable from `root`.
    ///
    /// Blocks in `blocks` that are not reachable are ignored. Cycles are kept
    /// in the graph; [`compute_paths`](crate::compute_paths) rejects them.
    pub fn build(
        course_key: CourseKey,
        root: Block,
        mut blocks: HashMap<UsageKey, Block>,
    ) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        blocks.remove(&root.key);
        let root_key = root.key.clone();
        let root_idx = graph.add_node(root);
        node_indices.insert(root_key, root_idx);

        let mut queue = VecDeque::from([root_idx]);
        while let Some(parent_idx) = queue.pop_front() {
            let children = graph[parent_idx].children.clone();
            for (position, child_key) in children.into_iter().enumerate() {
                let child_idx = match node_indices.get(&child_key) {
                    Some(&idx) => idx,
                    None => {
                        let block = blocks.remove(&child_key).ok_or_else(|| {
                            Error::not_found(format!(
                                "Block {child_key} referenced by {} does not exist",
                                graph[parent_idx].key
                            ))
                        })?;
                        let idx = graph.add_node(block);
                        node_indices.insert(child_key, idx);
                        queue.push_back(idx);
                        idx
                    }
                };
                graph.add_edge(parent_idx, child_idx, position);
            }
        }

        Ok(Self {
            course_key,
            graph,
            node_indices,
            root: root_idx,
        })
    }

    /// Number of distinct blocks in the tree.
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of parent → child inclusions.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The root block.
    pub fn root_block(&self) -> &Block {
        &self.graph[self.root]
    }

    /// Look up a block by key.
    pub fn get_block(&self, key: &UsageKey) -> Option<&Block> {
        self.node_indices.get(key).map(|&idx| &self.graph[idx])
    }

    /// Children of a block in display order.
    pub fn children(&self, key: &UsageKey) -> Vec<&Block> {
        self.get_block(key)
            .map(|block| {
                block
                    .children
                    .iter()
                    .filter_map(|child| self.get_block(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Iterate over all blocks.
    pub fn iter_blocks(&self) -> impl Iterator<Item = &Block> {
        self.graph.node_weights()
    }
}

/// Children of `parents` not yet in `seen`, deduplicated, in display order.
fn unseen_children(parents: &[Block], seen: &HashMap<UsageKey, Block>) -> Vec<UsageKey> {
    let mut queued = HashSet::new();
    parents
        .iter()
        .flat_map(|p| p.children.iter())
        .filter(|key| !seen.contains_key(*key) && queued.insert((*key).clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::{FetchMode, MemoryContentStore};

    #[tokio::test]
    async fn test_fetch_demo_course() {
        let (outline, keys) = fixtures::demo_course();
        let store = MemoryContentStore::new(FetchMode::Bulk).with_course(&outline).unwrap();

        let tree = CourseTree::fetch(&store, &outline.course_key).await.unwrap();
        assert_eq!(tree.block_count(), 8);
        assert_eq!(tree.edge_count(), 7);
        assert_eq!(tree.root_block().key, keys.course);

        let children: Vec<_> = tree.children(&keys.sequential_2).iter().map(|b| b.key.clone()).collect();
        assert_eq!(children, vec![keys.vertical_2, keys.vertical_3]);
    }

    #[tokio::test]
    async fn test_shared_block_is_one_node() {
        let (outline, keys) = fixtures::shared_course();
        let store = MemoryContentStore::new(FetchMode::PerLevel).with_course(&outline).unwrap();

        let tree = CourseTree::fetch(&store, &outline.course_key).await.unwrap();
        assert_eq!(tree.block_count(), 6);
        assert_eq!(tree.edge_count(), 6);
        assert!(tree.get_block(&keys.vertical_1).is_some());
    }

    #[tokio::test]
    async fn test_unreachable_blocks_are_ignored() {
        let (mut outline, _) = fixtures::demo_course();
        let course = outline.course_key.clone();
        let orphan = fixtures::block_key(&course, "vertical", "orphan");
        outline.blocks.push(crate::OutlineBlock {
            key: orphan.clone(),
            display_name: "Orphan".into(),
            block_type: None,
            children: Vec::new(),
        });
        let store = MemoryContentStore::new(FetchMode::Bulk).with_course(&outline).unwrap();

        let tree = CourseTree::fetch(&store, &course).await.unwrap();
        assert!(tree.get_block(&orphan).is_none());
        assert_eq!(tree.block_count(), 8);
    }

    #[tokio::test]
    async fn test_dangling_child_is_not_found() {
        let (mut outline, keys) = fixtures::demo_course();
        let dangling = fixtures::block_key(&outline.course_key, "vertical", "ghost");
        for block in &mut outline.blocks {
            if block.key == keys.chapter_2 {
                block.children.push(dangling.clone());
            }
        }

        for mode in [FetchMode::Bulk, FetchMode::PerLevel] {
            let store = MemoryContentStore::new(mode).with_course(&outline).unwrap();
            let err = CourseTree::fetch(&store, &outline.course_key).await.unwrap_err();
            assert!(err.is_not_found(), "{mode:?}: {err}");
        }
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let store = MemoryContentStore::new(FetchMode::Bulk);
        let course = CourseKey::parse("course-v1:none+none+none").unwrap();
        let err = CourseTree::fetch(&store, &course).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_per_level_round_trips_scale_with_depth() {
        let course = CourseKey::parse("course-v1:gen+gen+gen").unwrap();
        for depth in 2..=4 {
            let outline = fixtures::generated_course(&course, 2, depth);
            let store = MemoryContentStore::new(FetchMode::PerLevel).with_course(&outline).unwrap();
            CourseTree::fetch(&store, &course).await.unwrap();
            // root + one fetch per level below it
            assert_eq!(store.round_trips(), 1 + depth);
        }
    }
}
