//! Ancestor path computation.
//!
//! Every block gets one ancestor path per route from the course root: the
//! root gets `[[]]`, and a child of a block reached by path `P` gets
//! `P + [block]`. Blocks included under several parents (and everything
//! below them) therefore get several paths.
//!
//! Paths are accumulated node by node in topological order over the
//! [`CourseTree`] graph, so each block is processed once no matter how many
//! routes lead to it. Each route remembers the child positions it took;
//! sorting a block's routes by those positions yields exactly the order in
//! which a pre-order walk of the tree would have reached them.

use std::collections::HashMap;

use coursepath_core::{CourseKey, Error, Result, UsageKey};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::visit::EdgeRef;

use crate::{ContentStore, CourseTree};

/// Ordered block keys from the course root down to a block's parent.
pub type AncestorPath = Vec<UsageKey>;

/// Every reachable block of a course mapped to its ancestor paths.
pub type BlockPaths = HashMap<UsageKey, Vec<AncestorPath>>;

/// One route from the root, kept as node indices plus the child positions
/// taken at each step.
#[derive(Clone, Default)]
struct Route {
    positions: Vec<usize>,
    ancestors: Vec<petgraph::graph::NodeIndex>,
}

/// Compute the ancestor paths of every block in `tree`.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`] naming a block on the cycle when a block
/// appears as its own descendant.
pub fn compute_paths(tree: &CourseTree) -> Result<BlockPaths> {
    let graph = &tree.graph;
    let order = toposort(graph, None)
        .map_err(|cycle| Error::CycleDetected(graph[cycle.node_id()].key.to_string()))?;

    let mut routes: Vec<Vec<Route>> = vec![Vec::new(); graph.node_count()];
    routes[tree.root.index()] = vec![Route::default()];

    for &node in &order {
        if node == tree.root {
            continue;
        }
        let mut incoming = Vec::new();
        for edge in graph.edges_directed(node, Direction::Incoming) {
            let parent = edge.source();
            for route in &routes[parent.index()] {
                let mut extended = route.clone();
                extended.positions.push(*edge.weight());
                extended.ancestors.push(parent);
                incoming.push(extended);
            }
        }
        incoming.sort_by(|a, b| a.positions.cmp(&b.positions));
        routes[node.index()] = incoming;
    }

    let paths = order
        .into_iter()
        .map(|node| {
            let block_paths = routes[node.index()]
                .iter()
                .map(|route| {
                    route
                        .ancestors
                        .iter()
                        .map(|&idx| graph[idx].key.clone())
                        .collect()
                })
                .collect();
            (graph[node].key.clone(), block_paths)
        })
        .collect();

    Ok(paths)
}

/// Fetch the tree of `course` from `store` and compute its ancestor paths.
pub async fn compute_course_paths<S: ContentStore + ?Sized>(
    store: &S,
    course: &CourseKey,
) -> Result<(CourseTree, BlockPaths)> {
    let tree = CourseTree::fetch(store, course).await?;
    let paths = compute_paths(&tree)?;
    log::debug!(
        "Computed {} path(s) for {} block(s) of {course}",
        paths.values().map(Vec::len).sum::<usize>(),
        paths.len()
    );
    Ok((tree, paths))
}
