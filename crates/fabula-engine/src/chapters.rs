//! Chapter ordering over a branching graph.
//!
//! Flattens every path reachable from the start sentinel into one total
//! reading order — the order a host displays vertices in, distinct from the
//! execution order a walk produces. Branches are anchored at the
//! checkpoints where explored paths reconverge; between two checkpoints,
//! branches sharing more already-placed vertices come first, which fixes
//! the left-to-right order of parallel branches.

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::debug;

use fabula_core::{Graph, VertexId};

use crate::error::{EngineError, EngineResult};

/// Compute the chapter order between the two sentinels.
pub fn chapter_order(graph: &Graph) -> EngineResult<Vec<VertexId>> {
    chapter_order_between(graph, VertexId::Start, VertexId::End)
}

/// Compute the chapter order between two arbitrary endpoints.
pub fn chapter_order_between(
    graph: &Graph,
    start: VertexId,
    end: VertexId,
) -> EngineResult<Vec<VertexId>> {
    if !graph.contains(start) {
        return Err(EngineError::VertexNotFound { id: start });
    }

    // Enumerate paths from the start. The visited set is shared across the
    // whole enumeration and pre-seeded with the end vertex, so every path
    // terminates at the end or at the first vertex some path already
    // covered; that vertex becomes a checkpoint.
    let mut visited: HashSet<VertexId> = HashSet::new();
    visited.insert(end);
    let mut checkpoints: HashSet<VertexId> = HashSet::new();
    let mut paths: Vec<Vec<VertexId>> = Vec::new();

    record_paths(
        graph,
        start,
        Vec::new(),
        &mut visited,
        &mut checkpoints,
        &mut paths,
    );
    debug!(paths = paths.len(), checkpoints = checkpoints.len(), "paths recorded");

    // Merge each path's checkpoint subsequence into one master list: a new
    // checkpoint lands right after its predecessor on that path.
    let mut ordered: Vec<VertexId> = vec![start, end];
    for path in &paths {
        let mut path_checkpoints: Vec<VertexId> = vec![start];
        for vertex in path {
            if checkpoints.contains(vertex) && !path_checkpoints.contains(vertex) {
                path_checkpoints.push(*vertex);
            }
        }
        for i in 1..path_checkpoints.len() {
            let vertex = path_checkpoints[i];
            if ordered.contains(&vertex) {
                continue;
            }
            let previous = path_checkpoints[i - 1];
            let at = ordered
                .iter()
                .position(|v| *v == previous)
                .map(|p| p + 1)
                .unwrap_or(ordered.len());
            ordered.insert(at, vertex);
        }
    }

    // Place branches checkpoint by checkpoint. For each checkpoint, every
    // recorded path contributes its prefix up to the checkpoint's last
    // occurrence; prefixes with more already-placed vertices go first
    // (stable, so ties keep recording order).
    let mut chapters: Vec<VertexId> = Vec::new();
    for checkpoint in &ordered {
        let mut branches: Vec<&[VertexId]> = paths
            .iter()
            .filter_map(|path| {
                let last = path.iter().rposition(|v| v == checkpoint)?;
                Some(&path[..last])
            })
            .collect();
        branches.sort_by_key(|branch| {
            Reverse(branch.iter().filter(|v| chapters.contains(*v)).count())
        });

        for branch in branches {
            for vertex in branch {
                if !chapters.contains(vertex) {
                    chapters.push(*vertex);
                }
            }
        }
        if !chapters.contains(checkpoint) {
            chapters.push(*checkpoint);
        }
    }

    Ok(chapters)
}

fn record_paths(
    graph: &Graph,
    vertex: VertexId,
    mut path: Vec<VertexId>,
    visited: &mut HashSet<VertexId>,
    checkpoints: &mut HashSet<VertexId>,
    paths: &mut Vec<Vec<VertexId>>,
) {
    path.push(vertex);
    if visited.contains(&vertex) {
        checkpoints.insert(vertex);
        paths.push(path);
        return;
    }
    visited.insert(vertex);

    let Some(record) = graph.get_vertex(vertex) else {
        return;
    };
    for edge in record.edges() {
        record_paths(graph, edge.target, path.clone(), visited, checkpoints, paths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::Registry;

    fn ids(nums: &[u64]) -> Vec<VertexId> {
        nums.iter().map(|n| VertexId::Num(*n)).collect()
    }

    fn graph_with_edges(edges: &[(VertexId, VertexId)]) -> Graph {
        let mut graph = Graph::new(1, "g", Registry::empty());
        for (from, to) in edges {
            graph.add_vertex(*from);
            graph.add_vertex(*to);
            graph.add_edge(*from, *to, None, false).unwrap();
        }
        graph
    }

    #[test]
    fn test_linear_chain() {
        let graph = graph_with_edges(&[
            (VertexId::Start, VertexId::Num(1)),
            (VertexId::Num(1), VertexId::Num(2)),
            (VertexId::Num(2), VertexId::End),
        ]);

        let order = chapter_order(&graph).unwrap();
        assert_eq!(
            order,
            vec![
                VertexId::Start,
                VertexId::Num(1),
                VertexId::Num(2),
                VertexId::End
            ]
        );
    }

    #[test]
    fn test_diamond_places_branches_before_merge() {
        // Start -> 1 -> 3 -> End, Start -> 2 -> 3; 3 is the merge point.
        let graph = graph_with_edges(&[
            (VertexId::Start, VertexId::Num(1)),
            (VertexId::Start, VertexId::Num(2)),
            (VertexId::Num(1), VertexId::Num(3)),
            (VertexId::Num(2), VertexId::Num(3)),
            (VertexId::Num(3), VertexId::End),
        ]);

        let order = chapter_order(&graph).unwrap();
        assert_eq!(
            order,
            vec![
                VertexId::Start,
                VertexId::Num(1),
                VertexId::Num(2),
                VertexId::Num(3),
                VertexId::End
            ]
        );
    }

    #[test]
    fn test_order_is_permutation_of_reachable() {
        // Two nested branches plus an unreachable vertex.
        let mut graph = graph_with_edges(&[
            (VertexId::Start, VertexId::Num(1)),
            (VertexId::Start, VertexId::Num(2)),
            (VertexId::Num(1), VertexId::Num(3)),
            (VertexId::Num(2), VertexId::Num(3)),
            (VertexId::Num(3), VertexId::Num(4)),
            (VertexId::Num(3), VertexId::Num(5)),
            (VertexId::Num(4), VertexId::End),
            (VertexId::Num(5), VertexId::End),
        ]);
        graph.add_vertex(VertexId::Num(99));

        let order = chapter_order(&graph).unwrap();

        assert_eq!(order.first(), Some(&VertexId::Start));
        assert_eq!(order.last(), Some(&VertexId::End));
        assert!(!order.contains(&VertexId::Num(99)));
        assert_eq!(order.len(), 7);

        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), order.len());
        for id in ids(&[1, 2, 3, 4, 5]) {
            assert!(order.contains(&id));
        }
    }

    #[test]
    fn test_reconvergence_keeps_merge_after_branches() {
        // A longer arm and a short arm converging at 4.
        let graph = graph_with_edges(&[
            (VertexId::Start, VertexId::Num(1)),
            (VertexId::Num(1), VertexId::Num(2)),
            (VertexId::Num(2), VertexId::Num(4)),
            (VertexId::Start, VertexId::Num(3)),
            (VertexId::Num(3), VertexId::Num(4)),
            (VertexId::Num(4), VertexId::End),
        ]);

        let order = chapter_order(&graph).unwrap();
        let position = |id: VertexId| order.iter().position(|v| *v == id).unwrap();

        assert!(position(VertexId::Num(1)) < position(VertexId::Num(4)));
        assert!(position(VertexId::Num(2)) < position(VertexId::Num(4)));
        assert!(position(VertexId::Num(3)) < position(VertexId::Num(4)));
        assert!(position(VertexId::Num(4)) < position(VertexId::End));
    }

    #[test]
    fn test_missing_start_is_typed() {
        let graph = Graph::new(1, "g", Registry::empty());
        let result = chapter_order_between(&graph, VertexId::Num(7), VertexId::End);
        assert!(matches!(result, Err(EngineError::VertexNotFound { .. })));
    }

    #[test]
    fn test_custom_endpoints() {
        let graph = graph_with_edges(&[
            (VertexId::Start, VertexId::Num(1)),
            (VertexId::Num(1), VertexId::Num(2)),
            (VertexId::Num(2), VertexId::Num(3)),
            (VertexId::Num(3), VertexId::End),
        ]);

        let order =
            chapter_order_between(&graph, VertexId::Num(1), VertexId::Num(3)).unwrap();
        assert_eq!(order, ids(&[1, 2, 3]));
    }
}
