use crate::graph::{Graph, PartId, VertexId};
use crate::partition::Partition;
use std::collections::VecDeque;

/// True iff the part holding exactly `members` induces a single connected
/// component. Parts with fewer than two members are trivially connected.
pub fn is_part_connected(graph: &Graph, members: &[VertexId]) -> bool {
    if members.len() <= 1 {
        return true;
    }
    let part = graph.part_of(members[0]);
    reachable_in_part(graph, part, members[0], None) == members.len()
}

/// True iff removing `vertex` from its current part leaves the remaining
/// members mutually reachable through edges internal to that part.
///
/// The check carries `vertex` as an exclusion through the BFS instead of
/// mutating the assignment, so it is safe to call from read-only parallel
/// search workers.
pub fn would_remain_connected_if_removed(
    graph: &Graph,
    partition: &Partition,
    vertex: VertexId,
) -> bool {
    let part = graph.part_of(vertex);
    let members = partition.members(part);
    if members.len() <= 2 {
        return true;
    }
    let start = *members.iter().find(|&&u| u != vertex).expect("part has other members");
    reachable_in_part(graph, part, start, Some(vertex)) == members.len() - 1
}

/// First part that is not a single connected component, if any.
pub fn first_disconnected_part(graph: &Graph, partition: &Partition) -> Option<PartId> {
    partition.parts().find(|&part| !is_part_connected(graph, partition.members(part)))
}

pub fn verify_all_partitions(graph: &Graph, partition: &Partition) -> bool {
    first_disconnected_part(graph, partition).is_none()
}

/// Splits `members` into the connected components of the induced
/// subgraph, largest first.
pub(crate) fn connected_components(graph: &Graph, members: &[VertexId]) -> Vec<Vec<VertexId>> {
    if members.is_empty() {
        return Vec::new();
    }
    let part = graph.part_of(members[0]);
    let mut visited = vec![false; graph.node_count()];
    let mut queue = VecDeque::new();
    let mut components = Vec::new();

    for &root in members {
        if visited[root.index()] {
            continue;
        }
        let mut component = vec![root];
        visited[root.index()] = true;
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            for &v in graph.neighbors(u) {
                if graph.part_of(v) == part && !visited[v.index()] {
                    visited[v.index()] = true;
                    component.push(v);
                    queue.push_back(v);
                }
            }
        }
        components.push(component);
    }

    components.sort_by_key(|c| std::cmp::Reverse(c.len()));
    components
}

/// BFS from `start` over edges whose endpoints both lie in `part`,
/// skipping `excluded`; returns the number of vertices reached.
fn reachable_in_part(
    graph: &Graph,
    part: PartId,
    start: VertexId,
    excluded: Option<VertexId>,
) -> usize {
    let mut visited = vec![false; graph.node_count()];
    let mut queue = VecDeque::new();
    visited[start.index()] = true;
    queue.push_back(start);
    let mut count = 1;

    while let Some(u) = queue.pop_front() {
        for &v in graph.neighbors(u) {
            if Some(v) == excluded || graph.part_of(v) != part || visited[v.index()] {
                continue;
            }
            visited[v.index()] = true;
            queue.push_back(v);
            count += 1;
        }
    }
    count
}
