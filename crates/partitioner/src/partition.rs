use crate::graph::{Graph, PartId, VertexId};

/// Per-part member lists, kept in sync with [`Graph::part_of`].
///
/// `part_of` is authoritative; the lists are a derived index. All
/// mutation goes through [`assign`](Partition::assign) and
/// [`move_vertex`](Partition::move_vertex) so the two can never diverge.
#[derive(Debug, Clone)]
pub struct Partition {
    members: Vec<Vec<VertexId>>,
}

impl Partition {
    pub fn new(num_parts: usize) -> Self {
        Self { members: (0..num_parts).map(|_| Vec::with_capacity(128)).collect() }
    }

    pub fn num_parts(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self, part: PartId) -> &[VertexId] {
        &self.members[part.index()]
    }

    pub fn len(&self, part: PartId) -> usize {
        self.members[part.index()].len()
    }

    pub fn is_empty(&self, part: PartId) -> bool {
        self.members[part.index()].is_empty()
    }

    pub fn part_sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    pub fn parts(&self) -> impl Iterator<Item = PartId> {
        (0..self.members.len()).map(PartId::new)
    }

    /// First-time assignment of an unassigned vertex.
    pub fn assign(&mut self, graph: &mut Graph, v: VertexId, part: PartId) {
        debug_assert!(!graph.part_of(v).is_valid());
        graph.set_part(v, part);
        self.members[part.index()].push(v);
    }

    /// Moves an assigned vertex to `target`, updating `part_of` and both
    /// member lists in one step.
    pub fn move_vertex(&mut self, graph: &mut Graph, v: VertexId, target: PartId) {
        let source = graph.part_of(v);
        debug_assert!(source.is_valid() && source != target);
        let members = &mut self.members[source.index()];
        let pos = members.iter().position(|&u| u == v).expect("member list out of sync");
        members.swap_remove(pos);
        graph.set_part(v, target);
        self.members[target.index()].push(v);
    }

    /// Rebuilds every member list from `part_of`, used after restoring a
    /// snapshot assignment into the graph.
    pub fn rebuild_from(&mut self, graph: &Graph) {
        for members in &mut self.members {
            members.clear();
        }
        for (v, &part) in graph.assignment().iter().enumerate() {
            if part.is_valid() {
                self.members[part.index()].push(VertexId::new(v));
            }
        }
    }

    /// True iff the member lists agree exactly with `part_of`: every
    /// assigned vertex appears in exactly the list of its part.
    pub fn agrees_with(&self, graph: &Graph) -> bool {
        let mut seen = vec![false; graph.node_count()];
        for (p, members) in self.members.iter().enumerate() {
            for &v in members {
                if seen[v.index()] || graph.part_of(v) != PartId::new(p) {
                    return false;
                }
                seen[v.index()] = true;
            }
        }
        (0..graph.node_count())
            .all(|v| seen[v] == graph.part_of(VertexId::new(v)).is_valid())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::instances;

    #[test]
    fn assign_and_move_keep_both_views_in_sync() {
        let mut graph = Graph::from_petgraph(&instances::path_graph(4));
        let mut partition = Partition::new(2);
        for v in 0..4 {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(v / 2));
        }
        assert!(partition.agrees_with(&graph));
        assert_eq!(partition.part_sizes(), [2, 2]);

        partition.move_vertex(&mut graph, VertexId::new(1), PartId::new(1));
        assert!(partition.agrees_with(&graph));
        assert_eq!(partition.part_sizes(), [1, 3]);
        assert_eq!(graph.part_of(VertexId::new(1)), PartId::new(1));
    }

    #[test]
    fn rebuild_matches_assignment() {
        let mut graph = Graph::from_petgraph(&instances::cycle_graph(6));
        let mut partition = Partition::new(3);
        for v in 0..6 {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(v % 3));
        }
        let snapshot: Vec<_> = graph.assignment().to_vec();

        partition.move_vertex(&mut graph, VertexId::new(0), PartId::new(1));
        graph.restore_assignment(&snapshot);
        partition.rebuild_from(&graph);

        assert!(partition.agrees_with(&graph));
        assert_eq!(partition.part_sizes(), [2, 2, 2]);
    }
}
