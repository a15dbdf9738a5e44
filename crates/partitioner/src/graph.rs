use crate::Error;
use common::make_index;
use petgraph::graph::UnGraph;

make_index!(pub VertexId);
make_index!(pub PartId);

/// Adjacency-list graph with a mutable part assignment per vertex.
///
/// Adjacency is symmetric (every edge is stored on both endpoints) and
/// free of self loops; the constructors filter them. `part_of` starts out
/// as `PartId::invalid()` for every vertex, meaning unassigned.
#[derive(Debug, Clone)]
pub struct Graph {
    adjacency: Vec<Vec<VertexId>>,
    part_of: Vec<PartId>,
    num_parts: usize,
    min_part_size: usize,
    max_part_size: usize,
}

impl Graph {
    pub fn new(vertices: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertices],
            part_of: vec![PartId::invalid(); vertices],
            num_parts: 0,
            min_part_size: 0,
            max_part_size: 0,
        }
    }

    pub fn from_petgraph(graph: &UnGraph<(), ()>) -> Self {
        let mut this = Self::new(graph.node_count());
        for edge in graph.edge_indices() {
            let (u, v) = graph.edge_endpoints(edge).unwrap();
            this.add_edge(VertexId::new(u.index()), VertexId::new(v.index()));
        }
        this
    }

    /// Adds an undirected edge. Self loops and duplicates are ignored.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) {
        if u == v || self.adjacency[u.index()].contains(&v) {
            return;
        }
        self.adjacency[u.index()].push(v);
        self.adjacency[v.index()].push(u);
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges (each adjacency entry counted half).
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        &self.adjacency[v.index()]
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.adjacency[v.index()].len()
    }

    pub fn part_of(&self, v: VertexId) -> PartId {
        self.part_of[v.index()]
    }

    pub(crate) fn set_part(&mut self, v: VertexId, part: PartId) {
        self.part_of[v.index()] = part;
    }

    pub fn assignment(&self) -> &[PartId] {
        &self.part_of
    }

    pub(crate) fn restore_assignment(&mut self, assignment: &[PartId]) {
        self.part_of.copy_from_slice(assignment);
    }

    pub(crate) fn clear_assignment(&mut self) {
        self.part_of.fill(PartId::invalid());
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn min_part_size(&self) -> usize {
        self.min_part_size
    }

    pub fn max_part_size(&self) -> usize {
        self.max_part_size
    }

    /// Derives the balance bounds from the part count and the accuracy
    /// tolerance: sizes must lie in `[ceil(avg(1-accuracy)), floor(avg(1+accuracy))]`
    /// where `avg = vertices / parts`.
    pub fn set_part_bounds(&mut self, parts: usize, accuracy: f64) -> Result<(), Error> {
        if parts == 0 {
            return Err(Error::NoParts);
        }
        if parts > self.node_count() {
            return Err(Error::TooManyParts { parts, vertices: self.node_count() });
        }
        if !(accuracy > 0.0 && accuracy <= 1.0) {
            return Err(Error::InvalidAccuracy(accuracy));
        }
        let avg = self.node_count() as f64 / parts as f64;
        self.num_parts = parts;
        self.min_part_size = (avg * (1.0 - accuracy)).ceil() as usize;
        self.max_part_size = (avg * (1.0 + accuracy)).floor() as usize;
        Ok(())
    }

    /// Number of edges whose endpoints lie in different parts, each
    /// undirected edge counted once (`u < v` convention).
    pub fn cut_edges(&self) -> usize {
        let mut cut = 0;
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            let u = VertexId::new(u);
            for &v in neighbors {
                if u < v && self.part_of(u) != self.part_of(v) {
                    cut += 1;
                }
            }
        }
        cut
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::instances;

    #[test]
    fn from_petgraph_is_symmetric() {
        let graph = Graph::from_petgraph(&instances::path_graph(4));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(VertexId::new(1)), [VertexId::new(0), VertexId::new(2)]);
        for u in 0..4 {
            let u = VertexId::new(u);
            for &v in graph.neighbors(u) {
                assert!(graph.neighbors(v).contains(&u));
            }
        }
    }

    #[test]
    fn add_edge_filters_self_loops_and_duplicates() {
        let mut graph = Graph::new(3);
        graph.add_edge(VertexId::new(0), VertexId::new(1));
        graph.add_edge(VertexId::new(1), VertexId::new(0));
        graph.add_edge(VertexId::new(2), VertexId::new(2));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(VertexId::new(2)), 0);
    }

    #[test]
    fn part_bounds() {
        let mut graph = Graph::new(10);
        graph.set_part_bounds(2, 0.2).unwrap();
        assert_eq!(graph.min_part_size(), 4);
        assert_eq!(graph.max_part_size(), 6);

        assert!(matches!(graph.set_part_bounds(0, 0.2), Err(Error::NoParts)));
        assert!(matches!(graph.set_part_bounds(11, 0.2), Err(Error::TooManyParts { .. })));
        assert!(matches!(graph.set_part_bounds(2, 0.0), Err(Error::InvalidAccuracy(_))));
        assert!(matches!(graph.set_part_bounds(2, 1.5), Err(Error::InvalidAccuracy(_))));
    }

    #[test]
    fn cut_edges_counts_each_edge_once() {
        let mut graph = Graph::from_petgraph(&instances::cycle_graph(4));
        graph.set_part(VertexId::new(0), PartId::new(0));
        graph.set_part(VertexId::new(1), PartId::new(0));
        graph.set_part(VertexId::new(2), PartId::new(1));
        graph.set_part(VertexId::new(3), PartId::new(1));
        // edges (1,2) and (3,0) cross
        assert_eq!(graph.cut_edges(), 2);
    }
}
