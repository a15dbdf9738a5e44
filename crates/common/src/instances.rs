use petgraph::graph::UnGraph;

pub fn empty_graph(n: usize) -> UnGraph<(), ()> {
    let mut graph = UnGraph::with_capacity(n, 0);
    for _ in 0..n {
        graph.add_node(());
    }
    graph
}

pub fn path_graph(n: usize) -> UnGraph<(), ()> {
    let mut graph = empty_graph(n);
    for u in 1..n {
        graph.add_edge(((u - 1) as u32).into(), (u as u32).into(), ());
    }
    graph
}

pub fn cycle_graph(n: usize) -> UnGraph<(), ()> {
    let mut graph = path_graph(n);
    if n > 2 {
        graph.add_edge(((n - 1) as u32).into(), 0.into(), ());
    }
    graph
}

pub fn complete_graph(n: usize) -> UnGraph<(), ()> {
    let mut graph = empty_graph(n);
    for u in 0..n {
        for v in u + 1..n {
            graph.add_edge((u as u32).into(), (v as u32).into(), ());
        }
    }
    graph
}

/// A `rows x cols` grid with edges between horizontal and vertical neighbors.
pub fn grid_graph(rows: usize, cols: usize) -> UnGraph<(), ()> {
    let mut graph = empty_graph(rows * cols);
    let at = |r: usize, c: usize| ((r * cols + c) as u32).into();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                graph.add_edge(at(r, c), at(r, c + 1), ());
            }
            if r + 1 < rows {
                graph.add_edge(at(r, c), at(r + 1, c), ());
            }
        }
    }
    graph
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(path_graph(5).edge_count(), 4);
        assert_eq!(cycle_graph(5).edge_count(), 5);
        assert_eq!(complete_graph(4).edge_count(), 6);
        let grid = grid_graph(3, 4);
        assert_eq!(grid.node_count(), 12);
        assert_eq!(grid.edge_count(), 3 * 3 + 2 * 4);
    }
}
