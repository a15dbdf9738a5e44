use crate::connectivity::{
    first_disconnected_part, verify_all_partitions, would_remain_connected_if_removed,
};
use crate::graph::{Graph, PartId, VertexId};
use crate::partition::Partition;
use crate::Error;
use rayon::prelude::*;
use std::ops::Range;
use tracing::{debug, info, instrument};

/// Below this vertex count the best-move search stays on one thread.
const SEQUENTIAL_CUTOFF: usize = 512;

/// What a refinement run did, for logging and statistics.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RefineSummary {
    pub initial_cut: usize,
    pub best_cut: usize,
    pub moves_made: usize,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy)]
struct Move {
    vertex: VertexId,
    target: PartId,
    gain: i32,
}

/// Per-run search state. The `gain` and `target_part` entries are
/// advisory caches; neighbor moves invalidate them, so they are only
/// written for the winning candidate of each search.
struct FmContext {
    locked: Vec<bool>,
    unmovable: Vec<bool>,
    gain: Vec<i32>,
    target_part: Vec<PartId>,
    part_sizes: Vec<usize>,
    current_cut: usize,
    best_cut: usize,
    best_assignment: Vec<PartId>,
    moves_made: usize,
}

/// Fiduccia-Mattheyses refinement: repeatedly applies the highest-gain
/// vertex move that keeps every part inside the balance bounds and does
/// not disconnect the source part, then restores the best assignment
/// seen.
///
/// A zero initial cut or a zero iteration budget returns immediately
/// without touching any state. A global connectivity failure after an
/// applied move is a logic defect and aborts the run with
/// [`Error::IntegrityViolation`].
#[instrument(skip_all)]
pub fn refine(
    graph: &mut Graph,
    partition: &mut Partition,
    max_iterations: usize,
) -> Result<RefineSummary, Error> {
    let n = graph.node_count();
    let initial_cut = graph.cut_edges();
    if initial_cut == 0 || max_iterations == 0 {
        return Ok(RefineSummary { initial_cut, best_cut: initial_cut, moves_made: 0, iterations: 0 });
    }

    let mut ctx = FmContext {
        locked: vec![false; n],
        unmovable: vec![false; n],
        gain: vec![0; n],
        target_part: graph.assignment().to_vec(),
        part_sizes: partition.part_sizes(),
        current_cut: initial_cut,
        best_cut: initial_cut,
        best_assignment: graph.assignment().to_vec(),
        moves_made: 0,
    };
    // only meaningful when the run starts from a fully connected state;
    // degenerate inputs may carry isolated islands that no move can heal
    let check_integrity = verify_all_partitions(graph, partition);

    let mut iterations = 0;
    for _ in 0..max_iterations {
        let boundary = boundary_vertices(graph);
        ctx.locked.fill(false);

        let Some(vertex) = find_best_move(graph, partition, &mut ctx, &boundary) else {
            debug!(iterations, "no legal positive-gain move left");
            break;
        };
        iterations += 1;

        let target = ctx.target_part[vertex.index()];
        let gain = ctx.gain[vertex.index()];
        let source = graph.part_of(vertex);
        partition.move_vertex(graph, vertex, target);
        ctx.part_sizes[source.index()] -= 1;
        ctx.part_sizes[target.index()] += 1;
        ctx.current_cut -= gain as usize;
        ctx.locked[vertex.index()] = true;
        ctx.moves_made += 1;

        if ctx.current_cut < ctx.best_cut {
            ctx.best_cut = ctx.current_cut;
            ctx.best_assignment.copy_from_slice(graph.assignment());
        }

        if check_integrity {
            if let Some(part) = first_disconnected_part(graph, partition) {
                graph.restore_assignment(&ctx.best_assignment);
                partition.rebuild_from(graph);
                return Err(Error::IntegrityViolation { part, vertex });
            }
        }
    }

    graph.restore_assignment(&ctx.best_assignment);
    partition.rebuild_from(graph);
    debug_assert_eq!(graph.cut_edges(), ctx.best_cut);

    info!(initial_cut, best_cut = ctx.best_cut, moves = ctx.moves_made, "refinement finished");
    Ok(RefineSummary { initial_cut, best_cut: ctx.best_cut, moves_made: ctx.moves_made, iterations })
}

/// Signed change in cut-edge count if `vertex` moved to `target`
/// (positive means fewer cut edges).
pub fn calculate_gain(graph: &Graph, vertex: VertexId, target: PartId) -> i32 {
    let current = graph.part_of(vertex);
    let mut gain = 0;
    for &w in graph.neighbors(vertex) {
        let part = graph.part_of(w);
        if part == target {
            gain += 1;
        } else if part == current {
            gain -= 1;
        }
    }
    gain
}

/// A vertex is boundary iff some neighbor lies in a different part.
fn boundary_vertices(graph: &Graph) -> Vec<bool> {
    (0..graph.node_count())
        .map(|v| {
            let v = VertexId::new(v);
            let part = graph.part_of(v);
            graph.neighbors(v).iter().any(|&w| graph.part_of(w) != part)
        })
        .collect()
}

/// Best legal positive-gain move over the whole vertex range, searched in
/// parallel over contiguous chunks on large graphs. The winner's gain and
/// destination are stored in the context for the apply step. Vertices
/// whose removal would disconnect their part are banned for the rest of
/// the run; the bans found by the read-only workers are applied
/// sequentially after the join.
fn find_best_move(
    graph: &Graph,
    partition: &Partition,
    ctx: &mut FmContext,
    boundary: &[bool],
) -> Option<VertexId> {
    let n = graph.node_count();
    let (best, banned) = {
        let ctx = &*ctx;
        if n < SEQUENTIAL_CUTOFF {
            scan_range(graph, partition, ctx, boundary, 0..n)
        } else {
            let workers = std::thread::available_parallelism().map(|t| t.get()).unwrap_or(1);
            let chunk = n.div_ceil(workers);
            let locals: Vec<_> = (0..workers)
                .into_par_iter()
                .map(|t| {
                    let range = (t * chunk).min(n)..((t + 1) * chunk).min(n);
                    scan_range(graph, partition, ctx, boundary, range)
                })
                .collect();

            let mut best: Option<Move> = None;
            let mut banned = Vec::new();
            for (local_best, local_banned) in locals {
                if let Some(candidate) = local_best {
                    if improves_on(candidate, best) {
                        best = Some(candidate);
                    }
                }
                banned.extend(local_banned);
            }
            (best, banned)
        }
    };

    for v in banned {
        ctx.unmovable[v.index()] = true;
    }
    let mv = best?;
    ctx.gain[mv.vertex.index()] = mv.gain;
    ctx.target_part[mv.vertex.index()] = mv.target;
    Some(mv.vertex)
}

/// Highest gain wins; ties go to the lowest vertex id, then the lowest
/// target id, so the search is deterministic.
fn improves_on(candidate: Move, best: Option<Move>) -> bool {
    match best {
        None => true,
        Some(best) => {
            candidate.gain > best.gain
                || (candidate.gain == best.gain
                    && (candidate.vertex, candidate.target) < (best.vertex, best.target))
        }
    }
}

/// Local best move over `range`, together with the vertices whose
/// connectivity probe failed. Reads shared state only.
fn scan_range(
    graph: &Graph,
    partition: &Partition,
    ctx: &FmContext,
    boundary: &[bool],
    range: Range<usize>,
) -> (Option<Move>, Vec<VertexId>) {
    let mut best: Option<Move> = None;
    let mut banned = Vec::new();
    let (min_size, max_size) = (graph.min_part_size(), graph.max_part_size());

    for v in range {
        if !boundary[v] || ctx.locked[v] || ctx.unmovable[v] {
            continue;
        }
        let vertex = VertexId::new(v);
        let current = graph.part_of(vertex);

        for target in (0..graph.num_parts()).map(PartId::new) {
            if target == current {
                continue;
            }
            let gain = calculate_gain(graph, vertex, target);
            if gain <= 0 || best.is_some_and(|b| gain <= b.gain) {
                continue;
            }
            if ctx.part_sizes[current.index()] <= min_size
                || ctx.part_sizes[target.index()] >= max_size
            {
                continue;
            }
            if would_remain_connected_if_removed(graph, partition, vertex) {
                best = Some(Move { vertex, target, gain });
            } else {
                // a structural property of the source part, not of the
                // target: no other destination can make this move legal
                banned.push(vertex);
                break;
            }
        }
    }
    (best, banned)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::connectivity::verify_all_partitions;
    use crate::region_growing::region_growing;
    use common::instances;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Two triangles joined by a bridge, with the bridgehead on the
    /// wrong side: moving vertex 3 next to its triangle drops the cut
    /// from 2 to 1.
    fn bridged_triangles() -> (Graph, Partition) {
        let mut graph = Graph::new(6);
        for (u, v) in [(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5)] {
            graph.add_edge(VertexId::new(u), VertexId::new(v));
        }
        graph.set_part_bounds(2, 0.5).unwrap();
        let mut partition = Partition::new(2);
        for v in [0, 1, 2, 3] {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(0));
        }
        for v in [4, 5] {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(1));
        }
        (graph, partition)
    }

    #[test]
    fn gain_matches_the_cut_delta() {
        // parts {0,1} and {2,3}; edges (0,1) intra, (0,2) inter, (2,3) intra
        let mut graph = Graph::new(4);
        for (u, v) in [(0, 1), (0, 2), (2, 3)] {
            graph.add_edge(VertexId::new(u), VertexId::new(v));
        }
        graph.set_part_bounds(2, 1.0).unwrap();
        let mut partition = Partition::new(2);
        for v in 0..4 {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(v / 2));
        }

        assert_eq!(calculate_gain(&graph, VertexId::new(0), PartId::new(1)), 0);
        assert_eq!(calculate_gain(&graph, VertexId::new(2), PartId::new(0)), 0);

        graph.add_edge(VertexId::new(1), VertexId::new(2));
        assert_eq!(calculate_gain(&graph, VertexId::new(2), PartId::new(0)), 1);

        // applying the move changes the cut by exactly the gain
        let before = graph.cut_edges();
        let gain = calculate_gain(&graph, VertexId::new(2), PartId::new(0));
        partition.move_vertex(&mut graph, VertexId::new(2), PartId::new(0));
        assert_eq!(graph.cut_edges() as i32, before as i32 - gain);
    }

    #[test]
    fn refine_moves_the_bridgehead() {
        let (mut graph, mut partition) = bridged_triangles();
        assert_eq!(graph.cut_edges(), 2);

        let summary = refine(&mut graph, &mut partition, 10).unwrap();

        assert_eq!(summary.initial_cut, 2);
        assert_eq!(summary.best_cut, 1);
        assert_eq!(summary.moves_made, 1);
        assert_eq!(graph.cut_edges(), summary.best_cut);
        assert_eq!(graph.part_of(VertexId::new(3)), PartId::new(1));
        assert_eq!(partition.part_sizes(), [3, 3]);
        assert!(partition.agrees_with(&graph));
        assert!(verify_all_partitions(&graph, &partition));
    }

    #[test]
    fn zero_iterations_change_nothing() {
        let (mut graph, mut partition) = bridged_triangles();
        let before = graph.assignment().to_vec();

        let summary = refine(&mut graph, &mut partition, 0).unwrap();

        assert_eq!(summary.best_cut, summary.initial_cut);
        assert_eq!(summary.moves_made, 0);
        assert_eq!(graph.assignment(), before);
        assert!(partition.agrees_with(&graph));
    }

    #[test]
    fn zero_cut_short_circuits() {
        // two disjoint triangles, one per part: nothing to optimize
        let mut graph = Graph::new(6);
        for (u, v) in [(0, 1), (0, 2), (1, 2), (3, 4), (3, 5), (4, 5)] {
            graph.add_edge(VertexId::new(u), VertexId::new(v));
        }
        graph.set_part_bounds(2, 0.5).unwrap();
        let mut partition = Partition::new(2);
        for v in 0..6 {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(v / 3));
        }
        let before = graph.assignment().to_vec();

        let summary = refine(&mut graph, &mut partition, 100).unwrap();

        assert_eq!(summary.initial_cut, 0);
        assert_eq!(summary.moves_made, 0);
        assert_eq!(graph.assignment(), before);
    }

    #[test]
    fn cut_vertex_is_banned_for_the_whole_run() {
        // vertex 1 bridges 0 and 2 inside part 0 while leaning into
        // part 1: the move has positive gain but would split {0, 2}
        let mut graph = Graph::new(6);
        for (u, v) in [(0, 1), (1, 2), (1, 3), (1, 4), (1, 5), (3, 4), (4, 5)] {
            graph.add_edge(VertexId::new(u), VertexId::new(v));
        }
        graph.set_part_bounds(2, 0.5).unwrap();
        let mut partition = Partition::new(2);
        for v in [0, 1, 2] {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(0));
        }
        for v in [3, 4, 5] {
            partition.assign(&mut graph, VertexId::new(v), PartId::new(1));
        }
        assert_eq!(calculate_gain(&graph, VertexId::new(1), PartId::new(1)), 1);

        let mut ctx = FmContext {
            locked: vec![false; 6],
            unmovable: vec![false; 6],
            gain: vec![0; 6],
            target_part: graph.assignment().to_vec(),
            part_sizes: partition.part_sizes(),
            current_cut: graph.cut_edges(),
            best_cut: graph.cut_edges(),
            best_assignment: graph.assignment().to_vec(),
            moves_made: 0,
        };
        let boundary = boundary_vertices(&graph);
        assert!(find_best_move(&graph, &partition, &mut ctx, &boundary).is_none());
        assert!(ctx.unmovable[1]);

        // a bypass edge now makes the move structurally legal, but the
        // ban is permanent for the run and keeps the vertex out of play
        graph.add_edge(VertexId::new(0), VertexId::new(2));
        assert!(would_remain_connected_if_removed(&graph, &partition, VertexId::new(1)));
        let boundary = boundary_vertices(&graph);
        assert!(find_best_move(&graph, &partition, &mut ctx, &boundary).is_none());
    }

    #[test]
    fn ties_break_toward_the_lowest_ids() {
        let a = Move { vertex: VertexId::new(3), target: PartId::new(1), gain: 2 };
        let b = Move { vertex: VertexId::new(5), target: PartId::new(0), gain: 2 };
        let c = Move { vertex: VertexId::new(3), target: PartId::new(0), gain: 2 };
        assert!(!improves_on(b, Some(a)));
        assert!(improves_on(c, Some(a)));
        assert!(improves_on(a, None));
    }

    #[test]
    fn grown_grid_keeps_its_invariants_through_refinement() {
        // large enough to take the parallel search path
        let mut graph = Graph::from_petgraph(&instances::grid_graph(24, 30));
        let mut rng = StdRng::seed_from_u64(11);
        let (mut partition, _) = region_growing(&mut graph, 6, 0.3, &mut rng).unwrap();
        let grown_cut = graph.cut_edges();

        let summary = refine(&mut graph, &mut partition, 40).unwrap();

        assert_eq!(summary.initial_cut, grown_cut);
        assert!(summary.best_cut <= summary.initial_cut);
        assert_eq!(graph.cut_edges(), summary.best_cut);
        assert!(partition.agrees_with(&graph));
        assert!(verify_all_partitions(&graph, &partition));
        assert!(graph.assignment().iter().all(|p| p.is_valid()));
    }
}
