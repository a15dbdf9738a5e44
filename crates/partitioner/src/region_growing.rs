use crate::connectivity::{connected_components, is_part_connected};
use crate::graph::{Graph, PartId, VertexId};
use crate::partition::Partition;
use crate::Error;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

/// Random candidates sampled per seed after the first one.
const SEED_CANDIDATES: usize = 16;

/// Builds an initial assignment by growing one region per part from
/// spread-out seed vertices, then repairing leftovers and splitting any
/// part that did not end up connected.
///
/// Returns the populated partition store and whether every final part
/// size lies within the requested balance tolerance. Precondition
/// violations (`num_parts` of zero or larger than the vertex count,
/// accuracy outside `(0, 1]`) are reported as errors before any partition
/// state is touched.
#[instrument(skip_all)]
pub fn region_growing<R: Rng>(
    graph: &mut Graph,
    num_parts: usize,
    accuracy: f64,
    rng: &mut R,
) -> Result<(Partition, bool), Error> {
    graph.set_part_bounds(num_parts, accuracy)?;
    graph.clear_assignment();
    let mut partition = Partition::new(num_parts);

    let n = graph.node_count();
    let seeds = select_seeds(graph, num_parts, rng);
    for (i, &seed) in seeds.iter().enumerate() {
        partition.assign(graph, seed, PartId::new(i));
    }

    // seeded after all parts exist so no seed lands in another frontier
    let mut frontiers: Vec<Vec<VertexId>> = vec![Vec::new(); num_parts];
    for (i, &seed) in seeds.iter().enumerate() {
        for &v in graph.neighbors(seed) {
            if !graph.part_of(v).is_valid() {
                frontiers[i].push(v);
            }
        }
    }

    grow(graph, &mut partition, &mut frontiers);
    repair_unassigned(graph, &mut partition);
    split_disconnected_parts(graph, &mut partition);

    let sizes = partition.part_sizes();
    let success =
        sizes.iter().all(|&s| s >= graph.min_part_size() && s <= graph.max_part_size());
    if !success {
        warn!(
            ?sizes,
            min = graph.min_part_size(),
            max = graph.max_part_size(),
            "part sizes ended up outside the requested tolerance"
        );
    }
    info!(parts = num_parts, cut = graph.cut_edges(), success, "initial partition built");
    Ok((partition, success))
}

/// The first seed is uniform; every further seed is the best of
/// [`SEED_CANDIDATES`] random unassigned vertices, scored by how few
/// direct edges it has to the seeds chosen so far. A candidate with no
/// such edge wins outright.
fn select_seeds<R: Rng>(graph: &Graph, num_parts: usize, rng: &mut R) -> Vec<VertexId> {
    let n = graph.node_count();
    let mut is_seed = vec![false; n];
    let mut seeds = Vec::with_capacity(num_parts);

    let first = VertexId::new(rng.gen_range(0..n));
    is_seed[first.index()] = true;
    seeds.push(first);

    while seeds.len() < num_parts {
        let mut best: Option<(VertexId, usize)> = None;
        for _ in 0..SEED_CANDIDATES {
            let candidate = VertexId::new(rng.gen_range(0..n));
            if is_seed[candidate.index()] {
                continue;
            }
            let links = graph.neighbors(candidate).iter().filter(|w| is_seed[w.index()]).count();
            if best.map_or(true, |(_, fewest)| links < fewest) {
                best = Some((candidate, links));
            }
            if links == 0 {
                break;
            }
        }
        // a dense seed set can swallow the whole sample
        let seed = best.map(|(v, _)| v).unwrap_or_else(|| {
            (0..n).map(VertexId::new).find(|v| !is_seed[v.index()]).expect("parts <= vertices")
        });
        is_seed[seed.index()] = true;
        seeds.push(seed);
    }
    seeds
}

fn grow(graph: &mut Graph, partition: &mut Partition, frontiers: &mut [Vec<VertexId>]) {
    let n = graph.node_count();
    let mut relaxed_max = graph.max_part_size();
    let mut unassigned = n - partition.num_parts();
    let mut iterations = 0;
    let cap = 2 * n;

    while unassigned > 0 && iterations < cap {
        iterations += 1;

        // smallest part that still has room and a frontier to grow from
        let pick = partition
            .parts()
            .filter(|&p| !frontiers[p.index()].is_empty() && partition.len(p) < relaxed_max)
            .min_by_key(|&p| partition.len(p));
        let part = match pick {
            Some(part) => part,
            None => {
                let Some(part) =
                    partition.parts().find(|&p| !frontiers[p.index()].is_empty())
                else {
                    debug!(unassigned, "all frontiers empty, stopping growth");
                    break;
                };
                if partition.len(part) >= relaxed_max {
                    relaxed_max += 1;
                    debug!(max = relaxed_max, "relaxing the part size ceiling");
                }
                part
            }
        };

        let Some(v) = pop_growable(graph, &mut frontiers[part.index()], part) else {
            continue;
        };
        partition.assign(graph, v, part);
        unassigned -= 1;
        for &w in graph.neighbors(v) {
            if !graph.part_of(w).is_valid() {
                frontiers[part.index()].push(w);
            }
        }
    }

    if iterations >= cap {
        warn!(unassigned, "region growing stopped at the iteration cap");
    }
}

/// Pops frontier entries until one is still unassigned and touches the
/// part it would join; stale or detached entries are discarded.
fn pop_growable(graph: &Graph, frontier: &mut Vec<VertexId>, part: PartId) -> Option<VertexId> {
    while let Some(v) = frontier.pop() {
        if graph.part_of(v).is_valid() {
            continue;
        }
        if graph.neighbors(v).iter().any(|&w| graph.part_of(w) == part) {
            return Some(v);
        }
    }
    None
}

/// Assigns vertices the growth loop never reached: any with an assigned
/// neighbor joins the smallest such neighboring part, repeated until no
/// progress; fully isolated leftovers go to the smallest part overall.
fn repair_unassigned(graph: &mut Graph, partition: &mut Partition) {
    let n = graph.node_count();
    loop {
        let mut progress = false;
        for v in (0..n).map(VertexId::new) {
            if graph.part_of(v).is_valid() {
                continue;
            }
            let target = graph
                .neighbors(v)
                .iter()
                .map(|&w| graph.part_of(w))
                .filter(|p| p.is_valid())
                .min_by_key(|&p| partition.len(p));
            if let Some(part) = target {
                partition.assign(graph, v, part);
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }

    for v in (0..n).map(VertexId::new) {
        if graph.part_of(v).is_valid() {
            continue;
        }
        let smallest =
            partition.parts().min_by_key(|&p| partition.len(p)).expect("at least one part");
        warn!(vertex = %v, part = %smallest, "force-assigning a vertex isolated from every region");
        partition.assign(graph, v, smallest);
    }
}

/// Restores the connectivity invariant: a disconnected part keeps its
/// largest component, every smaller component moves wholesale to the
/// neighboring part with the fewest members.
fn split_disconnected_parts(graph: &mut Graph, partition: &mut Partition) {
    for part in (0..partition.num_parts()).map(PartId::new) {
        if partition.len(part) <= 1 || is_part_connected(graph, partition.members(part)) {
            continue;
        }
        let components = connected_components(graph, partition.members(part));
        debug!(part = %part, components = components.len(), "splitting a disconnected part");
        for component in &components[1..] {
            let target = component
                .iter()
                .flat_map(|&v| graph.neighbors(v))
                .map(|&w| graph.part_of(w))
                .filter(|&q| q.is_valid() && q != part)
                .min_by_key(|&q| partition.len(q));
            match target {
                Some(q) => {
                    for &v in component {
                        partition.move_vertex(graph, v, q);
                    }
                }
                None => {
                    // an island with no edges out of the part; moving it
                    // cannot make any part connected
                    warn!(part = %part, size = component.len(), "leaving an isolated component in place");
                }
            }
        }
    }
}
