use crate::Timings;
use partitioner::{Graph, Partition, RefineSummary};

/// Read-only report over the final graph and partition.
pub(crate) fn print_statistics(
    graph: &Graph,
    partition: &Partition,
    parts: usize,
    accuracy: f64,
    summary: &RefineSummary,
    timings: &Timings,
) {
    let vertices = graph.node_count();
    let edges = graph.edge_count();

    println!("=== Partition statistics ===");
    println!();
    println!("Graph:");
    println!("- vertices: {vertices}");
    println!("- edges: {edges}");
    println!();
    println!("Split:");
    println!("- parts: {parts}");
    println!("- accuracy: {:.2}%", accuracy * 100.0);

    println!();
    println!("Part sizes:");
    let average = vertices as f64 / parts as f64;
    for part in partition.parts() {
        let size = partition.len(part);
        println!(
            "- part {part}: {size} vertices ({:.2}% of average)",
            size as f64 / average * 100.0
        );
    }

    let cut = graph.cut_edges();
    println!();
    println!("Cut:");
    println!("- cut edges: {cut}");
    if edges > 0 {
        println!("- cut percentage: {:.2}%", cut as f64 / edges as f64 * 100.0);
    }
    println!(
        "- refinement: {} -> {} in {} moves",
        summary.initial_cut, summary.best_cut, summary.moves_made
    );

    println!();
    println!("Timings:");
    println!("- read: {:?}", timings.read);
    println!("- region growing: {:?}", timings.grow);
    println!("- refinement: {:?}", timings.refine);
    println!("- write: {:?}", timings.write);
}
