use crate::io::vbyte::{encode_vbyte, write_sentinel};
use petgraph::graph::{NodeIndex, UnGraph};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::num::ParseIntError;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadCsrrgError {
    #[error("missing line {0} ({1})")]
    MissingLine(usize, &'static str),
    #[error("more adjacency rows than vertices (expected at most {expected}, got {actual})")]
    WrongRowCount { expected: usize, actual: usize },
    #[error("row pointer out of range (got {0}, have {1} edge entries)")]
    InvalidRowPointer(usize, usize),
    #[error("neighbor index out of range (row {row}, got {neighbor}, have {vertices} vertices)")]
    InvalidNeighbor { row: usize, neighbor: usize, vertices: usize },
    #[error("parse error")]
    ParseInt(#[from] ParseIntError),
    #[error("io error")]
    IoError(#[from] std::io::Error),
}

/// The header rows of a CSRRG file, echoed verbatim when writing results.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CsrrgLayout {
    pub max_nodes: u64,
    pub index_row: Vec<u64>,
    pub count_row: Vec<u64>,
}

fn parse_row(line: &str) -> Result<Vec<u64>, ParseIntError> {
    line.split(';').map(str::trim).filter(|t| !t.is_empty()).map(str::parse).collect()
}

/// Reads the line-oriented CSRRG text format.
///
/// Line 1 holds a vertex-count bound, lines 2 and 3 hold index and count
/// rows that are carried through to the output unchanged, line 4 is a flat
/// semicolon-separated list of edge targets and line 5 holds CSR-style row
/// pointers into line 4. The number of vertices is the entry count of
/// line 2. Self references in the edge list are skipped; every accepted
/// target is added as an undirected edge.
pub fn read_csrrg<P>(path: P) -> Result<(UnGraph<(), ()>, CsrrgLayout), ReadCsrrgError>
where
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    let mut lines = std::io::BufReader::new(file).lines();
    let mut next_line = |number: usize, what: &'static str| -> Result<String, ReadCsrrgError> {
        lines.next().ok_or(ReadCsrrgError::MissingLine(number, what))?.map_err(ReadCsrrgError::from)
    };

    let max_nodes: u64 = next_line(1, "vertex count")?.trim().parse()?;
    let index_row = parse_row(&next_line(2, "index row")?)?;
    let count_row = parse_row(&next_line(3, "count row")?)?;
    let edges = parse_row(&next_line(4, "edge list")?)?;
    let row_pointers = parse_row(&next_line(5, "row pointers")?)?;

    let n = index_row.len();
    if row_pointers.len() > n {
        return Err(ReadCsrrgError::WrongRowCount { expected: n, actual: row_pointers.len() });
    }

    let mut graph = UnGraph::with_capacity(n, edges.len());
    for _ in 0..n {
        graph.add_node(());
    }

    for (row, &start) in row_pointers.iter().enumerate() {
        let start = start as usize;
        let end = row_pointers.get(row + 1).map(|&p| p as usize).unwrap_or(edges.len());
        if start > end || end > edges.len() {
            return Err(ReadCsrrgError::InvalidRowPointer(start, edges.len()));
        }
        for &target in &edges[start..end] {
            let target = target as usize;
            if target >= n {
                return Err(ReadCsrrgError::InvalidNeighbor { row, neighbor: target, vertices: n });
            }
            if target != row {
                graph.update_edge(NodeIndex::new(row), NodeIndex::new(target), ());
            }
        }
    }

    Ok((graph, CsrrgLayout { max_nodes, index_row, count_row }))
}

#[derive(Error, Debug)]
pub enum WriteCsrrgError {
    #[error("io error")]
    IoError(#[from] std::io::Error),
}

/// Per part: the member vertices in ascending order, each paired with its
/// in-part neighbors in ascending order.
fn part_sections(graph: &UnGraph<(), ()>, parts: &[Vec<u32>]) -> Vec<Vec<(u32, Vec<u32>)>> {
    let mut part_of = vec![usize::MAX; graph.node_count()];
    for (p, members) in parts.iter().enumerate() {
        for &v in members {
            part_of[v as usize] = p;
        }
    }
    parts
        .iter()
        .enumerate()
        .map(|(p, members)| {
            let mut members = members.clone();
            members.sort_unstable();
            members
                .iter()
                .map(|&v| {
                    let mut neighbors: Vec<u32> = graph
                        .neighbors(NodeIndex::new(v as usize))
                        .map(|w| w.index() as u32)
                        .filter(|&w| part_of[w as usize] == p)
                        .collect();
                    neighbors.sort_unstable();
                    (v, neighbors)
                })
                .collect()
        })
        .collect()
}

/// Writes the partition-aware CSRRG text form: the three header rows, one
/// adjacency line listing every part's members with their in-part
/// neighbors, and one cumulative row-pointer line per part.
pub fn write_csrrg_text<P>(
    path: P,
    layout: &CsrrgLayout,
    graph: &UnGraph<(), ()>,
    parts: &[Vec<u32>],
) -> Result<(), WriteCsrrgError>
where
    P: AsRef<Path>,
{
    let file = File::create(path)?;
    let mut file = BufWriter::new(file);
    let sections = part_sections(graph, parts);

    writeln!(file, "{}", layout.max_nodes)?;
    write_joined(&mut file, &layout.index_row)?;
    write_joined(&mut file, &layout.count_row)?;

    let mut first = true;
    for section in &sections {
        for (v, neighbors) in section {
            if !first {
                write!(file, ";")?;
            }
            first = false;
            write!(file, "{v}")?;
            for (k, w) in neighbors.iter().enumerate() {
                write!(file, "{}{}", if k == 0 { ';' } else { ',' }, w)?;
            }
        }
    }
    writeln!(file)?;

    if sections.is_empty() {
        file.flush()?;
        return Ok(());
    }

    write!(file, "0")?;
    let mut last_pos = 0usize;
    for (_, neighbors) in &sections[0] {
        last_pos += neighbors.len() + 1;
        write!(file, ";{last_pos}")?;
    }
    writeln!(file)?;

    for section in &sections[1..] {
        write!(file, "{last_pos}")?;
        let mut pos = last_pos;
        for (_, neighbors) in section {
            pos += neighbors.len() + 1;
            write!(file, ";{pos}")?;
        }
        last_pos = pos;
        writeln!(file)?;
    }

    file.flush()?;
    Ok(())
}

/// Binary form of [`write_csrrg_text`]: the same integer stream encoded as
/// vbytes, with an 8-byte sentinel between sections.
pub fn write_csrrg_binary<P>(
    path: P,
    layout: &CsrrgLayout,
    graph: &UnGraph<(), ()>,
    parts: &[Vec<u32>],
) -> Result<(), WriteCsrrgError>
where
    P: AsRef<Path>,
{
    let file = File::create(path)?;
    let mut file = BufWriter::new(file);
    let sections = part_sections(graph, parts);

    encode_vbyte(&mut file, layout.max_nodes)?;
    write_sentinel(&mut file)?;
    for &x in &layout.index_row {
        encode_vbyte(&mut file, x)?;
    }
    write_sentinel(&mut file)?;
    for &x in &layout.count_row {
        encode_vbyte(&mut file, x)?;
    }
    write_sentinel(&mut file)?;

    for section in &sections {
        for (v, neighbors) in section {
            encode_vbyte(&mut file, u64::from(*v))?;
            for &w in neighbors {
                encode_vbyte(&mut file, u64::from(w))?;
            }
        }
    }
    write_sentinel(&mut file)?;

    if sections.is_empty() {
        file.flush()?;
        return Ok(());
    }

    encode_vbyte(&mut file, 0)?;
    let mut last_pos = 0u64;
    for (_, neighbors) in &sections[0] {
        last_pos += neighbors.len() as u64 + 1;
        encode_vbyte(&mut file, last_pos)?;
    }
    write_sentinel(&mut file)?;

    for (i, section) in sections[1..].iter().enumerate() {
        encode_vbyte(&mut file, last_pos)?;
        let mut pos = last_pos;
        for (_, neighbors) in section {
            pos += neighbors.len() as u64 + 1;
            encode_vbyte(&mut file, pos)?;
        }
        last_pos = pos;
        if i + 2 < sections.len() {
            write_sentinel(&mut file)?;
        }
    }

    file.flush()?;
    Ok(())
}

fn write_joined<W: Write>(writer: &mut W, row: &[u64]) -> std::io::Result<()> {
    for (i, x) in row.iter().enumerate() {
        if i > 0 {
            write!(writer, ";")?;
        }
        write!(writer, "{x}")?;
    }
    writeln!(writer)
}
