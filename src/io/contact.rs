use anyhow::Context;

use crate::model::graph::ContactGraph;

/// Load contact edges from a headerless CSV of `int,int` pairs. Every line must
/// parse; the first bad line aborts the load.
pub fn load_contact_edges_csv(path: &str) -> anyhow::Result<Vec<(usize, usize)>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open contact edge CSV: {}", path))?;
    read_edges(rdr).with_context(|| format!("Failed to read contact edges from {}", path))
}

/// Same as [`load_contact_edges_csv`] but from any reader.
pub fn read_contact_edges<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<(usize, usize)>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    read_edges(rdr)
}

fn read_edges<R: std::io::Read>(mut rdr: csv::Reader<R>) -> anyhow::Result<Vec<(usize, usize)>> {
    let mut edges = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let line = line + 1;
        let record = result.with_context(|| format!("line {}: malformed record", line))?;
        anyhow::ensure!(record.len() == 2, "line {}: expected 2 fields, found {}", line, record.len());
        let a = record[0]
            .parse::<usize>()
            .with_context(|| format!("line {}: bad agent index '{}'", line, &record[0]))?;
        let b = record[1]
            .parse::<usize>()
            .with_context(|| format!("line {}: bad agent index '{}'", line, &record[1]))?;
        edges.push((a, b));
    }
    Ok(edges)
}

/// Build a graph for `population` agents from an edge file; out-of-range edges are
/// dropped by the graph.
pub fn load_contact_graph(path: &str, population: usize) -> anyhow::Result<ContactGraph> {
    let edges = load_contact_edges_csv(path)?;
    let mut graph = ContactGraph::with_agents(population);
    graph.build_from_edges(edges);
    Ok(graph)
}
