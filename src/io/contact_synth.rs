/// Synthetic contact edges for demos and benchmarks.
///
/// Ring lattice: every agent is linked to its `k` nearest successors (wrapping
/// around), so every node ends up with degree `2k` when `n > 2k`.
pub fn synthetic_contact_edges(n: usize, k: usize) -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(n * k);
    if n < 2 {
        return edges;
    }
    for i in 0..n {
        for d in 1..=k.min(n - 1) {
            let j = (i + d) % n;
            edges.push((i, j));
        }
    }
    edges
}

/// Age groups cycling through `0..n_groups`.
pub fn synthetic_age_groups(n: usize, n_groups: u8) -> Vec<u8> {
    (0..n).map(|i| (i % usize::from(n_groups.max(1))) as u8).collect()
}
