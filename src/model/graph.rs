/// Static undirected contact graph over dense agent indices.
///
/// Edges whose endpoints fall outside the population bound (or were never
/// registered) are dropped silently, so a partial population can be run against a
/// full edge file.
#[derive(Debug, Clone, Default)]
pub struct ContactGraph {
    bound: usize,
    adjacency: Vec<Option<Vec<usize>>>,
}

impl ContactGraph {
    pub fn new(population: usize) -> Self {
        Self {
            bound: population,
            adjacency: vec![None; population],
        }
    }

    /// Graph with every index of the population registered.
    pub fn with_agents(population: usize) -> Self {
        let mut g = Self::new(population);
        for i in 0..population {
            g.adjacency[i] = Some(Vec::new());
        }
        g
    }

    /// Register an agent with an empty neighbour set.
    pub fn insert(&mut self, index: usize) -> anyhow::Result<()> {
        anyhow::ensure!(
            index < self.bound,
            "agent index {} outside population bound {}",
            index,
            self.bound
        );
        self.adjacency[index].get_or_insert_with(Vec::new);
        Ok(())
    }

    /// Add every in-bound pair symmetrically. Returns how many pairs were kept.
    pub fn build_from_edges<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut kept = 0;
        for (a, b) in edges {
            if !(self.is_registered(a) && self.is_registered(b)) {
                continue;
            }
            self.link(a, b);
            self.link(b, a);
            kept += 1;
        }
        kept
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        match self.adjacency.get(index) {
            Some(Some(n)) => n,
            _ => &[],
        }
    }

    pub fn population(&self) -> usize {
        self.bound
    }

    pub fn registered(&self) -> usize {
        self.adjacency.iter().filter(|a| a.is_some()).count()
    }

    /// Undirected edge count (self-loops count once).
    pub fn edge_count(&self) -> usize {
        let mut ends = 0;
        let mut loops = 0;
        for (i, adj) in self.adjacency.iter().enumerate() {
            if let Some(adj) = adj {
                ends += adj.len();
                loops += adj.iter().filter(|&&j| j == i).count();
            }
        }
        (ends - loops) / 2 + loops
    }

    fn is_registered(&self, index: usize) -> bool {
        index < self.bound && self.adjacency[index].is_some()
    }

    fn link(&mut self, from: usize, to: usize) {
        if let Some(adj) = self.adjacency[from].as_mut() {
            if !adj.contains(&to) {
                adj.push(to);
            }
        }
    }
}
