use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AgentRow {
    age_group: u8,
}

/// Load one age group per agent from a CSV with an `age_group` column. Row order
/// gives the agent index.
pub fn load_age_groups_csv(path: &str) -> anyhow::Result<Vec<u8>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open age group CSV: {}", path))?;
    let mut groups = Vec::new();
    for (i, result) in rdr.deserialize::<AgentRow>().enumerate() {
        let row = result.with_context(|| format!("age group CSV {}: bad row for agent {}", path, i))?;
        groups.push(row.age_group);
    }
    anyhow::ensure!(!groups.is_empty(), "age group CSV {} has no agents", path);
    Ok(groups)
}

/// Take the first `agent_count` age groups. A file shorter than the population is an error.
pub fn fit_age_groups(groups: &[u8], agent_count: usize) -> anyhow::Result<Vec<u8>> {
    anyhow::ensure!(
        groups.len() >= agent_count,
        "age group list holds {} agents, population has {}",
        groups.len(),
        agent_count
    );
    Ok(groups[..agent_count].to_vec())
}
