use std::fmt;

use crate::{
    error::Result,
    geometry::Geometry,
    simulator::{CacheStats, Simulator},
    trace::TraceFile,
};

#[derive(Clone)]
pub struct ScenarioConfig {
    /// Section heading, e.g. `4-way SA` or `Block 32B`.
    pub label: String,
    pub geometry: Geometry,
}

impl ScenarioConfig {
    pub fn new(label: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            label: label.into(),
            geometry,
        }
    }
}

pub struct ScenarioResult {
    pub label: String,
    pub trace_results: Vec<TraceResult>,
}

pub struct TraceResult {
    pub trace_name: String,
    pub stats: CacheStats,
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        for result in &self.trace_results {
            let stats = &result.stats;
            writeln!(
                f,
                "  {:<16} hits {:>8} misses {:>8} evictions {:>8} hit-rate {:>6.2}%",
                result.trace_name,
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.hit_rate() * 100.0
            )?;
        }
        Ok(())
    }
}

/// Runs every trace under every scenario, each on a freshly built cache.
pub fn run_scenarios(
    traces: &[TraceFile],
    scenarios: &[ScenarioConfig],
) -> Result<Vec<ScenarioResult>> {
    let mut results = Vec::new();
    for scenario in scenarios {
        let mut per_trace = Vec::new();
        for trace in traces {
            let mut sim = Simulator::new(scenario.geometry)?;
            let stats = sim.run_trace(&trace.entries);
            per_trace.push(TraceResult {
                trace_name: trace.name.clone(),
                stats,
            });
        }
        results.push(ScenarioResult {
            label: scenario.label.clone(),
            trace_results: per_trace,
        });
    }
    Ok(results)
}

pub fn set_associative(base: &Geometry, ways: &[usize]) -> Result<Vec<ScenarioConfig>> {
    ways.iter()
        .map(|&assoc| {
            let geometry = Geometry::new(base.set_bits(), base.block_bits(), assoc)?;
            let label = if assoc == 1 {
                "Direct-Mapped".to_string()
            } else {
                format!("{assoc}-way SA")
            };
            Ok(ScenarioConfig::new(label, geometry))
        })
        .collect()
}

pub fn block_sizes(base: &Geometry, block_bits: &[u32]) -> Result<Vec<ScenarioConfig>> {
    block_bits
        .iter()
        .map(|&bits| {
            let geometry = Geometry::new(base.set_bits(), bits, base.lines_per_set())?;
            Ok(ScenarioConfig::new(
                format!("Block {}B", geometry.block_size()),
                geometry,
            ))
        })
        .collect()
}

pub fn set_counts(base: &Geometry, set_bits: &[u32]) -> Result<Vec<ScenarioConfig>> {
    set_bits
        .iter()
        .map(|&bits| {
            let geometry = Geometry::new(bits, base.block_bits(), base.lines_per_set())?;
            Ok(ScenarioConfig::new(
                format!("{} sets", geometry.set_count()),
                geometry,
            ))
        })
        .collect()
}
