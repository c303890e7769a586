use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::analysis::Analysis;
use crate::engine::{ProductionMetrics, RunState, SimulationEngine};
use crate::net::io::{IoError, write_json};
use crate::net::{Marking, TransitionId};

/// 仿真结束（或任意时刻）的状态快照，供 CLI 输出与展示层消费。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub run_state: RunState,
    pub step: u64,
    pub speed_ms: u64,
    pub history_len: usize,
    pub enabled: Vec<TransitionId>,
    pub marking: Marking,
    pub fire_counts: IndexMap<TransitionId, u64>,
    pub metrics: ProductionMetrics,
    pub analysis: Analysis,
}

impl SimulationReport {
    pub fn capture(engine: &SimulationEngine) -> Self {
        let state = engine.simulation_state();
        Self {
            run_state: state.run_state(),
            step: state.step(),
            speed_ms: state.speed(),
            history_len: state.history().len(),
            enabled: engine.enabled_transitions(),
            marking: engine.marking(),
            fire_counts: engine.fire_counts().clone(),
            metrics: engine.metrics().clone(),
            analysis: engine.analyze(),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        write_json(path, self)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation report")?;
        writeln!(f, "state: {:?}, step: {}", self.run_state, self.step)?;

        writeln!(f, "\nmarking:")?;
        for (place, tokens) in self.marking.iter() {
            writeln!(f, "  {}: {}", place, tokens)?;
        }

        writeln!(f, "\nproduction:")?;
        writeln!(f, "  produced: {}", self.metrics.total_produced)?;
        writeln!(f, "  cycle time: {:.1} ms", self.metrics.cycle_time)?;
        writeln!(f, "  average wait: {:.1}", self.metrics.average_wait_time)?;
        writeln!(f, "  efficiency: {:.1}%", self.metrics.efficiency)?;
        if !self.metrics.bottlenecks.is_empty() {
            let names: Vec<&str> = self
                .metrics
                .bottlenecks
                .iter()
                .map(|place| place.as_str())
                .collect();
            writeln!(f, "  bottlenecks: {}", names.join(", "))?;
        }

        writeln!(f, "\nanalysis:")?;
        writeln!(f, "  live: {}", self.analysis.is_live)?;
        writeln!(f, "  bounded: {}", self.analysis.is_bounded)?;
        writeln!(f, "  deadlock: {}", self.analysis.has_deadlock)?;
        for conflict in &self.analysis.conflicts {
            writeln!(f, "  conflict: {}", conflict)?;
        }
        for (transition, share) in &self.analysis.throughput {
            let fired = self.fire_counts.get(transition).copied().unwrap_or(0);
            writeln!(
                f,
                "  {}: fired {} ({:.1}%)",
                transition,
                fired,
                share * 100.0
            )?;
        }
        Ok(())
    }
}
