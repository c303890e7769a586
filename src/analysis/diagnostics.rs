//! 网络连通性诊断：孤立节点、源迁移、汇库所等可疑结构。
use std::fs;
use std::io::Write;

use petgraph::Direction;

use crate::net::{Net, NetNode, PlaceId, TransitionId};

/// Petri 网连通性诊断报告
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    /// 孤立库所（无任何连接的弧）
    pub isolated_places: Vec<(PlaceId, String)>,
    /// 孤立变迁（无任何连接的弧）
    pub isolated_transitions: Vec<(TransitionId, String)>,
    /// 警告信息
    pub warnings: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.isolated_transitions.is_empty()
            || !self.warnings.is_empty()
    }

    pub fn save_to_file(&self, path: &str) -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;

        writeln!(file, "=== Net connectivity report ===")?;
        writeln!(
            file,
            "total: {} places, {} transitions",
            self.total_places, self.total_transitions
        )?;
        writeln!(file)?;

        if !self.isolated_places.is_empty() {
            writeln!(file, "isolated places ({}):", self.isolated_places.len())?;
            for (id, name) in &self.isolated_places {
                writeln!(file, "  [{}] {}", id, name)?;
            }
            writeln!(file)?;
        }

        if !self.isolated_transitions.is_empty() {
            writeln!(
                file,
                "isolated transitions ({}):",
                self.isolated_transitions.len()
            )?;
            for (id, name) in &self.isolated_transitions {
                writeln!(file, "  [{}] {}", id, name)?;
            }
            writeln!(file)?;
        }

        if !self.warnings.is_empty() {
            writeln!(file, "warnings ({}):", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(file, "  - {}", warning)?;
            }
        }

        Ok(())
    }
}

/// 在二部图视图上检查每个节点的入/出边。
pub fn diagnose_connectivity(net: &Net) -> DiagnosticReport {
    let graph = net.to_graph();
    let mut report = DiagnosticReport {
        total_places: net.places_len(),
        total_transitions: net.transitions_len(),
        ..DiagnosticReport::default()
    };

    for node in graph.node_indices() {
        let has_input = graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
            .is_some();
        let has_output = graph
            .neighbors_directed(node, Direction::Outgoing)
            .next()
            .is_some();

        match &graph[node] {
            NetNode::Place(id) => {
                let Some(place) = net.place(id.as_str()) else {
                    continue;
                };
                if !has_input && !has_output {
                    report
                        .isolated_places
                        .push((id.clone(), place.name.clone()));
                } else if !has_input && place.tokens == 0 {
                    // 没有输入弧且初始为空的库所永远不会被填充
                    report.warnings.push(format!(
                        "place '{}' ({}) has no producer and starts empty",
                        place.name, id
                    ));
                } else if !has_output {
                    report.warnings.push(format!(
                        "place '{}' ({}) is a sink, tokens accumulate there",
                        place.name, id
                    ));
                }
            }
            NetNode::Transition(id) => {
                let Some(transition) = net.transition(id.as_str()) else {
                    continue;
                };
                if !has_input && !has_output {
                    report
                        .isolated_transitions
                        .push((id.clone(), transition.name.clone()));
                } else if !has_input {
                    report.warnings.push(format!(
                        "transition '{}' ({}) has no input place and is always enabled",
                        transition.name, id
                    ));
                } else if !has_output {
                    report.warnings.push(format!(
                        "transition '{}' ({}) has no output place",
                        transition.name, id
                    ));
                }
            }
        }
    }

    report
}

/// 打印诊断报告到日志
pub fn log_diagnostics(net: &Net) -> DiagnosticReport {
    let report = diagnose_connectivity(net);

    if report.has_issues() {
        log::warn!(
            "connectivity: {} places, {} transitions",
            report.total_places,
            report.total_transitions
        );
        for (id, name) in &report.isolated_places {
            log::warn!("  isolated place [{}] {}", id, name);
        }
        for (id, name) in &report.isolated_transitions {
            log::warn!("  isolated transition [{}] {}", id, name);
        }
        for warning in &report.warnings {
            log::warn!("  {}", warning);
        }
    } else {
        log::info!("connectivity check passed, no isolated nodes");
    }

    report
}
