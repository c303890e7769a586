//! 网络容器：库所、迁移与弧的有序集合，以及按 id 的查找、校验与导出。
use std::collections::{HashMap, HashSet};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::ids::{ArcId, PlaceId, TransitionId};
use crate::net::structure::{Arc, ArcDirection, Marking, Place, Transition, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    #[error("duplicate place id {0}")]
    DuplicatePlace(PlaceId),
    #[error("duplicate transition id {0}")]
    DuplicateTransition(TransitionId),
    #[error("duplicate arc id {0}")]
    DuplicateArc(ArcId),
    #[error("arc {arc} references missing {kind} {endpoint:?}")]
    DanglingArc {
        arc: ArcId,
        kind: &'static str,
        endpoint: String,
    },
    #[error("arc {arc} runs parallel to {first} between {from:?} and {to:?}")]
    ParallelArc {
        arc: ArcId,
        first: ArcId,
        from: String,
        to: String,
    },
    #[error("arc {0} has zero weight")]
    ZeroWeight(ArcId),
    #[error("place {0} declares a zero capacity")]
    ZeroCapacity(PlaceId),
    #[error("place {place} holds {tokens} tokens above its capacity {capacity}")]
    OverCapacity {
        place: PlaceId,
        tokens: Weight,
        capacity: Weight,
    },
}

/// 二部图视图中的节点，用于连通性诊断。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetNode {
    Place(PlaceId),
    Transition(TransitionId),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Net {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub arcs: Vec<Arc>,
}

impl Net {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, place: Place) -> PlaceId {
        let id = place.id.clone();
        self.places.push(place);
        id
    }

    pub fn add_transition(&mut self, transition: Transition) -> TransitionId {
        let id = transition.id.clone();
        self.transitions.push(transition);
        id
    }

    pub fn add_arc(&mut self, arc: Arc) -> ArcId {
        let id = arc.id.clone();
        self.arcs.push(arc);
        id
    }

    /// 输入弧: place -> transition
    pub fn add_input_arc(&mut self, place: &str, transition: &str, weight: Weight) -> ArcId {
        let id = self.fresh_arc_id(place, transition);
        self.add_arc(Arc::new(
            id,
            place,
            transition,
            weight,
            ArcDirection::PlaceToTransition,
        ))
    }

    /// 输出弧: transition -> place
    pub fn add_output_arc(&mut self, transition: &str, place: &str, weight: Weight) -> ArcId {
        let id = self.fresh_arc_id(transition, place);
        self.add_arc(Arc::new(
            id,
            transition,
            place,
            weight,
            ArcDirection::TransitionToPlace,
        ))
    }

    fn fresh_arc_id(&self, from: &str, to: &str) -> ArcId {
        let base = format!("{from}->{to}");
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.arc(&candidate).is_some() {
            suffix += 1;
            candidate = format!("{base}#{suffix}");
        }
        ArcId::new(candidate)
    }

    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|place| place.id == id)
    }

    pub fn place_mut(&mut self, id: &str) -> Option<&mut Place> {
        self.places.iter_mut().find(|place| place.id == id)
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transitions.iter().find(|transition| transition.id == id)
    }

    pub fn transition_mut(&mut self, id: &str) -> Option<&mut Transition> {
        self.transitions
            .iter_mut()
            .find(|transition| transition.id == id)
    }

    pub fn arc(&self, id: &str) -> Option<&Arc> {
        self.arcs.iter().find(|arc| arc.id == id)
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    /// 指向迁移的输入弧（place -> transition）。
    pub fn input_arcs<'a>(&'a self, transition: &'a str) -> impl Iterator<Item = &'a Arc> + 'a {
        self.arcs
            .iter()
            .filter(move |arc| arc.is_input() && arc.to == transition)
    }

    /// 迁移产生的输出弧（transition -> place）。
    pub fn output_arcs<'a>(&'a self, transition: &'a str) -> impl Iterator<Item = &'a Arc> + 'a {
        self.arcs
            .iter()
            .filter(move |arc| arc.is_output() && arc.from == transition)
    }

    /// 从库所出发、供给迁移的弧。
    pub fn outgoing_arcs<'a>(&'a self, place: &'a str) -> impl Iterator<Item = &'a Arc> + 'a {
        self.arcs
            .iter()
            .filter(move |arc| arc.is_input() && arc.from == place)
    }

    pub fn marking(&self) -> Marking {
        Marking::new(
            self.places
                .iter()
                .map(|place| (place.id.clone(), place.tokens))
                .collect(),
        )
    }

    /// 检查 id 唯一性、弧端点引用、权重与容量约束，返回首个问题。
    pub fn validate(&self) -> Result<(), NetError> {
        match self.problems().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// 收集全部结构问题。编辑过程中的网络可能暂时不一致，引擎对这些问题是容忍的。
    pub fn problems(&self) -> Vec<NetError> {
        let mut problems = Vec::new();

        let mut seen = HashSet::new();
        for place in &self.places {
            if !seen.insert(place.id.as_str()) {
                problems.push(NetError::DuplicatePlace(place.id.clone()));
            }
            if place.max_capacity == Some(0) {
                problems.push(NetError::ZeroCapacity(place.id.clone()));
            }
            if let Some(capacity) = place.capacity()
                && place.tokens > capacity
            {
                problems.push(NetError::OverCapacity {
                    place: place.id.clone(),
                    tokens: place.tokens,
                    capacity,
                });
            }
        }

        let mut seen = HashSet::new();
        for transition in &self.transitions {
            if !seen.insert(transition.id.as_str()) {
                problems.push(NetError::DuplicateTransition(transition.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        // 同向同端点的弧：可激发性按权重和判定，但通常是编辑失误
        let mut endpoints: HashMap<(&str, &str, ArcDirection), &ArcId> = HashMap::new();
        for arc in &self.arcs {
            if !seen.insert(arc.id.as_str()) {
                problems.push(NetError::DuplicateArc(arc.id.clone()));
            }
            let key = (arc.from.as_str(), arc.to.as_str(), arc.direction);
            if let Some(first) = endpoints.get(&key) {
                problems.push(NetError::ParallelArc {
                    arc: arc.id.clone(),
                    first: (*first).clone(),
                    from: arc.from.clone(),
                    to: arc.to.clone(),
                });
            } else {
                endpoints.insert(key, &arc.id);
            }
            if arc.weight == 0 {
                problems.push(NetError::ZeroWeight(arc.id.clone()));
            }
            if self.place(arc.place()).is_none() {
                problems.push(NetError::DanglingArc {
                    arc: arc.id.clone(),
                    kind: "place",
                    endpoint: arc.place().to_string(),
                });
            }
            if self.transition(arc.transition()).is_none() {
                problems.push(NetError::DanglingArc {
                    arc: arc.id.clone(),
                    kind: "transition",
                    endpoint: arc.transition().to_string(),
                });
            }
        }

        problems
    }

    /// 构造二部有向图视图，边权为弧权重；端点缺失的弧被跳过。
    pub fn to_graph(&self) -> DiGraph<NetNode, Weight> {
        let mut graph = DiGraph::new();
        let place_nodes: Vec<(&str, NodeIndex)> = self
            .places
            .iter()
            .map(|place| {
                (
                    place.id.as_str(),
                    graph.add_node(NetNode::Place(place.id.clone())),
                )
            })
            .collect();
        let transition_nodes: Vec<(&str, NodeIndex)> = self
            .transitions
            .iter()
            .map(|transition| {
                (
                    transition.id.as_str(),
                    graph.add_node(NetNode::Transition(transition.id.clone())),
                )
            })
            .collect();

        for arc in &self.arcs {
            let (Some(place), Some(transition)) = (
                find_node(&place_nodes, arc.place()),
                find_node(&transition_nodes, arc.transition()),
            ) else {
                continue;
            };
            match arc.direction {
                ArcDirection::PlaceToTransition => graph.add_edge(place, transition, arc.weight),
                ArcDirection::TransitionToPlace => graph.add_edge(transition, place, arc.weight),
            };
        }

        graph
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for place in &self.places {
            let capacity = place
                .capacity()
                .map_or_else(|| "inf".to_string(), |capacity| capacity.to_string());
            let _ = writeln!(
                &mut dot,
                "    \"{}\" [label=\"{}\\n{}/{}\", shape=circle, style=filled, fillcolor=\"{}\"];",
                place_node(place.id.as_str()),
                escape_label(&place.name),
                place.tokens,
                capacity,
                fill_color(&place.color, "#e3f2fd"),
            );
        }

        for transition in &self.transitions {
            let _ = writeln!(
                &mut dot,
                "    \"{}\" [label=\"{}\", shape=box, style=filled, fillcolor=\"{}\"];",
                transition_node(transition.id.as_str()),
                escape_label(&transition.name),
                if transition.is_enabled() {
                    "#c8e6c9"
                } else {
                    "#ffe0b2"
                },
            );
        }

        for arc in &self.arcs {
            let (place, transition) = (place_node(arc.place()), transition_node(arc.transition()));
            let (from, to) = match arc.direction {
                ArcDirection::PlaceToTransition => (place, transition),
                ArcDirection::TransitionToPlace => (transition, place),
            };
            if arc.weight == 1 {
                let _ = writeln!(&mut dot, "    \"{}\" -> \"{}\";", from, to);
            } else {
                let _ = writeln!(
                    &mut dot,
                    "    \"{}\" -> \"{}\" [label=\"{}\"];",
                    from, to, arc.weight
                );
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}

fn find_node(nodes: &[(&str, NodeIndex)], id: &str) -> Option<NodeIndex> {
    nodes
        .iter()
        .find(|(node_id, _)| *node_id == id)
        .map(|(_, idx)| *idx)
}

// 库所与迁移的 id 可能重名，DOT 节点名加类别前缀区分
fn place_node(id: &str) -> String {
    format!("place_{}", escape_label(id))
}

fn transition_node(id: &str) -> String {
    format!("trans_{}", escape_label(id))
}

fn fill_color<'a>(color: &'a str, fallback: &'a str) -> &'a str {
    if color.is_empty() { fallback } else { color }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
