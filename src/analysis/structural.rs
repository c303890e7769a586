//! 结构与性能分析
//!
//! 这里的活性与有界性都是局部结构启发式，而非基于状态空间的完整判定：
//! 1. 活性：每个迁移至少有一条输入弧（必要条件的近似）
//! 2. 有界性：每个库所都声明了正的有限容量
//! 3. 死锁：当前标识下没有可激发迁移
//! 4. 冲突：同一库所供给多个迁移
//!
//! 每次调用都从当前网络与发射计数重新计算，不跨变更缓存。

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::engine::enablement::enabled_transitions;
use crate::net::{Net, PlaceId, TransitionId, Weight};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub is_live: bool,
    pub is_bounded: bool,
    pub has_deadlock: bool,
    pub conflicts: Vec<String>,
    pub max_tokens: IndexMap<PlaceId, Weight>,
    pub throughput: IndexMap<TransitionId, f64>,
}

pub fn analyze(net: &Net, fire_counts: &IndexMap<TransitionId, u64>) -> Analysis {
    Analysis {
        is_live: check_liveness(net),
        is_bounded: check_boundedness(net),
        has_deadlock: check_deadlock(net),
        conflicts: find_conflicts(net),
        max_tokens: max_tokens(net),
        throughput: throughput(net, fire_counts),
    }
}

/// 没有输入弧的迁移在定义上不受约束，此时整个网络判为非活。
pub fn check_liveness(net: &Net) -> bool {
    net.transitions
        .iter()
        .all(|transition| net.input_arcs(transition.id.as_str()).next().is_some())
}

/// 任一库所容量无限即判为无界，不考虑实际可达的托肯数。
pub fn check_boundedness(net: &Net) -> bool {
    net.places.iter().all(|place| place.capacity().is_some())
}

pub fn check_deadlock(net: &Net) -> bool {
    enabled_transitions(net).is_empty()
}

/// 每个拥有多条输出弧的库所生成一条冲突描述，列出竞争的迁移名称。
pub fn find_conflicts(net: &Net) -> Vec<String> {
    net.places
        .iter()
        .filter_map(|place| {
            let competitors: Vec<&str> = net
                .outgoing_arcs(place.id.as_str())
                .map(|arc| {
                    net.transition(&arc.to)
                        .map_or(arc.to.as_str(), |transition| transition.name.as_str())
                })
                .collect();
            if competitors.len() > 1 {
                Some(format!(
                    "Place \"{}\" conflicts between: {}",
                    place.name,
                    competitors.iter().join(", ")
                ))
            } else {
                None
            }
        })
        .collect()
}

/// 上界估计 `max(tokens, capacity 或 tokens)`，并非观测到的历史最大值。
pub fn max_tokens(net: &Net) -> IndexMap<PlaceId, Weight> {
    net.places
        .iter()
        .map(|place| {
            let bound = place.tokens.max(place.capacity().unwrap_or(place.tokens));
            (place.id.clone(), bound)
        })
        .collect()
}

/// 每个迁移的发射占比；尚未发射时全部为 0。
pub fn throughput(net: &Net, fire_counts: &IndexMap<TransitionId, u64>) -> IndexMap<TransitionId, f64> {
    let total: u64 = net
        .transitions
        .iter()
        .map(|transition| fire_counts.get(transition.id.as_str()).copied().unwrap_or(0))
        .sum();
    net.transitions
        .iter()
        .map(|transition| {
            let count = fire_counts.get(transition.id.as_str()).copied().unwrap_or(0);
            let share = if total > 0 {
                count as f64 / total as f64
            } else {
                0.0
            };
            (transition.id.clone(), share)
        })
        .collect()
}
