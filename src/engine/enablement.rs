//! 可激发性判定：只读地评估网络在当前标识下哪些迁移可以发射。
use indexmap::IndexMap;

use crate::net::{Net, TransitionId, Weight};

/// 迁移可激发当且仅当每个输入库所的托肯数不小于指向该迁移的全部输入弧权重之和。
///
/// 同一库所的并行输入弧按总需求判定，发射时扣除的托肯数因此总是恰好等于弧权重之和。
/// 没有输入弧的迁移恒可激发；不存在的迁移不可激发。输入弧的源库所缺失时，
/// 该弧无法满足，迁移同样不可激发。
pub fn is_enabled(net: &Net, transition: &str) -> bool {
    if net.transition(transition).is_none() {
        return false;
    }
    input_demand(net, transition)
        .into_iter()
        .all(|(place_id, demand)| {
            net.place(place_id)
                .is_some_and(|place| place.tokens >= demand)
        })
}

/// 按源库所汇总的输入弧权重。
pub fn input_demand<'a>(net: &'a Net, transition: &'a str) -> IndexMap<&'a str, Weight> {
    let mut demand: IndexMap<&str, Weight> = IndexMap::new();
    for arc in net.input_arcs(transition) {
        let entry = demand.entry(arc.from.as_str()).or_insert(0);
        *entry = entry.saturating_add(arc.weight);
    }
    demand
}

/// 按迁移声明顺序返回可激发集合，不做任何随机化。
pub fn enabled_transitions(net: &Net) -> Vec<TransitionId> {
    net.transitions
        .iter()
        .filter(|transition| is_enabled(net, transition.id.as_str()))
        .map(|transition| transition.id.clone())
        .collect()
}

/// 针对当前标识重新计算每个迁移的 `enabled` 标志（全量，而非增量）。
pub fn refresh_enabled(net: &mut Net) {
    let flags: Vec<bool> = net
        .transitions
        .iter()
        .map(|transition| is_enabled(net, transition.id.as_str()))
        .collect();
    for (transition, enabled) in net.transitions.iter_mut().zip(flags) {
        transition.set_enabled(enabled);
    }
}
