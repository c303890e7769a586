//! 发射语义: 消耗输入库所托肯、产生输出库所托肯并按容量截断.
use thiserror::Error;

use crate::engine::enablement::is_enabled;
use crate::net::{Net, PlaceId, TransitionId, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("transition {0} does not exist")]
    Unknown(TransitionId),
    #[error("transition {0} is not enabled under the current marking")]
    NotEnabled(TransitionId),
}

/// 一次发射对标识的实际影响。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireReport {
    pub transition: TransitionId,
    pub consumed: Vec<(PlaceId, Weight)>,
    pub produced: Vec<(PlaceId, Weight)>,
    /// 因容量截断被丢弃的托肯。
    pub discarded: Vec<(PlaceId, Weight)>,
}

impl FireReport {
    fn new(transition: TransitionId) -> Self {
        Self {
            transition,
            consumed: Vec::new(),
            produced: Vec::new(),
            discarded: Vec::new(),
        }
    }
}

pub fn ensure_enabled(net: &Net, transition: &str) -> Result<(), FireError> {
    if net.transition(transition).is_none() {
        return Err(FireError::Unknown(TransitionId::new(transition)));
    }
    if !is_enabled(net, transition) {
        return Err(FireError::NotEnabled(TransitionId::new(transition)));
    }
    Ok(())
}

/// 检查可激发性后发射；不可激发时网络保持不变。
pub fn fire(net: &mut Net, transition: &str) -> Result<FireReport, FireError> {
    ensure_enabled(net, transition)?;
    Ok(fire_unchecked(net, transition))
}

/// 直接应用发射效应，调用方负责先行检查可激发性。
///
/// 端点缺失的弧被静默跳过。输出超过容量的部分被丢弃并记录在报告里。
pub fn fire_unchecked(net: &mut Net, transition: &str) -> FireReport {
    let mut report = FireReport::new(TransitionId::new(transition));

    let inputs: Vec<(String, Weight)> = net
        .input_arcs(transition)
        .map(|arc| (arc.from.clone(), arc.weight))
        .collect();
    let outputs: Vec<(String, Weight)> = net
        .output_arcs(transition)
        .map(|arc| (arc.to.clone(), arc.weight))
        .collect();

    for (place_id, weight) in inputs {
        let Some(place) = net.place_mut(&place_id) else {
            continue;
        };
        place.tokens = place.tokens.saturating_sub(weight);
        report.consumed.push((place.id.clone(), weight));
    }

    for (place_id, weight) in outputs {
        let Some(place) = net.place_mut(&place_id) else {
            continue;
        };
        let after = place.tokens.saturating_add(weight);
        match place.capacity() {
            Some(capacity) if after > capacity => {
                report.discarded.push((place.id.clone(), after - capacity));
                place.tokens = capacity;
            }
            _ => place.tokens = after,
        }
        report.produced.push((place.id.clone(), weight));
    }

    report
}
