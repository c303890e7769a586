//! 生产指标采集。
//!
//! 每次发射后从当前标识与累计计数器重新推导全部指标，而不是在旧值上增量合并，
//! 因此指标不会与网络状态发生漂移。
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::engine::classify::PlaceClassifier;
use crate::net::{Net, PlaceId, Transition};

/// 平均等待时间启发式中每个缓冲托肯折算的时间单位。
pub const WAIT_TIME_PER_TOKEN: f64 = 100.0;

/// 以毫秒计的单调时钟。
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// 手动推进的时钟，克隆出的句柄共享同一时间。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionMetrics {
    pub total_produced: u64,
    pub average_wait_time: f64,
    pub resource_utilization: IndexMap<PlaceId, f64>,
    pub bottlenecks: Vec<PlaceId>,
    pub cycle_time: f64,
    pub efficiency: f64,
}

pub struct MetricsCollector {
    metrics: ProductionMetrics,
    classifier: Box<dyn PlaceClassifier>,
    clock: Box<dyn Clock>,
    started_at: u64,
}

impl MetricsCollector {
    pub fn new(classifier: Box<dyn PlaceClassifier>, clock: Box<dyn Clock>) -> Self {
        let started_at = clock.now_ms();
        Self {
            metrics: ProductionMetrics::default(),
            classifier,
            clock,
            started_at,
        }
    }

    pub fn metrics(&self) -> &ProductionMetrics {
        &self.metrics
    }

    /// 自开始（或上次复位）以来经过的毫秒数。
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.started_at)
    }

    /// 清零全部指标并重新开始计时。
    pub fn reset(&mut self) {
        self.metrics = ProductionMetrics::default();
        self.started_at = self.clock.now_ms();
    }

    /// 在 `fired` 发射之后调用；`net` 已是发射后的状态且 `enabled` 标志已刷新。
    pub fn on_fired(&mut self, net: &Net, fired: &Transition) {
        if self.classifier.is_completion(fired) {
            self.metrics.total_produced += 1;
        }
        self.refresh(net);
    }

    /// 只按当前标识重算派生指标，不改变完工计数。撤销与载入网络后调用。
    pub fn refresh(&mut self, net: &Net) {
        let total_produced = self.metrics.total_produced;
        let cycle_time = if total_produced > 0 {
            self.elapsed_ms() as f64 / total_produced as f64
        } else {
            0.0
        };

        let resource_utilization = resource_utilization(net, self.classifier.as_ref());
        let efficiency = efficiency(&resource_utilization);

        self.metrics = ProductionMetrics {
            total_produced,
            average_wait_time: average_wait_time(net, self.classifier.as_ref()),
            resource_utilization,
            bottlenecks: bottlenecks(net),
            cycle_time,
            efficiency,
        };
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("metrics", &self.metrics)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

/// 资源类库所的利用率：托肯数除以容量（未设容量按 1 计）。
pub fn resource_utilization(net: &Net, classifier: &dyn PlaceClassifier) -> IndexMap<PlaceId, f64> {
    net.places
        .iter()
        .filter(|place| classifier.is_resource(place))
        .map(|place| {
            let capacity = place.capacity().unwrap_or(1);
            (place.id.clone(), place.tokens as f64 / capacity as f64)
        })
        .collect()
}

/// 平均利用率的百分数；没有资源类库所时为 0。
pub fn efficiency(utilization: &IndexMap<PlaceId, f64>) -> f64 {
    if utilization.is_empty() {
        return 0.0;
    }
    let sum: f64 = utilization.values().sum();
    sum / utilization.len() as f64 * 100.0
}

/// 托肯为 0 且至少饿死一个当前不可激发迁移的库所。
///
/// 依赖迁移上已刷新的 `enabled` 标志。
pub fn bottlenecks(net: &Net) -> Vec<PlaceId> {
    net.places
        .iter()
        .filter(|place| place.tokens == 0)
        .filter(|place| {
            net.outgoing_arcs(place.id.as_str()).any(|arc| {
                net.transition(&arc.to)
                    .is_some_and(|transition| !transition.is_enabled())
            })
        })
        .map(|place| place.id.clone())
        .collect()
}

/// 缓冲类库所托肯数乘以固定折算常数后的平均值，并非实测时间。
pub fn average_wait_time(net: &Net, classifier: &dyn PlaceClassifier) -> f64 {
    let waits: Vec<f64> = net
        .places
        .iter()
        .filter(|place| classifier.is_buffer(place))
        .map(|place| place.tokens as f64 * WAIT_TIME_PER_TOKEN)
        .collect();
    if waits.is_empty() {
        return 0.0;
    }
    waits.iter().sum::<f64>() / waits.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::NameClassifier;
    use crate::engine::enablement::refresh_enabled;
    use crate::net::Place;

    fn cell() -> Net {
        let mut net = Net::empty();
        net.add_place(Place::new_with_capacity("raw", "Raw", 0, 10));
        net.add_place(Place::new_with_capacity("m1", "Machine 1", 1, 2));
        net.add_place(Place::new("m2", "Machine 2", 0));
        net.add_place(Place::new_with_capacity("buf", "Buffer", 3, 8));
        net.add_place(Place::new("stock", "Stock", 1));
        net.add_transition(Transition::new("start", "Start"));
        net.add_transition(Transition::new("finish", "Finish"));
        net.add_input_arc("raw", "start", 1);
        net.add_input_arc("m1", "start", 1);
        net.add_output_arc("start", "buf", 1);
        net.add_input_arc("buf", "finish", 1);
        net.add_output_arc("finish", "stock", 1);
        refresh_enabled(&mut net);
        net
    }

    #[test]
    fn utilization_and_efficiency() {
        let net = cell();
        let classifier = NameClassifier::default();
        let utilization = resource_utilization(&net, &classifier);
        assert_eq!(utilization.get("m1"), Some(&0.5));
        assert_eq!(utilization.get("m2"), Some(&0.0));
        assert_eq!(utilization.len(), 2);
        assert!((efficiency(&utilization) - 25.0).abs() < 1e-9);
        assert_eq!(efficiency(&IndexMap::new()), 0.0);
    }

    #[test]
    fn empty_place_starving_disabled_transition_is_a_bottleneck() {
        let net = cell();
        assert_eq!(bottlenecks(&net), vec![PlaceId::new("raw")]);
    }

    #[test]
    fn wait_time_averages_buffer_places() {
        let net = cell();
        let classifier = NameClassifier::default();
        assert!((average_wait_time(&net, &classifier) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn collector_counts_completions_and_cycle_time() {
        let clock = ManualClock::new(1_000);
        let mut collector =
            MetricsCollector::new(Box::new(NameClassifier::default()), Box::new(clock.clone()));
        let net = cell();

        collector.on_fired(&net, net.transition("start").unwrap());
        assert_eq!(collector.metrics().total_produced, 0);
        assert_eq!(collector.metrics().cycle_time, 0.0);

        clock.advance(600);
        collector.on_fired(&net, net.transition("finish").unwrap());
        clock.advance(400);
        collector.on_fired(&net, net.transition("finish").unwrap());
        assert_eq!(collector.metrics().total_produced, 2);
        assert!((collector.metrics().cycle_time - 500.0).abs() < 1e-9);
        assert_eq!(collector.metrics().bottlenecks, vec![PlaceId::new("raw")]);

        collector.refresh(&net);
        assert_eq!(collector.metrics().total_produced, 2);

        collector.reset();
        assert_eq!(collector.metrics(), &ProductionMetrics::default());
        assert_eq!(collector.elapsed_ms(), 0);
    }
}
