//! 仿真引擎：可激发判定、发射、撤销历史与生产指标的统一入口。
//!
//! [`SimulationEngine`] 独占网络与全部派生状态，所有变更都是同步的 `&mut self`
//! 方法，执行完毕后派生状态（`enabled` 标志、指标）才可被观察到。
//! 非法命令（发射不可激发迁移、无历史可撤销）以 `false` 返回，而不是错误。

pub mod classify;
pub mod driver;
pub mod enablement;
pub mod firing;
pub mod history;
pub mod metrics;
pub mod state;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::analysis::structural::{self, Analysis};
use crate::config::SimConfig;
use crate::net::{Marking, Net, TransitionId};

pub use classify::{NameClassifier, PlaceClassifier};
pub use driver::{Driver, FirstChooser, RandomChooser, Tick, TransitionChooser};
pub use firing::{FireError, FireReport};
pub use history::{HISTORY_CAPACITY, History};
pub use metrics::{Clock, ManualClock, MetricsCollector, ProductionMetrics, SystemClock};
pub use state::{DEFAULT_SPEED_MS, RunState, SimulationState};

#[derive(Debug)]
pub struct SimulationEngine {
    net: Net,
    state: SimulationState,
    metrics: MetricsCollector,
    fire_counts: IndexMap<TransitionId, u64>,
}

impl SimulationEngine {
    pub fn new(net: Net) -> Self {
        Self::with_parts(
            net,
            Box::new(NameClassifier::default()),
            Box::new(SystemClock::new()),
        )
    }

    pub fn with_parts(
        mut net: Net,
        classifier: Box<dyn PlaceClassifier>,
        clock: Box<dyn Clock>,
    ) -> Self {
        report_problems(&net);
        enablement::refresh_enabled(&mut net);
        let fire_counts = zeroed_counts(&net);
        Self {
            state: SimulationState::new(net.clone()),
            net,
            metrics: MetricsCollector::new(classifier, clock),
            fire_counts,
        }
    }

    /// 按配置构造：分类关键词与自动发射速度取自配置。
    pub fn from_config(net: Net, config: &SimConfig) -> Result<Self, regex::Error> {
        let mut engine = Self::with_parts(
            net,
            Box::new(config.classifier()?),
            Box::new(SystemClock::new()),
        );
        engine.set_speed(config.speed_ms);
        Ok(engine)
    }

    /// 替换工作网络与复位基线，清空撤销条目并按新迁移集合重置发射计数。
    /// 步数与完工计数保留（与 [`Self::reset`] 不同），依赖标识的指标按新网络重算。
    pub fn update_net(&mut self, mut net: Net) {
        report_problems(&net);
        enablement::refresh_enabled(&mut net);
        self.fire_counts = zeroed_counts(&net);
        self.state.history_mut().rebase(net.clone());
        self.net = net;
        self.metrics.refresh(&self.net);
        info!(
            "loaded net with {} places, {} transitions, {} arcs",
            self.net.places_len(),
            self.net.transitions_len(),
            self.net.arcs.len()
        );
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    pub fn marking(&self) -> Marking {
        self.net.marking()
    }

    pub fn simulation_state(&self) -> &SimulationState {
        &self.state
    }

    pub fn metrics(&self) -> &ProductionMetrics {
        self.metrics.metrics()
    }

    pub fn fire_counts(&self) -> &IndexMap<TransitionId, u64> {
        &self.fire_counts
    }

    pub fn analyze(&self) -> Analysis {
        structural::analyze(&self.net, &self.fire_counts)
    }

    pub fn is_transition_enabled(&self, transition: &str) -> bool {
        enablement::is_enabled(&self.net, transition)
    }

    pub fn enabled_transitions(&self) -> Vec<TransitionId> {
        enablement::enabled_transitions(&self.net)
    }

    /// 发射迁移；不可激发时返回 `false` 且不做任何修改。
    pub fn fire_transition(&mut self, transition: &str) -> bool {
        if let Err(err) = firing::ensure_enabled(&self.net, transition) {
            debug!("fire rejected: {err}");
            return false;
        }

        self.state.history_mut().push(self.net.clone());
        let report = firing::fire_unchecked(&mut self.net, transition);
        enablement::refresh_enabled(&mut self.net);
        self.state.advance();
        *self
            .fire_counts
            .entry(report.transition.clone())
            .or_insert(0) += 1;
        if let Some(fired) = self.net.transition(transition) {
            self.metrics.on_fired(&self.net, fired);
        }

        debug!(
            "step {}: fired {} (consumed {:?}, produced {:?})",
            self.state.step(),
            report.transition,
            report.consumed,
            report.produced
        );
        if !report.discarded.is_empty() {
            debug!("capacity discarded tokens: {:?}", report.discarded);
        }
        true
    }

    /// 撤销最近一次发射；没有可撤销的历史时返回 `false`。
    pub fn step_back(&mut self) -> bool {
        let Some(previous) = self.state.history_mut().pop() else {
            debug!("step back rejected: no history");
            return false;
        };
        self.net = previous;
        self.state.retreat();
        enablement::refresh_enabled(&mut self.net);
        self.metrics.refresh(&self.net);
        debug!("stepped back to step {}", self.state.step());
        true
    }

    /// 恢复基线标识，清零步数、发射计数与指标，并停止运行。
    pub fn reset(&mut self) {
        self.net = self.state.history().baseline().clone();
        self.state.reset();
        self.fire_counts = zeroed_counts(&self.net);
        self.metrics.reset();
        enablement::refresh_enabled(&mut self.net);
        info!("simulation reset to baseline");
    }

    /// Stopped -> Running；没有可激发迁移时拒绝。
    pub fn play(&mut self) -> bool {
        if self.enabled_transitions().is_empty() {
            debug!("play rejected: no enabled transition");
            return false;
        }
        self.state.set_run_state(RunState::Running);
        true
    }

    pub fn pause(&mut self) {
        self.state.set_run_state(RunState::Stopped);
    }

    pub fn set_speed(&mut self, speed_ms: u64) {
        self.state.set_speed(speed_ms);
    }
}

fn zeroed_counts(net: &Net) -> IndexMap<TransitionId, u64> {
    net.transitions
        .iter()
        .map(|transition| (transition.id.clone(), 0))
        .collect()
}

fn report_problems(net: &Net) {
    for problem in net.problems() {
        warn!("net problem tolerated: {problem}");
    }
}
