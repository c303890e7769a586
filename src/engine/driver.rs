//! 自动发射驱动。
//!
//! 运行状态下每个 tick 依次：读取可激发集合；为空则转入停止并不再调度；
//! 否则经 [`TransitionChooser`] 选出一个迁移同步发射。一次 tick 的发射总是完整执行，
//! 取消只意味着不再安排下一次 tick。
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;

use crate::engine::SimulationEngine;
use crate::net::TransitionId;

/// 从可激发集合中挑选一个迁移，返回其下标。
pub trait TransitionChooser {
    fn choose(&mut self, enabled: &[TransitionId]) -> Option<usize>;
}

/// 均匀随机选择；可用种子复现。
#[derive(Debug, Clone)]
pub struct RandomChooser {
    rng: StdRng,
}

impl RandomChooser {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl TransitionChooser for RandomChooser {
    fn choose(&mut self, enabled: &[TransitionId]) -> Option<usize> {
        if enabled.is_empty() {
            return None;
        }
        Some(self.rng.random_range(0..enabled.len()))
    }
}

/// 总是选择声明顺序中的第一个可激发迁移。
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChooser;

impl TransitionChooser for FirstChooser {
    fn choose(&mut self, enabled: &[TransitionId]) -> Option<usize> {
        if enabled.is_empty() { None } else { Some(0) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// 发射了一个迁移。
    Fired(TransitionId),
    /// 没有可激发迁移，驱动已转入停止。
    Deadlocked,
    /// 未处于运行状态，什么也没做。
    Idle,
}

#[derive(Debug)]
pub struct Driver<C = RandomChooser> {
    engine: SimulationEngine,
    chooser: C,
}

impl<C: TransitionChooser> Driver<C> {
    pub fn new(engine: SimulationEngine, chooser: C) -> Self {
        Self { engine, chooser }
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimulationEngine {
        &mut self.engine
    }

    pub fn into_engine(self) -> SimulationEngine {
        self.engine
    }

    /// 手动单步：不论运行状态，选择并发射一个可激发迁移。
    pub fn step(&mut self) -> Option<TransitionId> {
        let enabled = self.engine.enabled_transitions();
        let chosen = self
            .chooser
            .choose(&enabled)
            .and_then(|index| enabled.get(index))?
            .clone();
        if self.engine.fire_transition(chosen.as_str()) {
            Some(chosen)
        } else {
            None
        }
    }

    /// 运行状态下的一次调度。发射后若已无可激发迁移则自动停止。
    pub fn tick(&mut self) -> Tick {
        if !self.engine.simulation_state().is_running() {
            return Tick::Idle;
        }
        match self.step() {
            Some(fired) => {
                if self.engine.enabled_transitions().is_empty() {
                    info!(
                        "no transition enabled after step {}, stopping",
                        self.engine.simulation_state().step()
                    );
                    self.engine.pause();
                }
                Tick::Fired(fired)
            }
            None => {
                info!("deadlock reached, stopping");
                self.engine.pause();
                Tick::Deadlocked
            }
        }
    }

    /// 不等待地连续 tick，直到停止或达到 `max_ticks`，返回发射次数。
    pub fn run_for(&mut self, max_ticks: u64) -> u64 {
        let mut fired = 0;
        for _ in 0..max_ticks {
            match self.tick() {
                Tick::Fired(_) => fired += 1,
                Tick::Deadlocked | Tick::Idle => break,
            }
        }
        fired
    }

    /// 以配置速度为间隔自动发射，直到停止。
    ///
    /// `stop` 收到 `true`（或发送端被丢弃）时取消等待中的调度并转入停止；
    /// 正在执行的发射总会完成。返回发射次数。
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> u64 {
        let mut fired = 0;
        if *stop.borrow() {
            self.engine.pause();
        }
        while self.engine.simulation_state().is_running() {
            let delay = Duration::from_millis(self.engine.simulation_state().speed());
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow_and_update() {
                        debug!("run loop cancelled");
                        self.engine.pause();
                    }
                    continue;
                }
            }
            if let Tick::Fired(_) = self.tick() {
                fired += 1;
            }
        }
        fired
    }
}
