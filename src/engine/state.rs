//! 仿真运行状态: 运行/暂停、步数、速度与撤销历史.
use serde::{Deserialize, Serialize};

use crate::engine::history::History;
use crate::net::Net;

/// 自动发射两步之间的默认间隔（毫秒）。
pub const DEFAULT_SPEED_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    run_state: RunState,
    step: u64,
    speed: u64,
    history: History,
}

impl SimulationState {
    pub fn new(baseline: Net) -> Self {
        Self {
            run_state: RunState::Stopped,
            step: 0,
            speed: DEFAULT_SPEED_MS,
            history: History::new(baseline),
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn speed(&self) -> u64 {
        self.speed
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub(crate) fn set_run_state(&mut self, run_state: RunState) {
        self.run_state = run_state;
    }

    pub(crate) fn set_speed(&mut self, speed: u64) {
        self.speed = speed;
    }

    pub(crate) fn advance(&mut self) {
        self.step += 1;
    }

    pub(crate) fn retreat(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    /// 回到停止状态、步数清零并丢弃撤销条目；基线与速度保留。
    pub(crate) fn reset(&mut self) {
        self.run_state = RunState::Stopped;
        self.step = 0;
        self.history.clear();
    }
}
