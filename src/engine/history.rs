//! 有界撤销历史。
//!
//! 每次发射前把完整网络快照压入历史；超出容量时按时间顺序淘汰最旧的一条（FIFO）。
//! 复位基线与撤销条目分开保存，淘汰永远不会丢失基线。
use std::collections::VecDeque;

use crate::net::Net;

pub const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct History {
    baseline: Net,
    entries: VecDeque<Net>,
    capacity: usize,
}

impl History {
    pub fn new(baseline: Net) -> Self {
        Self::with_capacity(baseline, HISTORY_CAPACITY)
    }

    pub fn with_capacity(baseline: Net, capacity: usize) -> Self {
        Self {
            baseline,
            entries: VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, snapshot: Net) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// 取出最近一次发射前的快照。
    pub fn pop(&mut self) -> Option<Net> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&Net> {
        self.entries.back()
    }

    pub fn baseline(&self) -> &Net {
        &self.baseline
    }

    /// 载入新网络时替换基线并清空撤销条目。
    pub fn rebase(&mut self, baseline: Net) {
        self.baseline = baseline;
        self.entries.clear();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 从最旧到最新遍历撤销条目。
    pub fn iter(&self) -> impl Iterator<Item = &Net> {
        self.entries.iter()
    }
}
