//! P/T 网静态结构元素：库所、迁移、弧与标识。
//!
//! 序列化字段与展示层的数据形状保持一致（`maxCapacity`、`type` 等 camelCase 字段），
//! 因此示例网络与用户编辑的网络可以直接以 JSON 载入。
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::net::ids::{ArcId, PlaceId, TransitionId};

pub type Weight = u64;

/// 画布坐标，仅由展示层解释。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    pub tokens: Weight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<Weight>,
    #[serde(default)]
    pub color: String,
}

impl Place {
    pub fn new(id: impl Into<PlaceId>, name: impl Into<String>, tokens: Weight) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: Position::default(),
            tokens,
            max_capacity: None,
            color: String::new(),
        }
    }

    pub fn new_with_capacity(
        id: impl Into<PlaceId>,
        name: impl Into<String>,
        tokens: Weight,
        capacity: Weight,
    ) -> Self {
        Self {
            max_capacity: Some(capacity),
            ..Self::new(id, name, tokens)
        }
    }

    /// 有效容量；`0` 与未设置同样视为无界。
    pub fn capacity(&self) -> Option<Weight> {
        self.max_capacity.filter(|capacity| *capacity > 0)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: TransitionId,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    /// 由引擎在每次标识变化后重新计算，外部写入会在下一次刷新时被覆盖。
    #[serde(default)]
    enabled: bool,
    /// 建议延迟（毫秒），引擎不据此调度。
    #[serde(default)]
    pub delay: u64,
    #[serde(default)]
    pub color: String,
}

impl Transition {
    pub fn new(id: impl Into<TransitionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: Position::default(),
            enabled: false,
            delay: 0,
            color: String::new(),
        }
    }

    pub fn with_delay(mut self, delay: u64) -> Self {
        self.delay = delay;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition")
            .field(&self.id)
            .field(&self.name)
            .field(&self.enabled)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Arc {
    pub id: ArcId,
    pub from: String,
    pub to: String,
    pub weight: Weight,
    #[serde(rename = "type")]
    pub direction: ArcDirection,
}

impl Arc {
    pub fn new(
        id: impl Into<ArcId>,
        from: impl Into<String>,
        to: impl Into<String>,
        weight: Weight,
        direction: ArcDirection,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            weight,
            direction,
        }
    }

    /// 弧所连接的库所端点 id。
    pub fn place(&self) -> &str {
        match self.direction {
            ArcDirection::PlaceToTransition => &self.from,
            ArcDirection::TransitionToPlace => &self.to,
        }
    }

    /// 弧所连接的迁移端点 id。
    pub fn transition(&self) -> &str {
        match self.direction {
            ArcDirection::PlaceToTransition => &self.to,
            ArcDirection::TransitionToPlace => &self.from,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == ArcDirection::PlaceToTransition
    }

    pub fn is_output(&self) -> bool {
        self.direction == ArcDirection::TransitionToPlace
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arc")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("weight", &self.weight)
            .field("direction", &self.direction)
            .finish()
    }
}

/// 某一时刻所有库所的托肯数，按库所声明顺序排列。
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Marking(pub IndexMap<PlaceId, Weight>);

impl Marking {
    pub fn new(initial: IndexMap<PlaceId, Weight>) -> Self {
        Self(initial)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceId, &Weight)> {
        self.0.iter()
    }

    pub fn tokens(&self, place: &str) -> Option<Weight> {
        self.0.get(place).copied()
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, tokens) in self.iter() {
            map.entry(&place.as_str(), tokens);
        }
        map.finish()
    }
}
