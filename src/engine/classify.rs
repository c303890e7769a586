//! 基于命名约定的库所/迁移分类。
//!
//! 生产指标依赖名称中的关键词来识别“完工”迁移、资源类库所与缓冲类库所。
//! 这是一种与数据命名耦合的启发式，而非图的结构属性，因此通过
//! [`PlaceClassifier`] 隔离，可以替换为基于显式标签的实现而不触及发射逻辑。
use itertools::Itertools;
use regex::{Regex, RegexBuilder};

use crate::net::{Place, Transition};

pub trait PlaceClassifier: Send + Sync {
    /// 发射后是否计为一件完工产品。
    fn is_completion(&self, transition: &Transition) -> bool;
    /// 是否计入资源利用率。
    fn is_resource(&self, place: &Place) -> bool;
    /// 是否计入平均等待时间。
    fn is_buffer(&self, place: &Place) -> bool;
}

pub const DEFAULT_COMPLETION_MARKERS: &[&str] = &["finish", "complete", "fin"];
pub const DEFAULT_RESOURCE_MARKERS: &[&str] = &["resource", "machine", "station", "occup"];
pub const DEFAULT_BUFFER_MARKERS: &[&str] = &["buffer", "tampon", "stock"];

/// 以关键词正则匹配名称（不区分大小写）。空关键词列表永不匹配。
#[derive(Debug, Clone)]
pub struct NameClassifier {
    completion: Option<Regex>,
    resource: Option<Regex>,
    buffer: Option<Regex>,
}

impl NameClassifier {
    pub fn new<S: AsRef<str>>(
        completion: &[S],
        resource: &[S],
        buffer: &[S],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            completion: compile(completion)?,
            resource: compile(resource)?,
            buffer: compile(buffer)?,
        })
    }

    fn matches(pattern: &Option<Regex>, text: &str) -> bool {
        pattern.as_ref().is_some_and(|regex| regex.is_match(text))
    }
}

impl Default for NameClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_COMPLETION_MARKERS,
            DEFAULT_RESOURCE_MARKERS,
            DEFAULT_BUFFER_MARKERS,
        )
        .expect("default markers are valid patterns")
    }
}

impl PlaceClassifier for NameClassifier {
    fn is_completion(&self, transition: &Transition) -> bool {
        Self::matches(&self.completion, transition.id.as_str())
            || Self::matches(&self.completion, &transition.name)
    }

    fn is_resource(&self, place: &Place) -> bool {
        Self::matches(&self.resource, &place.name)
    }

    fn is_buffer(&self, place: &Place) -> bool {
        Self::matches(&self.buffer, &place.name)
    }
}

fn compile<S: AsRef<str>>(markers: &[S]) -> Result<Option<Regex>, regex::Error> {
    if markers.is_empty() {
        return Ok(None);
    }
    let pattern = markers
        .iter()
        .map(|marker| format!("(?:{})", marker.as_ref()))
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
}
