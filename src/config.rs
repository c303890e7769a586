use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::classify::{
    DEFAULT_BUFFER_MARKERS, DEFAULT_COMPLETION_MARKERS, DEFAULT_RESOURCE_MARKERS, NameClassifier,
};
use crate::engine::state::DEFAULT_SPEED_MS;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimConfig {
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    #[serde(default = "default_completion_markers")]
    pub completion_markers: Vec<String>,
    #[serde(default = "default_resource_markers")]
    pub resource_markers: Vec<String>,
    #[serde(default = "default_buffer_markers")]
    pub buffer_markers: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            speed_ms: default_speed_ms(),
            seed: None,
            max_steps: default_max_steps(),
            completion_markers: default_completion_markers(),
            resource_markers: default_resource_markers(),
            buffer_markers: default_buffer_markers(),
        }
    }
}

impl SimConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: SimConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    pub fn classifier(&self) -> Result<NameClassifier, regex::Error> {
        NameClassifier::new(
            self.completion_markers.as_slice(),
            self.resource_markers.as_slice(),
            self.buffer_markers.as_slice(),
        )
    }
}

fn default_speed_ms() -> u64 {
    DEFAULT_SPEED_MS
}

fn default_max_steps() -> u64 {
    1000
}

// 关键词按正则、不区分大小写匹配 id 与名称
fn default_completion_markers() -> Vec<String> {
    to_strings(DEFAULT_COMPLETION_MARKERS)
}

fn default_resource_markers() -> Vec<String> {
    to_strings(DEFAULT_RESOURCE_MARKERS)
}

fn default_buffer_markers() -> Vec<String> {
    to_strings(DEFAULT_BUFFER_MARKERS)
}

fn to_strings(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|marker| marker.to_string()).collect()
}
