#![warn(non_snake_case)]

pub mod analysis;
pub mod config;
pub mod engine;
pub mod net;
pub mod options;
pub mod report;
