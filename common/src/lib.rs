pub mod config;
pub mod dataset;
pub mod histogram;
pub mod plot;
pub mod report;

pub const NS_PER_US: f64 = 1_000.0;
