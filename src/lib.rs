//! Reading, editing and comparing the `window.BENCHMARK_DATA` history files
//! that back the compiler benchmark dashboard.

pub mod config;
pub mod datafile;
mod error;
pub mod functions;
pub mod models;
pub mod report;
pub mod timings;
pub mod workload;

pub use error::{Error, Result};
pub use models::{Bench, BenchValue, BenchmarkData, BenchmarkEntry, Commit, Person, Tool};
