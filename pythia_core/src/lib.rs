//! PYTHIA batch flow tooling
//!
//! Two single-pass, sequential pieces that bracket a batch of PYTHIA runs:
//!
//! - **Flow generation**: writes a makeflow declaring N independent
//!   simulation tasks (each with a marker rule) and one join rule.
//! - **Log joining**: merges the numbered simulation outputs into one file,
//!   summing the event counts carried on `#<int>` lines.
//!
//! The workflow engine that executes the makeflow, and the simulation
//! binary it invokes, live outside this crate.
//!
//! # Usage
//!
//! ```ignore
//! use pythia_core::{FlowConfig, FlowGenerator, JoinConfig, LogJoiner};
//!
//! let config = FlowConfig {
//!     task_count: 4,
//!     ..Default::default()
//! };
//! FlowGenerator::new(config).generate()?;
//!
//! // ... the engine runs sim0..sim3 ...
//!
//! let summary = LogJoiner::new(JoinConfig::default()).join(4)?;
//! println!("{} events", summary.event_count);
//! ```

mod config;
mod error;
pub mod flow;
pub mod join;

pub use config::{FlowConfig, JoinConfig};
pub use error::{PythiaError, Result};
pub use flow::{FlowDescription, FlowGenerator, Rule};
pub use join::{join_streams, FileSummary, JoinSummary, LineKind, LogJoiner};
