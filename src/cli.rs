mod runner;
mod types;

pub use runner::{run_cli, summarize};
pub use types::{DimensionSummary, SessionSummary};
