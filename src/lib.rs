pub mod aggregate;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod fetch;
pub mod filter;
pub mod join;
pub mod level;
pub mod loader;
pub mod model;
pub mod output;
pub mod report;
pub mod schema;
pub mod source;
pub mod table;

pub use error::{PipelineError, Result};
pub use report::Report;
