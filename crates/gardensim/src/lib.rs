//! Command-line front end for the gardensim engine
//!
//! Loads a YAML scenario, runs the Monte Carlo forecast and prints the result
//! as JSON or as a short text summary.

pub mod logging;
pub mod report;
pub mod scenario;

pub use logging::init_logging;
pub use report::render_summary;
pub use scenario::{Overrides, TEMPLATE, load_scenario};
