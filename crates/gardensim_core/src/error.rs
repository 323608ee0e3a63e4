use crate::model::CropCategory;

/// Errors surfaced by the simulation engine.
///
/// Per-draw arithmetic problems are never errors: they are substituted and
/// counted in [`crate::metrics::SimulationDiagnostics`]. Only caller mistakes
/// and cancellation end a run early.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("portfolio is missing")]
    MissingPortfolio,

    #[error("invalid allocation for {category}: {value}")]
    InvalidAllocation { category: CropCategory, value: f64 },

    #[error("iteration count must be at least 1 (got {0})")]
    InvalidIterations(usize),

    #[error("invalid {distribution} parameters (mean={mean}, std_dev={std_dev}): {reason}")]
    InvalidDistributionParameters {
        distribution: &'static str,
        mean: f64,
        std_dev: f64,
        reason: &'static str,
    },

    /// Monte Carlo run was cancelled through its progress handle
    #[error("simulation cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
