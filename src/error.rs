// src/error.rs
//
// Error hierarchy for the simulator.
// Configuration problems, numerical divergence and noise-source setup failures
// are kept as separate variants so callers can tell them apart.

use std::fmt;

use thiserror::Error;

/// Which state array held the first non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateArray {
    Forward,
    Backward,
    Photon,
    Carriers,
}

impl StateArray {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward field",
            Self::Backward => "backward field",
            Self::Photon => "photon density",
            Self::Carriers => "carrier density",
        }
    }
}

impl fmt::Display for StateArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root error type for all simulator failures.
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid physical parameters, mesh count or duration.
    #[error("config error: {0}")]
    Config(String),

    /// A NaN/Inf appeared in the state during the run.
    #[error("numerical divergence at step {step}: non-finite {array} in cell {cell}")]
    NumericalDivergence {
        step: usize,
        array: StateArray,
        cell: usize,
    },

    /// The spontaneous-emission random context could not be set up.
    #[error("noise source initialisation failed: {0}")]
    NoiseInit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plot error: {0}")]
    Plot(String),
}

pub type SimResult<T> = Result<T, SimError>;
