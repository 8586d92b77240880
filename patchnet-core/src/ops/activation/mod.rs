// src/ops/activation/mod.rs

pub mod everett;
pub mod tanh;

pub use everett::Everett;
pub use tanh::Tanh;

use crate::autograd::Operator;
use crate::error::PatchNetError;
use std::fmt;
use std::str::FromStr;

/// Nonlinearity applied after each hidden affine layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    /// Bounded elementwise `tanh`; output width equals input width.
    #[default]
    Tanh,
    /// Split activation `(min(x, 0), max(x, 0))`; output width is doubled.
    Everett,
}

impl Activation {
    /// Output width divided by input width.
    pub fn width_factor(self) -> usize {
        match self {
            Activation::Tanh => 1,
            Activation::Everett => 2,
        }
    }

    pub fn operator(self) -> Box<dyn Operator> {
        match self {
            Activation::Tanh => Box::new(Tanh),
            Activation::Everett => Box::new(Everett),
        }
    }
}

impl FromStr for Activation {
    type Err = PatchNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tanh" => Ok(Activation::Tanh),
            "everett" => Ok(Activation::Everett),
            _ => Err(PatchNetError::ConfigurationError(format!(
                "Unsupported activation: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Tanh => write!(f, "tanh"),
            Activation::Everett => write!(f, "everett"),
        }
    }
}
