//! Decay kernels mapping event age to a weight.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Decay kernel used when evaluating a time surface.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Kernel {
    /// Raw age, no shaping.
    None,
    /// `max(0, 1 - age / tau)`.
    Linear,
    /// `exp(-age / tau)`.
    #[default]
    Exponential,
}

impl Kernel {
    /// True for kernels that need a decay constant.
    pub fn decays(self) -> bool {
        !matches!(self, Kernel::None)
    }

    /// `tau` must be positive and finite for decaying kernels; `None` ignores it.
    pub fn validate(self, tau: f64) -> Result<()> {
        if self.decays() && !(tau > 0.0 && tau.is_finite()) {
            return Err(ConfigurationError::InvalidTau(tau));
        }
        Ok(())
    }

    /// Evaluate the kernel for an age in timestamp units.
    ///
    /// Negative ages (query before the event) are clamped to zero. For
    /// `Kernel::None` the result is the age itself.
    #[inline]
    pub fn evaluate(self, age: f64, tau: f64) -> f64 {
        let age = age.max(0.0);
        match self {
            Kernel::None => age,
            Kernel::Linear => (1.0 - age / tau).max(0.0),
            Kernel::Exponential => (-age / tau).exp(),
        }
    }

    /// Value of a cell that has never seen an event, in kernel units.
    pub fn floor(self) -> f64 {
        match self {
            Kernel::None => f64::INFINITY,
            Kernel::Linear | Kernel::Exponential => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_exact_values() {
        assert_eq!(Kernel::Linear.evaluate(5.0, 10.0), 0.5);
        assert_eq!(Kernel::Linear.evaluate(10.0, 10.0), 0.0);
        assert_eq!(Kernel::Linear.evaluate(20.0, 10.0), 0.0);
        assert_eq!(Kernel::Linear.evaluate(0.0, 10.0), 1.0);
    }

    #[test]
    fn test_exponential_values() {
        assert_eq!(Kernel::Exponential.evaluate(0.0, 10.0), 1.0);
        assert_relative_eq!(
            Kernel::Exponential.evaluate(10.0, 10.0),
            (-1.0f64).exp()
        );
        assert!(Kernel::Exponential.evaluate(1e9, 10.0) < 1e-12);
    }

    #[test]
    fn test_none_is_raw_age() {
        assert_eq!(Kernel::None.evaluate(42.0, 0.0), 42.0);
        assert_eq!(Kernel::None.floor(), f64::INFINITY);
    }

    #[test]
    fn test_negative_age_clamped() {
        assert_eq!(Kernel::Linear.evaluate(-5.0, 10.0), 1.0);
        assert_eq!(Kernel::Exponential.evaluate(-5.0, 10.0), 1.0);
        assert_eq!(Kernel::None.evaluate(-5.0, 10.0), 0.0);
    }

    #[test]
    fn test_validate_tau() {
        assert!(Kernel::Linear.validate(0.0).is_err());
        assert!(Kernel::Exponential.validate(-1.0).is_err());
        assert!(Kernel::Exponential.validate(f64::NAN).is_err());
        assert!(Kernel::Exponential.validate(f64::INFINITY).is_err());
        assert!(Kernel::Linear.validate(10.0).is_ok());
        assert!(Kernel::None.validate(0.0).is_ok());
    }
}
