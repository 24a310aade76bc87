#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::event::{Event, Polarity};

/// How a representation treats event polarity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PolarityMode {
    /// Accept both polarities into the same cell.
    #[default]
    Ignore,
    /// Accept both polarities, each into its own channel (ON = 0, OFF = 1).
    Split,
    /// Accept only ON events.
    OnlyPositive,
    /// Accept only OFF events.
    OnlyNegative,
}

impl PolarityMode {
    /// Returns true if events of this polarity are integrated.
    #[inline]
    pub fn accepts(self, polarity: Polarity) -> bool {
        match self {
            PolarityMode::Ignore | PolarityMode::Split => true,
            PolarityMode::OnlyPositive => polarity == Polarity::Positive,
            PolarityMode::OnlyNegative => polarity == Polarity::Negative,
        }
    }

    /// Number of independent state planes the mode needs.
    pub fn planes(self) -> usize {
        match self {
            PolarityMode::Split => 2,
            _ => 1,
        }
    }

    /// State plane an accepted event of this polarity goes to.
    #[inline]
    pub fn plane(self, polarity: Polarity) -> usize {
        match self {
            PolarityMode::Split => polarity.index(),
            _ => 0,
        }
    }

    /// Convenience wrapper around [`accepts`](Self::accepts) for a whole event.
    #[inline]
    pub fn filter(self, event: &Event) -> bool {
        self.accepts(event.polarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on() -> Event {
        Event::new(10, 10, 100_000, Polarity::Positive)
    }

    fn off() -> Event {
        Event::new(10, 10, 100_000, Polarity::Negative)
    }

    #[test]
    fn test_only_positive_passes_on() {
        assert!(PolarityMode::OnlyPositive.filter(&on()));
        assert!(!PolarityMode::OnlyPositive.filter(&off()));
    }

    #[test]
    fn test_only_negative_passes_off() {
        assert!(PolarityMode::OnlyNegative.filter(&off()));
        assert!(!PolarityMode::OnlyNegative.filter(&on()));
    }

    #[test]
    fn test_ignore_and_split_pass_all() {
        for mode in [PolarityMode::Ignore, PolarityMode::Split] {
            assert!(mode.filter(&on()));
            assert!(mode.filter(&off()));
        }
    }

    #[test]
    fn test_planes() {
        assert_eq!(PolarityMode::Split.planes(), 2);
        assert_eq!(PolarityMode::Ignore.planes(), 1);
        assert_eq!(PolarityMode::Split.plane(Polarity::Negative), 1);
        assert_eq!(PolarityMode::Ignore.plane(Polarity::Negative), 0);
        assert_eq!(PolarityMode::OnlyNegative.plane(Polarity::Negative), 0);
    }

    #[test]
    fn test_default_is_ignore() {
        assert_eq!(PolarityMode::default(), PolarityMode::Ignore);
    }
}
