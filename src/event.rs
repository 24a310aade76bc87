#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sign of a brightness change.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Brightness decrease (OFF).
    Negative,
    /// Brightness increase (ON).
    Positive,
}

impl Polarity {
    /// `+1` for ON, `-1` for OFF.
    pub fn sign(self) -> i8 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    /// Channel index used by polarity-split grids: ON is 0, OFF is 1.
    pub fn index(self) -> usize {
        match self {
            Polarity::Positive => 0,
            Polarity::Negative => 1,
        }
    }

    /// Any positive value is ON, everything else is OFF.
    pub fn from_sign(sign: i8) -> Self {
        if sign > 0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }

    pub fn from_bool(on: bool) -> Self {
        if on {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

/// Single polarity event.
///
/// Timestamps are in microseconds. Consumers assume events arrive with
/// non-decreasing timestamps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub x: u16,
    pub y: u16,
    pub timestamp: i64,
    pub polarity: Polarity,
}

impl Event {
    pub fn new(x: u16, y: u16, timestamp: i64, polarity: Polarity) -> Self {
        Self {
            x,
            y,
            timestamp,
            polarity,
        }
    }

    /// Distance to another event under the given metric.
    ///
    /// `Temporal` is signed (`self - other`); the other metrics are norms.
    pub fn distance(&self, other: &Event, metric: Distance) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        let dt = self.timestamp as f64 - other.timestamp as f64;
        match metric {
            Distance::Spatial(norm) => norm.apply(&[dx, dy]),
            Distance::Temporal => dt,
            Distance::SpatioTemporal(norm) => norm.apply(&[dx, dy, dt]),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.x,
            self.y,
            self.timestamp,
            self.polarity.sign()
        )
    }
}

/// Vector norm used by [`Distance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Norm {
    L1,
    L2,
    Inf,
}

impl Norm {
    fn apply(self, components: &[f64]) -> f64 {
        match self {
            Norm::L1 => components.iter().map(|c| c.abs()).sum(),
            Norm::L2 => components.iter().map(|c| c * c).sum::<f64>().sqrt(),
            Norm::Inf => components.iter().fold(0.0, |m, c| c.abs().max(m)),
        }
    }
}

/// Metric for [`Event::distance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distance {
    /// Over (x, y) only.
    Spatial(Norm),
    /// Signed timestamp difference.
    Temporal,
    /// Over (x, y, t), with time in timestamp units.
    SpatioTemporal(Norm),
}

/// Event annotated with one derived scalar (depth, distance, weight, ...).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AugmentedEvent {
    pub event: Event,
    value: f64,
}

impl AugmentedEvent {
    /// Returns `None` when `value` is NaN or infinite.
    pub fn new(event: Event, value: f64) -> Option<Self> {
        value.is_finite().then_some(Self { event, value })
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl std::fmt::Display for AugmentedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.event, self.value)
    }
}

/// Anything carrying an event timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

impl Timestamped for Event {
    #[inline]
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for AugmentedEvent {
    #[inline]
    fn timestamp(&self) -> i64 {
        self.event.timestamp
    }
}
