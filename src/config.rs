//! Configuration for the representations.
//!
//! Options are carried in plain tagged structs rather than encoded in the type
//! system; every struct validates itself and the constructors refuse invalid
//! combinations with a [`ConfigurationError`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::kernel::Kernel;
use crate::polarity::PolarityMode;
use crate::{MAX_CAPACITY, MAX_CHANNELS, MAX_SENSOR_DIM};

/// Default sensor size: the 128x128 eDVS array.
pub const DEFAULT_WIDTH: u32 = 128;
pub const DEFAULT_HEIGHT: u32 = 128;

/// Default decay constant in microseconds.
pub const DEFAULT_TAU_US: f64 = 100_000.0;

/// Channel layout of a grid cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChannelKind {
    /// One value per pixel.
    #[default]
    Scalar,
    /// A fixed small vector of values per pixel.
    Vector(usize),
}

impl ChannelKind {
    pub fn width(self) -> usize {
        match self {
            ChannelKind::Scalar => 1,
            ChannelKind::Vector(n) => n,
        }
    }
}

/// Dimensions and per-pixel layout shared by all representations.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    pub channels: ChannelKind,
    pub polarity: PolarityMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            channels: ChannelKind::Scalar,
            polarity: PolarityMode::Ignore,
        }
    }
}

impl GridConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_channels(mut self, channels: ChannelKind) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_polarity(mut self, polarity: PolarityMode) -> Self {
        self.polarity = polarity;
        self
    }

    /// Split polarity with exactly two channels, ON first.
    pub fn split_polarity(self) -> Self {
        self.with_channels(ChannelKind::Vector(2))
            .with_polarity(PolarityMode::Split)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_SENSOR_DIM || self.height > MAX_SENSOR_DIM {
            return Err(ConfigurationError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_SENSOR_DIM,
            });
        }
        if let ChannelKind::Vector(n) = self.channels {
            if !(2..=MAX_CHANNELS).contains(&n) {
                return Err(ConfigurationError::InvalidChannels {
                    width: n,
                    max: MAX_CHANNELS,
                });
            }
        }
        if self.polarity == PolarityMode::Split && self.channels != ChannelKind::Vector(2) {
            return Err(ConfigurationError::PolarityNeedsTwoChannels(self.channels));
        }
        Ok(())
    }

    pub(crate) fn width_usize(&self) -> usize {
        self.width as usize
    }

    pub(crate) fn height_usize(&self) -> usize {
        self.height as usize
    }
}

/// Window and ring capacities must lie in `1..=MAX_CAPACITY`.
pub(crate) fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 || capacity > MAX_CAPACITY {
        return Err(ConfigurationError::InvalidCapacity {
            capacity,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}

/// Time surface configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSurfaceConfig {
    pub grid: GridConfig,
    pub kernel: Kernel,
    /// Decay constant in timestamp units; ignored by `Kernel::None`.
    pub tau: f64,
}

impl Default for TimeSurfaceConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            kernel: Kernel::Exponential,
            tau: DEFAULT_TAU_US,
        }
    }
}

impl TimeSurfaceConfig {
    pub fn new(grid: GridConfig, kernel: Kernel, tau: f64) -> Self {
        Self { grid, kernel, tau }
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.kernel.validate(self.tau)
    }
}

/// Event histogram configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HistogramConfig {
    pub grid: GridConfig,
    /// Count only the last `n` integrated events; `None` counts everything
    /// since the last reset.
    pub window: Option<usize>,
}

impl HistogramConfig {
    pub fn new(grid: GridConfig) -> Self {
        Self { grid, window: None }
    }

    pub fn with_window(mut self, events: usize) -> Self {
        self.window = Some(events);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        match self.window {
            Some(capacity) => check_capacity(capacity),
            None => Ok(()),
        }
    }
}

/// Storage policy of a point cloud.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Capacity {
    /// Keep everything until drained.
    #[default]
    Unbounded,
    /// Keep the newest `n` points, evicting the oldest.
    Ring(usize),
}

/// How the third coordinate of a point is derived from an event.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointMapping {
    /// `z = scale * (t - origin)`.
    Time { scale: f64 },
    /// `z` is a fixed value per polarity.
    Polarity { positive: f64, negative: f64 },
    /// `z = scale * value` of an augmented event; plain events get 0.
    Depth { scale: f64 },
}

impl Default for PointMapping {
    fn default() -> Self {
        PointMapping::Time { scale: 1.0 }
    }
}

impl PointMapping {
    pub fn validate(&self) -> Result<()> {
        let values = match *self {
            PointMapping::Time { scale } | PointMapping::Depth { scale } => [scale, scale],
            PointMapping::Polarity { positive, negative } => [positive, negative],
        };
        match values.into_iter().find(|v| !v.is_finite()) {
            Some(bad) => Err(ConfigurationError::InvalidScale(bad)),
            None => Ok(()),
        }
    }
}

/// Point cloud configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointCloudConfig {
    pub grid: GridConfig,
    pub capacity: Capacity,
    pub mapping: PointMapping,
}

impl PointCloudConfig {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_mapping(mut self, mapping: PointMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if let Capacity::Ring(n) = self.capacity {
            check_capacity(n)?;
        }
        self.mapping.validate()
    }
}

/// Which representation to build and its variant-specific options.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RepresentationKind {
    TimeSurface { kernel: Kernel, tau: f64 },
    Histogram { window: Option<usize> },
    PointCloud { capacity: Capacity, mapping: PointMapping },
}

/// Tagged configuration for any representation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepresentationConfig {
    pub grid: GridConfig,
    pub kind: RepresentationKind,
}

impl RepresentationConfig {
    pub fn new(grid: GridConfig, kind: RepresentationKind) -> Self {
        Self { grid, kind }
    }

    pub fn validate(&self) -> Result<()> {
        match self.kind {
            RepresentationKind::TimeSurface { kernel, tau } => {
                TimeSurfaceConfig::new(self.grid, kernel, tau).validate()
            }
            RepresentationKind::Histogram { window } => {
                HistogramConfig { grid: self.grid, window }.validate()
            }
            RepresentationKind::PointCloud { capacity, mapping } => PointCloudConfig {
                grid: self.grid,
                capacity,
                mapping,
            }
            .validate(),
        }
    }
}
