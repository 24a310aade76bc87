//! Bounded representations of event-camera streams.
//!
//! Events from a camera or a recording are turned into fixed-size structures:
//! decaying [`TimeSurface`]s, per-pixel [`EventHistogram`]s and 3-D
//! [`PointCloud`]s, all behind the [`Representation`] trait. Windowing buffers,
//! a plain-text reader and an undistortion lookup cover the surrounding
//! pipeline.
//!
//! ```
//! use ev_representations::{
//!     Event, GridConfig, Kernel, Polarity, Representation, TimeSurface, TimeSurfaceConfig,
//! };
//!
//! let config = TimeSurfaceConfig::new(GridConfig::new(128, 128), Kernel::Linear, 10.0);
//! let mut surface = TimeSurface::<f32>::new(config)?;
//! surface.insert(&Event::new(5, 7, 100, Polarity::Positive));
//! assert_eq!(surface.snapshot_at(105).get(5, 7, 0), Some(0.5));
//! # Ok::<(), ev_representations::ConfigurationError>(())
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod histogram;
pub mod kernel;
pub mod point_cloud;
pub mod polarity;
pub mod reader;
pub mod representation;
pub mod source;
pub mod time_surface;
pub mod undistort;
pub mod window;

/// Maximum allowed sensor dimension to prevent excessive memory allocation.
/// 32768 x 32768 = ~1 GB per plane, far beyond any real event sensor.
pub const MAX_SENSOR_DIM: u32 = 32768;

/// Widest per-pixel vector a grid cell may hold.
pub const MAX_CHANNELS: usize = 4;

/// Largest window or ring capacity, in elements. Bounded buffers reserve
/// their storage up front.
pub const MAX_CAPACITY: usize = 1 << 24;

pub use cell::{Cell, Coordinate, Counter};
pub use config::{
    Capacity, ChannelKind, GridConfig, HistogramConfig, PointCloudConfig, PointMapping,
    RepresentationConfig, RepresentationKind, TimeSurfaceConfig,
};
pub use error::{ConfigurationError, ReadError};
pub use event::{AugmentedEvent, Distance, Event, Norm, Polarity, Timestamped};
pub use geometry::{Circ, Rect3, Size3};
pub use grid::Grid;
pub use histogram::EventHistogram;
pub use kernel::Kernel;
pub use point_cloud::{CloudPoint, PointCloud, PointsView};
pub use polarity::PolarityMode;
pub use reader::{Columns, PlainTextReader};
pub use representation::{AnyRepresentation, AnySnapshot, InsertStats, Representation};
pub use source::{EventSource, IterSource};
pub use time_surface::{TimeSurface, TimeSurfaceView};
pub use undistort::UndistortMap;
pub use window::{BoundedBuffer, EventWindow};
