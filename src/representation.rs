//! The common contract of all event representations.
//!
//! A representation is configured once, mutated only through [`insert`], and
//! read through [`snapshot`]. The three concrete variants are [`TimeSurface`],
//! [`EventHistogram`] and [`PointCloud`]; [`AnyRepresentation`] selects one at
//! runtime from a [`RepresentationConfig`].
//!
//! [`insert`]: Representation::insert
//! [`snapshot`]: Representation::snapshot

use tracing::debug;

use crate::cell::{Coordinate, Counter};
use crate::config::{
    HistogramConfig, PointCloudConfig, RepresentationConfig, RepresentationKind, TimeSurfaceConfig,
};
use crate::error::Result;
use crate::event::Event;
use crate::grid::Grid;
use crate::histogram::EventHistogram;
use crate::point_cloud::{PointCloud, PointsView};
use crate::time_surface::{TimeSurface, TimeSurfaceView};

/// Bookkeeping over the events integrated since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertStats {
    count: u64,
    first: Option<i64>,
    last: Option<i64>,
}

impl InsertStats {
    #[inline]
    pub(crate) fn record(&mut self, timestamp: i64) {
        self.count = self.count.saturating_add(1);
        if self.first.is_none() {
            self.first = Some(timestamp);
        }
        self.last = Some(timestamp);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Timestamp of the first integrated event.
    pub fn first_timestamp(&self) -> Option<i64> {
        self.first
    }

    /// Timestamp of the most recent integrated event.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.last
    }

    /// Time spanned by the integrated events; zero when fewer than two.
    pub fn duration(&self) -> i64 {
        match (self.first, self.last) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        }
    }

    pub fn mid_time(&self) -> Option<i64> {
        let first = self.first?;
        Some(first.saturating_add(self.duration() / 2))
    }
}

/// Turns one more event into an updated, bounded structure.
///
/// Events outside the configured grid and events rejected by the polarity
/// mode are dropped silently; `insert` reports whether the event was
/// integrated. None of the methods allocate after construction except where a
/// representation is inherently unbounded (see [`Capacity::Unbounded`]).
///
/// No internal synchronization is provided: callers that share a
/// representation across threads serialize `insert` against `snapshot`.
///
/// [`Capacity::Unbounded`]: crate::config::Capacity::Unbounded
pub trait Representation {
    /// Read-only view returned by [`snapshot`](Self::snapshot).
    type Snapshot<'a>
    where
        Self: 'a;

    fn insert(&mut self, event: &Event) -> bool;

    /// Inserts every event in order and returns how many were integrated.
    fn insert_all<'e, I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = &'e Event>,
    {
        events
            .into_iter()
            .filter(|event| self.insert(event))
            .count()
    }

    /// Back to the neutral state without reallocating.
    fn reset(&mut self);

    fn snapshot(&self) -> Self::Snapshot<'_>;

    fn stats(&self) -> &InsertStats;

    /// Events integrated since the last reset.
    fn count(&self) -> u64 {
        self.stats().count()
    }

    fn width(&self) -> usize;

    fn height(&self) -> usize;
}

/// Snapshot of an [`AnyRepresentation`].
#[derive(Debug)]
pub enum AnySnapshot<'a, T: Coordinate + Counter> {
    TimeSurface(TimeSurfaceView<'a, T>),
    Histogram(&'a Grid<T>),
    PointCloud(PointsView<'a, T>),
}

impl<'a, T: Coordinate + Counter> PartialEq for AnySnapshot<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnySnapshot::TimeSurface(a), AnySnapshot::TimeSurface(b)) => a == b,
            (AnySnapshot::Histogram(a), AnySnapshot::Histogram(b)) => a == b,
            (AnySnapshot::PointCloud(a), AnySnapshot::PointCloud(b)) => a == b,
            _ => false,
        }
    }
}

/// One of the three representation variants, chosen at runtime.
///
/// The cell type must serve all three variants, which in practice means
/// `f32` or `f64`.
#[derive(Clone, Debug)]
pub enum AnyRepresentation<T: Coordinate + Counter> {
    TimeSurface(TimeSurface<T>),
    Histogram(EventHistogram<T>),
    PointCloud(PointCloud<T>),
}

impl<T: Coordinate + Counter> AnyRepresentation<T> {
    pub fn new(config: &RepresentationConfig) -> Result<Self> {
        config.validate()?;
        debug!(kind = ?config.kind, "building representation from tagged config");
        let grid = config.grid;
        Ok(match config.kind {
            RepresentationKind::TimeSurface { kernel, tau } => AnyRepresentation::TimeSurface(
                TimeSurface::new(TimeSurfaceConfig::new(grid, kernel, tau))?,
            ),
            RepresentationKind::Histogram { window } => {
                AnyRepresentation::Histogram(EventHistogram::new(HistogramConfig { grid, window })?)
            }
            RepresentationKind::PointCloud { capacity, mapping } => {
                AnyRepresentation::PointCloud(PointCloud::new(PointCloudConfig {
                    grid,
                    capacity,
                    mapping,
                })?)
            }
        })
    }

    pub fn as_time_surface(&self) -> Option<&TimeSurface<T>> {
        match self {
            AnyRepresentation::TimeSurface(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&EventHistogram<T>> {
        match self {
            AnyRepresentation::Histogram(histogram) => Some(histogram),
            _ => None,
        }
    }

    pub fn as_point_cloud_mut(&mut self) -> Option<&mut PointCloud<T>> {
        match self {
            AnyRepresentation::PointCloud(cloud) => Some(cloud),
            _ => None,
        }
    }
}

impl<T: Coordinate + Counter> Representation for AnyRepresentation<T> {
    type Snapshot<'a> = AnySnapshot<'a, T> where Self: 'a;

    fn insert(&mut self, event: &Event) -> bool {
        match self {
            AnyRepresentation::TimeSurface(r) => r.insert(event),
            AnyRepresentation::Histogram(r) => r.insert(event),
            AnyRepresentation::PointCloud(r) => r.insert(event),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyRepresentation::TimeSurface(r) => r.reset(),
            AnyRepresentation::Histogram(r) => r.reset(),
            AnyRepresentation::PointCloud(r) => r.reset(),
        }
    }

    fn snapshot(&self) -> AnySnapshot<'_, T> {
        match self {
            AnyRepresentation::TimeSurface(r) => AnySnapshot::TimeSurface(r.snapshot()),
            AnyRepresentation::Histogram(r) => AnySnapshot::Histogram(r.snapshot()),
            AnyRepresentation::PointCloud(r) => AnySnapshot::PointCloud(r.snapshot()),
        }
    }

    fn stats(&self) -> &InsertStats {
        match self {
            AnyRepresentation::TimeSurface(r) => r.stats(),
            AnyRepresentation::Histogram(r) => r.stats(),
            AnyRepresentation::PointCloud(r) => r.stats(),
        }
    }

    fn width(&self) -> usize {
        match self {
            AnyRepresentation::TimeSurface(r) => r.width(),
            AnyRepresentation::Histogram(r) => r.width(),
            AnyRepresentation::PointCloud(r) => r.width(),
        }
    }

    fn height(&self) -> usize {
        match self {
            AnyRepresentation::TimeSurface(r) => r.height(),
            AnyRepresentation::Histogram(r) => r.height(),
            AnyRepresentation::PointCloud(r) => r.height(),
        }
    }
}
