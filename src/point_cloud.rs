use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::cell::Coordinate;
use crate::config::{Capacity, PointCloudConfig, PointMapping};
use crate::error::Result;
use crate::event::{AugmentedEvent, Event, Polarity};
use crate::representation::{InsertStats, Representation};

/// One event lifted into 3-D.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudPoint<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub polarity: Polarity,
}

/// Events as an ordered sequence of 3-D points.
///
/// No dense grid is kept; the configured grid only bounds which events are
/// accepted. The third coordinate comes from the [`PointMapping`]. With
/// [`Capacity::Ring`] the oldest point is evicted once the ring is full;
/// with [`Capacity::Unbounded`] the caller drains periodically.
#[derive(Clone, Debug)]
pub struct PointCloud<T: Coordinate> {
    points: VecDeque<CloudPoint<T>>,
    config: PointCloudConfig,
    time_origin: i64,
    stats: InsertStats,
}

impl<T: Coordinate> PointCloud<T> {
    pub fn new(config: PointCloudConfig) -> Result<Self> {
        config.validate()?;
        let points = match config.capacity {
            Capacity::Ring(n) => VecDeque::with_capacity(n),
            Capacity::Unbounded => VecDeque::new(),
        };
        debug!(
            width = config.grid.width,
            height = config.grid.height,
            capacity = ?config.capacity,
            mapping = ?config.mapping,
            "point cloud configured"
        );
        Ok(Self {
            points,
            config,
            time_origin: 0,
            stats: InsertStats::default(),
        })
    }

    pub fn config(&self) -> &PointCloudConfig {
        &self.config
    }

    /// Timestamp mapped to `z = 0` by [`PointMapping::Time`].
    pub fn set_time_origin(&mut self, origin: i64) {
        self.time_origin = origin;
    }

    pub fn time_origin(&self) -> i64 {
        self.time_origin
    }

    /// Insert an event carrying a derived value; [`PointMapping::Depth`] uses
    /// it as `z`, the other mappings ignore it.
    pub fn insert_augmented(&mut self, event: &AugmentedEvent) -> bool {
        self.push(&event.event, event.value())
    }

    /// Whether the point `event` maps to is currently stored.
    ///
    /// Plain events map with depth 0 under [`PointMapping::Depth`]; use
    /// [`contains_augmented`](Self::contains_augmented) for points inserted
    /// with a value.
    pub fn contains(&self, event: &Event) -> bool {
        self.contains_point(&self.map(event, 0.0))
    }

    /// Whether the point `event` maps to, value included, is currently stored.
    pub fn contains_augmented(&self, event: &AugmentedEvent) -> bool {
        self.contains_point(&self.map(&event.event, event.value()))
    }

    fn contains_point(&self, point: &CloudPoint<T>) -> bool {
        self.points.iter().any(|p| p == point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove and return every stored point in insertion order.
    ///
    /// A point is delivered by at most one drain.
    pub fn drain(&mut self) -> Vec<CloudPoint<T>> {
        trace!(points = self.points.len(), "point cloud drained");
        self.points.drain(..).collect()
    }

    fn accepts(&self, event: &Event) -> bool {
        let grid = &self.config.grid;
        grid.polarity.accepts(event.polarity)
            && (event.x as u32) < grid.width
            && (event.y as u32) < grid.height
    }

    fn map(&self, event: &Event, value: f64) -> CloudPoint<T> {
        let z = match self.config.mapping {
            PointMapping::Time { scale } => {
                scale * event.timestamp.saturating_sub(self.time_origin) as f64
            }
            PointMapping::Polarity { positive, negative } => match event.polarity {
                Polarity::Positive => positive,
                Polarity::Negative => negative,
            },
            PointMapping::Depth { scale } => scale * value,
        };
        CloudPoint {
            x: T::from_f64(event.x as f64),
            y: T::from_f64(event.y as f64),
            z: T::from_f64(z),
            polarity: event.polarity,
        }
    }

    fn push(&mut self, event: &Event, value: f64) -> bool {
        if !self.accepts(event) {
            return false;
        }
        let point = self.map(event, value);
        if let Capacity::Ring(n) = self.config.capacity {
            if self.points.len() >= n {
                self.points.pop_front();
            }
        }
        self.points.push_back(point);
        self.stats.record(event.timestamp);
        true
    }
}

impl<T: Coordinate> Representation for PointCloud<T> {
    type Snapshot<'a> = PointsView<'a, T> where Self: 'a;

    /// Append the event as a point; plain events have depth 0 under
    /// [`PointMapping::Depth`].
    fn insert(&mut self, event: &Event) -> bool {
        self.push(event, 0.0)
    }

    fn reset(&mut self) {
        self.points.clear();
        self.stats.clear();
        trace!("point cloud reset");
    }

    /// The stored points, oldest first, without consuming them.
    fn snapshot(&self) -> PointsView<'_, T> {
        let (head, tail) = self.points.as_slices();
        PointsView { head, tail }
    }

    fn stats(&self) -> &InsertStats {
        &self.stats
    }

    fn width(&self) -> usize {
        self.config.grid.width_usize()
    }

    fn height(&self) -> usize {
        self.config.grid.height_usize()
    }
}

/// Borrowed view of a point cloud's points in insertion order.
#[derive(Clone, Copy, Debug)]
pub struct PointsView<'a, T> {
    head: &'a [CloudPoint<T>],
    tail: &'a [CloudPoint<T>],
}

impl<'a, T: Copy> PointsView<'a, T> {
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&'a CloudPoint<T>> {
        if index < self.head.len() {
            self.head.get(index)
        } else {
            self.tail.get(index - self.head.len())
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CloudPoint<T>> + 'a {
        self.head.iter().chain(self.tail.iter())
    }

    pub fn to_vec(&self) -> Vec<CloudPoint<T>> {
        self.iter().copied().collect()
    }
}

impl<'a, T: PartialEq + Copy> PartialEq for PointsView<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::polarity::PolarityMode;

    fn on(x: u16, y: u16, t: i64) -> Event {
        Event::new(x, y, t, Polarity::Positive)
    }

    fn off(x: u16, y: u16, t: i64) -> Event {
        Event::new(x, y, t, Polarity::Negative)
    }

    fn cloud(capacity: Capacity, mapping: PointMapping) -> PointCloud<f64> {
        let config = PointCloudConfig::new(GridConfig::new(16, 16))
            .with_capacity(capacity)
            .with_mapping(mapping);
        PointCloud::new(config).unwrap()
    }

    fn time_cloud() -> PointCloud<f64> {
        cloud(Capacity::Unbounded, PointMapping::Time { scale: 1.0 })
    }

    #[test]
    fn test_insert_appends_points_in_order() {
        let mut pc = time_cloud();
        pc.insert(&on(1, 2, 10));
        pc.insert(&off(3, 4, 20));
        let points = pc.snapshot().to_vec();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0],
            CloudPoint {
                x: 1.0,
                y: 2.0,
                z: 10.0,
                polarity: Polarity::Positive
            }
        );
        assert_eq!(points[1].z, 20.0);
        assert_eq!(points[1].polarity, Polarity::Negative);
    }

    #[test]
    fn test_drain_is_single_delivery() {
        let mut pc = time_cloud();
        pc.insert(&on(1, 1, 1));
        pc.insert(&on(2, 2, 2));
        let first = pc.drain();
        assert_eq!(first.len(), 2);
        assert!(pc.drain().is_empty());
        pc.insert(&on(3, 3, 3));
        let second = pc.drain();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].x, 3.0);
    }

    #[test]
    fn test_snapshot_does_not_consume() {
        let mut pc = time_cloud();
        pc.insert(&on(1, 1, 1));
        assert_eq!(pc.snapshot(), pc.snapshot());
        assert_eq!(pc.len(), 1);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut pc = cloud(Capacity::Ring(3), PointMapping::Time { scale: 1.0 });
        for t in 0..5 {
            pc.insert(&on(t as u16, 0, t));
        }
        let zs: Vec<f64> = pc.snapshot().iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![2.0, 3.0, 4.0]);
        assert_eq!(pc.snapshot().get(0).map(|p| p.x), Some(2.0));
        assert_eq!(pc.snapshot().get(3), None);
    }

    #[test]
    fn test_time_origin_and_scale() {
        let mut pc = cloud(Capacity::Unbounded, PointMapping::Time { scale: 0.001 });
        pc.set_time_origin(1_000_000);
        pc.insert(&on(0, 0, 1_002_000));
        assert_eq!(pc.snapshot().get(0).map(|p| p.z), Some(2.0));
    }

    #[test]
    fn test_polarity_mapping() {
        let mut pc = cloud(
            Capacity::Unbounded,
            PointMapping::Polarity {
                positive: 1.0,
                negative: -1.0,
            },
        );
        pc.insert(&on(0, 0, 5));
        pc.insert(&off(0, 0, 6));
        let zs: Vec<f64> = pc.snapshot().iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![1.0, -1.0]);
    }

    #[test]
    fn test_depth_mapping_uses_augmented_value() {
        let mut pc = cloud(Capacity::Unbounded, PointMapping::Depth { scale: 2.0 });
        let aug = AugmentedEvent::new(on(4, 4, 9), 1.25).unwrap();
        assert!(pc.insert_augmented(&aug));
        pc.insert(&on(5, 5, 10));
        let zs: Vec<f64> = pc.snapshot().iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![2.5, 0.0]);
    }

    #[test]
    fn test_out_of_bounds_and_filtered_dropped() {
        let config = PointCloudConfig::new(
            GridConfig::new(4, 4).with_polarity(PolarityMode::OnlyPositive),
        );
        let mut pc = PointCloud::<f32>::new(config).unwrap();
        assert!(!pc.insert(&on(4, 0, 0)));
        assert!(!pc.insert(&off(0, 0, 0)));
        assert!(pc.is_empty());
        assert_eq!(pc.count(), 0);
    }

    #[test]
    fn test_contains() {
        let mut pc = time_cloud();
        pc.insert(&on(7, 8, 100));
        assert!(pc.contains(&on(7, 8, 100)));
        assert!(!pc.contains(&off(7, 8, 100)));
        assert!(!pc.contains(&on(7, 8, 101)));
    }

    #[test]
    fn test_contains_augmented_under_depth_mapping() {
        let mut pc = cloud(Capacity::Unbounded, PointMapping::Depth { scale: 1.0 });
        let aug = AugmentedEvent::new(on(2, 3, 40), 0.75).unwrap();
        pc.insert_augmented(&aug);
        assert!(pc.contains_augmented(&aug));
        assert!(!pc.contains(&on(2, 3, 40)));
        assert!(!pc.contains_augmented(&AugmentedEvent::new(on(2, 3, 40), 0.5).unwrap()));

        pc.insert(&on(9, 9, 41));
        assert!(pc.contains(&on(9, 9, 41)));
    }

    #[test]
    fn test_oversized_ring_is_config_error() {
        let config =
            PointCloudConfig::new(GridConfig::new(4, 4)).with_capacity(Capacity::Ring(usize::MAX));
        assert!(PointCloud::<f32>::new(config).is_err());
    }

    #[test]
    fn test_reset_empties() {
        let mut pc = time_cloud();
        pc.insert(&on(1, 1, 1));
        pc.reset();
        assert!(pc.snapshot().is_empty());
        assert_eq!(pc.count(), 0);
    }
}
