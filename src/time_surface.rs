use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::cell::Cell;
use crate::config::TimeSurfaceConfig;
use crate::error::Result;
use crate::event::{Event, Polarity};
use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::polarity::PolarityMode;
use crate::representation::{InsertStats, Representation};

/// Stored timestamp of a pixel that has not seen an event since reset.
const NEVER: i64 = i64::MIN;

/// Time Surface representation (Lagorce et al., 2017).
///
/// Stores the most recent event timestamp at each pixel location, optionally
/// separated by polarity. Reading the surface evaluates the configured decay
/// kernel on `query_time - stored_timestamp` for every cell, so recent events
/// are bright and old events fade to the kernel floor.
///
/// Decay weights in `[0, 1]` are scaled by [`Cell::FULL_SCALE`]: a `u8` surface
/// renders `0..=255`, a float surface holds the raw weight. With
/// [`Kernel::None`] cells hold the raw age and untouched cells read
/// [`Cell::SATURATED`].
///
/// Insertion is last-writer-wins and never accumulates.
#[derive(Clone, Debug)]
pub struct TimeSurface<T: Cell> {
    /// One plane per polarity in split mode, one plane otherwise.
    timestamps: Grid<i64>,
    config: TimeSurfaceConfig,
    channels: usize,
    stats: InsertStats,
    _cell: PhantomData<T>,
}

impl<T: Cell> TimeSurface<T> {
    pub fn new(config: TimeSurfaceConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.grid;
        debug!(
            width = grid.width,
            height = grid.height,
            channels = ?grid.channels,
            polarity = ?grid.polarity,
            kernel = ?config.kernel,
            tau = config.tau,
            "time surface configured"
        );
        Ok(Self {
            timestamps: Grid::new(
                grid.width_usize(),
                grid.height_usize(),
                grid.polarity.planes(),
                NEVER,
            ),
            channels: grid.channels.width(),
            config,
            stats: InsertStats::default(),
            _cell: PhantomData,
        })
    }

    pub fn config(&self) -> &TimeSurfaceConfig {
        &self.config
    }

    pub fn kernel(&self) -> Kernel {
        self.config.kernel
    }

    pub fn tau(&self) -> f64 {
        self.config.tau
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Evaluate the surface at `time` without copying it.
    pub fn snapshot_at(&self, time: i64) -> TimeSurfaceView<'_, T> {
        TimeSurfaceView {
            surface: self,
            time,
        }
    }

    /// Raw timestamp at a pixel, `None` if outside or untouched since reset.
    ///
    /// `polarity` selects the plane in split mode and is otherwise ignored.
    pub fn timestamp_at(&self, x: u16, y: u16, polarity: Polarity) -> Option<i64> {
        let plane = self.config.grid.polarity.plane(polarity);
        let stamp = self.timestamps.get(x as usize, y as usize, plane)?;
        (stamp != NEVER).then_some(stamp)
    }

    /// Local time surface context around a pixel at `time`.
    ///
    /// Returns a flattened `(2*radius+1) x (2*radius+1)` patch of kernel
    /// values (not scaled to the cell type), using the most recent event of
    /// either polarity. Neighbours outside the frame or untouched since reset
    /// read the kernel floor. `radius` is clamped to the larger frame
    /// dimension, which already covers the whole frame from any pixel.
    pub fn local_patch(&self, x: u16, y: u16, radius: u16, time: i64) -> Vec<f64> {
        let cx = x as i64;
        let cy = y as i64;
        let r = (radius as i64).min(self.width().max(self.height()) as i64);
        let side = (2 * r + 1) as usize;
        let mut patch = Vec::with_capacity(side * side);

        for dy in -r..=r {
            for dx in -r..=r {
                let stamp = self.latest_stamp(cx + dx, cy + dy);
                patch.push(self.kernel_value(stamp, time));
            }
        }
        patch
    }

    fn latest_stamp(&self, x: i64, y: i64) -> i64 {
        if x < 0 || y < 0 {
            return NEVER;
        }
        self.timestamps
            .pixel(x as usize, y as usize)
            .and_then(|planes| planes.iter().copied().max())
            .unwrap_or(NEVER)
    }

    #[inline]
    fn kernel_value(&self, stamp: i64, time: i64) -> f64 {
        let kernel = self.config.kernel;
        if stamp == NEVER {
            return kernel.floor();
        }
        kernel.evaluate(time.saturating_sub(stamp) as f64, self.config.tau)
    }

    #[inline]
    fn cell_value(&self, stamp: i64, time: i64) -> T {
        if stamp == NEVER {
            return match self.config.kernel {
                Kernel::None => T::SATURATED,
                _ => T::ZERO,
            };
        }
        let value = self.kernel_value(stamp, time);
        match self.config.kernel {
            Kernel::None => T::from_f64(value),
            _ => T::from_f64(value * T::FULL_SCALE),
        }
    }

    /// Stored timestamp feeding output channel `channel` of a pixel.
    #[inline]
    fn stamp_for_channel(&self, planes: &[i64], channel: usize) -> i64 {
        match self.config.grid.polarity {
            PolarityMode::Split => planes[channel],
            _ => planes[0],
        }
    }

    /// A blank frame with this surface's shape, for [`TimeSurfaceView::render_into`].
    pub fn new_frame(&self) -> Grid<T> {
        Grid::new(self.width(), self.height(), self.channels, T::ZERO)
    }
}

impl<T: Cell> Representation for TimeSurface<T> {
    type Snapshot<'a> = TimeSurfaceView<'a, T> where Self: 'a;

    /// Overwrite the stored timestamp of the addressed cell.
    fn insert(&mut self, event: &Event) -> bool {
        let mode = self.config.grid.polarity;
        if !mode.accepts(event.polarity) {
            return false;
        }
        let plane = mode.plane(event.polarity);
        let Some(pixel) = self
            .timestamps
            .pixel_mut(event.x as usize, event.y as usize)
        else {
            return false;
        };
        pixel[plane] = event.timestamp;
        self.stats.record(event.timestamp);
        true
    }

    /// Forget every stored timestamp.
    fn reset(&mut self) {
        self.timestamps.fill(NEVER);
        self.stats.clear();
        trace!("time surface reset");
    }

    /// Evaluate at the newest inserted timestamp (0 when empty).
    fn snapshot(&self) -> TimeSurfaceView<'_, T> {
        self.snapshot_at(self.stats.last_timestamp().unwrap_or(0))
    }

    fn stats(&self) -> &InsertStats {
        &self.stats
    }

    fn width(&self) -> usize {
        self.timestamps.width()
    }

    fn height(&self) -> usize {
        self.timestamps.height()
    }
}

/// Lazy read-only view of a [`TimeSurface`] evaluated at a fixed time.
///
/// Values are computed on access; nothing is copied until
/// [`to_grid`](Self::to_grid) or [`render_into`](Self::render_into).
#[derive(Clone, Copy, Debug)]
pub struct TimeSurfaceView<'a, T: Cell> {
    surface: &'a TimeSurface<T>,
    time: i64,
}

impl<'a, T: Cell> TimeSurfaceView<'a, T> {
    /// Query time the view is evaluated at.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn width(&self) -> usize {
        self.surface.width()
    }

    pub fn height(&self) -> usize {
        self.surface.height()
    }

    pub fn channels(&self) -> usize {
        self.surface.channels
    }

    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<T> {
        if channel >= self.surface.channels {
            return None;
        }
        let planes = self.surface.timestamps.pixel(x, y)?;
        let stamp = self.surface.stamp_for_channel(planes, channel);
        Some(self.surface.cell_value(stamp, self.time))
    }

    /// All values, row-major with interleaved channels.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let surface = self.surface;
        let time = self.time;
        let channels = surface.channels;
        surface
            .timestamps
            .as_slice()
            .chunks_exact(surface.timestamps.channels())
            .flat_map(move |planes| {
                (0..channels).map(move |c| {
                    surface.cell_value(surface.stamp_for_channel(planes, c), time)
                })
            })
    }

    /// Write the evaluated surface into `frame`.
    ///
    /// Returns false, leaving `frame` untouched, if its shape differs from the
    /// surface (use [`TimeSurface::new_frame`] to allocate a matching one).
    pub fn render_into(&self, frame: &mut Grid<T>) -> bool {
        if frame.width() != self.width()
            || frame.height() != self.height()
            || frame.channels() != self.channels()
        {
            return false;
        }
        for (dst, value) in frame.as_mut_slice().iter_mut().zip(self.iter()) {
            *dst = value;
        }
        true
    }

    pub fn to_grid(&self) -> Grid<T> {
        let mut frame = self.surface.new_frame();
        self.render_into(&mut frame);
        frame
    }
}

impl<'a, T: Cell> PartialEq for TimeSurfaceView<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.channels() == other.channels()
            && self.iter().eq(other.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelKind, GridConfig};
    use approx::assert_relative_eq;

    const TAU: f64 = 100_000.0;

    fn on(x: u16, y: u16, t: i64) -> Event {
        Event::new(x, y, t, Polarity::Positive)
    }

    fn off(x: u16, y: u16, t: i64) -> Event {
        Event::new(x, y, t, Polarity::Negative)
    }

    fn surface<T: Cell>(kernel: Kernel, tau: f64) -> TimeSurface<T> {
        TimeSurface::new(TimeSurfaceConfig::new(GridConfig::new(4, 4), kernel, tau)).unwrap()
    }

    #[test]
    fn test_initial_surface_is_floor() {
        let ts = surface::<u8>(Kernel::Exponential, TAU);
        assert!(ts.snapshot_at(100_000).iter().all(|v| v == 0));
        assert_eq!(ts.timestamp_at(0, 0, Polarity::Positive), None);

        let raw = surface::<u16>(Kernel::None, 0.0);
        assert!(raw.snapshot().iter().all(|v| v == u16::MAX));
    }

    #[test]
    fn test_insert_stores_timestamp() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        assert!(ts.insert(&on(1, 2, 500_000)));
        assert_eq!(ts.timestamp_at(1, 2, Polarity::Positive), Some(500_000));
        assert_eq!(ts.timestamp_at(0, 0, Polarity::Positive), None);
    }

    #[test]
    fn test_frame_recent_event_bright() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        ts.insert(&on(0, 0, 100_000));
        // dt = 0, exp(0) = 1.0 -> 255
        assert_eq!(ts.snapshot_at(100_000).get(0, 0, 0), Some(255));
    }

    #[test]
    fn test_frame_old_event_fades() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        ts.insert(&on(0, 0, 100_000));
        // dt = 900000, exp(-9) ~ 0.000123 -> 0
        assert!(ts.snapshot_at(1_000_000).get(0, 0, 0).unwrap() < 2);
    }

    #[test]
    fn test_linear_kernel_exact() {
        let mut ts = surface::<f64>(Kernel::Linear, 10.0);
        ts.insert(&on(2, 2, 100));
        assert_eq!(ts.snapshot_at(105).get(2, 2, 0), Some(0.5));
        assert_eq!(ts.snapshot_at(110).get(2, 2, 0), Some(0.0));
        assert_eq!(ts.snapshot_at(120).get(2, 2, 0), Some(0.0));
    }

    #[test]
    fn test_exponential_kernel_at_zero_age() {
        let mut ts = surface::<f32>(Kernel::Exponential, 10.0);
        ts.insert(&on(3, 0, 42));
        assert_eq!(ts.snapshot().get(3, 0, 0), Some(1.0));
        assert_relative_eq!(
            ts.snapshot_at(52).get(3, 0, 0).unwrap(),
            (-1.0f32).exp(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_last_writer_wins() {
        let mut ts = surface::<f64>(Kernel::None, 0.0);
        ts.insert(&on(1, 1, 100));
        ts.insert(&off(1, 1, 200));
        assert_eq!(ts.timestamp_at(1, 1, Polarity::Positive), Some(200));
        assert_eq!(ts.snapshot_at(250).get(1, 1, 0), Some(50.0));
    }

    #[test]
    fn test_query_before_event_clamps_age() {
        let mut ts = surface::<f64>(Kernel::Linear, 10.0);
        ts.insert(&on(0, 0, 100));
        assert_eq!(ts.snapshot_at(50).get(0, 0, 0), Some(1.0));
    }

    #[test]
    fn test_out_of_bounds_insert_ignored() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        assert!(!ts.insert(&on(10, 10, 100_000)));
        assert_eq!(ts.timestamp_at(10, 10, Polarity::Positive), None);
        assert_eq!(ts.count(), 0);
    }

    #[test]
    fn test_reset() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        ts.insert(&on(1, 1, 100_000));
        ts.reset();
        assert_eq!(ts.timestamp_at(1, 1, Polarity::Positive), None);
        assert!(ts.snapshot_at(100_000).iter().all(|v| v == 0));
        assert_eq!(ts.stats().last_timestamp(), None);
    }

    #[test]
    fn test_split_polarity_channels() {
        let grid = GridConfig::new(4, 4).split_polarity();
        let mut ts =
            TimeSurface::<f64>::new(TimeSurfaceConfig::new(grid, Kernel::Linear, 10.0)).unwrap();
        ts.insert(&on(1, 1, 100));
        ts.insert(&off(1, 1, 105));
        let view = ts.snapshot_at(105);
        assert_eq!(view.get(1, 1, 0), Some(0.5));
        assert_eq!(view.get(1, 1, 1), Some(1.0));
        assert_eq!(view.get(1, 1, 2), None);
        assert_eq!(ts.timestamp_at(1, 1, Polarity::Positive), Some(100));
        assert_eq!(ts.timestamp_at(1, 1, Polarity::Negative), Some(105));
    }

    #[test]
    fn test_only_positive_drops_off_events() {
        let grid = GridConfig::new(4, 4).with_polarity(PolarityMode::OnlyPositive);
        let mut ts =
            TimeSurface::<u8>::new(TimeSurfaceConfig::new(grid, Kernel::Exponential, TAU))
                .unwrap();
        assert!(!ts.insert(&off(0, 0, 10)));
        assert!(ts.insert(&on(0, 0, 10)));
        assert_eq!(ts.count(), 1);
    }

    #[test]
    fn test_vector_channels_replicate() {
        let grid = GridConfig::new(4, 4).with_channels(ChannelKind::Vector(3));
        let mut ts =
            TimeSurface::<u8>::new(TimeSurfaceConfig::new(grid, Kernel::Exponential, TAU))
                .unwrap();
        ts.insert(&on(2, 3, 1_000));
        let frame = ts.snapshot().to_grid();
        assert_eq!(frame.pixel(2, 3), Some(&[255u8, 255, 255][..]));
        assert_eq!(frame.as_slice().len(), 4 * 4 * 3);
    }

    #[test]
    fn test_render_into_checks_shape() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        ts.insert(&on(0, 0, 5));
        let mut frame = ts.new_frame();
        assert!(ts.snapshot().render_into(&mut frame));
        assert_eq!(frame.get(0, 0, 0), Some(255));

        let mut wrong = Grid::new(2, 2, 1, 0u8);
        assert!(!ts.snapshot().render_into(&mut wrong));
        assert!(wrong.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_local_patch_center() {
        let grid = GridConfig::new(8, 8);
        let mut ts =
            TimeSurface::<u8>::new(TimeSurfaceConfig::new(grid, Kernel::Exponential, TAU))
                .unwrap();
        ts.insert(&on(4, 4, 100_000));
        let ctx = ts.local_patch(4, 4, 1, 100_000);
        // 3x3 patch, center 1.0, untouched neighbours 0.0
        assert_eq!(ctx.len(), 9);
        assert_eq!(ctx[4], 1.0);
        assert_eq!(ctx[0], 0.0);
    }

    #[test]
    fn test_local_patch_at_edge() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        ts.insert(&on(0, 0, 100_000));
        ts.insert(&off(1, 1, 50_000));
        let ctx = ts.local_patch(0, 0, 1, 100_000);
        // row-major from (-1,-1); index 4 is the centre, 8 is (1,1)
        assert_eq!(ctx.len(), 9);
        assert_eq!(ctx[4], 1.0);
        assert_eq!(ctx[0], 0.0);
        assert_relative_eq!(ctx[8], (-0.5f64).exp());
    }

    #[test]
    fn test_local_patch_radius_clamped_to_frame() {
        let mut ts = surface::<u8>(Kernel::Exponential, TAU);
        ts.insert(&on(3, 3, 100_000));
        let ctx = ts.local_patch(0, 0, u16::MAX, 100_000);
        assert_eq!(ctx.len(), 9 * 9);
        // centre of a 9x9 patch is index 40; (3,3) sits three rows and columns on
        assert_eq!(ctx[40 + 3 * 9 + 3], 1.0);
        assert_eq!(ctx.iter().filter(|&&v| v > 0.0).count(), 1);
    }

    #[test]
    fn test_snapshot_idempotent() {
        let mut ts = surface::<f32>(Kernel::Exponential, 50.0);
        ts.insert(&on(1, 0, 10));
        ts.insert(&on(2, 3, 30));
        assert_eq!(ts.snapshot(), ts.snapshot());
        assert_eq!(ts.snapshot().time(), 30);
    }
}
