use std::ops::Range;

use tracing::{debug, trace};

use crate::cell::Counter;
use crate::config::HistogramConfig;
use crate::error::Result;
use crate::event::Event;
use crate::grid::Grid;
use crate::polarity::PolarityMode;
use crate::representation::{InsertStats, Representation};
use crate::window::EventWindow;

/// Per-pixel event counts.
///
/// Each accepted event increments its cell by one. In split mode the count
/// goes to the event's polarity channel (ON = 0, OFF = 1); otherwise every
/// channel of the pixel is incremented. Counts saturate at the cell type's
/// maximum and never wrap.
///
/// With a window configured only the last `n` integrated events are counted:
/// admitting an event past capacity retracts the evicted event's count in the
/// same `insert` call, so a snapshot never sees one change without the other.
/// Exact in-window counts are kept separately, so a saturated cell stays at
/// the maximum for as long as the window holds more events than it can show.
#[derive(Clone, Debug)]
pub struct EventHistogram<T: Counter> {
    counts: Grid<T>,
    config: HistogramConfig,
    window: Option<Sliding>,
    stats: InsertStats,
}

/// Sliding-window state: the admitted events and their exact counts.
#[derive(Clone, Debug)]
struct Sliding {
    events: EventWindow,
    exact: Grid<u64>,
}

impl<T: Counter> EventHistogram<T> {
    pub fn new(config: HistogramConfig) -> Result<Self> {
        config.validate()?;
        let grid = config.grid;
        let (width, height, channels) = (
            grid.width_usize(),
            grid.height_usize(),
            grid.channels.width(),
        );
        let window = match config.window {
            Some(capacity) => Some(Sliding {
                events: EventWindow::new(capacity)?,
                exact: Grid::new(width, height, channels, 0),
            }),
            None => None,
        };
        debug!(
            width = grid.width,
            height = grid.height,
            channels = ?grid.channels,
            polarity = ?grid.polarity,
            window = ?config.window,
            "event histogram configured"
        );
        Ok(Self {
            counts: Grid::new(width, height, channels, T::ZERO),
            config,
            window,
            stats: InsertStats::default(),
        })
    }

    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Count of one channel at a pixel.
    pub fn count_at(&self, x: usize, y: usize, channel: usize) -> Option<T> {
        self.counts.get(x, y, channel)
    }

    /// Largest count in the grid.
    pub fn max_count(&self) -> T {
        self.counts
            .as_slice()
            .iter()
            .copied()
            .fold(T::ZERO, |max, v| if v > max { v } else { max })
    }

    /// Events currently inside the sliding window; 0 without a window.
    pub fn window_len(&self) -> usize {
        self.window.as_ref().map_or(0, |w| w.events.len())
    }

    pub fn window(&self) -> Option<&EventWindow> {
        self.window.as_ref().map(|w| &w.events)
    }

    fn increment(&mut self, event: &Event) {
        let channels = contributed(self.config.grid.polarity, self.counts.channels(), event);
        if let Some(pixel) = self.counts.pixel_mut(event.x as usize, event.y as usize) {
            for cell in &mut pixel[channels] {
                *cell = cell.saturating_inc();
            }
        }
    }

    /// Admit `event` into the window and retract the evicted one, writing the
    /// exact counts clamped to the cell type.
    fn slide(&mut self, event: &Event) {
        let mode = self.config.grid.polarity;
        let width = self.counts.channels();
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let evicted = window.events.slide(*event);
        let changes = std::iter::once((event, true)).chain(evicted.as_ref().map(|e| (e, false)));
        for (changed, admitted) in changes {
            let channels = contributed(mode, width, changed);
            let (x, y) = (changed.x as usize, changed.y as usize);
            let (Some(exact), Some(pixel)) =
                (window.exact.pixel_mut(x, y), self.counts.pixel_mut(x, y))
            else {
                continue;
            };
            for c in channels {
                exact[c] = if admitted {
                    exact[c].saturating_add(1)
                } else {
                    exact[c].saturating_sub(1)
                };
                pixel[c] = T::from_f64(exact[c] as f64);
            }
        }
    }
}

/// Channels of a pixel an event contributes to.
fn contributed(mode: PolarityMode, channels: usize, event: &Event) -> Range<usize> {
    match mode {
        PolarityMode::Split => {
            let c = event.polarity.index();
            c..c + 1
        }
        _ => 0..channels,
    }
}

impl<T: Counter> Representation for EventHistogram<T> {
    type Snapshot<'a> = &'a Grid<T> where Self: 'a;

    fn insert(&mut self, event: &Event) -> bool {
        if !self.config.grid.polarity.accepts(event.polarity) {
            return false;
        }
        if self
            .counts
            .index(event.x as usize, event.y as usize)
            .is_none()
        {
            return false;
        }
        if self.window.is_some() {
            self.slide(event);
        } else {
            self.increment(event);
        }
        self.stats.record(event.timestamp);
        true
    }

    /// Zero all counts and empty the window.
    fn reset(&mut self) {
        self.counts.fill(T::ZERO);
        if let Some(window) = self.window.as_mut() {
            window.events.clear();
            window.exact.fill(0);
        }
        self.stats.clear();
        trace!("event histogram reset");
    }

    /// The count grid itself; already materialized.
    fn snapshot(&self) -> &Grid<T> {
        &self.counts
    }

    fn stats(&self) -> &InsertStats {
        &self.stats
    }

    fn width(&self) -> usize {
        self.counts.width()
    }

    fn height(&self) -> usize {
        self.counts.height()
    }
}
