//! Ordered event sources feeding the representations.
//!
//! A source yields events in non-decreasing timestamp order; the
//! representations do not reorder. Only `next_event` is required, the batch
//! helpers are built on it.

use crate::error::ReadError;
use crate::event::Event;
use crate::window::BoundedBuffer;

pub trait EventSource {
    /// Next event, or `None` at the end of the stream.
    fn next_event(&mut self) -> Result<Option<Event>, ReadError>;

    /// Sensor width and height, when the source knows them.
    fn resolution(&self) -> Option<(u32, u32)> {
        None
    }

    /// Append up to `n` events to `out`; returns how many were appended.
    /// Fewer than `n` means the stream ended.
    fn next_batch(&mut self, n: usize, out: &mut Vec<Event>) -> Result<usize, ReadError> {
        out.reserve(n);
        for read in 0..n {
            match self.next_event()? {
                Some(event) => out.push(event),
                None => return Ok(read),
            }
        }
        Ok(n)
    }

    /// Push up to `n` events into a bounded window, evicting its oldest
    /// entries once full.
    fn fill_window(
        &mut self,
        n: usize,
        window: &mut BoundedBuffer<Event>,
    ) -> Result<usize, ReadError> {
        for read in 0..n {
            match self.next_event()? {
                Some(event) => {
                    window.push_back(event);
                }
                None => return Ok(read),
            }
        }
        Ok(n)
    }

    /// Append events to `out` until one arrives `span` or more after the
    /// first appended event. That boundary event is returned instead of
    /// appended, so nothing is lost between consecutive calls.
    fn next_span(&mut self, span: i64, out: &mut Vec<Event>) -> Result<Option<Event>, ReadError> {
        let mut start = out.last().map(|e| e.timestamp);
        while let Some(event) = self.next_event()? {
            let origin = *start.get_or_insert(event.timestamp);
            if event.timestamp.saturating_sub(origin) >= span {
                return Ok(Some(event));
            }
            out.push(event);
        }
        Ok(None)
    }

    /// Discard up to `n` events; returns how many were discarded.
    fn skip(&mut self, n: usize) -> Result<usize, ReadError> {
        for skipped in 0..n {
            if self.next_event()?.is_none() {
                return Ok(skipped);
            }
        }
        Ok(n)
    }
}

/// Replays events from any iterator, e.g. a recording held in memory.
#[derive(Clone, Debug)]
pub struct IterSource<I> {
    events: I,
    resolution: Option<(u32, u32)>,
}

impl<I: Iterator<Item = Event>> IterSource<I> {
    pub fn new<T: IntoIterator<IntoIter = I>>(events: T) -> Self {
        Self {
            events: events.into_iter(),
            resolution: None,
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }
}

impl<I: Iterator<Item = Event>> EventSource for IterSource<I> {
    fn next_event(&mut self) -> Result<Option<Event>, ReadError> {
        Ok(self.events.next())
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }
}
