//! Fixed-capacity temporal buffers.
//!
//! [`BoundedBuffer`] covers ring buffer, bounded deque and bounded queue use:
//! pushing into a full buffer evicts from the opposite end and hands the
//! evicted element back. [`EventWindow`] is the event-specialised window the
//! sliding histogram is built on.

use std::collections::{vec_deque, VecDeque};

use crate::config::check_capacity;
use crate::error::Result;
use crate::event::{Event, Timestamped};

/// Ordered buffer that never holds more than `capacity` elements.
///
/// Storage is reserved up front; pushes never reallocate.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append at the back, evicting and returning the front element when full.
    pub fn push_back(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Prepend at the front, evicting and returning the back element when full.
    pub fn push_front(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.items.pop_back()
        } else {
            None
        };
        self.items.push_front(item);
        evicted
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    /// Oldest element in queue order.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Contents front to back as two contiguous slices.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        self.items.as_slices()
    }

    /// Remove every element, front to back.
    pub fn drain(&mut self) -> vec_deque::Drain<'_, T> {
        self.items.drain(..)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Timestamped> BoundedBuffer<T> {
    /// Time between the front and back elements; zero when fewer than two.
    pub fn duration(&self) -> i64 {
        match (self.items.front(), self.items.back()) {
            (Some(first), Some(last)) => last.timestamp().saturating_sub(first.timestamp()),
            _ => 0,
        }
    }

    /// Events per second over [`duration`](Self::duration), assuming
    /// microsecond timestamps. Zero when the duration is not positive.
    pub fn rate(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0 {
            return 0.0;
        }
        self.items.len() as f64 * 1e6 / duration as f64
    }

    /// Midpoint between the front and back timestamps.
    pub fn mid_time(&self) -> Option<i64> {
        let first = self.items.front()?.timestamp();
        Some(first.saturating_add(self.duration() / 2))
    }

    /// Mean timestamp of the buffered elements.
    pub fn mean_time(&self) -> Option<f64> {
        if self.items.is_empty() {
            return None;
        }
        let sum: f64 = self.items.iter().map(|e| e.timestamp() as f64).sum();
        Some(sum / self.items.len() as f64)
    }
}

impl<'a, T> IntoIterator for &'a BoundedBuffer<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Extending past capacity keeps the newest elements.
impl<T> Extend<T> for BoundedBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

/// Sliding window over the last `capacity` events.
///
/// [`slide`](Self::slide) admits one event and reports the one that fell out,
/// so a consumer can add the new contribution and retract the evicted one in a
/// single step.
#[derive(Clone, Debug, PartialEq)]
pub struct EventWindow {
    events: BoundedBuffer<Event>,
}

impl EventWindow {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            events: BoundedBuffer::new(capacity)?,
        })
    }

    /// Admit `event`, returning the evicted oldest event once the window is full.
    #[inline]
    pub fn slide(&mut self, event: Event) -> Option<Event> {
        self.events.push_back(event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.events.is_full()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Time spanned by the window.
    pub fn duration(&self) -> i64 {
        self.events.duration()
    }

    pub fn rate(&self) -> f64 {
        self.events.rate()
    }

    pub fn as_buffer(&self) -> &BoundedBuffer<Event> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::event::Polarity;
    use approx::assert_relative_eq;

    fn ev(t: i64) -> Event {
        Event::new(0, 0, t, Polarity::Positive)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            BoundedBuffer::<u8>::new(0),
            Err(ConfigurationError::InvalidCapacity { capacity: 0, .. })
        ));
        assert!(EventWindow::new(0).is_err());
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        assert!(BoundedBuffer::<Event>::new(usize::MAX).is_err());
        assert!(EventWindow::new(crate::MAX_CAPACITY + 1).is_err());
    }

    #[test]
    fn test_push_back_evicts_oldest() {
        let mut buf = BoundedBuffer::new(3).unwrap();
        assert_eq!(buf.push_back(1), None);
        assert_eq!(buf.push_back(2), None);
        assert_eq!(buf.push_back(3), None);
        assert!(buf.is_full());
        assert_eq!(buf.push_back(4), Some(1));
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_push_front_evicts_back() {
        let mut buf = BoundedBuffer::new(2).unwrap();
        buf.push_back('a');
        buf.push_back('b');
        assert_eq!(buf.push_front('z'), Some('b'));
        assert_eq!(buf.front(), Some(&'z'));
        assert_eq!(buf.back(), Some(&'a'));
    }

    #[test]
    fn test_deque_pops() {
        let mut buf = BoundedBuffer::new(4).unwrap();
        buf.extend([1, 2, 3]);
        assert_eq!(buf.pop_front(), Some(1));
        assert_eq!(buf.pop_back(), Some(3));
        assert_eq!(buf.get(0), Some(&2));
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.pop_front(), None);
    }

    #[test]
    fn test_extend_keeps_newest() {
        let mut buf = BoundedBuffer::new(2).unwrap();
        buf.extend(0..10);
        assert_eq!((&buf).into_iter().copied().collect::<Vec<_>>(), vec![8, 9]);
        assert_eq!(buf.drain().collect::<Vec<_>>(), vec![8, 9]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_timestamp_statistics() {
        let mut buf = BoundedBuffer::new(8).unwrap();
        assert_eq!(buf.duration(), 0);
        assert_eq!(buf.rate(), 0.0);
        assert_eq!(buf.mid_time(), None);
        assert_eq!(buf.mean_time(), None);

        buf.extend([ev(1_000), ev(1_500), ev(3_000), ev(5_000)]);
        assert_eq!(buf.duration(), 4_000);
        assert_eq!(buf.mid_time(), Some(3_000));
        assert_relative_eq!(buf.mean_time().unwrap(), 2_625.0);
        // 4 events over 4 ms
        assert_relative_eq!(buf.rate(), 1_000.0);
    }

    #[test]
    fn test_event_window_slide() {
        let mut window = EventWindow::new(2).unwrap();
        assert_eq!(window.slide(ev(1)), None);
        assert_eq!(window.slide(ev(2)), None);
        assert_eq!(window.slide(ev(3)), Some(ev(1)));
        assert_eq!(window.len(), 2);
        assert_eq!(window.duration(), 1);
        assert_eq!(
            window.iter().map(|e| e.timestamp).collect::<Vec<_>>(),
            vec![2, 3]
        );
        window.clear();
        assert!(window.is_empty());
    }
}
