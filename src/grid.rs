//! Dense per-pixel storage shared by the grid-backed representations.

/// Row-major grid with interleaved channels.
///
/// Dimensions are fixed at construction; every mutating method works in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    channels: usize,
}

impl<T: Copy> Grid<T> {
    /// Callers validate dimensions first (see `GridConfig::validate`).
    pub(crate) fn new(width: usize, height: usize, channels: usize, fill: T) -> Self {
        Self {
            data: vec![fill; width * height * channels],
            width,
            height,
            channels,
        }
    }

    /// Offset of the first channel of pixel (x, y), or `None` when outside.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) * self.channels)
    }

    /// All channels of pixel (x, y).
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[T]> {
        let i = self.index(x, y)?;
        Some(&self.data[i..i + self.channels])
    }

    #[inline]
    pub(crate) fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [T]> {
        let i = self.index(x, y)?;
        let c = self.channels;
        Some(&mut self.data[i..i + c])
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<T> {
        if channel >= self.channels {
            return None;
        }
        self.pixel(x, y).map(|p| p[channel])
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels (not values).
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Same dimensions and channel count.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_row_major_interleaved() {
        let mut g = Grid::new(4, 3, 2, 0u8);
        g.pixel_mut(1, 2).unwrap()[1] = 7;
        // (2 * 4 + 1) * 2 + 1
        assert_eq!(g.as_slice()[19], 7);
        assert_eq!(g.get(1, 2, 1), Some(7));
        assert_eq!(g.get(1, 2, 0), Some(0));
    }

    #[test]
    fn test_out_of_bounds_is_none() {
        let g = Grid::new(4, 4, 1, 0u8);
        assert!(g.index(4, 0).is_none());
        assert!(g.index(0, 4).is_none());
        assert!(g.get(0, 0, 1).is_none());
    }

    #[test]
    fn test_fill_and_shape() {
        let mut g = Grid::new(2, 2, 3, 1.0f32);
        g.fill(0.5);
        assert!(g.as_slice().iter().all(|&v| v == 0.5));
        assert_eq!(g.area(), 4);
        assert_eq!(g.as_slice().len(), 12);
        assert!(g.same_shape(&Grid::new(2, 2, 3, 0u8)));
        assert!(!g.same_shape(&Grid::new(2, 2, 1, 0u8)));
    }
}
