use tracing::debug;

use crate::config::GridConfig;
use crate::error::{ConfigurationError, Result};
use crate::event::Event;
use crate::grid::Grid;

/// Precomputed per-pixel coordinate remap, consulted before insertion.
///
/// Each source pixel stores a sub-pixel destination. [`apply`](Self::apply)
/// rounds it to the nearest pixel and drops events whose destination leaves
/// the frame. Building the table from lens intrinsics is left to the caller
/// through [`from_fn`](Self::from_fn).
#[derive(Clone, Debug, PartialEq)]
pub struct UndistortMap {
    /// Two channels per pixel: destination x, destination y.
    table: Grid<f64>,
}

impl UndistortMap {
    /// Maps every pixel to itself.
    pub fn identity(width: u32, height: u32) -> Result<Self> {
        Self::from_fn(width, height, |x, y| (x as f64, y as f64))
    }

    /// Builds the table by evaluating `model` at every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut model: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> (f64, f64),
    {
        let mut table = Self::blank(width, height)?;
        for y in 0..height {
            for x in 0..width {
                if let Some(cell) = table.pixel_mut(x as usize, y as usize) {
                    let (dx, dy) = model(x, y);
                    cell[0] = dx;
                    cell[1] = dy;
                }
            }
        }
        debug!(width, height, "undistortion map built");
        Ok(Self { table })
    }

    /// Row-major destinations, one per pixel.
    pub fn from_table(width: u32, height: u32, destinations: &[(f64, f64)]) -> Result<Self> {
        let mut table = Self::blank(width, height)?;
        let expected = table.area();
        if destinations.len() != expected {
            return Err(ConfigurationError::InvalidRemapTable {
                expected,
                actual: destinations.len(),
            });
        }
        for (cell, &(dx, dy)) in table.as_mut_slice().chunks_exact_mut(2).zip(destinations) {
            cell[0] = dx;
            cell[1] = dy;
        }
        Ok(Self { table })
    }

    fn blank(width: u32, height: u32) -> Result<Grid<f64>> {
        GridConfig::new(width, height).validate()?;
        Ok(Grid::new(width as usize, height as usize, 2, f64::NAN))
    }

    pub fn width(&self) -> usize {
        self.table.width()
    }

    pub fn height(&self) -> usize {
        self.table.height()
    }

    /// Sub-pixel destination of a source pixel.
    pub fn destination(&self, x: u16, y: u16) -> Option<(f64, f64)> {
        let cell = self.table.pixel(x as usize, y as usize)?;
        Some((cell[0], cell[1]))
    }

    /// The event moved to its rounded destination, or `None` if the source
    /// or destination pixel is outside the frame.
    pub fn apply(&self, event: &Event) -> Option<Event> {
        let (dx, dy) = self.destination(event.x, event.y)?;
        let (x, y) = (dx.round(), dy.round());
        if !(x >= 0.0 && y >= 0.0 && x < self.width() as f64 && y < self.height() as f64) {
            return None;
        }
        Some(Event {
            x: x as u16,
            y: y as u16,
            ..*event
        })
    }
}
