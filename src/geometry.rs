//! Spatio-temporal extents and regions.
//!
//! `Size3` and `Rect3` describe boxes over (x, y, t); `Circ` is a disc in the
//! pixel plane. All three are generic over the coordinate type and are used to
//! clip or mask event streams before they reach a representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::ops::{Add, Mul, Sub};

use crate::error::{ConfigurationError, Result};
use crate::event::Event;

/// Numeric coordinate type usable in geometric primitives.
pub trait Scalar:
    Copy
    + PartialOrd
    + Default
    + std::fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// Whether `value` lies in `[start, start + extent)`, compared without
    /// narrowing `value` or overflowing the far bound.
    fn span_contains(start: Self, extent: Self, value: i64) -> bool;
    /// `far - near`, or `None` when it does not fit in `Self`.
    fn extent_between(near: Self, far: Self) -> Option<Self>;
    fn to_f64(self) -> f64;
}

macro_rules! impl_int_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn span_contains(start: Self, extent: Self, value: i64) -> bool {
                    let offset = value as i128 - start as i128;
                    offset >= 0 && offset < extent as i128
                }
                #[inline]
                fn extent_between(near: Self, far: Self) -> Option<Self> {
                    far.checked_sub(near)
                }
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! impl_float_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline]
                fn span_contains(start: Self, extent: Self, value: i64) -> bool {
                    let offset = value as f64 - start as f64;
                    offset >= 0.0 && offset < extent as f64
                }
                #[inline]
                fn extent_between(near: Self, far: Self) -> Option<Self> {
                    Some(far - near)
                }
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_int_scalar!(i32, i64, u32);
impl_float_scalar!(f32, f64);

fn non_negative<T: Scalar>(name: &str, value: T) -> Result<()> {
    // `!(v >= 0)` also rejects NaN
    if !(value >= T::default()) {
        return Err(ConfigurationError::InvalidExtent(format!(
            "{} must be non-negative, got {:?}",
            name, value
        )));
    }
    Ok(())
}

/// Width, height and temporal length of a box.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size3<T> {
    pub width: T,
    pub height: T,
    pub length: T,
}

impl<T: Scalar> Size3<T> {
    pub fn new(width: T, height: T, length: T) -> Result<Self> {
        non_negative("width", width)?;
        non_negative("height", height)?;
        non_negative("length", length)?;
        Ok(Self {
            width,
            height,
            length,
        })
    }

    /// True when every extent is zero.
    pub fn is_empty(&self) -> bool {
        let zero = T::default();
        self.width == zero && self.height == zero && self.length == zero
    }

    pub fn volume(&self) -> T {
        self.width * self.height * self.length
    }
}

/// Axis-aligned box over (x, y, t).
///
/// The origin is inclusive and the far bound exclusive on every axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect3<T> {
    pub x: T,
    pub y: T,
    pub t: T,
    pub width: T,
    pub height: T,
    pub length: T,
}

impl<T: Scalar> Rect3<T> {
    pub fn new(x: T, y: T, t: T, width: T, height: T, length: T) -> Result<Self> {
        let size = Size3::new(width, height, length)?;
        Ok(Self::from_origin(x, y, t, size))
    }

    pub fn from_origin(x: T, y: T, t: T, size: Size3<T>) -> Self {
        Self {
            x,
            y,
            t,
            width: size.width,
            height: size.height,
            length: size.length,
        }
    }

    /// Box spanning `near` (inclusive) to `far` (exclusive).
    ///
    /// Fails when `far` lies before `near` on any axis.
    pub fn from_corners(near: (T, T, T), far: (T, T, T)) -> Result<Self> {
        let extent = |name: &str, a: T, b: T| {
            T::extent_between(a, b).ok_or_else(|| {
                ConfigurationError::InvalidExtent(format!(
                    "{} from {:?} to {:?} is out of range",
                    name, a, b
                ))
            })
        };
        Self::new(
            near.0,
            near.1,
            near.2,
            extent("width", near.0, far.0)?,
            extent("height", near.1, far.1)?,
            extent("length", near.2, far.2)?,
        )
    }

    pub fn contains(&self, event: &Event) -> bool {
        T::span_contains(self.x, self.width, event.x as i64)
            && T::span_contains(self.y, self.height, event.y as i64)
            && T::span_contains(self.t, self.length, event.timestamp)
    }

    /// True when any extent is zero, so no event can be inside.
    pub fn is_empty(&self) -> bool {
        let zero = T::default();
        self.width == zero || self.height == zero || self.length == zero
    }

    pub fn size(&self) -> Size3<T> {
        Size3 {
            width: self.width,
            height: self.height,
            length: self.length,
        }
    }

    pub fn volume(&self) -> T {
        self.size().volume()
    }
}

/// Disc in the pixel plane; the boundary is inclusive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Circ<T> {
    pub cx: T,
    pub cy: T,
    pub radius: T,
}

impl<T: Scalar> Circ<T> {
    pub fn new(cx: T, cy: T, radius: T) -> Result<Self> {
        non_negative("radius", radius)?;
        Ok(Self { cx, cy, radius })
    }

    pub fn contains(&self, event: &Event) -> bool {
        let dx = self.cx.to_f64() - event.x as f64;
        let dy = self.cy.to_f64() - event.y as f64;
        let r = self.radius.to_f64();
        dx * dx + dy * dy <= r * r
    }

    pub fn is_empty(&self) -> bool {
        self.radius == T::default()
    }

    pub fn area(&self) -> f64 {
        let r = self.radius.to_f64();
        std::f64::consts::PI * r * r
    }
}
