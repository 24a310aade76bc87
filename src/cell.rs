//! Numeric cell types for representation grids.
//!
//! Representations are generic over a single cell type parameter instead of
//! one concrete type per pixel depth. Integer cells saturate on conversion and
//! on counting; float cells hold raw values.

/// Pixel value stored in a representation grid.
pub trait Cell: Copy + PartialEq + PartialOrd + Default + std::fmt::Debug + Send + Sync + 'static {
    const ZERO: Self;
    /// "Infinitely far" value: `MAX` for integers, `+inf` for floats.
    const SATURATED: Self;
    /// Value a unit weight maps to: `MAX` for integers, `1.0` for floats.
    const FULL_SCALE: f64;

    /// Saturating conversion; NaN maps to zero.
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

/// Cell that can hold an event count.
pub trait Counter: Cell {
    fn saturating_inc(self) -> Self;
    fn saturating_dec(self) -> Self;
}

/// Floating point cell usable as a point-cloud coordinate.
pub trait Coordinate: Cell {}

macro_rules! impl_int_cell {
    ($($t:ty),*) => {
        $(
            impl Cell for $t {
                const ZERO: Self = 0;
                const SATURATED: Self = <$t>::MAX;
                const FULL_SCALE: f64 = <$t>::MAX as f64;

                #[inline]
                fn from_f64(value: f64) -> Self {
                    // float-to-int `as` saturates at the bounds
                    value.round() as $t
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }

            impl Counter for $t {
                #[inline]
                fn saturating_inc(self) -> Self {
                    self.saturating_add(1)
                }

                #[inline]
                fn saturating_dec(self) -> Self {
                    // counts never go below zero, even for signed cells
                    if self > 0 { self - 1 } else { 0 }
                }
            }
        )*
    };
}

macro_rules! impl_float_cell {
    ($($t:ty),*) => {
        $(
            impl Cell for $t {
                const ZERO: Self = 0.0;
                const SATURATED: Self = <$t>::INFINITY;
                const FULL_SCALE: f64 = 1.0;

                #[inline]
                fn from_f64(value: f64) -> Self {
                    if value.is_nan() { 0.0 } else { value as $t }
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }

            impl Counter for $t {
                #[inline]
                fn saturating_inc(self) -> Self {
                    self + 1.0
                }

                #[inline]
                fn saturating_dec(self) -> Self {
                    if self >= 1.0 { self - 1.0 } else { 0.0 }
                }
            }

            impl Coordinate for $t {}
        )*
    };
}

impl_int_cell!(u8, u16, u32, u64, i16, i32, i64);
impl_float_cell!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversion_saturates() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(u8::from_f64(f64::NAN), 0);
        assert_eq!(i16::from_f64(-1e9), i16::MIN);
        assert_eq!(u16::from_f64(127.6), 128);
    }

    #[test]
    fn test_full_scale() {
        assert_eq!(u8::FULL_SCALE, 255.0);
        assert_eq!(f32::FULL_SCALE, 1.0);
        assert_eq!(u8::SATURATED, 255);
        assert!(f64::SATURATED.is_infinite());
    }

    #[test]
    fn test_counter_saturates_instead_of_wrapping() {
        assert_eq!(255u8.saturating_inc(), 255);
        assert_eq!(i16::MAX.saturating_inc(), i16::MAX);
        assert_eq!(0u32.saturating_dec(), 0);
        assert_eq!(0i32.saturating_dec(), 0);
        assert_eq!(3u8.saturating_dec(), 2);
    }

    #[test]
    fn test_float_counter() {
        assert_eq!(2.0f32.saturating_inc(), 3.0);
        assert_eq!(0.0f64.saturating_dec(), 0.0);
        assert_eq!(f64::from_f64(f64::NAN), 0.0);
    }
}
