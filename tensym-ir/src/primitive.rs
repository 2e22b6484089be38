//! Functions to construct [`Integer`]s and [`Float`]s with a consistent precision.

use rug::{Assign, Float, Integer};

/// The number of bits of precision to use for floating-point values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Float`] with the given value and [`PRECISION`] bits of precision.
pub fn float<T>(n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(PRECISION, n)
}
