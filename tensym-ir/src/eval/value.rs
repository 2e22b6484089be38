//! The numeric values produced by evaluation.

use rug::{ops::Pow, Float, Integer};
use std::fmt::{Display, Formatter};

use tensym_error::EvalError;

use crate::primitive::{float, int};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A number produced by evaluating an expression.
///
/// Integer arithmetic is exact; as soon as a float enters an operation, the result is promoted
/// to a [`Float`]. Division always yields a float, even for two integer operands, so that
/// evaluating a quotient never silently truncates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// An exact integer value.
    Integer(Integer),

    /// A floating-point value.
    Float(Float),
}

impl Value {
    /// Returns true if this value is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => n.is_zero(),
            Value::Float(f) => f.is_zero(),
        }
    }

    /// Returns true if this value is one.
    pub fn is_one(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 1,
            Value::Float(f) => *f == 1,
        }
    }

    /// Converts this value to a [`Float`], exactly for integers that fit the working precision.
    pub fn to_float(&self) -> Float {
        match self {
            Value::Integer(n) => float(n),
            Value::Float(f) => f.clone(),
        }
    }

    /// Adds two values. Two integers stay exact; any float operand promotes the result.
    pub fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(a + b),
            (a, b) => Value::Float(a.to_float() + b.to_float()),
        }
    }

    /// Multiplies two values. Two integers stay exact; any float operand promotes the result.
    pub fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(a * b),
            (a, b) => Value::Float(a.to_float() * b.to_float()),
        }
    }

    /// Divides two values, always yielding a float. Fails if the divisor is zero.
    pub fn div(self, rhs: Self) -> Result<Self, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Value::Float(self.to_float() / rhs.to_float()))
    }

    /// Raises this value to the given power. An integer base with a non-negative integer
    /// exponent stays exact; everything else goes through floats. A zero base with a negative
    /// exponent is a division by zero.
    pub fn pow(self, rhs: Self) -> Result<Self, EvalError> {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => {
                if b < 0 && a.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                match (b >= 0, b.to_u32()) {
                    (true, Some(exponent)) => Ok(Value::Integer(a.pow(exponent))),
                    _ => Ok(Value::Float(float(&a).pow(float(&b)))),
                }
            },
            (a, b) => {
                if b.to_float() < 0 && a.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(a.to_float().pow(b.to_float())))
            },
        }
    }

    /// The absolute value.
    pub fn abs(self) -> Self {
        match self {
            Value::Integer(n) => Value::Integer(n.abs()),
            Value::Float(f) => Value::Float(f.abs()),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(int(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(int(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(float(n))
    }
}

impl From<Integer> for Value {
    fn from(n: Integer) -> Self {
        Value::Integer(n)
    }
}

impl From<Float> for Value {
    fn from(f: Float) -> Self {
        Value::Float(f)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x.to_f64()),
        }
    }
}
