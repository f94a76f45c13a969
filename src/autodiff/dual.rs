//! Dual numbers for forward-mode automatic differentiation.
//!
//! A dual number has the form a + b*ε where ε² = 0. Carrying the pair
//! (value, derivative) through ordinary arithmetic yields exact derivatives
//! with respect to whichever inputs were seeded with derivative 1.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual {
    /// The function value (real part).
    pub value: f64,
    /// The derivative value (dual part).
    pub derivative: f64,
}

impl Dual {
    pub fn new(value: f64, derivative: f64) -> Self {
        Self { value, derivative }
    }

    /// A constant: derivative 0.
    pub fn constant(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// The seeded variable of the current pass: derivative 1.
    pub fn variable(value: f64) -> Self {
        Self::new(value, 1.0)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    /// Apply a unary function given its pointwise derivative.
    pub fn apply_unary<F, D>(self, func: F, deriv: D) -> Dual
    where
        F: FnOnce(f64) -> f64,
        D: FnOnce(f64) -> f64,
    {
        Dual::new(func(self.value), deriv(self.value) * self.derivative)
    }

    /// Integer power self^n.
    pub fn powi(self, n: i32) -> Dual {
        match n {
            0 => Dual::constant(1.0),
            1 => self,
            _ => Dual::new(
                self.value.powi(n),
                f64::from(n) * self.value.powi(n - 1) * self.derivative,
            ),
        }
    }

    /// Natural exponential e^self.
    pub fn exp(self) -> Dual {
        let exp_val = self.value.exp();
        Dual::new(exp_val, exp_val * self.derivative)
    }

    /// Hyperbolic tangent.
    pub fn tanh(self) -> Dual {
        let t = self.value.tanh();
        Dual::new(t, (1.0 - t * t) * self.derivative)
    }

    /// ReLU: max(0, self), subgradient 0 at the kink.
    pub fn relu(self) -> Dual {
        if self.value > 0.0 {
            self
        } else {
            Dual::constant(0.0)
        }
    }
}

impl Add for Dual {
    type Output = Dual;

    fn add(self, rhs: Dual) -> Dual {
        Dual::new(self.value + rhs.value, self.derivative + rhs.derivative)
    }
}

impl Sub for Dual {
    type Output = Dual;

    fn sub(self, rhs: Dual) -> Dual {
        Dual::new(self.value - rhs.value, self.derivative - rhs.derivative)
    }
}

impl Mul for Dual {
    type Output = Dual;

    fn mul(self, rhs: Dual) -> Dual {
        Dual::new(
            self.value * rhs.value,
            self.derivative * rhs.value + self.value * rhs.derivative,
        )
    }
}

impl Div for Dual {
    type Output = Dual;

    fn div(self, rhs: Dual) -> Dual {
        Dual::new(
            self.value / rhs.value,
            (self.derivative * rhs.value - self.value * rhs.derivative)
                / (rhs.value * rhs.value),
        )
    }
}

impl Neg for Dual {
    type Output = Dual;

    fn neg(self) -> Dual {
        Dual::new(-self.value, -self.derivative)
    }
}

impl From<f64> for Dual {
    fn from(value: f64) -> Self {
        Dual::constant(value)
    }
}

impl fmt::Display for Dual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}ε", self.value, self.derivative)
    }
}
