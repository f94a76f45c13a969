//! Single-qubit gate matrices.
//!
//! Rotation gates follow the convention R(θ) = exp(-iθG/2) with generator
//! eigenvalues ±1, which is what makes the π/2 parameter-shift rule exact.

use super::complex::Complex;

/// 2x2 unitary acting on one qubit, row-major.
pub type GateMatrix = [[Complex; 2]; 2];

/// Rotation about the X axis.
pub fn rx(theta: f64) -> GateMatrix {
    let cos_half = (theta / 2.0).cos();
    let sin_half = (theta / 2.0).sin();
    [
        [Complex::new(cos_half, 0.0), Complex::new(0.0, -sin_half)],
        [Complex::new(0.0, -sin_half), Complex::new(cos_half, 0.0)],
    ]
}

/// Rotation about the Y axis. Real-valued, the workhorse of angle encoding.
pub fn ry(theta: f64) -> GateMatrix {
    let cos_half = (theta / 2.0).cos();
    let sin_half = (theta / 2.0).sin();
    [
        [Complex::new(cos_half, 0.0), Complex::new(-sin_half, 0.0)],
        [Complex::new(sin_half, 0.0), Complex::new(cos_half, 0.0)],
    ]
}

/// Rotation about the Z axis.
pub fn rz(theta: f64) -> GateMatrix {
    let cos_half = (theta / 2.0).cos();
    let sin_half = (theta / 2.0).sin();
    [
        [Complex::new(cos_half, -sin_half), Complex::zero()],
        [Complex::zero(), Complex::new(cos_half, sin_half)],
    ]
}

/// Hadamard gate.
pub fn hadamard() -> GateMatrix {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    [
        [Complex::from_real(h), Complex::from_real(h)],
        [Complex::from_real(h), Complex::from_real(-h)],
    ]
}
