use std::ops;

use crate::approx_eq::ApproxEq;

/// Linear RGB color. Channels are unbounded until the image is written.
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
    pub const fn black() -> Self {
        Self::new(0., 0., 0.)
    }
    pub const fn white() -> Self {
        Self::new(1., 1., 1.)
    }
    pub const fn red() -> Self {
        Self::new(1., 0., 0.)
    }
    pub const fn green() -> Self {
        Self::new(0., 1., 0.)
    }
    pub const fn blue() -> Self {
        Self::new(0., 0., 1.)
    }
    /// Color of rays that leave the scene.
    pub const fn background() -> Self {
        Self::new(0.2, 0.7, 0.8)
    }
    pub fn r(&self) -> f64 {
        self.r
    }
    pub fn g(&self) -> f64 {
        self.g
    }
    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    // ties go to even, so 0.7 lands on 178 and not 179
    fn scale_val_to_u8(v: f64) -> u8 {
        let v = v.clamp(0., 1.);
        (v * 255.).round_ties_even() as u8
    }

    pub fn as_scaled_values(&self) -> [u8; 3] {
        [
            Self::scale_val_to_u8(self.r),
            Self::scale_val_to_u8(self.g),
            Self::scale_val_to_u8(self.b),
        ]
    }
}

impl ApproxEq for Color {
    fn approx_eq_epsilon(&self, rhs: &Self, epsilon: f64) -> bool {
        self.r.approx_eq_epsilon(&rhs.r, epsilon)
            && self.g.approx_eq_epsilon(&rhs.g, epsilon)
            && self.b.approx_eq_epsilon(&rhs.b, epsilon)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl ops::Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Color {
            r: self.r + rhs.r,
            g: self.g + rhs.g,
            b: self.b + rhs.b,
        }
    }
}

impl ops::Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Color {
            r: self.r * rhs.r,
            g: self.g * rhs.g,
            b: self.b * rhs.b,
        }
    }
}

impl ops::Mul<f64> for Color {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Color {
            r: self.r * rhs,
            g: self.g * rhs,
            b: self.b * rhs,
        }
    }
}
