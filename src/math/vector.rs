use std::ops;

use crate::approx_eq::ApproxEq;

/// Three component vector, used both for points and directions.
#[derive(Copy, Clone, Debug, Default)]
pub struct Vector {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0., 0., 0.)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Zero vector stays zero instead of turning into NaNs.
    pub fn normalize(&self) -> Self {
        let len = self.magnitude();
        if len == 0. {
            return Self::zero();
        }
        *self / len
    }

    pub fn dot(&self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Mirror `self` about `normal`. `normal` has to be normalized.
    pub fn reflect(&self, normal: Self) -> Self {
        *self - normal * 2. * self.dot(normal)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl ApproxEq for Vector {
    fn approx_eq_epsilon(&self, rhs: &Self, epsilon: f64) -> bool {
        self.x.approx_eq_epsilon(&rhs.x, epsilon)
            && self.y.approx_eq_epsilon(&rhs.y, epsilon)
            && self.z.approx_eq_epsilon(&rhs.z, epsilon)
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl ops::Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl ops::Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl ops::Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl ops::Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl ops::Div<f64> for Vector {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_1_SQRT_2;

    use super::*;
    use crate::assert_approx_eq_low_prec;

    #[test]
    fn add() {
        assert_approx_eq_low_prec!(
            Vector::new(3., -2., 5.) + Vector::new(-2., 3., 1.),
            Vector::new(1., 1., 6.)
        );
    }

    #[test]
    fn sub() {
        assert_approx_eq_low_prec!(
            Vector::new(3., 2., 1.) - Vector::new(5., 6., 7.),
            Vector::new(-2., -4., -6.)
        );
    }

    #[test]
    fn neg() {
        assert_approx_eq_low_prec!(-Vector::new(1., -2., 3.), Vector::new(-1., 2., -3.));
    }

    #[test]
    fn mul_f64() {
        assert_approx_eq_low_prec!(Vector::new(1., -2., 3.) * 3.5, Vector::new(3.5, -7., 10.5));
    }

    #[test]
    fn div_f64() {
        assert_approx_eq_low_prec!(Vector::new(1., -2., 4.) / 2., Vector::new(0.5, -1., 2.));
    }

    #[test]
    fn magnitude() {
        assert_approx_eq_low_prec!(Vector::new(1., 0., 0.).magnitude(), 1.);
        assert_approx_eq_low_prec!(Vector::new(0., 0., 0.).magnitude(), 0.);
        assert_approx_eq_low_prec!(Vector::new(-1., -2., 3.).magnitude(), 14_f64.sqrt());
    }

    #[test]
    fn normalize() {
        assert_approx_eq_low_prec!(Vector::new(4., 0., 0.).normalize(), Vector::new(1., 0., 0.));
        let sqrt_14 = 14_f64.sqrt();
        assert_approx_eq_low_prec!(
            Vector::new(1., -2., 3.).normalize(),
            Vector::new(1. / sqrt_14, -2. / sqrt_14, 3. / sqrt_14)
        );
        assert_approx_eq_low_prec!(Vector::new(1., 2., 3.).normalize().magnitude(), 1.);
    }

    #[test]
    fn normalize_zero_vector() {
        let normalized = Vector::zero().normalize();
        assert!(normalized.is_finite());
        assert_approx_eq_low_prec!(normalized, Vector::zero());
    }

    #[test]
    fn dot_product() {
        assert_approx_eq_low_prec!(Vector::new(1., 2., 3.).dot(Vector::new(2., 3., 4.)), 20.);
    }

    #[test]
    fn reflect_vector_approaching_at_45_deg() {
        let v = Vector::new(1., -1., 0.);
        let normal = Vector::new(0., 1., 0.);
        assert_approx_eq_low_prec!(v.reflect(normal), Vector::new(1., 1., 0.));
    }

    #[test]
    fn reflect_vector_off_slanted_surface() {
        let v = Vector::new(0., -1., 0.);
        let normal = Vector::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.);
        assert_approx_eq_low_prec!(v.reflect(normal), Vector::new(1., 0., 0.));
    }

    #[test]
    fn reflection_is_self_inverse() {
        let normals = [
            Vector::new(0., 1., 0.),
            Vector::new(1., 2., -3.).normalize(),
            Vector::new(-0.3, 0.1, 0.9).normalize(),
        ];
        let directions = [
            Vector::new(0., 0., 1.),
            Vector::new(1., -1., 0.).normalize(),
            Vector::new(-2., 5., 0.5).normalize(),
        ];

        for normal in normals {
            for direction in directions {
                let twice = direction.reflect(normal).reflect(normal);
                assert_approx_eq_low_prec!(twice, direction);
            }
        }
    }

    #[test]
    fn reflection_preserves_length() {
        let normal = Vector::new(1., 1., 1.).normalize();
        let direction = Vector::new(0.2, -0.7, 0.4).normalize();
        assert_approx_eq_low_prec!(direction.reflect(normal).magnitude(), 1.);
    }
}
