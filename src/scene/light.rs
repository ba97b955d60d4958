use std::ops;

use crate::math::vector::Vector;

#[derive(PartialEq, Debug, Clone)]
pub struct PointLightSource {
    position: Vector,
    intensity: f64,
}

impl Default for PointLightSource {
    fn default() -> Self {
        Self {
            position: Vector::zero(),
            intensity: 1.,
        }
    }
}

/// Scalar light intensities gathered at a surface point.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct Illumination {
    pub diffuse: f64,
    pub specular: f64,
}

impl ops::Add for Illumination {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            diffuse: self.diffuse + rhs.diffuse,
            specular: self.specular + rhs.specular,
        }
    }
}

impl PointLightSource {
    pub fn new(position: Vector, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    /// Phong diffuse and specular terms of this light at a surface point.
    ///
    /// `light_v` points from the surface towards the light, `ray_v` is the direction of the
    /// incoming ray. The highlight is measured against `ray_v` itself, not its reverse.
    pub fn illumination(
        &self,
        light_v: Vector,
        normal_v: Vector,
        ray_v: Vector,
        specular_exponent: f64,
    ) -> Illumination {
        let diffuse = self.intensity * light_v.dot(normal_v).max(0.);

        let reflect_dot_ray = light_v.reflect(normal_v).dot(ray_v).max(0.);
        let specular = self.intensity * reflect_dot_ray.powf(specular_exponent);

        Illumination { diffuse, specular }
    }
}
