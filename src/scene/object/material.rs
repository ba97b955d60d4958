use crate::math::color::Color;

/// Weights of the three contributions that make up a surface color.
/// They don't have to sum up to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Albedo {
    /// own color lit by diffuse light
    pub diffuse: f64,
    /// white specular highlights
    pub specular: f64,
    /// color seen in the mirror direction
    pub reflective: f64,
}

impl Albedo {
    pub const fn new(diffuse: f64, specular: f64, reflective: f64) -> Self {
        Self {
            diffuse,
            specular,
            reflective,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.diffuse.is_finite() && self.specular.is_finite() && self.reflective.is_finite()
    }
}

impl Default for Albedo {
    fn default() -> Self {
        Self::new(1., 0., 0.)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub specular_exponent: f64, // [0;+inf)
    pub albedo: Albedo,
}

impl Material {
    pub fn new(color: Color, specular_exponent: f64, albedo: Albedo) -> Self {
        Self {
            color,
            specular_exponent,
            albedo,
        }
    }

    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::black(),
            specular_exponent: 0.,
            albedo: Albedo::default(),
        }
    }
}

impl Material {
    pub fn ivory() -> Self {
        Self::new(Color::new(0.4, 0.4, 0.3), 50., Albedo::new(0.6, 0.3, 0.1))
    }
    pub fn red_rubber() -> Self {
        Self::new(Color::new(0.3, 0.1, 0.1), 10., Albedo::new(0.9, 0.1, 0.))
    }
    pub fn mirror() -> Self {
        Self::new(Color::white(), 1425., Albedo::new(0., 10., 0.8))
    }
}
