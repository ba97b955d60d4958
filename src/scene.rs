pub mod camera;
pub mod light;

pub mod object {
    pub mod material;
    pub mod sphere;
}

pub mod io {
    pub mod interactive;
    pub mod yaml;
}

use std::fmt::Display;

use derive_builder::Builder;
use light::PointLightSource;
use object::{material::Material, sphere::Sphere};

use crate::{
    math::vector::Vector,
    render::{intersection::Hit, ray::Ray},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    InvalidRadius { sphere: usize, radius: f64 },
    InvalidSpecularExponent { sphere: usize, exponent: f64 },
    InvalidMaterial { sphere: usize },
    InvalidSphereCenter { sphere: usize },
    InvalidLightIntensity { light: usize, intensity: f64 },
    InvalidLightPosition { light: usize },
    InvalidFarPlane(f64),
    InvalidImageSize { width: usize, height: usize },
    InvalidFieldOfView(f64),
    Builder(String),
}

impl Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRadius { sphere, radius } => {
                write!(f, "sphere #{sphere} has invalid radius {radius}, it must be positive")
            }
            Self::InvalidSpecularExponent { sphere, exponent } => write!(
                f,
                "sphere #{sphere} has invalid specular exponent {exponent}, it can't be negative"
            ),
            Self::InvalidMaterial { sphere } => {
                write!(f, "material of sphere #{sphere} has non-finite values")
            }
            Self::InvalidSphereCenter { sphere } => {
                write!(f, "center of sphere #{sphere} has non-finite coordinates")
            }
            Self::InvalidLightIntensity { light, intensity } => write!(
                f,
                "light #{light} has invalid intensity {intensity}, it can't be negative"
            ),
            Self::InvalidLightPosition { light } => {
                write!(f, "position of light #{light} has non-finite coordinates")
            }
            Self::InvalidFarPlane(far_plane) => {
                write!(f, "far plane {far_plane} has to be positive")
            }
            Self::InvalidImageSize { width, height } => {
                write!(f, "image size {width}x{height} is either empty or too large")
            }
            Self::InvalidFieldOfView(fov) => write!(
                f,
                "field of view {fov} rad is invalid, it has to be in range (0; pi)"
            ),
            Self::Builder(msg) => write!(f, "failed to build scene: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Spheres and lights that make up the rendered world.
///
/// Built once through [`SceneBuilder`], which validates the entities, and read-only
/// afterwards.
#[derive(PartialEq, Debug, Clone, Builder)]
#[builder(default, build_fn(private, name = "build_unvalidated"))]
pub struct Scene {
    spheres: Vec<Sphere>,
    light_sources: Vec<PointLightSource>,
    /// Hits further away than this are treated as misses
    #[builder(default = "Scene::DEFAULT_FAR_PLANE")]
    far_plane: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

impl SceneBuilder {
    pub fn add_sphere(&mut self, sphere: Sphere) -> &mut Self {
        self.spheres.get_or_insert_with(Vec::new).push(sphere);
        self
    }

    pub fn add_light_source(&mut self, light_source: PointLightSource) -> &mut Self {
        self.light_sources
            .get_or_insert_with(Vec::new)
            .push(light_source);
        self
    }

    pub fn build(&self) -> Result<Scene, SceneError> {
        let scene = self
            .build_unvalidated()
            .map_err(|e| SceneError::Builder(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }
}

impl Scene {
    pub const DEFAULT_FAR_PLANE: f64 = 1000.;

    pub fn empty() -> Self {
        Self {
            spheres: Vec::new(),
            light_sources: Vec::new(),
            far_plane: Self::DEFAULT_FAR_PLANE,
        }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn light_sources(&self) -> &[PointLightSource] {
        &self.light_sources
    }

    pub fn far_plane(&self) -> f64 {
        self.far_plane
    }

    fn validate(&self) -> Result<(), SceneError> {
        if !(self.far_plane > 0.) {
            return Err(SceneError::InvalidFarPlane(self.far_plane));
        }
        for (id, sphere) in self.spheres.iter().enumerate() {
            let sphere_no = id + 1;
            if !sphere.center().is_finite() {
                return Err(SceneError::InvalidSphereCenter { sphere: sphere_no });
            }
            if !(sphere.radius() > 0. && sphere.radius().is_finite()) {
                return Err(SceneError::InvalidRadius {
                    sphere: sphere_no,
                    radius: sphere.radius(),
                });
            }
            let material = sphere.material();
            if !(material.specular_exponent >= 0.) {
                return Err(SceneError::InvalidSpecularExponent {
                    sphere: sphere_no,
                    exponent: material.specular_exponent,
                });
            }
            if !material.color.is_finite()
                || !material.albedo.is_finite()
                || !material.specular_exponent.is_finite()
            {
                return Err(SceneError::InvalidMaterial { sphere: sphere_no });
            }
        }
        for (id, light) in self.light_sources.iter().enumerate() {
            if !light.position().is_finite() {
                return Err(SceneError::InvalidLightPosition { light: id + 1 });
            }
            if !(light.intensity() >= 0. && light.intensity().is_finite()) {
                return Err(SceneError::InvalidLightIntensity {
                    light: id + 1,
                    intensity: light.intensity(),
                });
            }
        }
        Ok(())
    }

    /// Nearest hit of the ray across all spheres.
    ///
    /// Spheres are tested in order and only a strictly closer hit replaces the current one,
    /// so the first sphere wins a tie.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut nearest: Option<(f64, &Sphere)> = None;

        for sphere in &self.spheres {
            let Some(distance) = sphere.intersect(ray) else {
                continue;
            };
            match nearest {
                Some((nearest_distance, _)) if nearest_distance <= distance => {}
                _ => nearest = Some((distance, sphere)),
            }
        }

        nearest
            .filter(|(distance, _)| *distance < self.far_plane)
            .map(|(distance, sphere)| Hit::new(ray, distance, sphere))
    }

    /// Four spheres of stock materials lit by three lights.
    pub fn demo() -> Self {
        let ivory = Material::ivory();
        let red_rubber = Material::red_rubber();
        let mirror = Material::mirror();

        Self {
            spheres: vec![
                Sphere::new(Vector::new(-3., 0., 16.), 2., ivory),
                Sphere::new(Vector::new(-1., -1.5, 12.), 2., mirror.clone()),
                Sphere::new(Vector::new(1.5, -0.5, 18.), 3., red_rubber),
                Sphere::new(Vector::new(7., 5., 18.), 4., mirror),
            ],
            light_sources: vec![
                PointLightSource::new(Vector::new(-20., 20., -20.), 1.5),
                PointLightSource::new(Vector::new(30., 50., -25.), 1.8),
                PointLightSource::new(Vector::new(30., 20., 30.), 1.7),
            ],
            far_plane: Self::DEFAULT_FAR_PLANE,
        }
    }
}
