use derive_builder::Builder;

use crate::{
    math::{color::Color, vector::Vector},
    render::{intersection::Hit, ray::Ray},
    scene::{
        Scene,
        light::{Illumination, PointLightSource},
    },
};

#[derive(PartialEq, Debug, Clone, Builder)]
#[builder(default)]
/// The integrator calculates the color for each given ray
pub struct Integrator {
    /// The scene to be rendered
    scene: Scene,
    /// Deepest recursion level that is still shaded,
    /// 0 means reflections show only the background
    #[builder(default = "Integrator::MAX_RECURSIVE_DEPTH")]
    max_recursive_depth: usize,
    /// Color of rays that miss everything or go past the recursion limit
    #[builder(default = "Color::background()")]
    background: Color,
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            scene: Scene::default(),
            max_recursive_depth: Self::MAX_RECURSIVE_DEPTH,
            background: Color::background(),
        }
    }
}

impl Integrator {
    pub const MAX_RECURSIVE_DEPTH: usize = 4;

    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Default::default()
        }
    }

    fn light_sources(&self) -> &[PointLightSource] {
        self.scene.light_sources()
    }

    /// The main method for calculating color for the given ray
    pub fn color_at(&self, ray: &Ray) -> Color {
        self.color_at_depth(ray, 0)
    }

    fn color_at_depth(&self, ray: &Ray, depth: usize) -> Color {
        if depth > self.max_recursive_depth {
            return self.background;
        }
        self.scene
            .intersect(ray)
            .map_or(self.background, |hit| self.shade_hit(ray, &hit, depth))
    }

    /// True when something sits between the hit point and the light.
    fn is_shadowed(&self, hit: &Hit, light_v: Vector, light_distance: f64) -> bool {
        let origin = hit.biased_origin(light_v);
        let shadow_ray = Ray::new(origin, light_v);

        self.scene
            .intersect(&shadow_ray)
            .is_some_and(|blocker| (blocker.point() - origin).magnitude() < light_distance)
    }

    fn direct_illumination(&self, ray: &Ray, hit: &Hit) -> Illumination {
        let specular_exponent = hit.material().specular_exponent;

        self.light_sources()
            .iter()
            .filter_map(|light_source| {
                let to_light = light_source.position() - hit.point();
                let light_v = to_light.normalize();
                let light_distance = to_light.magnitude();

                if self.is_shadowed(hit, light_v, light_distance) {
                    return None;
                }
                Some(light_source.illumination(
                    light_v,
                    hit.normal_v(),
                    ray.direction(),
                    specular_exponent,
                ))
            })
            .fold(Illumination::default(), |acc, lit| acc + lit)
    }

    fn reflected_color_at_depth(&self, ray: &Ray, hit: &Hit, depth: usize) -> Color {
        if hit.material().albedo.reflective == 0. {
            return Color::black();
        }
        let reflect_v = ray.direction().reflect(hit.normal_v()).normalize();
        let reflected_ray = Ray::new(hit.biased_origin(reflect_v), reflect_v);

        self.color_at_depth(&reflected_ray, depth + 1)
    }

    fn shade_hit(&self, ray: &Ray, hit: &Hit, depth: usize) -> Color {
        let material = hit.material();
        let reflected = self.reflected_color_at_depth(ray, hit, depth);
        let Illumination { diffuse, specular } = self.direct_illumination(ray, hit);

        material.color * diffuse * material.albedo.diffuse
            + Color::white() * specular * material.albedo.specular
            + reflected * material.albedo.reflective
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn max_recursive_depth(&self) -> usize {
        self.max_recursive_depth
    }

    pub fn background(&self) -> Color {
        self.background
    }
}
