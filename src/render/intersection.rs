use crate::{
    math::vector::Vector,
    render::ray::Ray,
    scene::object::{material::Material, sphere::Sphere},
};

/// Secondary rays start this far off the surface so they don't hit it again.
pub const SURFACE_BIAS: f64 = 1.0e-3;

/// The nearest intersection of a ray with the scene.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    distance: f64,
    point: Vector,
    normal_v: Vector,
    sphere: &'a Sphere,
}

impl<'a> Hit<'a> {
    pub fn new(ray: &Ray, distance: f64, sphere: &'a Sphere) -> Self {
        let point = ray.position(distance);
        Self {
            distance,
            point,
            normal_v: sphere.normal_at(point),
            sphere,
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn point(&self) -> Vector {
        self.point
    }

    pub fn normal_v(&self) -> Vector {
        self.normal_v
    }

    pub fn sphere(&self) -> &'a Sphere {
        self.sphere
    }

    pub fn material(&self) -> &'a Material {
        self.sphere.material()
    }

    /// Origin for a ray leaving the hit point in `direction`, pushed off the surface
    /// to the side the ray is heading to.
    pub fn biased_origin(&self, direction: Vector) -> Vector {
        if direction.dot(self.normal_v) < 0. {
            self.point - self.normal_v * SURFACE_BIAS
        } else {
            self.point + self.normal_v * SURFACE_BIAS
        }
    }
}
