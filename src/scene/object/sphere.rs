use crate::{math::vector::Vector, render::ray::Ray, scene::object::material::Material};

#[derive(PartialEq, Debug, Clone)]
pub struct Sphere {
    center: Vector,
    radius: f64,
    material: Material,
}

impl Sphere {
    pub fn new(center: Vector, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn center(&self) -> Vector {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Outward facing unit normal at a point on the surface.
    pub fn normal_at(&self, point: Vector) -> Vector {
        (point - self.center).normalize()
    }

    /// Distance along the ray to the nearest non-negative intersection.
    ///
    /// When the origin is inside the sphere the near root is negative and the far one is
    /// returned, so the inner surface is what the ray sees.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let sphere_to_ray = ray.origin() - self.center;

        let a = ray.direction().dot(ray.direction());
        let b = 2. * ray.direction().dot(sphere_to_ray);
        let c = sphere_to_ray.dot(sphere_to_ray) - self.radius * self.radius;

        let discriminant = b * b - 4. * a * c;
        if discriminant < 0. || a == 0. {
            return None;
        }

        let delta_sqrt = discriminant.sqrt();
        let t1 = (-b - delta_sqrt) / (2. * a);
        let t2 = (-b + delta_sqrt) / (2. * a);

        if t1.max(t2) < 0. {
            return None;
        }
        Some(if t1 >= 0. { t1 } else { t2 })
    }
}
