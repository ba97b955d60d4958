use crate::math::vector::Vector;

#[derive(Clone, Copy, Debug, Default)]
pub struct Ray {
    origin: Vector,
    direction: Vector,
}

impl Ray {
    /// `direction` is expected to be normalized.
    pub fn new(origin: Vector, direction: Vector) -> Self {
        Self { origin, direction }
    }

    pub fn position(&self, time: f64) -> Vector {
        self.origin + self.direction * time
    }
    pub fn origin(&self) -> Vector {
        self.origin
    }
    pub fn direction(&self) -> Vector {
        self.direction
    }
}
