pub mod approx_eq;

pub mod math {
    pub mod color;
    pub mod vector;
}

pub mod render {
    pub mod canvas;
    pub mod intersection;
    pub mod ray;
    pub mod renderer;
}

pub mod scene;

pub mod shading {
    pub mod integrator;
}
