use std::f64::consts::PI;

use crate::{
    math::vector::Vector,
    render::{canvas::Canvas, ray::Ray},
    scene::SceneError,
};

// camera sits at the origin and looks toward +z, +y is up
#[derive(PartialEq, Debug, Clone)]
pub struct Camera {
    target_width: usize,
    target_height: usize,
    field_of_view: f64,
    /// distance from the eye to the image plane, in pixels
    focal_distance: f64,
}

impl Camera {
    /// `field_of_view` is the vertical angle in radians.
    pub fn new(
        target_width: usize,
        target_height: usize,
        field_of_view: f64,
    ) -> Result<Self, SceneError> {
        // the pixel count has to fit in memory and each side in a png header
        let too_large = target_width.checked_mul(target_height).is_none()
            || u32::try_from(target_width).is_err()
            || u32::try_from(target_height).is_err();
        if target_width == 0 || target_height == 0 || too_large {
            return Err(SceneError::InvalidImageSize {
                width: target_width,
                height: target_height,
            });
        }
        if !(field_of_view > 0. && field_of_view < PI) {
            return Err(SceneError::InvalidFieldOfView(field_of_view));
        }
        let focal_distance = target_height as f64 / 2. / (field_of_view / 2.).tan();

        Ok(Self {
            target_width,
            target_height,
            field_of_view,
            focal_distance,
        })
    }

    pub fn with_fov_degrees(
        target_width: usize,
        target_height: usize,
        fov_degrees: f64,
    ) -> Result<Self, SceneError> {
        Self::new(target_width, target_height, fov_degrees.to_radians())
    }

    /// Primary ray through pixel `(x, y)`, `(0, 0)` being the top left corner.
    pub fn ray_for_pixel(&self, x: usize, y: usize) -> Ray {
        let scene_x = x as f64 - self.target_width as f64 / 2.;
        let scene_y = self.target_height as f64 / 2. - y as f64;
        let direction = Vector::new(scene_x, scene_y, self.focal_distance).normalize();

        Ray::new(Vector::zero(), direction)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.target_width, self.target_height)
    }

    pub fn target_width(&self) -> usize {
        self.target_width
    }

    pub fn target_height(&self) -> usize {
        self.target_height
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_3};

    use super::*;
    use crate::assert_approx_eq_low_prec;

    #[test]
    fn zero_sized_image_is_rejected() {
        assert_eq!(
            Camera::new(0, 10, FRAC_PI_2),
            Err(SceneError::InvalidImageSize {
                width: 0,
                height: 10
            })
        );
        assert!(Camera::new(10, 0, FRAC_PI_2).is_err());
    }

    #[test]
    fn oversized_image_is_rejected() {
        assert_eq!(
            Camera::new(usize::MAX, 2, FRAC_PI_2),
            Err(SceneError::InvalidImageSize {
                width: usize::MAX,
                height: 2
            })
        );
        let too_wide = u32::MAX as usize + 1;
        assert!(matches!(
            Camera::new(too_wide, 1, FRAC_PI_2),
            Err(SceneError::InvalidImageSize { .. })
        ));
        assert!(matches!(
            Camera::new(1, too_wide, FRAC_PI_2),
            Err(SceneError::InvalidImageSize { .. })
        ));
    }

    #[test]
    fn field_of_view_out_of_range_is_rejected() {
        assert!(Camera::new(10, 10, 0.).is_err());
        assert!(Camera::new(10, 10, PI).is_err());
        assert!(Camera::new(10, 10, -1.).is_err());
        assert!(Camera::new(10, 10, f64::NAN).is_err());
    }

    #[test]
    fn fov_in_degrees_is_converted() {
        let camera = Camera::with_fov_degrees(100, 50, 60.).unwrap();
        assert_approx_eq_low_prec!(camera.field_of_view(), FRAC_PI_3);
    }

    #[test]
    fn ray_thru_canvas_center() {
        let camera = Camera::new(200, 100, FRAC_PI_2).unwrap();

        let ray = camera.ray_for_pixel(100, 50);
        assert_approx_eq_low_prec!(ray.origin(), Vector::zero());
        assert_approx_eq_low_prec!(ray.direction(), Vector::new(0., 0., 1.));
    }

    #[test]
    fn ray_thru_top_edge() {
        // with 90 degrees fov the top edge is 45 degrees above the axis
        let camera = Camera::new(100, 100, FRAC_PI_2).unwrap();

        let ray = camera.ray_for_pixel(50, 0);
        assert_approx_eq_low_prec!(
            ray.direction(),
            Vector::new(0., FRAC_1_SQRT_2, FRAC_1_SQRT_2)
        );
    }

    #[test]
    fn ray_thru_top_left_corner() {
        let camera = Camera::new(100, 100, FRAC_PI_2).unwrap();

        let ray = camera.ray_for_pixel(0, 0);
        let expected = Vector::new(-50., 50., 50.).normalize();
        assert_approx_eq_low_prec!(ray.direction(), expected);
        assert_approx_eq_low_prec!(ray.direction().magnitude(), 1.);
    }

    #[test]
    fn canvas_has_camera_size() {
        let camera = Camera::new(7, 3, FRAC_PI_2).unwrap();
        let canvas = camera.canvas();
        assert_eq!(canvas.width(), 7);
        assert_eq!(canvas.height(), 3);
    }
}
