use derive_builder::Builder;
use log::{debug, info, warn};

use crate::{
    math::color::Color,
    render::canvas::Canvas,
    scene::{Scene, camera::Camera},
    shading::integrator::Integrator,
};

#[derive(PartialEq, Debug, Clone, Builder)]
/// The renderer calculates each pixel color using the integrator and camera.
pub struct Renderer {
    integrator: Integrator,
    camera: Camera,
    #[builder(default = "false")]
    use_progress_bar: bool,
}

impl Renderer {
    fn color_at_pixel(&self, x: usize, y: usize) -> Color {
        self.integrator.color_at(&self.camera.ray_for_pixel(x, y))
    }

    fn progress_bar(&self) -> Option<indicatif::ProgressBar> {
        if !self.use_progress_bar {
            return None;
        }
        let pb = indicatif::ProgressBar::new(
            self.camera.target_width() as u64 * self.camera.target_height() as u64,
        );
        match indicatif::ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} pixels shaded: {human_pos}/{human_len} {percent}% ({eta})",
        ) {
            Ok(style) => Some(pb.with_style(style)),
            Err(e) => {
                warn!("invalid progress bar template: {e}");
                Some(pb)
            }
        }
    }

    pub fn render(&self) -> Canvas {
        let scene = self.scene();
        info!(
            "rendering {}x{} image of {} spheres and {} lights",
            self.camera.target_width(),
            self.camera.target_height(),
            scene.spheres().len(),
            scene.light_sources().len()
        );
        if scene.light_sources().is_empty() {
            warn!("scene has no light sources, only reflections of the background will be visible");
        }
        debug!(
            "max recursive depth: {}, far plane: {}",
            self.integrator.max_recursive_depth(),
            scene.far_plane()
        );

        let mut image = self.camera.canvas();

        let now = std::time::Instant::now();
        image.set_each_pixel(|x, y| self.color_at_pixel(x, y), self.progress_bar());
        info!("render time: {:?}", now.elapsed());
        image
    }

    pub fn scene(&self) -> &Scene {
        self.integrator.scene()
    }
}
