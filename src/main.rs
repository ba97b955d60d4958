use std::{io, path::PathBuf};

use clap::Parser;
use log::info;
use spheretracer::{
    math::color::Color,
    render::{canvas::ImageFormat, renderer::RendererBuilder},
    scene::{
        Scene, SceneBuilder,
        camera::Camera,
        io::{interactive, yaml},
    },
    shading::integrator::{Integrator, IntegratorBuilder},
};

const DEFAULT_WIDTH: usize = 1024;
const DEFAULT_HEIGHT: usize = 768;
const DEFAULT_FOV_DEGREES: f64 = 90.;

/// Sphere ray tracer
/// Renders scenes of spheres and point lights with diffuse, specular and mirror shading.
/// The scene is read from a yaml file, or typed in when no file is given
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// The yaml scene file to render.
    /// If omitted, the scene is read from the standard input
    scene_file: Option<PathBuf>,

    /// The format of the output image
    #[clap(short = 'f', long, default_value = "ppm")]
    image_format: ImageFormat,

    /// The output path of the rendered image.
    /// By default it's `./<scene_filename>.<image_format>` for scene files
    /// and `./out.<image_format>` otherwise
    #[clap(short, long)]
    output_path: Option<PathBuf>,

    #[clap(long, help = format!("Width (in pixels) of the output image.
Overrides the one in the scene. If not specified anywhere, defaults to {}", DEFAULT_WIDTH))]
    width: Option<usize>,

    #[clap(long, help = format!("Height (in pixels) of the output image.
Overrides the one in the scene. If not specified anywhere, defaults to {}", DEFAULT_HEIGHT))]
    height: Option<usize>,

    #[clap(long, help = format!("Vertical field of view of the camera in degrees.
Overrides the one in the scene. If not specified anywhere, defaults to {}", DEFAULT_FOV_DEGREES))]
    fov: Option<f64>,

    /// Maximum number of times a ray can bounce off a reflective surface.
    /// Overrides the one in the scene file
    #[clap(short, long)]
    max_reflective_depth: Option<usize>,

    /// Hits further away than this are ignored.
    /// Overrides the one in the scene file
    #[clap(long)]
    far_plane: Option<f64>,

    /// Render the built-in demo scene instead of reading one
    #[clap(long, conflicts_with = "scene_file")]
    demo: bool,

    /// Show a progress bar while rendering
    #[clap(long)]
    progress: bool,

    /// Don't print prompts when reading the scene from the standard input
    #[clap(short, long)]
    quiet: bool,
}

/// Image options and scene gathered from whichever source was chosen.
struct SceneSource {
    width: Option<usize>,
    height: Option<usize>,
    fov_degrees: Option<f64>,
    max_reflective_depth: Option<usize>,
    background: Option<Color>,
    scene_builder: SceneBuilder,
}

impl SceneSource {
    fn from_scene(width: usize, height: usize, fov_degrees: f64, scene: Scene) -> Self {
        let mut scene_builder = SceneBuilder::default();
        scene_builder
            .spheres(scene.spheres().to_vec())
            .light_sources(scene.light_sources().to_vec())
            .far_plane(scene.far_plane());

        Self {
            width: Some(width),
            height: Some(height),
            fov_degrees: Some(fov_degrees),
            max_reflective_depth: None,
            background: None,
            scene_builder,
        }
    }
}

fn read_scene_source(args: &Args) -> Result<SceneSource, String> {
    if args.demo {
        info!("rendering the demo scene");
        return Ok(SceneSource::from_scene(
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
            DEFAULT_FOV_DEGREES,
            Scene::demo(),
        ));
    }

    if let Some(scene_file) = &args.scene_file {
        info!("reading scene from {:?}", scene_file);
        let scene_source = std::fs::read_to_string(scene_file)
            .map_err(|e| format!("Failed to read scene file: {}", e))?;
        let config = yaml::parse_str(&scene_source)
            .map_err(|e| format!("Failed to parse scene: {}", e))?;

        return Ok(SceneSource {
            width: config.width,
            height: config.height,
            fov_degrees: config.field_of_view,
            max_reflective_depth: config.max_reflective_depth,
            background: config.background,
            scene_builder: config.scene_builder,
        });
    }

    let input = io::stdin().lock();
    let parsed = if args.quiet {
        interactive::read_scene(input, io::sink())
    } else {
        interactive::read_scene(input, io::stdout())
    }
    .map_err(|e| format!("Failed to read scene: {}", e))?;

    Ok(SceneSource::from_scene(
        parsed.width,
        parsed.height,
        parsed.fov_degrees,
        parsed.scene,
    ))
}

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    let mut source = read_scene_source(&args)?;
    if let Some(far_plane) = args.far_plane {
        source.scene_builder.far_plane(far_plane);
    }
    let scene = source
        .scene_builder
        .build()
        .map_err(|e| format!("Invalid scene: {}", e))?;

    let camera = Camera::with_fov_degrees(
        args.width.or(source.width).unwrap_or(DEFAULT_WIDTH),
        args.height.or(source.height).unwrap_or(DEFAULT_HEIGHT),
        args.fov.or(source.fov_degrees).unwrap_or(DEFAULT_FOV_DEGREES),
    )
    .map_err(|e| format!("Invalid camera: {}", e))?;

    let integrator = IntegratorBuilder::default()
        .scene(scene)
        .max_recursive_depth(
            args.max_reflective_depth
                .or(source.max_reflective_depth)
                .unwrap_or(Integrator::MAX_RECURSIVE_DEPTH),
        )
        .background(source.background.unwrap_or_else(Color::background))
        .build()
        .map_err(|e| format!("Failed to set up the integrator: {}", e))?;

    let renderer = RendererBuilder::default()
        .integrator(integrator)
        .camera(camera)
        .use_progress_bar(args.progress)
        .build()
        .map_err(|e| format!("Failed to set up the renderer: {}", e))?;

    let canvas = renderer.render();

    let output_path = args.output_path.clone().unwrap_or_else(|| {
        let mut path = args
            .scene_file
            .as_ref()
            .and_then(|scene_file| scene_file.file_name())
            .map_or_else(|| PathBuf::from("out"), PathBuf::from);
        path.set_extension(args.image_format.to_string());
        path
    });
    canvas
        .save_to_file(&output_path, args.image_format)
        .map_err(|e| format!("Failed to save image: {}", e))?;
    println!(
        "The work is completed! The image is saved under the name {:?}",
        output_path
    );
    Ok(())
}
