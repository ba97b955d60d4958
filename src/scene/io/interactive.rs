//! Scene description typed in at the console.
//!
//! Numbers are separated by whitespace or newlines. Image width, height and field of view (in
//! degrees) come first, then three lists: materials, spheres and lights. Each list entry is a
//! single line and a list ends with [`SENTINEL`] in place of the entry's first number.

use std::{
    collections::VecDeque,
    fmt::Display,
    io::{BufRead, Write},
    str::FromStr,
};

use log::debug;

use crate::{
    math::{color::Color, vector::Vector},
    scene::{
        Scene, SceneBuilder, SceneError,
        light::PointLightSource,
        object::{
            material::{Albedo, Material},
            sphere::Sphere,
        },
    },
};

/// Terminates every list of the input.
pub const SENTINEL: f64 = -666.;

const HELP: &str = "\
To enter integer (int) write it and press Enter key.
To enter fractional number (float) write it, using decimal point, and press Enter key.
To enter multiple numbers write them with spaces without other separators and press Enter key.
To enter list write each element with a new line, then write -666 and press Enter key.

Colours are entered as 3 float numbers (from 0 to 1), each number means red, green or blue component in rgb color model.
Factors are entered as float numbers.

";

#[derive(Debug)]
pub enum InputParseError {
    UnexpectedEof { expected: &'static str },
    InvalidNumber { token: String, expected: &'static str },
    UnknownMaterial { index: i64, available: usize },
    Scene(SceneError),
    Io(std::io::Error),
}

impl Display for InputParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof { expected } => {
                write!(f, "input ended while expecting {expected}")
            }
            Self::InvalidNumber { token, expected } => {
                write!(f, "`{token}` is not a valid {expected}")
            }
            Self::UnknownMaterial { index, available } => write!(
                f,
                "material number {index} doesn't exist, there are {available} materials"
            ),
            Self::Scene(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InputParseError {}

impl From<std::io::Error> for InputParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SceneError> for InputParseError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

type InputParseResult<T> = Result<T, InputParseError>;

/// Everything read from the console: image parameters and the validated scene.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveScene {
    pub width: usize,
    pub height: usize,
    pub fov_degrees: f64,
    pub scene: Scene,
}

/// Reads whitespace separated numbers, pulling new lines only when they are needed,
/// and writes prompts before each of them.
pub struct InteractiveReader<R, W> {
    input: R,
    prompt: W,
    tokens: VecDeque<String>,
}

impl<R: BufRead, W: Write> InteractiveReader<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self {
            input,
            prompt,
            tokens: VecDeque::new(),
        }
    }

    fn say(&mut self, text: &str) -> InputParseResult<()> {
        self.prompt.write_all(text.as_bytes())?;
        self.prompt.flush()?;
        Ok(())
    }

    fn next_token(&mut self, expected: &'static str) -> InputParseResult<String> {
        loop {
            if let Some(token) = self.tokens.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(InputParseError::UnexpectedEof { expected });
            }
            self.tokens
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }

    fn next<T: FromStr>(&mut self, expected: &'static str) -> InputParseResult<T> {
        let token = self.next_token(expected)?;
        token
            .parse()
            .map_err(|_| InputParseError::InvalidNumber { token, expected })
    }

    fn next_f64(&mut self, expected: &'static str) -> InputParseResult<f64> {
        self.next(expected)
    }

    fn next_vector(&mut self, expected: &'static str) -> InputParseResult<Vector> {
        Ok(Vector::new(
            self.next_f64(expected)?,
            self.next_f64(expected)?,
            self.next_f64(expected)?,
        ))
    }

    /// First number of a list entry, or `None` when the list ended.
    fn next_entry_start(
        &mut self,
        entry_no: usize,
        expected: &'static str,
    ) -> InputParseResult<Option<f64>> {
        self.say(&format!("{entry_no}. "))?;
        let first = self.next_f64(expected)?;
        Ok((first != SENTINEL).then_some(first))
    }

    fn read_materials(&mut self) -> InputParseResult<Vec<Material>> {
        self.say("\nEnter the list of the materials in format (colour; specular exponent (float); influence factors of: own colour, specularity, reflection):\n")?;
        let mut materials = Vec::new();
        while let Some(r) = self.next_entry_start(materials.len() + 1, "material colour")? {
            let g = self.next_f64("material colour")?;
            let b = self.next_f64("material colour")?;
            let specular_exponent = self.next_f64("specular exponent")?;
            let albedo = self.next_vector("influence factor")?;

            materials.push(Material::new(
                Color::new(r, g, b),
                specular_exponent,
                Albedo::new(albedo.x(), albedo.y(), albedo.z()),
            ));
        }
        self.say("\n\n")?;
        Ok(materials)
    }

    fn read_spheres(&mut self, materials: &[Material]) -> InputParseResult<Vec<Sphere>> {
        self.say("The camera locates in coordinates (0, 0, 0) and directed along 3rd axis.\n\n")?;
        self.say("Enter the list of the spheres in format (coordinates (3 float numbers); radius (float); material number (int)):\n")?;
        let mut spheres = Vec::new();
        while let Some(x) = self.next_entry_start(spheres.len() + 1, "sphere coordinate")? {
            let y = self.next_f64("sphere coordinate")?;
            let z = self.next_f64("sphere coordinate")?;
            let radius = self.next_f64("sphere radius")?;
            let index: i64 = self.next("material number")?;

            let material = usize::try_from(index)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| materials.get(i))
                .ok_or(InputParseError::UnknownMaterial {
                    index,
                    available: materials.len(),
                })?;

            spheres.push(Sphere::new(Vector::new(x, y, z), radius, material.clone()));
        }
        self.say("\n\n")?;
        Ok(spheres)
    }

    fn read_lights(&mut self) -> InputParseResult<Vec<PointLightSource>> {
        self.say("Enter the list of the sources of light in format (coordinates (3 float numbers); intensity (float)):\n")?;
        let mut lights = Vec::new();
        while let Some(x) = self.next_entry_start(lights.len() + 1, "light coordinate")? {
            let y = self.next_f64("light coordinate")?;
            let z = self.next_f64("light coordinate")?;
            let intensity = self.next_f64("light intensity")?;

            lights.push(PointLightSource::new(Vector::new(x, y, z), intensity));
        }
        Ok(lights)
    }

    pub fn read_scene(mut self) -> InputParseResult<InteractiveScene> {
        self.say(HELP)?;

        self.say("Enter image width (int):                ")?;
        let width = self.next("image width")?;
        self.say("Enter image height (int):               ")?;
        let height = self.next("image height")?;
        self.say("Enter field of view in degrees (float): ")?;
        let fov_degrees = self.next_f64("field of view")?;

        let materials = self.read_materials()?;
        let spheres = self.read_spheres(&materials)?;
        let lights = self.read_lights()?;
        debug!(
            "read {} materials, {} spheres and {} lights",
            materials.len(),
            spheres.len(),
            lights.len()
        );

        let mut builder = SceneBuilder::default();
        for sphere in spheres {
            builder.add_sphere(sphere);
        }
        for light in lights {
            builder.add_light_source(light);
        }

        Ok(InteractiveScene {
            width,
            height,
            fov_degrees,
            scene: builder.build()?,
        })
    }
}

pub fn read_scene<R: BufRead, W: Write>(
    input: R,
    prompt: W,
) -> InputParseResult<InteractiveScene> {
    InteractiveReader::new(input, prompt).read_scene()
}
