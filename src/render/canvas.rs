use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use clap::ValueEnum;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

use crate::math::color::Color;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    Ppm,
    Png,
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Ppm => write!(f, "ppm"),
            ImageFormat::Png => write!(f, "png"),
        }
    }
}

/// Row-major buffer of linear colors, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn with_color(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; height * width],
        }
    }

    pub fn new(width: usize, height: usize) -> Self {
        Self::with_color(width, height, Color::black())
    }

    fn index(&self, x: usize, y: usize) -> usize {
        self.width * y + x
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn pixel_at(&self, x: usize, y: usize) -> Color {
        self.pixels[self.index(x, y)]
    }
    pub fn write_pixel(&mut self, x: usize, y: usize, new_color: Color) {
        let id = self.index(x, y);
        self.pixels[id] = new_color;
    }

    /// Computes every pixel in parallel. Each call of `fun` writes only its own slot.
    pub fn set_each_pixel<F>(&mut self, fun: F, progressbar: Option<ProgressBar>)
    where
        F: Fn(usize, usize) -> Color + Sync,
    {
        let width = self.width;
        let progressbar = progressbar.unwrap_or_else(ProgressBar::hidden);

        self.pixels
            .par_iter_mut()
            .enumerate()
            .progress_with(progressbar)
            .for_each(|(id, pixel_color)| {
                let x = id % width;
                let y = id / width;
                *pixel_color = fun(x, y);
            })
    }

    pub fn as_u8_rgb(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|color| color.as_scaled_values())
            .collect()
    }

    pub fn save_to_file(&self, path: &Path, format: ImageFormat) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            ImageFormat::Ppm => self.write_ppm(&mut writer)?,
            ImageFormat::Png => self.write_png(&mut writer)?,
        }
        writer.flush()
    }
}

/// binary ppm (P6)
impl Canvas {
    fn ppm_header(&self) -> String {
        format!("P6\n{} {}\n255\n", self.width, self.height)
    }

    pub fn write_ppm<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.ppm_header().as_bytes())?;
        writer.write_all(&self.as_u8_rgb())?;
        Ok(())
    }
}

/// png
impl Canvas {
    pub fn write_png<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let (Ok(width), Ok(height)) = (u32::try_from(self.width), u32::try_from(self.height))
        else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{}x{} image is too large for png", self.width, self.height),
            ));
        };
        let mut encoder = png::Encoder::new(writer, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;

        writer
            .write_image_data(&self.as_u8_rgb())
            .map_err(|e| e.into())
    }
}
