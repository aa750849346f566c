//! Test doubles: an in-memory image host and a surface that records calls.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use futures::future::{self, FutureExt, LocalBoxFuture};
use nalgebra::Affine2;
use pshape_core::{Clock, ImageHost, Raster, SliceRegion, Surface, TextureError};

#[derive(Debug, Clone, PartialEq)]
pub struct TestImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub ready: bool,
}

impl Raster for TestImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Serves images registered up front; everything else fails to decode.
#[derive(Default)]
pub struct MemoryHost {
    images: RefCell<HashMap<String, TestImage>>,
    decodes: RefCell<HashMap<String, usize>>,
}

impl MemoryHost {
    pub fn with_images(images: &[(&str, u32, u32)]) -> Self {
        let host = Self::default();
        for (name, width, height) in images {
            host.insert(name, *width, *height, true);
        }
        host
    }

    pub fn insert(&self, name: &str, width: u32, height: u32, ready: bool) {
        self.images.borrow_mut().insert(
            name.to_string(),
            TestImage {
                name: name.to_string(),
                width,
                height,
                ready,
            },
        );
    }

    pub fn decode_count(&self, source: &str) -> usize {
        self.decodes.borrow().get(source).copied().unwrap_or(0)
    }

    pub fn total_decodes(&self) -> usize {
        self.decodes.borrow().values().sum()
    }
}

impl ImageHost for MemoryHost {
    type Raster = TestImage;

    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<TestImage, TextureError>> {
        *self.decodes.borrow_mut().entry(source.to_string()).or_default() += 1;
        let result = self
            .images
            .borrow()
            .get(source)
            .cloned()
            .ok_or_else(|| TextureError::decode(source, "unreachable source"));
        future::ready(result).boxed_local()
    }

    fn slice(&self, raster: &TestImage, source: &str, region: SliceRegion) -> Result<String, TextureError> {
        let name = format!("{source}@{}+{}.png", region.x, region.width);
        self.insert(&name, region.width, region.height, raster.ready);
        Ok(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear,
    Save,
    Restore,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Clip,
    Fill(String),
    DrawImage(String, Affine2<f64>),
    Smoothing(bool, String),
}

pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<Command>,
    pub unknown_colors: Vec<String>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            unknown_colors: Vec::new(),
        }
    }

    /// Treat `color` as unparseable, like a canvas ignoring a bad fill style
    pub fn reject_color(mut self, color: &str) -> Self {
        self.unknown_colors.push(color.to_string());
        self
    }

    pub fn fills(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Fill(color) => Some(color.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<(&str, &Affine2<f64>)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawImage(name, transform) => Some((name.as_str(), transform)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    type Image = TestImage;

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(Command::Clear);
    }

    fn save(&mut self) {
        self.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        self.commands.push(Command::Restore);
    }

    fn begin_path(&mut self) {
        self.commands.push(Command::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(Command::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(Command::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.commands.push(Command::ClosePath);
    }

    fn clip(&mut self) {
        self.commands.push(Command::Clip);
    }

    fn supports_color(&self, color: &str) -> bool {
        !self.unknown_colors.iter().any(|c| c == color)
    }

    fn fill(&mut self, color: &str) {
        self.commands.push(Command::Fill(color.to_string()));
    }

    fn draw_image(&mut self, image: &TestImage, transform: &Affine2<f64>) {
        self.commands.push(Command::DrawImage(image.name.clone(), *transform));
    }

    fn set_image_smoothing(&mut self, enabled: bool, quality: &str) {
        self.commands.push(Command::Smoothing(enabled, quality.to_string()));
    }
}

/// Clock the test moves by hand
#[derive(Clone, Default)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<f64>>,
}

impl ManualClock {
    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}
