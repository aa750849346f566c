/// Construction-time shape options
use std::fmt;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::geometry::clamp_sides;

pub const DEFAULT_TOP_FILL: &str = "red";
pub const DEFAULT_BOTTOM_FILL: &str = "blue";
pub const DEFAULT_SIDE_FILL: &str = "green";

/// Options for one prism. Every field is optional when deserialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub radius: f64,
    /// Half-extent along x; falls back to `radius`
    pub width: Option<f64>,
    /// Half-extent along y; falls back to `radius`
    pub height: Option<f64>,
    pub thickness: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    #[serde(alias = "number_of_sides")]
    pub num_sides: f64,
    pub top_fill: String,
    pub bottom_fill: String,
    pub side_fills: Vec<String>,
    pub camera_direction: CameraDirection,
    /// Cut a single side image into one strip per side
    #[serde(alias = "wrap")]
    pub wrap_side_image: bool,
    pub surface: SurfaceSize,
    pub resolution_scale: f64,
    pub image_smoothing: bool,
    pub smoothing_quality: String,
    pub fallback: FallbackColors,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            radius: 240.0,
            width: None,
            height: None,
            thickness: 60.0,
            speed_x: 2.0,
            speed_y: 0.25,
            num_sides: 14.0,
            top_fill: DEFAULT_TOP_FILL.to_string(),
            bottom_fill: DEFAULT_BOTTOM_FILL.to_string(),
            side_fills: vec![DEFAULT_SIDE_FILL.to_string()],
            camera_direction: CameraDirection::default(),
            wrap_side_image: true,
            surface: SurfaceSize::default(),
            resolution_scale: 1.0,
            image_smoothing: true,
            smoothing_quality: "high".to_string(),
            fallback: FallbackColors::default(),
        }
    }
}

impl ShapeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&text)
    }

    /// Side count after clamping to the supported range
    pub fn sides(&self) -> usize {
        clamp_sides(self.num_sides)
    }

    /// (rx, ry): explicit width/height, or the radius for both
    pub fn half_extents(&self) -> (f64, f64) {
        (
            self.width.unwrap_or(self.radius),
            self.height.unwrap_or(self.radius),
        )
    }

    pub fn camera(&self) -> Vector3<f64> {
        self.camera_direction.into()
    }

    /// Backing pixel size of the drawing surface
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = if self.resolution_scale > 0.0 {
            self.resolution_scale
        } else {
            1.0
        };
        (
            (self.surface.width as f64 * scale).round() as u32,
            (self.surface.height as f64 * scale).round() as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CameraDirection {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for CameraDirection {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: -1.0,
        }
    }
}

impl From<CameraDirection> for Vector3<f64> {
    fn from(dir: CameraDirection) -> Self {
        Vector3::new(dir.x, dir.y, dir.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Colors drawn when a face has no usable texture
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FallbackColors {
    pub top: String,
    pub bottom: String,
    pub side: String,
}

impl Default for FallbackColors {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP_FILL.to_string(),
            bottom: DEFAULT_BOTTOM_FILL.to_string(),
            side: DEFAULT_SIDE_FILL.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read shape config: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid shape config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
