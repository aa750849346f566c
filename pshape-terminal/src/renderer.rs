/// Software drawing surface rendered to the terminal with half-block cells
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use log::debug;
use nalgebra::{Affine2, Point2};
use pshape_core::Surface;
use std::io::Write;

use crate::color::{parse_color, Rgb};
use crate::images::TerminalImage;

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '▀';

#[derive(Clone)]
struct SavedState {
    clip: Option<Vec<bool>>,
}

/// Pixel canvas where every terminal cell holds two vertically stacked pixels
pub struct CellCanvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    background: Rgb,
    fill_style: Rgb,
    subpaths: Vec<Vec<Point2<f64>>>,
    clip: Option<Vec<bool>>,
    stack: Vec<SavedState>,
    smoothing: bool,
}

impl CellCanvas {
    /// Canvas for a terminal area of `columns` x `rows` cells
    pub fn for_cells(columns: usize, rows: usize) -> Self {
        Self::new(columns, rows * 2)
    }

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
            background: Rgb::BLACK,
            fill_style: Rgb::BLACK,
            subpaths: Vec::new(),
            clip: None,
            stack: Vec::new(),
            smoothing: true,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Pixel bounds (min_x, min_y, max_x, max_y) of `points`, clamped to the canvas
    fn bounds<'a>(&self, points: impl Iterator<Item = &'a Point2<f64>>) -> Option<(usize, usize, usize, usize)> {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        if !min_x.is_finite() || self.width == 0 || self.height == 0 {
            return None;
        }
        let min_x = min_x.floor().max(0.0) as usize;
        let min_y = min_y.floor().max(0.0) as usize;
        let max_x = (max_x.ceil() as i64).min(self.width as i64 - 1);
        let max_y = (max_y.ceil() as i64).min(self.height as i64 - 1);
        if max_x < 0 || max_y < 0 || min_x as i64 > max_x || min_y as i64 > max_y {
            return None;
        }
        Some((min_x, min_y, max_x as usize, max_y as usize))
    }

    fn clip_allows(&self, idx: usize) -> bool {
        self.clip.as_ref().map_or(true, |mask| mask[idx])
    }

    fn path_contains(&self, x: f64, y: f64) -> bool {
        self.subpaths
            .iter()
            .map(|subpath| winding_number(subpath, x, y))
            .sum::<i32>()
            != 0
    }

    fn sample(&self, image: &TerminalImage, u: f64, v: f64) -> Option<(Rgb, u8)> {
        let pixels = image.pixels();
        let (w, h) = (pixels.width(), pixels.height());
        if u < 0.0 || v < 0.0 || u >= w as f64 || v >= h as f64 {
            return None;
        }

        let texel = |x: u32, y: u32| {
            let p = pixels.get_pixel(x.min(w - 1), y.min(h - 1)).0;
            [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
        };

        let rgba = if self.smoothing {
            // bilinear between the four nearest texel centers
            let fx = (u - 0.5).max(0.0);
            let fy = (v - 0.5).max(0.0);
            let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
            let (tx, ty) = (fx.fract(), fy.fract());
            let (a, b) = (texel(x0, y0), texel(x0 + 1, y0));
            let (c, d) = (texel(x0, y0 + 1), texel(x0 + 1, y0 + 1));
            let mut out = [0.0; 4];
            for i in 0..4 {
                let top = a[i] + (b[i] - a[i]) * tx;
                let bottom = c[i] + (d[i] - c[i]) * tx;
                out[i] = top + (bottom - top) * ty;
            }
            out
        } else {
            texel(u as u32, v as u32)
        };

        Some((
            Rgb::new(rgba[0] as u8, rgba[1] as u8, rgba[2] as u8),
            rgba[3].round() as u8,
        ))
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<(Rgb, Rgb)> = None;
        for row in 0..self.height / 2 {
            for x in 0..self.width {
                let top = self.pixel(x, row * 2);
                let bottom = self.pixel(x, row * 2 + 1);
                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(to_color(top)))?;
                    writer.queue(SetBackgroundColor(to_color(bottom)))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
            writer.queue(ResetColor)?;
            current = None;
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for CellCanvas {
    type Image = TerminalImage;

    fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.subpaths.clear();
    }

    fn save(&mut self) {
        self.stack.push(SavedState {
            clip: self.clip.clone(),
        });
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.clip = state.clip;
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![Point2::new(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.push(Point2::new(x, y)),
            None => self.move_to(x, y),
        }
    }

    fn close_path(&mut self) {
        // subpaths are always filled as closed polygons
    }

    fn clip(&mut self) {
        let mut mask = vec![false; self.width * self.height];
        if let Some((min_x, min_y, max_x, max_y)) = self.bounds(self.subpaths.iter().flatten()) {
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let idx = y * self.width + x;
                    mask[idx] = self.clip_allows(idx) && self.path_contains(x as f64 + 0.5, y as f64 + 0.5);
                }
            }
        }
        self.clip = Some(mask);
    }

    fn supports_color(&self, color: &str) -> bool {
        parse_color(color).is_some()
    }

    fn fill(&mut self, color: &str) {
        match parse_color(color) {
            Some(rgb) => self.fill_style = rgb,
            None => debug!("ignoring unknown color '{color}'"),
        }

        let Some((min_x, min_y, max_x, max_y)) = self.bounds(self.subpaths.iter().flatten()) else {
            return;
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let idx = y * self.width + x;
                if self.clip_allows(idx) && self.path_contains(x as f64 + 0.5, y as f64 + 0.5) {
                    self.pixels[idx] = self.fill_style;
                }
            }
        }
    }

    fn draw_image(&mut self, image: &TerminalImage, transform: &Affine2<f64>) {
        let Some(inverse) = transform.try_inverse() else {
            return;
        };

        let (w, h) = (image.pixels().width() as f64, image.pixels().height() as f64);
        let corners = [
            transform * Point2::new(0.0, 0.0),
            transform * Point2::new(w, 0.0),
            transform * Point2::new(w, h),
            transform * Point2::new(0.0, h),
        ];
        let Some((min_x, min_y, max_x, max_y)) = self.bounds(corners.iter()) else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let idx = y * self.width + x;
                if !self.clip_allows(idx) {
                    continue;
                }
                let uv = inverse * Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                if let Some((rgb, alpha)) = self.sample(image, uv.x, uv.y) {
                    self.pixels[idx] = self.pixels[idx].blend(rgb, alpha);
                }
            }
        }
    }

    fn set_image_smoothing(&mut self, enabled: bool, _quality: &str) {
        self.smoothing = enabled;
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Nonzero winding number of the closed polygon `points` around (x, y)
fn winding_number(points: &[Point2<f64>], x: f64, y: f64) -> i32 {
    let n = points.len();
    if n < 3 {
        return 0;
    }

    let mut winding = 0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = (b.x - a.x) * (y - a.y) - (x - a.x) * (b.y - a.y);
        if a.y <= y {
            if b.y > y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding
}
