/// Terminal host for the pShape renderer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use futures::executor::block_on;
use log::info;
use pshape_core::{Clock, LoopHandle, RenderLoop, Shape, ShapeConfig, Surface, TextureManager, Viewport};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod color;
pub mod images;
pub mod renderer;

pub use images::{FileImageHost, TerminalImage};
pub use renderer::CellCanvas;

/// Monotonic clock based on [`Instant`]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Size a shape to a canvas of `width` x `height` pixels.
///
/// Projection stretches x by the aspect ratio, so the radius is bounded by
/// the height alone.
pub fn fit_to_canvas(config: &mut ShapeConfig, width: usize, height: usize) {
    config.radius = height as f64 * 0.35;
    config.thickness = config.radius / 4.0;
    config.width = None;
    config.height = None;
    config.surface.width = width as u32;
    config.surface.height = height as u32;
}

/// Shrink or grow a configured shape from its own surface
/// (`surface` x `resolution_scale`) onto a canvas of `width` x `height` pixels,
/// keeping its proportions to the surface.
pub fn scale_to_canvas(config: &mut ShapeConfig, width: usize, height: usize) {
    let (surface_width, surface_height) = config.pixel_size();
    if surface_width == 0 || surface_height == 0 {
        fit_to_canvas(config, width, height);
        return;
    }
    let scale = (width as f64 / surface_width as f64).min(height as f64 / surface_height as f64);
    config.radius *= scale;
    config.width = config.width.map(|w| w * scale);
    config.height = config.height.map(|h| h * scale);
    config.thickness *= scale;
    config.surface.width = width as u32;
    config.surface.height = height as u32;
    config.resolution_scale = 1.0;
}

/// Main application struct for terminal shape rendering
pub struct TerminalApp {
    render_loop: RenderLoop<TerminalImage, InstantClock>,
    handle: LoopHandle,
    canvas: CellCanvas,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build the shape and wait for all of its textures before returning.
    ///
    /// Image paths in the config resolve against `asset_dir`. With `fit` set,
    /// the shape is resized to fill the terminal; otherwise it is scaled from
    /// its configured surface size.
    pub fn new(mut config: ShapeConfig, asset_dir: impl Into<PathBuf>, fit: bool) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        // keep the last row for the status line
        let canvas = CellCanvas::for_cells(columns as usize, rows.saturating_sub(1) as usize);
        let (width, height) = canvas.size();
        if fit {
            fit_to_canvas(&mut config, width as usize, height as usize);
        } else {
            scale_to_canvas(&mut config, width as usize, height as usize);
        }

        let textures = TextureManager::new(FileImageHost::new(asset_dir));
        let shape = block_on(Shape::load(&config, Viewport::new(width, height), &textures));
        info!("loaded {} cached textures", textures.cached_count());

        let render_loop = RenderLoop::new(shape, InstantClock::new());
        let handle = render_loop.handle();

        Ok(Self {
            render_loop,
            handle,
            canvas,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.handle.is_running() {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            if !self.render_loop.tick(&mut self.canvas) {
                break;
            }
            self.present()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                self.handle.stop();
            }
        }
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.canvas.draw(&mut stdout)?;

        let sides = self.render_loop.shape().model().num_sides();
        queue!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "pShape | {sides} sides | {:.1}s | FPS: {:.1} | Q=Quit",
                self.render_loop.elapsed(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pshape_core::CapVisibility;

    #[test]
    fn test_fit_to_canvas() {
        let mut config = ShapeConfig {
            width: Some(400.0),
            ..ShapeConfig::default()
        };
        fit_to_canvas(&mut config, 160, 80);
        assert_eq!(config.radius, 28.0);
        assert_eq!(config.thickness, 7.0);
        assert_eq!(config.half_extents(), (28.0, 28.0));
    }

    #[test]
    fn test_scale_to_canvas_keeps_proportions() {
        let mut config = ShapeConfig {
            width: Some(300.0),
            resolution_scale: 2.0,
            ..ShapeConfig::default()
        };
        // 1600x1200 backing surface onto 160x80: height bounds the scale
        scale_to_canvas(&mut config, 160, 80);
        let scale = 80.0 / 1200.0;
        assert!((config.radius - 240.0 * scale).abs() < 1e-9);
        assert!((config.thickness - 60.0 * scale).abs() < 1e-9);
        assert_eq!(config.half_extents(), (300.0 * scale, 240.0 * scale));
        assert_eq!(config.pixel_size(), (160, 80));
    }

    #[test]
    fn test_shape_renders_onto_cell_canvas() {
        let mut config = ShapeConfig::default();
        fit_to_canvas(&mut config, 80, 40);
        let textures = TextureManager::new(FileImageHost::new("."));
        let mut canvas = CellCanvas::new(80, 40);
        let mut shape = block_on(Shape::load(&config, Viewport::new(80.0, 40.0), &textures));

        let stats = shape.render_frame(&mut canvas, 0.0);

        assert_eq!(stats.cap, CapVisibility::Top);
        // the top cap is red and covers the center
        assert_eq!(canvas.pixel(40, 20), color::Rgb::new(255, 0, 0));
        assert_eq!(canvas.pixel(0, 0), color::Rgb::BLACK);
    }

    #[test]
    fn test_unknown_side_color_uses_fallback() {
        let mut config = ShapeConfig {
            side_fills: vec!["image.gif".into()],
            speed_x: 1.0,
            speed_y: 0.5,
            ..ShapeConfig::default()
        };
        fit_to_canvas(&mut config, 120, 80);
        let textures = TextureManager::new(FileImageHost::new("."));
        let mut canvas = CellCanvas::new(120, 80);
        let mut shape = block_on(Shape::load(&config, Viewport::new(120.0, 80.0), &textures));

        shape.render_frame(&mut canvas, 1.0);
        let stats = shape.render_frame(&mut canvas, 1.0);

        assert!(stats.sides_drawn > 0);
        let green = color::parse_color("green").unwrap();
        let green_pixels = (0..80)
            .flat_map(|y| (0..120).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == green)
            .count();
        assert!(green_pixels > 0);
    }
}
