/// Frame loop with an explicit start/stop lifecycle
use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::raster::Surface;
use crate::shape::{FrameStats, Shape};
use crate::texture::Raster;

/// Monotonic clock in seconds, supplied by the host
pub trait Clock {
    fn now_seconds(&self) -> f64;
}

/// Cloneable handle that stops a running [`RenderLoop`]
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
        }
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Default for LoopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one shape, one frame per host callback.
///
/// Elapsed time is measured from the loop's own start, so shapes started at
/// different times animate independently.
pub struct RenderLoop<R, C> {
    shape: Shape<R>,
    clock: C,
    start: f64,
    handle: LoopHandle,
    surface_configured: bool,
    frames: u64,
}

impl<R: Raster, C: Clock> RenderLoop<R, C> {
    pub fn new(shape: Shape<R>, clock: C) -> Self {
        Self::with_handle(shape, clock, LoopHandle::new())
    }

    /// Start a loop controlled by an existing handle, e.g. one handed out
    /// before the shape finished loading
    pub fn with_handle(shape: Shape<R>, clock: C, handle: LoopHandle) -> Self {
        let start = clock.now_seconds();
        Self {
            shape,
            clock,
            start,
            handle,
            surface_configured: false,
            frames: 0,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.now_seconds() - self.start
    }

    /// Draw one frame.
    ///
    /// Returns `false` once the loop has been stopped; the host should not
    /// schedule another frame after that. Nothing is drawn until every fill
    /// of the shape has settled.
    pub fn tick<S: Surface<Image = R>>(&mut self, surface: &mut S) -> bool {
        self.tick_with_stats(surface).is_some() || self.handle.is_running()
    }

    /// Like [`RenderLoop::tick`], returning what was drawn
    pub fn tick_with_stats<S: Surface<Image = R>>(&mut self, surface: &mut S) -> Option<FrameStats> {
        if !self.handle.is_running() || !self.shape.is_settled() {
            return None;
        }

        if !self.surface_configured {
            self.shape.configure_surface(surface);
            self.surface_configured = true;
            debug!("first frame for shape with {} sides", self.shape.model().num_sides());
        }

        let elapsed = self.elapsed();
        let stats = self.shape.render_frame(surface, elapsed);
        self.frames += 1;
        Some(stats)
    }
}
