//! Overlay rendering of gaze data onto a canvas aligned with the displayed
//! stimulus image.
//!
//! Gaze data is stored in image-natural pixels. Every draw rescales it into
//! the currently rendered image box, so the canvas must match that box. The
//! renderer checks this before each draw and rebuilds the canvas when the box
//! changed (layout resize, image load).

/// RGBA drawing surface and primitives
pub mod canvas;

/// Bitmap digits for fixation labels
pub mod glyphs;

use crate::{
    config::RenderConfig,
    mapping::image_to_display,
    types::{Fixation, GazePoint, ImageBounds},
    utils::safe_cast::f64_to_canvas_dim,
    Error, Result,
};
use canvas::{Canvas, Color};
use log::debug;
use std::path::Path;
use std::str::FromStr;

/// Overlay kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Confidence-weighted soft discs per gaze point
    Heatmap,
    /// Time-coloured polyline through the gaze points
    ScanPath,
    /// Numbered markers sized by fixation duration
    Fixations,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heatmap => "heatmap",
            Self::ScanPath => "scanpath",
            Self::Fixations => "fixations",
        }
    }
}

impl FromStr for RenderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "heatmap" => Ok(Self::Heatmap),
            "scanpath" | "scan_path" => Ok(Self::ScanPath),
            "fixations" => Ok(Self::Fixations),
            other => Err(Error::InvalidInput(format!("Unknown overlay '{other}'"))),
        }
    }
}

const HEAT_COLOR: Color = Color::rgba(1.0, 0.15, 0.0, 1.0);
const PATH_START: Color = Color::rgba(0.1, 0.8, 0.2, 0.9);
const PATH_MID: Color = Color::rgba(1.0, 0.85, 0.0, 0.9);
const PATH_END: Color = Color::rgba(0.9, 0.1, 0.1, 0.9);
const FIXATION_FILL: Color = Color::rgba(0.15, 0.4, 1.0, 0.45);
const FIXATION_STROKE: Color = Color::rgba(0.05, 0.2, 0.8, 0.9);
const LABEL_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

/// Paints heatmap, scan path and fixation overlays
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    config: RenderConfig,
    canvas: Canvas,
    bounds: Option<ImageBounds>,
}

impl OverlayRenderer {
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            canvas: Canvas::new(1, 1),
            bounds: None,
        }
    }

    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Match the canvas to the rendered image box
    ///
    /// Returns `true` if the canvas was rebuilt. An unchanged box keeps the
    /// existing canvas and its contents.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for degenerate bounds.
    pub fn ensure_canvas(&mut self, bounds: &ImageBounds) -> Result<bool> {
        bounds.validate()?;
        let width = f64_to_canvas_dim(bounds.width)?;
        let height = f64_to_canvas_dim(bounds.height)?;

        let same_box = self.bounds.as_ref() == Some(bounds)
            && self.canvas.width() == width
            && self.canvas.height() == height;
        if same_box {
            return Ok(false);
        }

        debug!("Resizing overlay canvas to {}x{}", width, height);
        self.canvas = Canvas::new(width, height);
        self.bounds = Some(*bounds);
        Ok(true)
    }

    /// Erase all overlays, keeping the canvas size
    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    /// Paint one overlay mode over the current canvas contents
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds cannot size a canvas.
    pub fn render(
        &mut self,
        mode: RenderMode,
        points: &[GazePoint],
        fixations: &[Fixation],
        bounds: &ImageBounds,
    ) -> Result<()> {
        match mode {
            RenderMode::Heatmap => self.draw_heatmap(points, bounds),
            RenderMode::ScanPath => self.draw_scan_path(points, bounds),
            RenderMode::Fixations => self.draw_fixations(fixations, bounds),
        }
    }

    /// Confidence-weighted soft discs, one per point
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds cannot size a canvas.
    pub fn draw_heatmap(&mut self, points: &[GazePoint], bounds: &ImageBounds) -> Result<()> {
        self.ensure_canvas(bounds)?;
        let radius = self.config.heatmap_radius;
        for point in points {
            let (x, y) = image_to_display(point.x, point.y, bounds);
            let alpha = self.config.heatmap_max_alpha * point.confidence.clamp(0.0, 1.0);
            self.canvas.soft_disc(x, y, radius, HEAT_COLOR.with_alpha(alpha));
        }
        Ok(())
    }

    /// Polyline through the points with a start/mid/end colour gradient
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds cannot size a canvas.
    pub fn draw_scan_path(&mut self, points: &[GazePoint], bounds: &ImageBounds) -> Result<()> {
        self.ensure_canvas(bounds)?;
        let width = self.config.scanpath_line_width;
        let display: Vec<(f64, f64)> = points
            .iter()
            .map(|p| image_to_display(p.x, p.y, bounds))
            .collect();

        for (index, pair) in display.windows(2).enumerate() {
            let color = path_color(index + 1, display.len());
            self.canvas.line(pair[0], pair[1], width, color);
        }
        for (index, &(x, y)) in display.iter().enumerate() {
            self.canvas.fill_circle(x, y, width * 1.5, path_color(index, display.len()));
        }
        Ok(())
    }

    /// Numbered markers sized by fixation duration
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds cannot size a canvas.
    pub fn draw_fixations(&mut self, fixations: &[Fixation], bounds: &ImageBounds) -> Result<()> {
        self.ensure_canvas(bounds)?;
        for (index, fixation) in fixations.iter().enumerate() {
            let (x, y) = image_to_display(fixation.x, fixation.y, bounds);
            let radius = self.fixation_radius(fixation.duration);
            self.canvas.fill_circle(x, y, radius, FIXATION_FILL);
            self.canvas.stroke_circle(x, y, radius, 2.0, FIXATION_STROKE);
            self.canvas
                .draw_label(&(index + 1).to_string(), x, y, self.config.label_scale, LABEL_COLOR);
        }
        Ok(())
    }

    /// Marker radius for a fixation duration, clamped to the configured range
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fixation_radius(&self, duration_ms: i64) -> f64 {
        let c = &self.config;
        (c.fixation_min_radius + duration_ms.max(0) as f64 * c.fixation_radius_per_ms)
            .clamp(c.fixation_min_radius, c.fixation_max_radius)
    }

    /// Write the current canvas to disk
    ///
    /// # Errors
    ///
    /// Returns `Error::Image` if the file cannot be written.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.canvas.save(path)
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Three-band gradient colour for the `index`-th of `len` points
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn path_color(index: usize, len: usize) -> Color {
    if len <= 1 {
        return PATH_START;
    }
    let t = index.min(len - 1) as f64 / (len - 1) as f64;
    if t <= 0.5 {
        PATH_START.mix(PATH_MID, t * 2.0)
    } else {
        PATH_MID.mix(PATH_END, (t - 0.5) * 2.0)
    }
}
