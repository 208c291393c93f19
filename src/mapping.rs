//! Two-stage coordinate mapping: estimator space to viewport pixels to
//! image-natural pixels.
//!
//! Both stages are plain affine rescales. No smoothing or clipping happens
//! here; points that land off the image are kept and left for
//! [`crate::validation`] to flag.

use crate::{
    types::{CalibrationDomain, GazePoint, ImageBounds, Viewport},
    Result,
};
use log::{debug, warn};

/// Maps raw estimator samples into image-natural coordinates
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    domain: Option<CalibrationDomain>,
    viewport: Viewport,
}

impl CoordinateMapper {
    /// Create a mapper for a calibration domain and viewport
    ///
    /// Without a domain, stage 1 is the identity and mapping accuracy is degraded.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the domain is degenerate or the viewport is empty.
    pub fn new(domain: Option<CalibrationDomain>, viewport: Viewport) -> Result<Self> {
        viewport.validate()?;
        if let Some(domain) = &domain {
            domain.validate()?;
        } else {
            warn!("No calibration domain available; treating estimator space as viewport space (degraded accuracy)");
        }

        Ok(Self { domain, viewport })
    }

    #[must_use]
    pub const fn domain(&self) -> Option<&CalibrationDomain> {
        self.domain.as_ref()
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether stage 1 falls back to the identity transform
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.domain.is_none()
    }

    /// Stage 1: estimator space to viewport pixels
    #[must_use]
    pub fn to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
        match &self.domain {
            Some(d) => (
                (x - d.min_x) / (d.max_x - d.min_x) * self.viewport.width,
                (y - d.min_y) / (d.max_y - d.min_y) * self.viewport.height,
            ),
            None => (x, y),
        }
    }

    /// Stage 2: viewport pixels to image-natural pixels
    #[must_use]
    pub fn viewport_to_image(viewport_x: f64, viewport_y: f64, bounds: &ImageBounds) -> (f64, f64) {
        (
            (viewport_x - bounds.x) / bounds.width * bounds.natural_width,
            (viewport_y - bounds.y) / bounds.height * bounds.natural_height,
        )
    }

    /// Map one sample through both stages; timestamp and confidence pass through
    #[must_use]
    pub fn map_point(&self, point: &GazePoint, bounds: &ImageBounds) -> GazePoint {
        let (vx, vy) = self.to_viewport(point.x, point.y);
        let (ix, iy) = Self::viewport_to_image(vx, vy, bounds);
        GazePoint {
            x: ix,
            y: iy,
            ..*point
        }
    }

    /// Map a whole sample sequence, preserving order
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the image bounds are degenerate.
    pub fn map_points(&self, points: &[GazePoint], bounds: &ImageBounds) -> Result<Vec<GazePoint>> {
        bounds.validate()?;
        let mapped: Vec<GazePoint> = points.iter().map(|p| self.map_point(p, bounds)).collect();
        debug!(
            "Mapped {} samples into {}x{} image space",
            mapped.len(),
            bounds.natural_width,
            bounds.natural_height
        );
        Ok(mapped)
    }
}

/// Rescale an image-natural position into the displayed image box
///
/// The result is relative to the box's top-left corner, i.e. canvas pixels
/// for a canvas sized to the rendered box.
#[must_use]
pub fn image_to_display(x: f64, y: f64, bounds: &ImageBounds) -> (f64, f64) {
    (
        x / bounds.natural_width * bounds.width,
        y / bounds.natural_height * bounds.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            Some(CalibrationDomain::new(0.0, 1000.0, 0.0, 1000.0).unwrap()),
            Viewport::new(1920.0, 1080.0),
        )
        .unwrap()
    }

    #[test]
    fn test_domain_center_maps_to_viewport_center() {
        let (x, y) = mapper().to_viewport(500.0, 500.0);
        assert_eq!(x, 960.0);
        assert_eq!(y, 540.0);
    }

    #[test]
    fn test_domain_origin_maps_to_zero() {
        let (x, y) = mapper().to_viewport(0.0, 0.0);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_offset_domain() {
        let mapper = CoordinateMapper::new(
            Some(CalibrationDomain::new(-200.0, 200.0, 100.0, 300.0).unwrap()),
            Viewport::new(800.0, 600.0),
        )
        .unwrap();
        assert_eq!(mapper.to_viewport(-200.0, 100.0), (0.0, 0.0));
        assert_eq!(mapper.to_viewport(200.0, 300.0), (800.0, 600.0));
        assert_eq!(mapper.to_viewport(0.0, 200.0), (400.0, 300.0));
    }

    #[test]
    fn test_identity_without_domain() {
        let mapper = CoordinateMapper::new(None, Viewport::new(1920.0, 1080.0)).unwrap();
        assert!(mapper.is_identity());
        assert_eq!(mapper.to_viewport(123.5, 456.25), (123.5, 456.25));
    }

    #[test]
    fn test_rejects_degenerate_domain() {
        let domain = CalibrationDomain {
            min_x: 10.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 5.0,
        };
        assert!(CoordinateMapper::new(Some(domain), Viewport::new(100.0, 100.0)).is_err());
    }

    #[test]
    fn test_stage_two_out_of_bounds_is_not_clamped() {
        let bounds = ImageBounds::new(100.0, 50.0, 800.0, 600.0, 4000.0, 3000.0);
        let mapped = mapper().map_point(&GazePoint::new(500.0, 500.0, 42, 0.9), &bounds);

        assert_eq!(mapped.x, 4300.0);
        assert_eq!(mapped.y, 2450.0);
        assert_eq!(mapped.timestamp, 42);
        assert_eq!(mapped.confidence, 0.9);
        assert!(!bounds.contains_natural(mapped.x, mapped.y));
    }

    #[test]
    fn test_image_to_display_inverts_natural_scaling() {
        let bounds = ImageBounds::new(100.0, 50.0, 800.0, 600.0, 4000.0, 3000.0);
        let (ix, iy) = CoordinateMapper::viewport_to_image(500.0, 350.0, &bounds);
        let (dx, dy) = image_to_display(ix, iy, &bounds);
        assert!((dx - 400.0).abs() < 1e-9);
        assert!((dy - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_points_rejects_empty_bounds() {
        let bounds = ImageBounds::new(0.0, 0.0, 0.0, 600.0, 4000.0, 3000.0);
        assert!(mapper().map_points(&[GazePoint::new(1.0, 1.0, 0, 1.0)], &bounds).is_err());
    }
}
