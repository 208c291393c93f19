//! Coarse attention-density grid over the stimulus image.
//!
//! This is the numeric counterpart of the painted heatmap overlay: a fixed
//! `N × N` grid over image-natural space holding the number of gaze samples
//! that fell in each bin.

use crate::{
    types::{GazePoint, ImageBounds},
    Error, Result,
};

/// Gaze sample counts per image region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapGrid {
    size: usize,
    cells: Vec<u32>,
    max_count: u32,
}

impl HeatmapGrid {
    /// Bin points (image-natural coordinates) into a `size × size` grid
    ///
    /// Points off the image are skipped. A zero size is treated as 1.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `size × size` overflows.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn from_points(points: &[GazePoint], bounds: &ImageBounds, size: usize) -> Result<Self> {
        let size = size.max(1);
        let len = size
            .checked_mul(size)
            .ok_or_else(|| Error::InvalidInput(format!("Heatmap grid size {size} is too large")))?;
        let mut cells = vec![0u32; len];

        for point in points {
            if !bounds.contains_natural(point.x, point.y) {
                continue;
            }
            let col = ((point.x / bounds.natural_width * size as f64) as usize).min(size - 1);
            let row = ((point.y / bounds.natural_height * size as f64) as usize).min(size - 1);
            let cell = &mut cells[row * size + col];
            *cell = cell.saturating_add(1);
        }

        let max_count = cells.iter().copied().max().unwrap_or(0);
        Ok(Self {
            size,
            cells,
            max_count,
        })
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Count in a cell, `None` outside the grid
    #[must_use]
    pub fn cell(&self, col: usize, row: usize) -> Option<u32> {
        if col >= self.size || row >= self.size {
            return None;
        }
        Some(self.cells[row * self.size + col])
    }

    /// Cell count relative to the busiest cell
    #[must_use]
    pub fn normalized_cell(&self, col: usize, row: usize) -> Option<f64> {
        let value = self.cell(col, row)?;
        if self.max_count == 0 {
            return Some(0.0);
        }
        Some(f64::from(value) / f64::from(self.max_count))
    }

    /// Total number of binned samples
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| u64::from(c)).sum()
    }

    /// Row-major nested rows, as stored in the session result
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.size).map(<[u32]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ImageBounds {
        ImageBounds::new(0.0, 0.0, 100.0, 100.0, 1000.0, 1000.0)
    }

    #[test]
    fn test_heatmap_tracks_hotspot() {
        let points = vec![
            GazePoint::new(150.0, 150.0, 0, 1.0),
            GazePoint::new(160.0, 140.0, 16, 1.0),
            GazePoint::new(120.0, 110.0, 32, 1.0),
            GazePoint::new(950.0, 950.0, 48, 1.0),
        ];
        let grid = HeatmapGrid::from_points(&points, &bounds(), 10).unwrap();

        assert_eq!(grid.cell(1, 1), Some(3));
        assert_eq!(grid.cell(9, 9), Some(1));
        assert_eq!(grid.max_count(), 3);
        assert_eq!(grid.total(), 4);
        assert_eq!(grid.normalized_cell(1, 1), Some(1.0));
    }

    #[test]
    fn test_far_edge_lands_in_last_bin() {
        let points = vec![GazePoint::new(1000.0, 1000.0, 0, 1.0)];
        let grid = HeatmapGrid::from_points(&points, &bounds(), 4).unwrap();
        assert_eq!(grid.cell(3, 3), Some(1));
    }

    #[test]
    fn test_off_image_points_are_skipped() {
        let points = vec![GazePoint::new(1200.0, 10.0, 0, 1.0), GazePoint::new(-1.0, 10.0, 0, 1.0)];
        let grid = HeatmapGrid::from_points(&points, &bounds(), 4).unwrap();
        assert_eq!(grid.total(), 0);
        assert_eq!(grid.normalized_cell(0, 0), Some(0.0));
    }

    #[test]
    fn test_rows_shape() {
        let grid = HeatmapGrid::from_points(&[], &bounds(), 5).unwrap();
        let rows = grid.to_rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 5 && r.iter().all(|&c| c == 0)));
        assert_eq!(grid.cell(5, 0), None);
    }

    #[test]
    fn test_overflowing_size_is_rejected() {
        let result = HeatmapGrid::from_points(&[], &bounds(), 1 << 33);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
