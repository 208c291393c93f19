//! Numeric helpers shared by the calibration heuristics and the renderer.

pub mod safe_cast;

/// Statistical summary of a sample window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Population standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Range (max - min) of the data
    pub range: f64,
}

/// Calculate statistics for a data window
///
/// Returns `None` for an empty iterator.
#[allow(clippy::cast_precision_loss)] // Sample counts stay far below 2^52
pub fn calculate_stats<I>(data: I) -> Option<Statistics>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = data.into_iter().collect();
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(Statistics {
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
        range: max - min,
    })
}

/// Linear interpolation between two values
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
