//! Horizon edge detection on the raw sensor frame.
//!
//! A Canny-style detector over fixed buffers:
//!
//! 1. **Smoothing** with a 3×3 Gaussian
//! 2. **Gradients** with horizontal and vertical Sobel kernels (saturating)
//! 3. **Magnitude / phase** via `hypot` and `atan2`
//! 4. **Non-maximum suppression** along one of four gradient directions
//! 5. **Double thresholding** relative to the strongest response
//! 6. **Hysteresis**, a single 8-neighbour pass (no flood fill)
//! 7. **Extraction** of edge pixels as image-centred points
//!
//! None of these steps fail. An image with no horizon simply produces few or
//! no edge points, which the attitude estimator rejects.

pub mod convolution;
pub mod suppression;
pub mod threshold;

use rkyv::{Archive, Deserialize, Serialize};
use tracing::debug;

use crate::pixel_grid::{Grid, PixelGrid};
use crate::Vector2;

pub use threshold::{Thresholds, STRONG, WEAK};

/// Edge detector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
pub struct EdgeDetectionConfig {
    /// Low threshold as a fraction of the high threshold. Default 0.5.
    pub low_ratio: f32,
    /// High threshold as a fraction of the strongest suppressed magnitude.
    /// Default 0.8.
    pub high_ratio: f32,
}

impl Default for EdgeDetectionConfig {
    fn default() -> Self {
        Self {
            low_ratio: 0.5,
            high_ratio: 0.8,
        }
    }
}

/// Intermediate grids of one detection pass, allocated once and reused.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    blurred: Grid<i16>,
    grad_x: Grid<i16>,
    grad_y: Grid<i16>,
    magnitude: Grid<i16>,
    phase: Grid<f64>,
    suppressed: Grid<i16>,
    classified: Grid<i16>,
    edges: Grid<i16>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full detector on `image`, writing edge points into `points`.
    ///
    /// `points` is cleared first; give it a capacity of
    /// [`NUM_PIXELS`](crate::pixel_grid::NUM_PIXELS) to keep the pass free of
    /// allocation.
    pub fn detect(
        &mut self,
        image: &PixelGrid,
        config: &EdgeDetectionConfig,
        points: &mut Vec<Vector2>,
    ) -> Thresholds {
        convolution::gaussian_blur(image, &mut self.blurred);
        convolution::sobel(&self.blurred, &mut self.grad_x, &convolution::SOBEL_X);
        convolution::sobel(&self.blurred, &mut self.grad_y, &convolution::SOBEL_Y);
        suppression::magnitude_and_phase(
            &self.grad_x,
            &self.grad_y,
            &mut self.magnitude,
            &mut self.phase,
        );
        suppression::non_max_suppression(&self.magnitude, &self.phase, &mut self.suppressed);
        let thresholds = threshold::double_threshold(
            &self.suppressed,
            &mut self.classified,
            config.low_ratio,
            config.high_ratio,
        );
        threshold::hysteresis(&self.classified, &mut self.edges);
        threshold::extract_edge_points(&self.edges, points);

        debug!(
            "Edge detection: max magnitude {}, thresholds [{}, {}], {} edge points",
            thresholds.max,
            thresholds.low,
            thresholds.high,
            points.len()
        );
        thresholds
    }

    /// Gradient magnitude of the last pass.
    pub fn magnitude(&self) -> &Grid<i16> {
        &self.magnitude
    }

    /// Final binary edge map of the last pass (`STRONG` or zero).
    pub fn edges(&self) -> &Grid<i16> {
        &self.edges
    }
}
