//! One estimation cycle: image and magnetometer in, nadir and orientation out.
//!
//! [`HorizonSensor`] owns every buffer a cycle needs (edge detector grids
//! and the edge point list), allocated once at construction, so a cycle
//! performs no heap allocation with either fit algorithm.

use std::path::Path;

use anyhow::{Context, Result};
use rkyv::{Archive, Deserialize, Serialize};
use tracing::{debug, info};

use crate::attitude::{estimate_attitude, EulerAngles, RejectionCode};
use crate::camera_model::CameraModel;
use crate::circle_fit::{fit_circle, Circle, FitAlgorithm, FitStatistics};
use crate::edge_detection::{EdgeDetectionConfig, EdgeDetector, Thresholds};
use crate::magnetometer::{MagnetometerReading, MagnetometerTransform};
use crate::perf::{CycleCounter, InstantCounter};
use crate::pixel_grid::{PixelGrid, NUM_PIXELS};
use crate::{Quaternion, Vector2, Vector3};

/// Every tunable of the pipeline.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Edge detector threshold ratios.
    pub edge: EdgeDetectionConfig,
    /// Fewer edge points than this rejects the frame (code 1). Default 50.
    pub min_edge_points: usize,
    /// A fitted radius below this rejects the frame (code 2), in pixels.
    /// Default 20.
    pub min_circle_radius: f32,
    /// Default [`FitAlgorithm::LeastSquares`].
    pub fit_algorithm: FitAlgorithm,
    /// Sampling stride of the chord fit. Default 20.
    ///
    /// A horizon arc on the 120 × 160 frame yields a few hundred edge points,
    /// so stride 20 keeps only about ten samples. With that few the chord
    /// centre is pulled toward the arc: expect 2° to 4° of nadir error and
    /// up to 6° in yaw. Stride 5 brings nadir within 2°. The
    /// least-squares fit stays under 1° on the same frames.
    pub chord_subset_stride: usize,
    /// Sensor optics. Default: 57° horizontal FOV over 160 px, no distortion.
    pub camera: CameraModel,
    /// Equatorial Earth radius in km. Default 6378.136.
    pub earth_radius_km: f32,
    /// Report residual statistics for accepted fits. Default true.
    pub compute_fit_statistics: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            edge: EdgeDetectionConfig::default(),
            min_edge_points: 50,
            min_circle_radius: 20.0,
            fit_algorithm: FitAlgorithm::LeastSquares,
            chord_subset_stride: 20,
            camera: CameraModel::default(),
            earth_radius_km: 6378.136,
            compute_fit_statistics: true,
        }
    }
}

impl PipelineConfig {
    /// Serialize the configuration to bytes using rkyv.
    pub fn to_rkyv_bytes(&self) -> Result<Vec<u8>> {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map_err(|e| anyhow::anyhow!("rkyv serialization failed: {}", e))?;
        Ok(bytes.to_vec())
    }

    /// Deserialize a configuration produced by [`to_rkyv_bytes`](Self::to_rkyv_bytes).
    pub fn from_rkyv_bytes(bytes: &[u8]) -> Result<Self> {
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| anyhow::anyhow!("rkyv deserialization failed: {}", e))
    }

    /// Save the configuration to a file using rkyv.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_rkyv_bytes()?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        info!("Saved pipeline config to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Load a configuration from an rkyv file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_rkyv_bytes(&bytes)?;
        info!(
            "Loaded pipeline config: {:?} fit, thresholds {}/{}, min {} points, min radius {}",
            config.fit_algorithm,
            config.edge.low_ratio,
            config.edge.high_ratio,
            config.min_edge_points,
            config.min_circle_radius
        );
        Ok(config)
    }
}

/// Outcome of one estimation cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimationResult {
    /// Unit nadir vector in the camera frame; zeros when rejected.
    pub nadir: Vector3,
    /// Orientation quaternion; zeros when rejected.
    pub orientation: Quaternion,
    pub rejection: RejectionCode,
    pub euler: EulerAngles,
    /// Edge points found by the detector.
    pub num_edge_points: usize,
    /// Fitted circle ([`Circle::DEGENERATE`] when no fit was attempted).
    pub circle: Circle,
    /// Edge detector threshold levels of this frame.
    pub thresholds: Thresholds,
    /// Present for accepted fits when enabled in the config.
    pub fit_statistics: Option<FitStatistics>,
    /// Cycle duration in counter ticks.
    pub elapsed_ticks: u64,
}

impl EstimationResult {
    pub fn is_valid(&self) -> bool {
        self.rejection.is_valid()
    }

    /// Telemetry rejection code: 0 valid, 1 insufficient edge points,
    /// 2 fit radius too small.
    pub fn rejection_code(&self) -> u8 {
        self.rejection.as_code()
    }
}

/// The horizon sensor processing chain with its pre-allocated workspace.
pub struct HorizonSensor<C: CycleCounter = InstantCounter> {
    config: PipelineConfig,
    detector: EdgeDetector,
    points: Vec<Vector2>,
    counter: C,
}

impl HorizonSensor<InstantCounter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_counter(config, InstantCounter::new())
    }
}

impl Default for HorizonSensor<InstantCounter> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<C: CycleCounter> HorizonSensor<C> {
    pub fn with_counter(config: PipelineConfig, counter: C) -> Self {
        Self {
            config,
            detector: EdgeDetector::new(),
            points: Vec::with_capacity(NUM_PIXELS),
            counter,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Edge points of the last cycle, after distortion correction.
    pub fn edge_points(&self) -> &[Vector2] {
        &self.points
    }

    pub fn detector(&self) -> &EdgeDetector {
        &self.detector
    }

    /// Run one cycle.
    ///
    /// Never fails: frames without a usable horizon come back with a
    /// non-zero rejection code and zeroed nadir/orientation.
    pub fn estimate(
        &mut self,
        image: &PixelGrid,
        altitude_km: f32,
        reading: &MagnetometerReading,
        transform: &MagnetometerTransform,
    ) -> EstimationResult {
        let start = self.counter.now();
        let config = &self.config;

        let thresholds = self.detector.detect(image, &config.edge, &mut self.points);
        let num_edge_points = self.points.len();
        config.camera.correct_points(&mut self.points);

        let circle = if num_edge_points >= config.min_edge_points {
            fit_circle(&self.points, config.fit_algorithm, config.chord_subset_stride)
        } else {
            Circle::DEGENERATE
        };
        debug!(
            "Circle fit ({:?}): centre ({:.2}, {:.2}), radius {:.2}",
            config.fit_algorithm, circle.center.x, circle.center.y, circle.radius
        );

        let field = transform.to_camera_frame(reading);
        let attitude = estimate_attitude(&circle, num_edge_points, altitude_km, &field, config);

        let fit_statistics = if config.compute_fit_statistics && attitude.is_valid() {
            circle.residual_statistics(&self.points)
        } else {
            None
        };

        let elapsed_ticks = self.counter.elapsed_since(start);
        debug!(
            "Cycle complete: {} in {:.3} ms",
            attitude.rejection,
            self.counter.ticks_to_ms(elapsed_ticks)
        );

        EstimationResult {
            nadir: attitude.nadir,
            orientation: attitude.orientation,
            rejection: attitude.rejection,
            euler: attitude.euler,
            num_edge_points,
            circle,
            thresholds,
            fit_statistics,
            elapsed_ticks,
        }
    }
}

/// Run a single cycle with a freshly allocated workspace.
pub fn estimate(
    image: &PixelGrid,
    altitude_km: f32,
    reading: &MagnetometerReading,
    transform: &MagnetometerTransform,
    config: &PipelineConfig,
) -> EstimationResult {
    HorizonSensor::new(config.clone()).estimate(image, altitude_km, reading, transform)
}
