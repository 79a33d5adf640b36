//! # horizon-attitude
//!
//! Spacecraft **attitude from a single infrared horizon image** and a
//! three-axis magnetometer reading.
//!
//! A 120×160 thermal frame of the Earth's limb is reduced to a circle
//! approximating the horizon arc. The circle's offset and radius give roll
//! and pitch relative to nadir (with the orbit altitude and the sensor field
//! of view); the magnetic field projected onto the local horizontal plane
//! gives yaw. The result is a nadir vector and a full orientation
//! quaternion, or a rejection code when the frame has no usable horizon.
//!
//! ## Example
//!
//! ```no_run
//! use horizon_attitude::{
//!     HorizonSensor, MagnetometerReading, MagnetometerTransform, PipelineConfig, PixelGrid,
//! };
//!
//! let image = PixelGrid::load_raw("data/frame_0001.raw").unwrap();
//! let mut sensor = HorizonSensor::new(PipelineConfig::default());
//!
//! let result = sensor.estimate(
//!     &image,
//!     500.0, // altitude, km
//!     &MagnetometerReading::new(-312, 1840, -2290),
//!     &MagnetometerTransform::identity(),
//! );
//! if result.is_valid() {
//!     println!("nadir {:?}, orientation {}", result.nadir, result.orientation);
//! } else {
//!     println!("rejected: {}", result.rejection);
//! }
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Edge detection**: Canny-style chain over fixed buffers (Gaussian blur,
//!    Sobel gradients, non-maximum suppression, double threshold, single-pass
//!    hysteresis) yielding image-centred edge points
//! 2. **Distortion removal**: optional radial lens correction of the points
//! 3. **Circle fit**: algebraic least squares, or chord-bisector intersection
//! 4. **Attitude**: roll and pitch from the circle, yaw from the magnetic
//!    field, composed as `(roll * pitch) * yaw`
//! 5. **Gating**: too few edge points or too small a radius rejects the frame

pub mod attitude;
pub mod camera_model;
pub mod circle_fit;
pub mod distortion;
pub mod edge_detection;
pub mod linalg;
pub mod magnetometer;
pub mod perf;
pub mod pipeline;
pub mod pixel_grid;

pub use attitude::{AttitudeEstimate, EulerAngles, RejectionCode};
pub use camera_model::CameraModel;
pub use circle_fit::{Circle, FitAlgorithm, FitStatistics};
pub use distortion::{Distortion, RadialDistortion};
pub use edge_detection::{EdgeDetectionConfig, EdgeDetector};
pub use magnetometer::{GeomagneticModel, MagnetometerReading, MagnetometerTransform};
pub use perf::{CycleCounter, InstantCounter};
pub use pipeline::{estimate, EstimationResult, HorizonSensor, PipelineConfig};
pub use pixel_grid::{Grid, PixelGrid};

// Commonly used types
// 32-bit floats throughout, matching the flight processor's FPU.
// The least-squares normal equations switch to 64-bit internally.
pub type Quaternion = nalgebra::Quaternion<f32>;
pub type Vector2 = nalgebra::Vector2<f32>;
pub type Vector3 = nalgebra::Vector3<f32>;
pub type Matrix2 = nalgebra::Matrix2<f32>;
pub type Matrix3 = nalgebra::Matrix3<f32>;
