//! Synthetic horizon scenes shared by the integration tests.
//!
//! The Earth is rendered as a uniformly warm (bright, low-valued) disc on a
//! cold (dark, high-valued) background, sampled at pixel centres in the same
//! image-centred frame the edge detector reports.

#![allow(dead_code)]

use horizon_attitude::camera_model::CameraModel;
use horizon_attitude::edge_detection::threshold::pixel_to_image;
use horizon_attitude::pixel_grid::{PixelGrid, PIXEL_MAX};
use horizon_attitude::{Vector2, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Sensor value of the Earth's disc.
pub const EARTH: u16 = 1000;
/// Sensor value of space.
pub const SPACE: u16 = 3000;
/// Equatorial Earth radius used by the default pipeline config, km.
pub const EARTH_RADIUS_KM: f32 = 6378.136;

/// A disc of `radius` pixels centred at `center` (image-centred frame).
pub fn render_disc(center: Vector2, radius: f32) -> PixelGrid {
    PixelGrid::from_fn(|row, col| {
        if (pixel_to_image(row, col) - center).norm() < radius {
            EARTH
        } else {
            SPACE
        }
    })
}

/// A disc in ideal (pinhole) coordinates, imaged through `camera`'s lens.
pub fn render_disc_through(camera: &CameraModel, center: Vector2, radius: f32) -> PixelGrid {
    PixelGrid::from_fn(|row, col| {
        let ideal = camera.to_ideal(&pixel_to_image(row, col));
        if (ideal - center).norm() < radius {
            EARTH
        } else {
            SPACE
        }
    })
}

/// Add seeded Gaussian read noise, saturating to the 14-bit range.
pub fn add_noise(image: &PixelGrid, sigma: f32, seed: u64) -> PixelGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, sigma).unwrap();
    PixelGrid::from_fn(|row, col| {
        let v = image[(row, col)] as f32 + normal.sample(&mut rng);
        v.round().clamp(0.0, PIXEL_MAX as f32) as u16
    })
}

/// Nadir direction in the camera frame (+x right, +y up, boresight -z) for
/// a horizon circle, from the horizon-vertex geometry.
pub fn expected_nadir(
    center: Vector2,
    radius: f32,
    altitude_km: f32,
    camera: &CameraModel,
) -> Vector3 {
    let distance = center.norm();
    let towards_earth = center / distance;
    let beta = ((distance - radius) / camera.focal_length_px).atan()
        + (EARTH_RADIUS_KM / (EARTH_RADIUS_KM + altitude_km)).asin();
    Vector3::new(
        towards_earth.x * beta.sin(),
        towards_earth.y * beta.sin(),
        -beta.cos(),
    )
}

/// Unit vector perpendicular to `nadir`, in the plane of `nadir` and `hint`.
pub fn horizontal(nadir: &Vector3, hint: &Vector3) -> Vector3 {
    (hint - nadir * hint.dot(nadir)).normalize()
}

/// Camera-frame field of `strength` counts with the given dip below the
/// horizontal plane toward nadir.
pub fn magnetic_field(nadir: &Vector3, north: &Vector3, strength: f32, dip_deg: f32) -> Vector3 {
    let dip = dip_deg.to_radians();
    (north * dip.cos() + nadir * dip.sin()) * strength
}

/// Angle between two directions, in degrees.
pub fn angle_deg(a: &Vector3, b: &Vector3) -> f32 {
    let c = a.normalize().dot(&b.normalize()).clamp(-1.0, 1.0);
    c.acos().to_degrees()
}
