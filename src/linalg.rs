//! Fixed-size linear algebra used by every stage of the pipeline.
//!
//! These are thin, allocation-free helpers over `nalgebra` types. They exist
//! as named functions (rather than inline operator use) because the circle
//! fit and attitude derivation depend on their exact formulation: the 3×3
//! inverse is the adjugate form, and quaternion rotation is the sandwich
//! product `q·v·q⁻¹` evaluated directly, never through a rotation matrix.

use nalgebra::{RealField, Vector3 as NVector3};

use crate::{Matrix2, Matrix3, Quaternion, Vector2, Vector3};

/// Euclidean length of a 2-D vector.
pub fn norm2(v: &Vector2) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Determinant of a 2×2 matrix.
///
/// For a matrix whose columns are two vectors `a` and `b` this is the z
/// component of `a × b`, so its sign tells which way `a` turns onto `b`.
pub fn det2(a: &Matrix2) -> f32 {
    a[(0, 0)] * a[(1, 1)] - a[(1, 0)] * a[(0, 1)]
}

/// Determinant of a 3×3 matrix (rule of Sarrus).
pub fn det3<T: RealField + Copy>(a: &nalgebra::Matrix3<T>) -> T {
    a[(0, 0)] * a[(1, 1)] * a[(2, 2)]
        + a[(0, 1)] * a[(1, 2)] * a[(2, 0)]
        + a[(0, 2)] * a[(1, 0)] * a[(2, 1)]
        - a[(0, 2)] * a[(1, 1)] * a[(2, 0)]
        - a[(0, 1)] * a[(1, 0)] * a[(2, 2)]
        - a[(0, 0)] * a[(1, 2)] * a[(2, 1)]
}

/// Adjugate-based inverse of a 3×3 matrix.
///
/// The division by the determinant is unchecked: a singular input produces
/// non-finite entries. Callers must guarantee non-singularity (see
/// [`det3`]); the least-squares circle fit does so before calling.
pub fn invert3<T: RealField + Copy>(a: &nalgebra::Matrix3<T>) -> nalgebra::Matrix3<T> {
    let det = det3(a);
    nalgebra::Matrix3::from_fn(|i, j| {
        // Cofactor of the transposed position, using the cyclic index trick.
        let (i1, i2) = ((j + 1) % 3, (j + 2) % 3);
        let (j1, j2) = ((i + 1) % 3, (i + 2) % 3);
        (a[(i1, j1)] * a[(i2, j2)] - a[(i1, j2)] * a[(i2, j1)]) / det
    })
}

/// Multiply a 3×3 matrix by a 3×1 column vector.
pub fn multiply3x3_3x1<T: RealField + Copy>(
    a: &nalgebra::Matrix3<T>,
    v: &NVector3<T>,
) -> NVector3<T> {
    let mut u = NVector3::<T>::zeros();
    for i in 0..3 {
        for j in 0..3 {
            u[i] += a[(i, j)] * v[j];
        }
    }
    u
}

/// Hamilton product `a * b`.
///
/// Rotating by the result applies `b` first, then `a`.
pub fn quat_multiply(a: &Quaternion, b: &Quaternion) -> Quaternion {
    Quaternion::new(
        a.w * b.w - a.i * b.i - a.j * b.j - a.k * b.k,
        a.w * b.i + a.i * b.w + a.j * b.k - a.k * b.j,
        a.w * b.j - a.i * b.k + a.j * b.w + a.k * b.i,
        a.w * b.k + a.i * b.j - a.j * b.i + a.k * b.w,
    )
}

/// Inverse of a unit quaternion (its conjugate).
pub fn quat_inverse(q: &Quaternion) -> Quaternion {
    Quaternion::new(q.w, -q.i, -q.j, -q.k)
}

/// Scale a quaternion to unit magnitude. A zero quaternion becomes identity.
pub fn quat_normalize(q: &Quaternion) -> Quaternion {
    let magnitude = (q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k).sqrt();
    if magnitude > 0.0 {
        Quaternion::new(
            q.w / magnitude,
            q.i / magnitude,
            q.j / magnitude,
            q.k / magnitude,
        )
    } else {
        Quaternion::identity()
    }
}

/// Rotate `v` by the unit quaternion `q` using the sandwich product `q·v·q⁻¹`.
pub fn quat_rotate(q: &Quaternion, v: &Vector3) -> Vector3 {
    let pure = Quaternion::new(0.0, v.x, v.y, v.z);
    let rotated = quat_multiply(&quat_multiply(q, &pure), &quat_inverse(q));
    Vector3::new(rotated.i, rotated.j, rotated.k)
}

/// Rotation of `angle` radians about the camera x axis.
pub fn quat_about_x(angle: f32) -> Quaternion {
    let (sine, cosine) = (0.5 * angle).sin_cos();
    Quaternion::new(cosine, sine, 0.0, 0.0)
}

/// Rotation of `angle` radians about the camera z (boresight) axis.
pub fn quat_about_z(angle: f32) -> Quaternion {
    let (sine, cosine) = (0.5 * angle).sin_cos();
    Quaternion::new(cosine, 0.0, 0.0, sine)
}

/// 3×3 rotation matrix equivalent of a unit quaternion.
///
/// Used to build reference-frame transforms; rotation of vectors goes
/// through [`quat_rotate`].
pub fn quat_to_matrix(q: &Quaternion) -> Matrix3 {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    Matrix3::new(
        1.0 - 2.0 * (y * y + z * z),
        2.0 * (x * y - z * w),
        2.0 * (x * z + y * w),
        2.0 * (x * y + z * w),
        1.0 - 2.0 * (x * x + z * z),
        2.0 * (y * z - x * w),
        2.0 * (x * z - y * w),
        2.0 * (y * z + x * w),
        1.0 - 2.0 * (x * x + y * y),
    )
}
