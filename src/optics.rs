//! The optics kernel
//!
//! Pure direction math shared by every trace step. Both functions expect
//! unit inputs with the normal oriented against the incident direction;
//! neither re-normalizes its output.

use crate::Vec3;

/// Mirror reflection of `v` about `normal`
pub fn reflect(v: &Vec3, normal: &Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Refraction direction for an incident direction, surface normal and
/// index ratio `eta` (incident medium over transmitted medium)
///
/// Computes `eta * v + (eta * cos_i - sqrt(cos_t2)) * normal` where
/// `cos_i = dot(-v, normal)`. When `cos_t2` is non-positive no
/// transmitted direction exists (total internal reflection) and the zero
/// vector is returned; callers treat that as the prune signal.
pub fn refract(v: &Vec3, normal: &Vec3, eta: f64) -> Vec3 {
    let cos_i = -v.dot(normal);
    let cos_t2 = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if cos_t2 <= 0.0 {
        return Vec3::zeros();
    }
    eta * v + (eta * cos_i - cos_t2.sqrt()) * normal
}
