use crate::{EPSILON, F};
use nalgebra::Vector2;

/// `raw / ‖raw‖`, or `None` when the norm is too small (or not finite) to
/// normalize safely.
pub fn normalize(raw: Vector2<F>) -> Option<Vector2<F>> {
    let norm = raw.norm();
    if norm.is_finite() && norm >= EPSILON {
        Some(raw / norm)
    } else {
        None
    }
}
