use crate::F;

/// Diffusion coefficient of a chain with segment length `delta`: `D = delta² / 6`.
pub fn diffusion_coefficient(delta: F) -> F {
    delta * delta / 6.0
}

/// Per-axis standard deviation of one unit-time Brownian-bridge increment
/// taken with `remaining` steps left, including this one.
///
/// Var = 2D (r - 1) / r, so the last increment is deterministic.
pub fn bridge_increment_sigma(diffusion: F, remaining: u32) -> F {
    if remaining == 0 {
        return 0.0;
    }
    let r = remaining as F;
    (2.0 * diffusion * (r - 1.0) / r).sqrt()
}
