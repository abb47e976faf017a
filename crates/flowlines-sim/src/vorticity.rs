use glam::Vec2;
use ndarray::Array2;

use crate::field::{DoubleBuffered, FieldStore};

/// Gradient magnitudes below this contribute no confinement force.
const GRADIENT_EPSILON: f32 = 1e-5;

/// Re-injects small-scale rotation lost to the diffusion and advection
/// passes. Computes the scalar curl, then pushes each cell along the
/// normalized gradient of |curl| rotated a quarter turn, scaled by the local
/// curl. Cells where the gradient is numerically negligible are skipped so
/// no division by near-zero reaches the field.
pub fn apply(fields: &mut FieldStore, strength: f32, dt: f32) {
    if strength == 0.0 {
        return;
    }

    compute_curl(fields.velocity.read(), fields.curl.back_mut());
    fields.curl.swap();

    confine(&mut fields.velocity, fields.curl.read(), strength, dt);
}

/// `curl = 0.5 * ((vy[right] - vy[left]) - (vx[up] - vx[down]))`.
pub fn compute_curl(velocity: &Array2<Vec2>, out: &mut Array2<f32>) {
    let (nx, ny) = velocity.dim();

    for i in 0..nx {
        for j in 0..ny {
            let xm = if i > 0 { i - 1 } else { i };
            let xp = if i + 1 < nx { i + 1 } else { i };
            let ym = if j > 0 { j - 1 } else { j };
            let yp = if j + 1 < ny { j + 1 } else { j };

            out[(i, j)] = 0.5
                * ((velocity[(xp, j)].y - velocity[(xm, j)].y)
                    - (velocity[(i, yp)].x - velocity[(i, ym)].x));
        }
    }
}

fn confine(velocity: &mut DoubleBuffered<Vec2>, curl: &Array2<f32>, strength: f32, dt: f32) {
    let (nx, ny) = curl.dim();
    let (src, dst) = velocity.read_write();

    for i in 0..nx {
        for j in 0..ny {
            let xm = if i > 0 { i - 1 } else { i };
            let xp = if i + 1 < nx { i + 1 } else { i };
            let ym = if j > 0 { j - 1 } else { j };
            let yp = if j + 1 < ny { j + 1 } else { j };

            let grad = Vec2::new(
                curl[(xp, j)].abs() - curl[(xm, j)].abs(),
                curl[(i, yp)].abs() - curl[(i, ym)].abs(),
            ) * 0.5;

            let len = grad.length();
            if len < GRADIENT_EPSILON {
                dst[(i, j)] = src[(i, j)];
                continue;
            }

            let n = grad / len;
            let force = Vec2::new(n.y, -n.x) * (strength * curl[(i, j)] * dt);
            dst[(i, j)] = src[(i, j)] + force;
        }
    }

    velocity.swap();
}
