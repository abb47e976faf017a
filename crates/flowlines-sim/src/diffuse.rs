use std::ops::{Add, Mul};

use crate::field::DoubleBuffered;

/// Implicit viscous diffusion by Jacobi relaxation.
///
/// Each pass computes `x' = (x0 + a * sum(neighbors)) / (1 + 4a)` with
/// `a = viscosity * dt`, reading the previous pass's full buffer and writing
/// a fresh one. `x0` is the pre-diffusion field, snapshotted once. Edge cells
/// treat a missing neighbor as themselves. Zero iterations leaves the field
/// untouched.
pub fn diffuse<T>(field: &mut DoubleBuffered<T>, viscosity: f32, dt: f32, iterations: u32)
where
    T: Copy + Default + Add<Output = T> + Mul<f32, Output = T>,
{
    let alpha = viscosity * dt;
    if iterations == 0 || alpha <= 0.0 {
        return;
    }

    let inv = 1.0 / (1.0 + 4.0 * alpha);
    let origin = field.read().clone();
    let (nx, ny) = origin.dim();

    for _ in 0..iterations {
        let (src, dst) = field.read_write();

        for i in 0..nx {
            for j in 0..ny {
                let xm = if i > 0 { i - 1 } else { i };
                let xp = if i + 1 < nx { i + 1 } else { i };
                let ym = if j > 0 { j - 1 } else { j };
                let yp = if j + 1 < ny { j + 1 } else { j };

                let neighbors = src[(xm, j)] + src[(xp, j)] + src[(i, ym)] + src[(i, yp)];
                dst[(i, j)] = (origin[(i, j)] + neighbors * alpha) * inv;
            }
        }

        field.swap();
    }
}
