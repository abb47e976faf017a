use glam::Vec2;
use ndarray::Array2;

use crate::field::{DoubleBuffered, FieldStore};

/// Removes the divergent part of the velocity field.
///
/// Divergence is measured with central differences, the Poisson equation
/// `laplacian(p) = div` is relaxed for exactly `iterations` Jacobi passes
/// seeded from the previous frame's pressure, and the pressure gradient is
/// subtracted from velocity. The iteration count is a quality knob, not a
/// convergence test; zero iterations is an identity pass that touches
/// neither pressure nor velocity.
pub fn project(fields: &mut FieldStore, iterations: u32) {
    if iterations == 0 {
        return;
    }

    compute_divergence(fields.velocity.read(), fields.divergence.back_mut());
    fields.divergence.swap();

    relax_pressure(&mut fields.pressure, fields.divergence.read(), iterations);

    subtract_gradient(&mut fields.velocity, fields.pressure.read());
}

/// `div = 0.5 * ((vx[right] - vx[left]) + (vy[up] - vy[down]))`, edge cells
/// substituting themselves for missing neighbors.
pub fn compute_divergence(velocity: &Array2<Vec2>, out: &mut Array2<f32>) {
    let (nx, ny) = velocity.dim();

    for i in 0..nx {
        for j in 0..ny {
            let xm = if i > 0 { i - 1 } else { i };
            let xp = if i + 1 < nx { i + 1 } else { i };
            let ym = if j > 0 { j - 1 } else { j };
            let yp = if j + 1 < ny { j + 1 } else { j };

            out[(i, j)] = 0.5
                * ((velocity[(xp, j)].x - velocity[(xm, j)].x)
                    + (velocity[(i, yp)].y - velocity[(i, ym)].y));
        }
    }
}

fn relax_pressure(pressure: &mut DoubleBuffered<f32>, divergence: &Array2<f32>, iterations: u32) {
    let (nx, ny) = divergence.dim();

    for _ in 0..iterations {
        let (src, dst) = pressure.read_write();

        for i in 0..nx {
            for j in 0..ny {
                let xm = if i > 0 { i - 1 } else { i };
                let xp = if i + 1 < nx { i + 1 } else { i };
                let ym = if j > 0 { j - 1 } else { j };
                let yp = if j + 1 < ny { j + 1 } else { j };

                let neighbors = src[(xm, j)] + src[(xp, j)] + src[(i, ym)] + src[(i, yp)];
                dst[(i, j)] = (neighbors - divergence[(i, j)]) * 0.25;
            }
        }

        pressure.swap();
    }
}

fn subtract_gradient(velocity: &mut DoubleBuffered<Vec2>, pressure: &Array2<f32>) {
    let (nx, ny) = pressure.dim();
    let (src, dst) = velocity.read_write();

    for i in 0..nx {
        for j in 0..ny {
            let xm = if i > 0 { i - 1 } else { i };
            let xp = if i + 1 < nx { i + 1 } else { i };
            let ym = if j > 0 { j - 1 } else { j };
            let yp = if j + 1 < ny { j + 1 } else { j };

            let grad = Vec2::new(
                pressure[(xp, j)] - pressure[(xm, j)],
                pressure[(i, yp)] - pressure[(i, ym)],
            ) * 0.5;

            dst[(i, j)] = src[(i, j)] - grad;
        }
    }

    velocity.swap();
}

#[cfg(test)]
mod tests {
    use crate::field::FieldStore;

    use super::*;

    fn max_abs(field: &Array2<f32>) -> f32 {
        field.iter().fold(0.0f32, |m, v| m.max(v.abs()))
    }

    #[test]
    fn uniform_flow_has_no_divergence() {
        let velocity = Array2::from_elem((8, 8), Vec2::new(1.0, -2.0));
        let mut div = Array2::zeros((8, 8));

        compute_divergence(&velocity, &mut div);

        // Interior cells see identical neighbors either side.
        assert_eq!(div[(4, 4)], 0.0);
        assert_eq!(div[(2, 5)], 0.0);
    }

    #[test]
    fn projection_removes_divergence_of_a_smooth_impulse() {
        let mut fields = FieldStore::new(24, 24).unwrap();

        // Gaussian-weighted rightward impulse centred on the grid; smooth
        // enough that the central-difference operators resolve it.
        let sigma2 = 2.0f32 * 2.0;
        for ((i, j), v) in fields.velocity.read_mut().indexed_iter_mut() {
            let dx = i as f32 - 12.0;
            let dy = j as f32 - 12.0;
            v.x = (-(dx * dx + dy * dy) / (2.0 * sigma2)).exp();
        }

        let mut before = Array2::zeros((24, 24));
        compute_divergence(fields.velocity.read(), &mut before);
        assert!(max_abs(&before) > 0.05);

        project(&mut fields, 300);

        let mut after = Array2::zeros((24, 24));
        compute_divergence(fields.velocity.read(), &mut after);

        // The spacing-2 divergence and gradient stencils compose to a wide
        // Laplacian, while the relaxation uses the compact 5-point stencil,
        // so a discretization residual of roughly 3.5e-2 survives any
        // iteration count for this seed.
        assert!(max_abs(&after) < 5e-2, "residual divergence {}", max_abs(&after));
        assert!(max_abs(&after) < 0.2 * max_abs(&before));
    }

    #[test]
    fn pressure_persists_as_a_warm_start() {
        let mut fields = FieldStore::new(16, 16).unwrap();
        fields.velocity.read_mut()[(8, 8)] = Vec2::new(1.0, 0.0);

        project(&mut fields, 40);
        assert!(max_abs(fields.pressure.read()) > 0.0);

        // The next solve relaxes from the stored pressure rather than from
        // zero: one pass over a divergence-free field averages the warm
        // values instead of wiping them.
        fields.velocity.read_mut().fill(Vec2::ZERO);
        project(&mut fields, 1);
        assert!(max_abs(fields.pressure.read()) > 0.0);
    }

    #[test]
    fn zero_iterations_is_an_identity_pass() {
        let mut fields = FieldStore::new(8, 8).unwrap();
        fields.velocity.read_mut()[(4, 4)] = Vec2::new(1.0, 1.0);
        project(&mut fields, 30);

        let velocity_before = fields.velocity.read().clone();
        let pressure_before = fields.pressure.read().clone();

        project(&mut fields, 0);

        assert_eq!(*fields.velocity.read(), velocity_before);
        assert_eq!(*fields.pressure.read(), pressure_before);
    }
}
