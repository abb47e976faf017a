use std::ops::{Add, Mul};

use glam::Vec2;
use ndarray::{Array2, Zip};

use crate::field::bilinear;

/// Semi-Lagrangian transport of `src` along `velocity` into `dst`.
///
/// Every cell back-traces by `velocity * dt * time_scale`, samples `src` at
/// the traced coordinate, and stores the sample scaled by the dissipation
/// factor. `time_scale` is the global advection speed adjustment and applies
/// to every advected quantity, not just velocity self-advection.
///
/// For self-advection, pass the same buffer as `src` and `velocity`.
pub fn advect<T>(
    src: &Array2<T>,
    velocity: &Array2<Vec2>,
    dst: &mut Array2<T>,
    dt: f32,
    dissipation: f32,
    time_scale: f32,
) where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let keep = (1.0 - dissipation * dt).max(0.0);
    let step = dt * time_scale;

    Zip::indexed(dst).for_each(|(i, j), out| {
        let pos = Vec2::new(i as f32, j as f32);
        let traced = pos - velocity[(i, j)] * step;
        *out = bilinear(src, traced) * keep;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_velocity_is_identity() {
        let mut src: Array2<f32> = Array2::zeros((6, 6));
        src[(2, 3)] = 4.0;
        src[(5, 0)] = -1.5;

        let velocity = Array2::from_elem((6, 6), Vec2::ZERO);
        let mut dst = Array2::zeros((6, 6));

        advect(&src, &velocity, &mut dst, 0.5, 0.0, 1.0);

        assert_eq!(src, dst);
    }

    #[test]
    fn dissipation_scales_the_result() {
        let mut src: Array2<f32> = Array2::zeros((4, 4));
        src[(1, 1)] = 2.0;

        let velocity = Array2::from_elem((4, 4), Vec2::ZERO);
        let mut dst = Array2::zeros((4, 4));

        advect(&src, &velocity, &mut dst, 1.0, 0.25, 1.0);

        assert!((dst[(1, 1)] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn dissipation_never_flips_sign() {
        let mut src: Array2<f32> = Array2::zeros((4, 4));
        src[(1, 1)] = 2.0;

        let velocity = Array2::from_elem((4, 4), Vec2::ZERO);
        let mut dst = Array2::zeros((4, 4));

        advect(&src, &velocity, &mut dst, 1.0, 3.0, 1.0);

        assert_eq!(dst[(1, 1)], 0.0);
    }

    #[test]
    fn uniform_flow_translates_the_field() {
        let mut src: Array2<f32> = Array2::zeros((8, 8));
        src[(2, 4)] = 1.0;

        // One cell per unit time, rightwards.
        let velocity = Array2::from_elem((8, 8), Vec2::new(1.0, 0.0));
        let mut dst = Array2::zeros((8, 8));

        advect(&src, &velocity, &mut dst, 1.0, 0.0, 1.0);

        assert!((dst[(3, 4)] - 1.0).abs() < 1e-6);
        assert!(dst[(2, 4)].abs() < 1e-6);
    }

    #[test]
    fn time_scale_multiplies_the_trace_distance() {
        let mut src: Array2<f32> = Array2::zeros((8, 8));
        src[(2, 4)] = 1.0;

        let velocity = Array2::from_elem((8, 8), Vec2::new(1.0, 0.0));
        let mut dst = Array2::zeros((8, 8));

        advect(&src, &velocity, &mut dst, 1.0, 0.0, 2.0);

        assert!((dst[(4, 4)] - 1.0).abs() < 1e-6);
    }
}
