use std::ops::{Add, Mul};

use glam::Vec2;
use ndarray::Array2;

use crate::settings::ConfigError;

/// A pair of equally sized buffers addressed by a front index.
///
/// Solver passes read the front buffer and write the back buffer, then flip
/// the index with [`swap`](Self::swap). [`read_write`](Self::read_write)
/// hands out the two buffers together, so a pass cannot write the buffer it
/// is reading.
#[derive(Debug, Clone)]
pub struct DoubleBuffered<T> {
    bufs: [Array2<T>; 2],
    front: usize,
}

impl<T: Copy + Default> DoubleBuffered<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bufs: [
                Array2::from_elem((width, height), T::default()),
                Array2::from_elem((width, height), T::default()),
            ],
            front: 0,
        }
    }

    #[inline]
    pub fn read(&self) -> &Array2<T> {
        &self.bufs[self.front]
    }

    #[inline]
    pub fn read_mut(&mut self) -> &mut Array2<T> {
        &mut self.bufs[self.front]
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut Array2<T> {
        &mut self.bufs[self.front ^ 1]
    }

    /// Front buffer for reading, back buffer for writing.
    #[inline]
    pub fn read_write(&mut self) -> (&Array2<T>, &mut Array2<T>) {
        let (a, b) = self.bufs.split_at_mut(1);
        if self.front == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// O(1) index flip; no data moves.
    #[inline]
    pub fn swap(&mut self) {
        self.front ^= 1;
    }
}

/// Bilinear sample at a continuous grid coordinate, clamped to the edges.
pub fn bilinear<T>(field: &Array2<T>, pos: Vec2) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let (nx, ny) = field.dim();

    let x = pos.x.clamp(0.0, (nx - 1) as f32);
    let y = pos.y.clamp(0.0, (ny - 1) as f32);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(nx - 1);
    let y1 = (y0 + 1).min(ny - 1);

    let tx = x - x0 as f32;
    let ty = y - y0 as f32;

    let bottom = field[(x0, y0)] * (1.0 - tx) + field[(x1, y0)] * tx;
    let top = field[(x0, y1)] * (1.0 - tx) + field[(x1, y1)] * tx;

    bottom * (1.0 - ty) + top * ty
}

/// Owns every grid field of the simulation, all double buffered.
#[derive(Debug, Clone)]
pub struct FieldStore {
    width: usize,
    height: usize,
    pub velocity: DoubleBuffered<Vec2>,
    pub pressure: DoubleBuffered<f32>,
    pub divergence: DoubleBuffered<f32>,
    pub curl: DoubleBuffered<f32>,
}

impl FieldStore {
    /// Allocates zero-filled fields. Zero dimensions are rejected before
    /// anything is allocated.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }

        let (w, h) = (width as usize, height as usize);

        Ok(Self {
            width: w,
            height: h,
            velocity: DoubleBuffered::new(w, h),
            pressure: DoubleBuffered::new(w, h),
            divergence: DoubleBuffered::new(w, h),
            curl: DoubleBuffered::new(w, h),
        })
    }

    /// Reallocates all fields at the new resolution, zeroing every buffer.
    /// On error the previous fields are left untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn sample_velocity(&self, pos: Vec2) -> Vec2 {
        bilinear(self.velocity.read(), pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_zeroed() {
        let fields = FieldStore::new(8, 6).unwrap();
        assert_eq!(fields.velocity.read().dim(), (8, 6));
        assert!(fields.velocity.read().iter().all(|v| *v == Vec2::ZERO));
        assert!(fields.pressure.read().iter().all(|p| *p == 0.0));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(FieldStore::new(0, 6).is_err());
        assert!(FieldStore::new(8, 0).is_err());
    }

    #[test]
    fn failed_resize_keeps_old_fields() {
        let mut fields = FieldStore::new(8, 6).unwrap();
        fields.pressure.read_mut()[(2, 2)] = 1.5;

        assert!(fields.resize(0, 12).is_err());
        assert_eq!(fields.width(), 8);
        assert_eq!(fields.pressure.read()[(2, 2)], 1.5);
    }

    #[test]
    fn resize_clears_residual_state() {
        let mut fields = FieldStore::new(64, 64).unwrap();
        fields.velocity.read_mut()[(10, 10)] = Vec2::new(3.0, -1.0);
        fields.pressure.read_mut()[(10, 10)] = 2.0;

        fields.resize(128, 128).unwrap();

        assert_eq!(fields.velocity.read().dim(), (128, 128));
        assert!(fields.velocity.read().iter().all(|v| *v == Vec2::ZERO));
        assert!(fields.pressure.read().iter().all(|p| *p == 0.0));
        assert!(fields.divergence.read().iter().all(|d| *d == 0.0));
        assert!(fields.curl.read().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn swap_is_an_index_flip() {
        let mut buf: DoubleBuffered<f32> = DoubleBuffered::new(4, 4);
        buf.back_mut()[(1, 1)] = 7.0;

        assert_eq!(buf.read()[(1, 1)], 0.0);
        buf.swap();
        assert_eq!(buf.read()[(1, 1)], 7.0);
    }

    #[test]
    fn read_and_write_buffers_never_alias() {
        let mut buf: DoubleBuffered<f32> = DoubleBuffered::new(4, 4);
        buf.read_mut()[(0, 0)] = 1.0;

        let (src, dst) = buf.read_write();
        dst[(0, 0)] = 9.0;
        assert_eq!(src[(0, 0)], 1.0);
    }

    #[test]
    fn bilinear_interpolates_and_clamps() {
        let mut field: Array2<f32> = Array2::zeros((4, 4));
        field[(1, 1)] = 1.0;
        field[(2, 1)] = 3.0;

        // Exact cell centres reproduce stored values.
        assert_eq!(bilinear(&field, Vec2::new(1.0, 1.0)), 1.0);
        // Halfway between two cells.
        assert!((bilinear(&field, Vec2::new(1.5, 1.0)) - 2.0).abs() < 1e-6);
        // Outside the grid reads the nearest edge value.
        assert_eq!(bilinear(&field, Vec2::new(-5.0, 1.0)), bilinear(&field, Vec2::new(0.0, 1.0)));
        assert_eq!(bilinear(&field, Vec2::new(9.0, 9.0)), field[(3, 3)]);
    }
}
