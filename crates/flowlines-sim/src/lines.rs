use glam::Vec2;
use smallvec::SmallVec;

use crate::field::FieldStore;
use crate::settings::Settings;

/// Grid cells per trail particle; the pool scales with the domain area.
const CELLS_PER_LINE: usize = 4;

/// One visual trail: a head position and a bounded history of past
/// positions, oldest first.
pub struct LineParticle {
    pub position: Vec2,
    pub age: f32,
    pub trail: SmallVec<[Vec2; 8]>,
}

impl LineParticle {
    fn seeded(position: Vec2) -> Self {
        let mut trail = SmallVec::new();
        trail.push(position);

        Self {
            position,
            age: 0.0,
            trail,
        }
    }

    /// Opacity of the trail point at `index`, 0 at the tail side of
    /// `begin_offset` and ramping to 1 at the head.
    pub fn opacity(&self, index: usize, begin_offset: f32) -> f32 {
        if self.trail.len() < 2 {
            return 0.0;
        }

        let t = index as f32 / (self.trail.len() - 1) as f32;
        if begin_offset >= 1.0 {
            return if t >= 1.0 { 1.0 } else { 0.0 };
        }

        ((t - begin_offset) / (1.0 - begin_offset)).clamp(0.0, 1.0)
    }
}

/// Advects the trail pool through the velocity field.
///
/// The pool is preallocated from the grid area and particles are recycled in
/// place: a particle that leaves the domain is reset to a fresh seed position
/// with a cleared trail, never deallocated.
pub struct LineIntegrator {
    particles: Vec<LineParticle>,
    width: usize,
    height: usize,
    generation: u32,
}

impl LineIntegrator {
    pub fn new(width: usize, height: usize) -> Self {
        let mut integrator = Self {
            particles: Vec::new(),
            width,
            height,
            generation: 0,
        };
        integrator.reseed_all();
        integrator
    }

    /// Rebuilds the pool for a new grid resolution.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.generation = 0;
        self.reseed_all();
    }

    pub fn particles(&self) -> &[LineParticle] {
        &self.particles
    }

    fn reseed_all(&mut self) {
        let count = (self.width * self.height).div_ceil(CELLS_PER_LINE);
        self.particles = (0..count)
            .map(|k| LineParticle::seeded(seed_position(self.width, self.height, 0, k as u32)))
            .collect();
    }

    /// One frame: sample velocity at each head, advance, record history.
    pub fn step(&mut self, fields: &FieldStore, dt: f32, settings: &Settings) {
        let max_points = settings.line_length.ceil().max(2.0) as usize;
        let max = Vec2::new((self.width - 1) as f32, (self.height - 1) as f32);
        self.generation = self.generation.wrapping_add(1);

        for (k, particle) in self.particles.iter_mut().enumerate() {
            let v = fields.sample_velocity(particle.position);
            particle.position += v * (dt * settings.adjust_advection);
            particle.age += dt;

            let p = particle.position;
            if p.x < 0.0 || p.y < 0.0 || p.x > max.x || p.y > max.y {
                // Clearing the history avoids a streak between the exit
                // point and the new seed.
                *particle = LineParticle::seeded(seed_position(
                    self.width,
                    self.height,
                    self.generation,
                    k as u32,
                ));
                continue;
            }

            particle.trail.push(p);
            while particle.trail.len() > max_points {
                particle.trail.remove(0);
            }
        }
    }
}

/// Deterministic scatter of seed positions over the domain.
fn seed_position(width: usize, height: usize, salt: u32, k: u32) -> Vec2 {
    let hx = pcg_hash(k.wrapping_mul(2).wrapping_add(salt.wrapping_mul(0x9e3779b9)));
    let hy = pcg_hash(hx ^ k.wrapping_mul(2).wrapping_add(1));

    Vec2::new(
        hx as f32 / u32::MAX as f32 * (width - 1) as f32,
        hy as f32 / u32::MAX as f32 * (height - 1) as f32,
    )
}

fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}
