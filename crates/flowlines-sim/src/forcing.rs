use glam::Vec2;
use ndarray::Zip;
use noise::{NoiseFn, OpenSimplex};

use crate::field::FieldStore;
use crate::settings::{NoiseChannelSettings, Settings};

/// Fixed per-channel seeds keep runs reproducible.
const CHANNEL_SEEDS: [u32; 2] = [0x0b67, 0x51c3];

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlendState {
    Steady { elapsed: f32 },
    Blending { from: f32, to: f32, elapsed: f32 },
}

/// One coherent-noise channel: a smooth 2D force field whose temporal phase
/// periodically crossfades to a new target.
///
/// The channel dwells in `Steady` until `offset_increment` seconds have
/// passed, then blends from the current phase to `phase + offset_increment`
/// over `blend_duration` seconds and settles again.
pub struct NoiseChannel {
    cfg: NoiseChannelSettings,
    noise: OpenSimplex,
    current_offset: f32,
    state: BlendState,
}

impl NoiseChannel {
    pub fn new(cfg: NoiseChannelSettings, seed: u32) -> Self {
        Self {
            cfg,
            noise: OpenSimplex::new(seed),
            current_offset: 0.0,
            state: BlendState::Steady { elapsed: 0.0 },
        }
    }

    /// Swaps in new parameters without disturbing the phase state.
    pub fn set_config(&mut self, cfg: NoiseChannelSettings) {
        self.cfg = cfg;
    }

    /// Advances the phase state machine by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        match &mut self.state {
            BlendState::Steady { elapsed } => {
                *elapsed += dt;
                if self.cfg.offset_increment > 0.0 && *elapsed >= self.cfg.offset_increment {
                    self.state = BlendState::Blending {
                        from: self.current_offset,
                        to: self.current_offset + self.cfg.offset_increment,
                        elapsed: 0.0,
                    };
                }
            }
            BlendState::Blending { to, elapsed, .. } => {
                *elapsed += dt;
                if blend_progress(*elapsed, self.cfg.blend_duration) >= 1.0 {
                    self.current_offset = *to;
                    self.state = BlendState::Steady { elapsed: 0.0 };
                }
            }
        }
    }

    /// Force vector at a position in normalized [0,1] domain coordinates.
    pub fn force_at(&self, pos: Vec2) -> Vec2 {
        match self.state {
            BlendState::Steady { .. } => self.sample(pos, self.current_offset),
            BlendState::Blending { from, to, elapsed } => {
                let w = smooth(blend_progress(elapsed, self.cfg.blend_duration));
                self.sample(pos, from) * (1.0 - w) + self.sample(pos, to) * w
            }
        }
    }

    fn sample(&self, pos: Vec2, phase: f32) -> Vec2 {
        let p = pos * self.cfg.scale;
        let x = self.noise.get([
            p.x as f64,
            p.y as f64,
            (phase + self.cfg.offset1) as f64,
        ]);
        let y = self.noise.get([
            p.x as f64,
            p.y as f64,
            (phase + self.cfg.offset2) as f64,
        ]);

        Vec2::new(x as f32, y as f32) * self.cfg.multiplier
    }
}

/// Linear blend progress in [0, 1]; a non-positive duration is an instant
/// transition.
fn blend_progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

/// Cosine ease; hits 0 and 1 exactly at the endpoints.
fn smooth(w: f32) -> f32 {
    0.5 - 0.5 * (std::f32::consts::PI * w).cos()
}

/// The two additive forcing channels.
pub struct NoiseForcer {
    channels: [NoiseChannel; 2],
}

impl NoiseForcer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            channels: [
                NoiseChannel::new(settings.noise_channel_1, CHANNEL_SEEDS[0]),
                NoiseChannel::new(settings.noise_channel_2, CHANNEL_SEEDS[1]),
            ],
        }
    }

    pub fn reconfigure(&mut self, settings: &Settings) {
        self.channels[0].set_config(settings.noise_channel_1);
        self.channels[1].set_config(settings.noise_channel_2);
    }

    /// Ticks both channels and adds their summed force, scaled by `dt`, to
    /// the velocity field.
    pub fn apply(&mut self, fields: &mut FieldStore, dt: f32) {
        for channel in &mut self.channels {
            channel.tick(dt);
        }

        if self.channels.iter().all(|c| c.cfg.multiplier == 0.0) {
            return;
        }

        let inv_extent = Vec2::new(
            1.0 / fields.width() as f32,
            1.0 / fields.height() as f32,
        );

        let (src, dst) = fields.velocity.read_write();
        let channels = &self.channels;

        Zip::indexed(dst).for_each(|(i, j), out| {
            let pos = Vec2::new(i as f32 + 0.5, j as f32 + 0.5) * inv_extent;
            let force = channels[0].force_at(pos) + channels[1].force_at(pos);
            *out = src[(i, j)] + force * dt;
        });

        fields.velocity.swap();
    }
}
