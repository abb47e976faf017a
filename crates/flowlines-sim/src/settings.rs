use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration, reported before any field is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("fluid grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("setting `{name}` must be a finite number")]
    NonFinite { name: &'static str },
}

/// Palette tag handed through to the renderer. The solver never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    Plasma,
    Poolside,
    Pollen,
}

/// One coherent-noise forcing channel.
///
/// `offset1`/`offset2` decorrelate the x and y force components by sampling
/// the noise volume at two phase depths. `offset_increment` is both the
/// steady dwell time and the phase step taken at each retarget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoiseChannelSettings {
    pub scale: f32,
    pub multiplier: f32,
    pub offset1: f32,
    pub offset2: f32,
    pub offset_increment: f32,
    pub blend_duration: f32,
}

impl Default for NoiseChannelSettings {
    fn default() -> Self {
        Self {
            scale: 2.5,
            multiplier: 1.0,
            offset1: 0.0,
            offset2: 0.5,
            offset_increment: 8.0,
            blend_duration: 3.5,
        }
    }
}

/// Per-frame immutable snapshot of every tunable parameter.
///
/// Updates arrive through [`crate::Flux::configure`] and become visible only
/// at the next frame boundary, never between solver passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub viscosity: f32,
    pub velocity_dissipation: f32,
    pub fluid_width: u32,
    pub fluid_height: u32,
    pub diffusion_iterations: u32,
    pub pressure_iterations: u32,
    pub color_scheme: ColorScheme,
    pub line_length: f32,
    pub line_width: f32,
    pub line_begin_offset: f32,
    pub adjust_advection: f32,
    pub vorticity: f32,
    pub noise_channel_1: NoiseChannelSettings,
    pub noise_channel_2: NoiseChannelSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viscosity: 5.0,
            velocity_dissipation: 0.0,
            fluid_width: 128,
            fluid_height: 128,
            diffusion_iterations: 4,
            pressure_iterations: 30,
            color_scheme: ColorScheme::default(),
            line_length: 24.0,
            line_width: 10.0,
            line_begin_offset: 0.5,
            adjust_advection: 1.0,
            vorticity: 0.8,
            noise_channel_1: NoiseChannelSettings::default(),
            noise_channel_2: NoiseChannelSettings {
                scale: 15.0,
                multiplier: 0.35,
                offset1: 1.0,
                offset2: 1.5,
                offset_increment: 12.0,
                blend_duration: 5.0,
            },
        }
    }
}

impl Settings {
    /// Checks the snapshot before it is allowed anywhere near the fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fluid_width == 0 || self.fluid_height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.fluid_width,
                height: self.fluid_height,
            });
        }

        let scalars = [
            ("viscosity", self.viscosity),
            ("velocityDissipation", self.velocity_dissipation),
            ("lineLength", self.line_length),
            ("lineWidth", self.line_width),
            ("lineBeginOffset", self.line_begin_offset),
            ("adjustAdvection", self.adjust_advection),
            ("vorticity", self.vorticity),
        ];

        for (name, value) in scalars {
            check_finite(name, value)?;
        }

        for channel in [&self.noise_channel_1, &self.noise_channel_2] {
            check_finite("scale", channel.scale)?;
            check_finite("multiplier", channel.multiplier)?;
            check_finite("offset1", channel.offset1)?;
            check_finite("offset2", channel.offset2)?;
            check_finite("offsetIncrement", channel.offset_increment)?;
            check_finite("blendDuration", channel.blend_duration)?;
        }

        Ok(())
    }
}

fn check_finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name })
    }
}
