//! Grid-based 2D flow solver driving line-trail visuals.
//!
//! The velocity field is advanced once per display frame through a fixed
//! stage sequence: coherent-noise forcing, semi-Lagrangian advection, viscous
//! diffusion, vorticity confinement, and pressure projection. A pool of trail
//! particles is then advected through the corrected field to produce the
//! drawable line state. Rendering and UI live outside this crate; the
//! boundary is [`Settings`] in and [`FrameState`] out.

pub mod advect;
pub mod diffuse;
pub mod field;
pub mod forcing;
pub mod lines;
pub mod pressure;
pub mod settings;
pub mod sim;
pub mod vorticity;

pub use settings::{ColorScheme, ConfigError, NoiseChannelSettings, Settings};
pub use sim::{Flux, FrameState};
