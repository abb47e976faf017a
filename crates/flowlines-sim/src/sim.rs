use glam::Vec2;
use ndarray::Array2;

use crate::advect::advect;
use crate::diffuse::diffuse;
use crate::field::FieldStore;
use crate::forcing::NoiseForcer;
use crate::lines::{LineIntegrator, LineParticle};
use crate::pressure;
use crate::settings::{ColorScheme, ConfigError, Settings};
use crate::vorticity;

/// Read-only view of one finished frame, handed to the renderer.
pub struct FrameState<'a> {
    pub velocity: &'a Array2<Vec2>,
    pub lines: &'a [LineParticle],
    pub color_scheme: ColorScheme,
    pub line_width: f32,
    pub line_begin_offset: f32,
}

/// The frame loop: owns the fields, the forcing channels and the trail pool,
/// and runs the fixed stage sequence once per external tick.
///
/// Settings hand-offs are atomic at the frame boundary. A snapshot accepted
/// by [`configure`](Self::configure) becomes visible at the start of the
/// next [`step`](Self::step), never between stages.
pub struct Flux {
    fields: FieldStore,
    lines: LineIntegrator,
    forcer: NoiseForcer,
    settings: Settings,
    pending: Option<Settings>,
}

impl Flux {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let fields = FieldStore::new(settings.fluid_width, settings.fluid_height)?;
        let lines = LineIntegrator::new(fields.width(), fields.height());
        let forcer = NoiseForcer::new(&settings);

        Ok(Self {
            fields,
            lines,
            forcer,
            settings,
            pending: None,
        })
    }

    /// Validates and stages a new settings snapshot. On error the previous
    /// configuration stays active and the pending slot is untouched.
    pub fn configure(&mut self, settings: Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.pending = Some(settings);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Advances the simulation by `dt` seconds and returns the frame for
    /// rendering. Never fails; numerical guards live inside the passes.
    pub fn step(&mut self, dt: f32) -> FrameState<'_> {
        self.apply_pending();

        self.forcer.apply(&mut self.fields, dt);

        {
            let (src, dst) = self.fields.velocity.read_write();
            advect(
                src,
                src,
                dst,
                dt,
                self.settings.velocity_dissipation,
                self.settings.adjust_advection,
            );
        }
        self.fields.velocity.swap();

        diffuse(
            &mut self.fields.velocity,
            self.settings.viscosity,
            dt,
            self.settings.diffusion_iterations,
        );

        vorticity::apply(&mut self.fields, self.settings.vorticity, dt);

        pressure::project(&mut self.fields, self.settings.pressure_iterations);

        self.lines.step(&self.fields, dt, &self.settings);

        FrameState {
            velocity: self.fields.velocity.read(),
            lines: self.lines.particles(),
            color_scheme: self.settings.color_scheme,
            line_width: self.settings.line_width,
            line_begin_offset: self.settings.line_begin_offset,
        }
    }

    fn apply_pending(&mut self) {
        let Some(next) = self.pending.take() else {
            return;
        };

        let resized = (next.fluid_width, next.fluid_height)
            != (self.settings.fluid_width, self.settings.fluid_height);

        if resized {
            if self.fields.resize(next.fluid_width, next.fluid_height).is_err() {
                return;
            }
            self.lines.resize(self.fields.width(), self.fields.height());
        }

        self.forcer.reconfigure(&next);
        self.settings = next;
    }
}
