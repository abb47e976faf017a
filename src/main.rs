use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flowlines_io::load_settings;
use flowlines_sim::{Flux, Settings};
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};

/// Headless driver: steps the flow simulation for a fixed duration and
/// reports field statistics. Drawing is left to a rendering front end.
#[derive(Parser)]
#[command(name = "flowlines")]
struct Args {
    /// Settings JSON file; defaults apply when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Override the fluid grid width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the fluid grid height.
    #[arg(long)]
    height: Option<u32>,

    /// Simulation frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Simulated duration in seconds.
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("failed to load settings from {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    if let Some(width) = args.width {
        settings.fluid_width = width;
    }
    if let Some(height) = args.height {
        settings.fluid_height = height;
    }

    let mut flux = match Flux::new(settings) {
        Ok(flux) => flux,
        Err(err) => {
            eprintln!("invalid settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    let frames = (args.duration * args.fps as f32).ceil() as u64;
    let dt = 1.0 / args.fps as f32;

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template).unwrap()
        .progress_chars("=> ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(frames).with_style(style);

    let mut peak_speed = 0.0f32;
    let mut mean_speed = 0.0f32;
    let mut live_trails = 0usize;

    for _frame in (0..frames).progress_with(progress) {
        let state = flux.step(dt);

        let mut sum = 0.0f32;
        for v in state.velocity.iter() {
            let speed = v.length();
            sum += speed;
            peak_speed = peak_speed.max(speed);
        }

        mean_speed = sum / state.velocity.len() as f32;
        live_trails = state.lines.iter().filter(|l| l.trail.len() >= 2).count();
    }

    println!(
        "{} frames at {}x{}: mean speed {:.4}, peak speed {:.4}, {} live trails",
        frames,
        flux.settings().fluid_width,
        flux.settings().fluid_height,
        mean_speed,
        peak_speed,
        live_trails,
    );

    ExitCode::SUCCESS
}
