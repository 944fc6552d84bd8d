// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use psyshape::prelude::*;

/// Present a circle stimulus in a calibrated window.
#[derive(Parser, Debug)]
#[command(name = "shape-circle", version, about, long_about = None)]
struct Cli {
    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// Window height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Show window decorations
    #[arg(long)]
    allow_gui: bool,
    /// Name of the monitor calibration profile
    #[arg(long, default_value = "testMonitor")]
    monitor: String,
    /// TOML file with additional monitor profiles
    #[arg(long)]
    monitors: Option<PathBuf>,
    /// Units of radius and position (pix, deg, degFlat, cm, norm, height)
    #[arg(long, default_value = "deg", value_parser = parse_units)]
    units: Units,
    /// Index of the screen to open the window on
    #[arg(long, default_value_t = 0)]
    screen: usize,
    /// Circle radius
    #[arg(long, default_value_t = 2.0)]
    radius: f32,
    /// Number of polygon edges approximating the circle
    #[arg(long, default_value_t = 32)]
    edges: u32,
    /// Seconds to keep the stimulus on screen
    #[arg(long, default_value_t = 5.0)]
    duration: f64,
    /// Save the recorded frame intervals to this CSV file
    #[arg(long)]
    frame_intervals: Option<PathBuf>,
}

fn parse_units(s: &str) -> Result<Units, String> {
    s.parse().map_err(|e: PsyshapeError| e.to_string())
}

// If a list is given, the first font found will be used.
const FANCY_FONTS: [&str; 3] = ["Monotype Corsiva", "Palace Script MT", "Edwardian Script ITC"];

fn run(cli: Cli) -> anyhow::Result<()> {
    let profiles = match &cli.monitors {
        Some(path) => MonitorProfiles::load(path)
            .with_context(|| format!("Failed to load monitor profiles from {}", path.display()))?,
        None => MonitorProfiles::builtin(),
    };

    // create a window to draw in
    let options = WindowOptions {
        size: (cli.width, cli.height),
        allow_gui: cli.allow_gui,
        monitor: cli.monitor.clone(),
        units: cli.units,
        screen: cli.screen,
        record_frame_intervals: true,
        ..WindowOptions::default()
    };
    let mut win = Window::new(&options, &profiles).context("Failed to open window")?;

    let mut fonts = FontPreferences::new(FANCY_FONTS);
    if let Some(font) = fonts.resolve() {
        log::info!("Preferred font: {}", font);
    }

    let mut circle = Circle::new(cli.radius, cli.edges)?;
    circle.set_pos(0.0, 0.0);
    win.draw(&circle);

    win.flip()?;

    // pause, so you get a chance to see it!
    let waited = win.wait(cli.duration)?;
    if waited.is_aborted() {
        log::info!("Aborted after {:.3} s", waited.duration().as_secs_f64());
    }

    if let Some(path) = &cli.frame_intervals {
        win.save_frame_intervals(path)
            .with_context(|| format!("Failed to save frame intervals to {}", path.display()))?;
    }

    win.close();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    run(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_circle_demo() {
        let cli = Cli::parse_from(["shape-circle"]);
        assert_eq!((cli.width, cli.height), (800, 800));
        assert!(!cli.allow_gui);
        assert_eq!(cli.monitor, "testMonitor");
        assert_eq!(cli.units, Units::Deg);
        assert_eq!(cli.screen, 0);
        assert_eq!(cli.radius, 2.0);
        assert_eq!(cli.edges, 32);
        assert_eq!(cli.duration, 5.0);
        assert!(cli.monitors.is_none());
        assert!(cli.frame_intervals.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "shape-circle",
            "--units",
            "pix",
            "--radius",
            "100",
            "--edges",
            "64",
            "--frame-intervals",
            "intervals.csv",
        ]);
        assert_eq!(cli.units, Units::Pix);
        assert_eq!(cli.radius, 100.0);
        assert_eq!(cli.edges, 64);
        assert_eq!(cli.frame_intervals, Some(PathBuf::from("intervals.csv")));
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["shape-circle", "--units", "parsecs"]).is_err());
        let cli = Cli::parse_from(["shape-circle", "--units", "degFlat"]);
        assert_eq!(cli.units, Units::DegFlat);
    }

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
