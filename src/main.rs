//! Mergetui: drag across equal tiles on a 5×5 board to merge them, in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use mergetui::config::validate_frame_rate;
use mergetui::{Difficulty, GameConfig, RefillPolicy};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }

    let fall_step = if args.no_animation { 1.0 } else { args.fall_step };
    let config = GameConfig {
        difficulty: args.difficulty,
        fall_step,
        refill: args.refill,
        seed: args.seed,
    }
    .validate()?;
    let fps = validate_frame_rate(args.fps)?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    info!(?config, fps, "starting");

    let mut app = App::new(args, config, theme, fps)?;
    app.run()?;
    Ok(())
}

/// Logs go to a file; the terminal belongs to the board.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Merge-puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "mergetui",
    version,
    about = "Merge puzzle in the terminal. Drag across equal neighbouring tiles to combine them into one bigger tile.",
    long_about = "Mergetui is a 5x5 merge puzzle.\n\n\
        Drag through two or more equal tiles, moving to any of the 8 neighbours. On release \
        they combine on the last cell: x2 for a pair, x4 for 3 or 4 tiles, x8 for 5 or more. Tiles above \
        fall down and new ones drop in from the top. Longer chains score extra.\n\n\
        CONTROLS (mouse):\n  Left drag   Select chain   Release    Merge      Right click  Drop last pick\n\n\
        CONTROLS (keys):\n  Arrows/hjkl Move cursor    Space      Grab / release   Enter  Release\n  Backspace/u Drop last pick R          Restart          q/Esc  Quit menu\n\n\
        Use --theme to load a btop-style theme; tiles can be overridden with theme[tile_<value>]."
)]
pub struct Args {
    /// Difficulty: easy (2-8), medium (2-64), hard (8-256). Sets the values on the starting board.
    #[arg(short, long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Fixed seed for the board and spawned tiles.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Target render frames per second. One animation tick runs per frame.
    #[arg(long, default_value = "80.0", value_name = "RATE")]
    pub fps: f64,

    /// Fraction of a fall completed per tick, in (0, 1].
    #[arg(long, default_value = "0.05", value_name = "STEP")]
    pub fall_step: f32,

    /// How emptied cells are refilled after a merge.
    #[arg(long, default_value = "animated")]
    pub refill: RefillPolicy,

    /// Disable fall and merge animations (tiles land on the next frame).
    #[arg(long)]
    pub no_animation: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the classic tiles if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
