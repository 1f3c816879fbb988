use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;

use gridpoint::app::App;
use gridpoint::bindings::{Cell, KeyBindings};
use gridpoint::capture::KeyListener;
use gridpoint::combo::ComboMatcher;
use gridpoint::controller::{ClickDispatcher, CursorAccess, NavigationController, Renderer};
use gridpoint::geometry::Monitor;
use gridpoint::keys::KeyId;
use gridpoint::overlay::{LogRenderer, TerminalRenderer};
use gridpoint::pointer::{DryRunPointer, UinputPointer};
use gridpoint::settings::Settings;
use gridpoint::{logging, screens, Error};

#[derive(Parser)]
#[command(name = "gridpoint")]
#[command(version)]
#[command(about = "Keyboard-driven pointer placement on a recursive 3x3 grid", long_about = None)]
struct Cli {
    /// Settings file (defaults to ~/.config/gridpoint/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. info or gridpoint=debug (GRIDPOINT_LOG overrides)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available monitors
    Monitors,

    /// Run the navigator on one monitor
    Run {
        /// Monitor index (prompted for when omitted)
        #[arg(short, long)]
        monitor: Option<usize>,

        /// Log pointer moves and clicks instead of performing them
        #[arg(long)]
        dry_run: bool,

        /// Do not draw the terminal mini-map
        #[arg(long)]
        headless: bool,
    },

    /// Bind a key to a grid cell and save the settings
    Bind {
        /// Key name, e.g. q, space, f5
        key: String,

        /// Grid row (0-2)
        row: usize,

        /// Grid column (0-2)
        col: usize,
    },

    /// Show the current key layout
    Keys,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);

    let log_file = match (&cli.command, &cli.log_file) {
        (_, Some(path)) => Some(path.clone()),
        // The mini-map owns the terminal; keep logs off it.
        (Commands::Run { headless: false, .. }, None) => default_log_path(),
        _ => None,
    };
    logging::init(&cli.log_level, log_file.as_deref()).context("failed to open log file")?;

    let settings = Settings::load(&config_path)?;

    match cli.command {
        Commands::Monitors => {
            let provider = screens::detect(&settings.monitors);
            let monitors = provider.list_monitors();
            if monitors.is_empty() {
                return Err(Error::NoMonitors.into());
            }
            print_monitors(&monitors);
        }
        Commands::Run {
            monitor,
            dry_run,
            headless,
        } => run(&settings, monitor, dry_run, headless)?,
        Commands::Bind { key, row, col } => {
            let key: KeyId = key.parse()?;
            let cell = Cell::try_new(row, col).ok_or(Error::CellOutOfRange { row, col })?;
            let mut bindings = settings.bindings()?;
            let displaced = bindings.rebind(key.clone(), cell);
            let mut settings = settings;
            settings.set_bindings(&bindings);
            settings.validate()?;
            settings.save(&config_path)?;
            if let Some(displaced) = displaced {
                println!("{} is no longer bound", displaced);
            }
            println!("Bound {} to cell {} in {}", key, cell, config_path.display());
            print_layout(&bindings);
        }
        Commands::Keys => {
            print_layout(&settings.bindings()?);
            println!("Activation: {}", settings.activation);
            println!("Select:     {}", settings.selection_key);
            println!("Settings:   {}", config_path.display());
        }
    }

    Ok(())
}

fn run(settings: &Settings, index: Option<usize>, dry_run: bool, headless: bool) -> Result<()> {
    let provider = screens::detect(&settings.monitors);
    let monitors = provider.list_monitors();
    if monitors.is_empty() {
        return Err(Error::NoMonitors.into());
    }
    let index = match index {
        Some(index) => index,
        None => choose_monitor(&monitors)?,
    };
    let monitor = screens::select_monitor(provider.as_ref(), index)?;
    println!("\nStarting on {}...", monitor.name);
    print_controls(settings);

    let bindings = settings.bindings()?;
    let matcher = ComboMatcher::new(
        settings.activation.clone(),
        settings.selection_key.clone(),
        bindings.clone(),
    );

    let start = monitor.center();
    let cursor: Box<dyn CursorAccess>;
    let clicker: Box<dyn ClickDispatcher>;
    if dry_run {
        cursor = Box::new(DryRunPointer::new(start));
        clicker = Box::new(DryRunPointer::new(start));
    } else {
        let pointer = UinputPointer::new(&monitors, start, settings.click.clone())?;
        cursor = Box::new(pointer.clone());
        clicker = Box::new(pointer);
    }

    let (tx, rx) = mpsc::channel();
    let listener = KeyListener::spawn(tx)?;

    let renderer: Box<dyn Renderer> = if headless {
        Box::new(LogRenderer)
    } else {
        let renderer = TerminalRenderer::new(&bindings, status_line(settings))
            .context("failed to set up terminal")?;
        Box::new(renderer)
    };

    let controller = NavigationController::new(monitor, cursor, renderer);
    let mut app = App::new(matcher, controller, clicker);
    let result = app.run(rx);
    drop(app);
    listener.stop();
    result?;
    Ok(())
}

fn default_log_path() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("gridpoint");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("gridpoint.log"))
}

fn print_monitors(monitors: &[Monitor]) {
    println!("\nAvailable screens:");
    println!("{}", "-".repeat(50));
    for (i, monitor) in monitors.iter().enumerate() {
        let primary = if monitor.is_primary { " (primary)" } else { "" };
        println!("  [{}] {}{}", i, monitor.name, primary);
        println!("      Resolution: {}x{}", monitor.width, monitor.height);
        println!("      Position: ({}, {})", monitor.x, monitor.y);
        println!();
    }
}

/// Ask on stdin until a valid index is entered.
fn choose_monitor(monitors: &[Monitor]) -> Result<usize> {
    print_monitors(monitors);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Select screen [0-{}]: ", monitors.len() - 1);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            anyhow::bail!("no monitor selected");
        };
        match line?.trim().parse::<usize>() {
            Ok(index) if index < monitors.len() => return Ok(index),
            Ok(_) => println!("Please enter a number between 0 and {}", monitors.len() - 1),
            Err(_) => println!("Please enter a valid number"),
        }
    }
}

fn grid_keys(bindings: &KeyBindings) -> String {
    bindings
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|key| key.as_ref().map_or(".".to_string(), |k| k.to_string()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

fn print_layout(bindings: &KeyBindings) {
    for row in bindings.rows() {
        let keys: Vec<String> = row
            .iter()
            .map(|key| format!("{:^7}", key.as_ref().map_or(".".to_string(), |k| k.to_string())))
            .collect();
        println!("  {}", keys.join("|"));
    }
}

fn print_controls(settings: &Settings) {
    let grid = settings
        .bindings()
        .map(|b| grid_keys(&b))
        .unwrap_or_default();
    println!("\nControls:");
    println!("  {} = toggle overlay (show/cancel)", settings.activation);
    println!("  {} = select grid cell", grid);
    println!("  {} = click at current position", settings.selection_key);
    println!("  esc = go back one level (cancel at top level)");
    println!("  ctrl+esc = quit app");
}

fn status_line(settings: &Settings) -> String {
    format!(
        "{} show/cancel | {} click | esc back | ctrl+esc quit",
        settings.activation, settings.selection_key
    )
}
