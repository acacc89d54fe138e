//! ectop: process and energy metrics top.
//!
//! Run: `ectop`, or `ectop --once --json out.json` for a single snapshot.

use anyhow::{Context, Result};
use clap::Parser;
use ectop::config::{Config, ControllerKind, GeometryConfig, ViewConfig};
use ectop::debug::DebugLog;
use ectop::grid::{GridModel, TextRenderer};
use ectop::monitor::{Monitor, ProcessFeeder, ProcessHooks};
use ectop::render::RendererKind;
use std::path::PathBuf;

/// ectop: grid dashboard over the process table
#[derive(Parser, Debug)]
#[command(name = "ectop")]
#[command(version)]
#[command(about = "Reactive process and energy metrics dashboard", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Update interval in milliseconds
    #[arg(short, long)]
    frequency: Option<u64>,

    /// Debug output on stderr (also ECTOP_DEBUG=1)
    #[arg(long)]
    debug: bool,

    /// Update and render once, print text views to stdout, then exit
    #[arg(long)]
    once: bool,

    /// Also write an HTML table to this file
    #[arg(long)]
    html: Option<PathBuf>,

    /// Also write a JSON document to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default_path().map(Config::load_or_default).unwrap_or_default(),
    };
    if let Some(ms) = cli.frequency {
        config.monitor.frequency_ms = ms;
    }
    for (kind, output) in [(RendererKind::Html, &cli.html), (RendererKind::Json, &cli.json)] {
        if let Some(path) = output {
            let base = config.views.first().cloned().unwrap_or_default();
            let name = format!("{}-{kind:?}", base.name).to_lowercase();
            config.views.push(ViewConfig { name, kind, output: Some(path.clone()), controller: ControllerKind::None, ..base });
        }
    }
    if cli.once {
        for view in config.views.iter_mut().filter(|v| v.kind == RendererKind::Terminal) {
            view.kind = RendererKind::Text;
            view.geometry.get_or_insert(GeometryConfig { x: 0, y: 0, width: 120, height: 40 });
        }
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let debug = DebugLog::from_env(cli.debug);
    let config = load_config(&cli)?;

    let mut model = GridModel::with_debug(debug);
    let hooks = ProcessHooks::install(&mut model);
    let mut monitor = Monitor::with_model(model, hooks);
    monitor.connect_row_feeder(Box::new(ProcessFeeder::new()));
    let views = config.apply(&mut monitor);

    if cli.once {
        monitor.update();
        monitor.render_views();
        for key in views {
            if let Some(text) = monitor.model().view(key).and_then(|v| v.renderer_as::<TextRenderer>()) {
                println!("{}", text.content());
            }
        }
        return Ok(());
    }
    run(monitor)
}

#[cfg(feature = "terminal")]
fn run(monitor: Monitor<ProcessHooks>) -> Result<()> {
    ectop::app::App::new(monitor).run()?;
    Ok(())
}

#[cfg(not(feature = "terminal"))]
fn run(mut monitor: Monitor<ProcessHooks>) -> Result<()> {
    loop {
        if monitor.update() {
            monitor.render_views();
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
}
