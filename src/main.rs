use anyhow::Context;
use clap::{ArgAction, Parser};

use annotateit::{
    Config,
    backend::{self, RunOptions},
    input::Tool,
};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ANNOTATEIT_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "annotateit")]
#[command(version = VERSION, about = "Multi-monitor screen annotation overlay for Wayland compositors")]
struct Cli {
    /// Annotate only this monitor (id, name or connector); skips the selection dialog
    #[arg(long, value_name = "ID|NAME", conflicts_with = "all_monitors")]
    monitor: Option<String>,

    /// Annotate every monitor; skips the selection dialog
    #[arg(long, action = ArgAction::SetTrue)]
    all_monitors: bool,

    /// Initial drawing tool
    #[arg(long, value_enum, value_name = "TOOL")]
    tool: Option<Tool>,

    /// Start in pass-through mode (input goes to the windows below)
    #[arg(long, action = ArgAction::SetTrue)]
    passthrough: bool,

    /// Print the monitors the compositor reports and exit
    #[arg(long, action = ArgAction::SetTrue)]
    list_monitors: bool,

    /// Write the example configuration file and exit
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::create_default_file().context("Could not write example config")?;
        println!("Wrote example configuration to {}", path.display());
        return Ok(());
    }

    if std::env::var("WAYLAND_DISPLAY").is_err() {
        log::error!("WAYLAND_DISPLAY not set - annotateit requires a Wayland session.");
        log::error!("Run it on a compositor with wlr-layer-shell (Hyprland, Sway, ...).");
        return Err(anyhow::anyhow!("WAYLAND_DISPLAY not set"));
    }

    if cli.list_monitors {
        let monitors = backend::list_monitors()?;
        if monitors.is_empty() {
            println!("No monitors found");
        }
        for monitor in &monitors {
            println!("{}", backend::describe_monitor(monitor));
        }
        return Ok(());
    }

    log::info!("Starting annotation overlay");
    backend::run_wayland(RunOptions {
        monitor: cli.monitor,
        all_monitors: cli.all_monitors,
        tool: cli.tool,
        passthrough: cli.passthrough,
    })?;
    log::info!("Annotation overlay closed");

    Ok(())
}
