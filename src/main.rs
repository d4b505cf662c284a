use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use campaign_forge::config::AppConfig;
use campaign_forge::core::logging;
use campaign_forge::tui::app::AppState;
use campaign_forge::tui::services::Services;

const USAGE: &str = "\
Usage: campaign-forge [--config <path>]

Options:
  -c, --config <path>  Read configuration from <path>
  -h, --help           Print this help
  -V, --version        Print the version";

enum Command {
    Run { config: Option<PathBuf> },
    Help,
    Version,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-c" | "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            other => bail!("unrecognized argument '{other}'\n\n{USAGE}"),
        }
    }
    Ok(Command::Run { config })
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await.map_err(|e| miette::miette!("{e:#}"))
}

async fn run() -> anyhow::Result<()> {
    let config_path = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Version => {
            println!("{} {}", campaign_forge::NAME, campaign_forge::VERSION);
            return Ok(());
        }
        Command::Run { config } => config,
    };

    let config = match &config_path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let _log_guard = logging::init_tui(&config.data_dir().join("logs"));
    log::info!("{} v{} starting", campaign_forge::NAME, campaign_forge::VERSION);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::init(&config, event_tx.clone()).context("Failed to start")?;
    let mut app = AppState::new(event_rx, event_tx, services);

    install_panic_hook(config.tui.mouse_enabled);
    let mut terminal = setup_terminal(config.tui.mouse_enabled)?;

    let result = app
        .run(&mut terminal, Duration::from_millis(config.tui.tick_rate_ms.max(1)))
        .await;

    restore_terminal(config.tui.mouse_enabled)?;
    terminal.show_cursor()?;

    log::info!("{} exiting", campaign_forge::NAME);
    result.context("Terminal I/O failed")
}

fn setup_terminal(mouse: bool) -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mouse: bool) -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    if mouse {
        execute!(stdout, DisableMouseCapture)?;
    }
    execute!(stdout, LeaveAlternateScreen)
}

/// Leave the alternate screen before the default hook prints the panic.
fn install_panic_hook(mouse: bool) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal(mouse);
        log::error!("panic: {info}");
        default_hook(info);
    }));
}
