mod actor;
mod ai;
mod app;
mod backend;
mod config;
mod constants;
mod store;
mod sync;

use anyhow::Result;
use std::env;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{Action, App, SessionEvent};
use crate::config::Config;
use crate::store::{InboxAction, PrefAction, ScrollPos, Theme};

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,briefmail=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("briefmail.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"briefmail - inbox client core for an email summarization service

Usage: briefmail [command]

Commands:
    (none)      Start the session daemon
    setup       Write a starter configuration file
    help        Show this help message

While running, commands are read from stdin:
    refresh, status, more, scroll <offset> <max>, select <id>, page <n>,
    pagesize <n>, sidebar <bool>, search [query], summaries, interval <secs>,
    theme <light|dark|system>, logout, quit

Configuration file: ~/.config/briefmail/config.toml
"#
    );
}

fn run_setup() -> Result<()> {
    use std::io::{self, Write};

    let config_path = Config::config_path()?;
    if config_path.exists() {
        print!("Configuration already exists. Overwrite? [y/N]: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    print!("Backend URL: ");
    io::stdout().flush()?;
    let mut url = String::new();
    io::stdin().read_line(&mut url)?;

    print!("User id (email): ");
    io::stdout().flush()?;
    let mut user_id = String::new();
    io::stdin().read_line(&mut user_id)?;

    print!("API token (optional): ");
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().read_line(&mut token)?;
    let token = token.trim();

    let config = Config {
        backend: config::BackendConfig {
            url: url.trim().trim_end_matches('/').to_string(),
            user_id: user_id.trim().to_string(),
            token: if token.is_empty() {
                None
            } else {
                Some(token.to_string())
            },
        },
        sync: config::SyncConfig::default(),
        preferences: config::PreferencesConfig::default(),
    };

    Config::ensure_dirs()?;
    config.save()?;
    println!("Configuration saved to {}", config_path.display());
    println!("\nSetup complete! Run 'briefmail' to start.");
    Ok(())
}

/// Map one stdin line to a session action.
fn parse_command(line: &str) -> Option<Action> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?;
    match cmd {
        "refresh" => Some(Action::Refresh),
        "status" => Some(Action::Status),
        "more" => Some(Action::Scroll(ScrollPos::bottom())),
        "scroll" => {
            let offset = parts.next()?.parse().ok()?;
            let max = parts.next()?.parse().ok()?;
            Some(Action::Scroll(ScrollPos::new(offset, max)))
        }
        "select" => parts
            .next()?
            .parse()
            .ok()
            .map(|id| Action::Inbox(InboxAction::EmailChange(id))),
        "page" => parts
            .next()?
            .parse()
            .ok()
            .map(|page| Action::Inbox(InboxAction::PageChange(page))),
        "pagesize" => parts.next()?.parse().ok().map(Action::Resize),
        "sidebar" => parts
            .next()?
            .parse()
            .ok()
            .map(|expanded| Action::Inbox(InboxAction::LogoClick { expanded })),
        "search" => Some(Action::SearchChanged(
            parts.collect::<Vec<_>>().join(" "),
        )),
        "summaries" => Some(Action::Pref(PrefAction::ToggleSummaries)),
        "interval" => parts
            .next()?
            .parse()
            .ok()
            .map(|secs| Action::Pref(PrefAction::SetFetchInterval(secs))),
        "theme" => match parts.next()? {
            "light" => Some(Action::Pref(PrefAction::SetTheme(Theme::Light))),
            "dark" => Some(Action::Pref(PrefAction::SetTheme(Theme::Dark))),
            "system" => Some(Action::Pref(PrefAction::SetTheme(Theme::System))),
            _ => None,
        },
        "logout" => Some(Action::Logout),
        _ => None,
    }
}

/// Read commands from stdin on a blocking thread and dispatch them.
fn spawn_command_reader(actions: mpsc::Sender<Action>, cancel: CancellationToken) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lines() {
            let Ok(line) = line else { break };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "quit" || trimmed == "exit" {
                break;
            }
            match parse_command(trimmed) {
                Some(action) => {
                    if actions.blocking_send(action).is_err() {
                        break;
                    }
                }
                None => eprintln!("Unknown command: {} (try 'briefmail help')", trimmed),
            }
        }
        cancel.cancel();
    });
}

async fn run_session() -> Result<()> {
    let config = Config::load()?;
    Config::ensure_dirs()?;

    let mut app = App::new(config).await?;
    let cancel = app.cancel_token();
    let mut events = app.subscribe();

    // Log session events the way an attached view would react to them.
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::NewMail { count } => {
                    tracing::info!("{} new email(s) arrived", count)
                }
                SessionEvent::SummariesReady { count } => {
                    tracing::info!("{} summaries ready", count)
                }
            }
        }
    });

    spawn_command_reader(app.handle(), cancel.clone());

    // Ctrl-c stops the session and its actors.
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    app.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("setup") => run_setup(),
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            setup_logging();
            run_session().await
        }
    }
}
