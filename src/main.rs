// Main entry point
use clap::Parser;
use colored::Colorize;
use futures_util::future::join_all;
use ordertrack::infrastructure::config::{self, load_config, Config};
use ordertrack::interfaces::cli::{Cli, Command};
use ordertrack::interfaces::shutdown;
use ordertrack::presentation::format;
use ordertrack::presentation::theme::Theme;
use ordertrack::state::AppState;
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup graceful shutdown handler
    let shutdown_rx = shutdown::listen();

    let cli = Cli::parse();
    let config = load_config()?;

    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        config::generate_config_sample()?;
        return Ok(());
    }
    if cli.status {
        print_status(&config);
        return Ok(());
    }

    let Some(command) = cli.command else {
        eprintln!("{}", "Please provide a command, see --help".red());
        std::process::exit(1);
    };

    let theme_name = cli.theme.as_deref().unwrap_or(config.theme.as_str());
    let theme = Theme::from_name(theme_name);
    let state = AppState::new(config)?;
    tracing::debug!(window = ?state.tracking.window(), "request dedup enabled");

    tokio::select! {
        result = run(&state, command, &theme, cli.json) => {
            if let Err(e) = result {
                eprintln!("{}", format!("✘ {}", e).red());
                std::process::exit(1);
            }
        }
        _ = shutdown::interrupted(shutdown_rx) => {
            eprintln!("Request cancelled");
            std::process::exit(shutdown::INTERRUPTED_EXIT_CODE);
        }
    }

    Ok(())
}

async fn run(state: &AppState, command: Command, theme: &Theme, json: bool) -> anyhow::Result<()> {
    let emoji = state.config.enable_emoji;
    let tracking = &state.tracking;

    match command {
        Command::Track { order_ids } => {
            // Duplicate ids collapse into one request inside the cache window
            let results = join_all(order_ids.iter().map(|id| tracking.track_order(id))).await;

            let mut failed = 0;
            for (id, result) in order_ids.iter().zip(results) {
                match result {
                    Ok(summary) if json => print_json(&summary)?,
                    Ok(summary) => print!("{}", format::format_summary(&summary, theme, emoji)),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}", format!("✘ {}: {}", id, e).red());
                    }
                }
            }
            tracing::debug!(stats = ?tracking.stats(), "tracking finished");

            if failed == order_ids.len() {
                anyhow::bail!("no order could be tracked");
            }
        }
        Command::OtpRequest { order_id, email } => {
            let dispatch = tracking.request_otp(&order_id, &email).await?;
            if json {
                print_json(&dispatch)?;
            } else {
                print!("{}", format::format_otp_dispatch(&dispatch, theme));
            }
        }
        Command::OtpVerify {
            order_id,
            email,
            otp,
        } => {
            let verification = tracking.verify_otp(&order_id, &email, &otp).await?;
            if json {
                print_json(&verification)?;
            } else {
                print!("{}", format::format_otp_verification(&verification, theme));
            }
        }
        Command::Details { order_id, token } => {
            let details = tracking.track_order_details(&order_id, &token).await?;
            if json {
                print_json(&details)?;
            } else {
                print!("{}", format::format_details(&details, theme, emoji));
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    if let Some(path) = logging.path.as_deref().filter(|p| !p.is_empty()) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return Ok(());
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_status(config: &Config) {
    println!("{}", "ordertrack Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config: {}",
        config::get_config_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found (using defaults)".to_string())
    );
    println!("API: {}", config.api.base_url);
    println!(
        "API token: {}",
        if config.api.token.is_some() {
            "Configured"
        } else {
            "Not configured"
        }
    );
    println!("Timeout: {}s", config.api.timeout_secs);
    println!(
        "Dedup window: {}ms (+{}ms grace){}",
        config.cache.window_ms,
        config.cache.grace_ms,
        if config.cache.evict_failures {
            ", failures evicted early"
        } else {
            ""
        }
    );
    println!(
        "Logging: {} ({})",
        config.logging.level,
        config.logging.path.as_deref().unwrap_or("stderr")
    );
}
