//! TuxPay admin - manage invoices and payments on a TuxPay server from the
//! command line.

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tuxpay_core::notify::Level;
use tuxpay_core::{ApiClient, ApiError, ChannelNotifier, Config, Formatter, Notification};

use commands::{Commands, Context};

#[derive(Parser)]
#[command(name = "tuxpay-admin")]
#[command(about = "Manage invoices and payments on a TuxPay server")]
#[command(version)]
struct Cli {
    /// Server URL (defaults to the configured server, then http://localhost:8000)
    #[arg(long, global = true, env = "TUXPAY_API_URL")]
    api_url: Option<String>,

    /// Locale for amounts and dates, e.g. en-US or fr-CA
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Log in as this user for this command only (the password is prompted)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Print raw JSON where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let guard = logging::init_tracing(std::env::var_os(logging::LOG_DIR_ENV).map(PathBuf::from));
    info!("TuxPay admin starting");

    let (notifier, mut notifications) = ChannelNotifier::new();
    let result = run(cli, notifier).await;

    // Notifications are delivered synchronously, so everything is queued by now
    while let Ok(notification) = notifications.try_recv() {
        print_notification(&notification);
    }

    if let Err(e) = result {
        let api_error = e.downcast_ref::<ApiError>();
        // Pipeline errors were already shown as notifications
        if !api_error.is_some_and(|api| api.notification().is_some()) {
            eprintln!("Error: {:#}", e);
        }
        if api_error.is_some_and(ApiError::requires_login) {
            eprintln!("Run `tuxpay-admin login` to sign in");
        }
        drop(guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, notifier: ChannelNotifier) -> Result<()> {
    let mut config = Config::load()?;
    let api_url = cli.api_url.unwrap_or_else(|| config.api_url());
    config.api_url = Some(api_url.clone());

    let session = config.build_session(&api_url)?.shared();
    let client = ApiClient::new(api_url, session)?.with_notifier(notifier);
    let formatter = Formatter::new(cli.locale.as_deref().unwrap_or(config.locale()));
    debug!(api_url = %client.base_url(), locale = %formatter.locale(), "Client ready");

    let mut ctx = Context {
        client,
        formatter,
        config,
        email: cli.email,
        json: cli.json,
    };

    // --email with any other command logs in just for that command
    if ctx.email.is_some() && !matches!(cli.command, Commands::Login { .. }) {
        commands::login(&mut ctx, false).await?;
    }

    cli.command.execute(&mut ctx).await
}

fn print_notification(notification: &Notification) {
    match notification.level {
        Level::Info => eprintln!("note: {}", notification.message),
        Level::Error => eprintln!("{}", notification.message),
    }
}
