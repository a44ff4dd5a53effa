//! CLI commands

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::{info, warn};
use tuxpay_core::models::{Invoice, InvoiceCreation, Payment};
use tuxpay_core::utils::format::parse_leading_number;
use tuxpay_core::utils::{truncate_string, DateOptions};
use tuxpay_core::{ApiClient, Config, Formatter, Session};

/// Width of the name column in listings
const NAME_WIDTH: usize = 24;

/// Seconds in a day, for `--expires-in`
const SECS_PER_DAY: f64 = 86_400.0;

/// Everything a command needs to run.
pub struct Context {
    pub client: ApiClient,
    pub formatter: Formatter,
    pub config: Config,
    /// Email given with `--email`
    pub email: Option<String>,
    /// Print raw JSON instead of tables
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the server
    Login {
        /// Keep the token after this command exits
        #[arg(long)]
        remember: bool,
    },

    /// Forget the stored token
    Logout,

    /// Show the server and login state
    Status,

    /// Invoice activity for the last 30 days
    Dashboard,

    /// List invoices, newest first
    Invoices {
        #[arg(long, default_value_t = tuxpay_core::api::DEFAULT_PAGE_LIMIT)]
        limit: u32,
        /// Page number, counting from 0, of `limit` invoices each
        #[arg(long, default_value_t = 0)]
        page: u32,
    },

    /// Show one invoice and its payments
    Invoice { id: i64 },

    /// Save an invoice as a PDF
    Download {
        id: i64,
        /// Output file (defaults to invoice-<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create an invoice
    CreateInvoice {
        /// Amount in major units, e.g. 12.50
        amount: String,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        customer_name: Option<String>,
        #[arg(long)]
        customer_email: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Days until the invoice expires
        #[arg(long)]
        expires_in: Option<u32>,
    },

    /// List payments, newest first
    Payments {
        #[arg(long, default_value_t = tuxpay_core::api::DEFAULT_PAGE_LIMIT)]
        limit: u32,
        /// Number of payments to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one payment
    Payment { id: i64 },

    /// List enabled coins and exchange rates
    Coins,
}

impl Commands {
    pub async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self {
            Commands::Login { remember } => login(ctx, remember).await,
            Commands::Logout => {
                ctx.client.logout().await?;
                println!("Logged out");
                Ok(())
            }
            Commands::Status => status(ctx).await,
            Commands::Dashboard => dashboard(ctx).await,
            Commands::Invoices { limit, page } => {
                let invoices = ctx.client.invoices(limit, page).await?;
                if ctx.json {
                    return print_json(serde_json::to_value(&invoices)?);
                }
                if invoices.is_empty() {
                    println!("No invoices");
                }
                for invoice in &invoices {
                    println!("{}", invoice_row(&ctx.formatter, invoice));
                }
                Ok(())
            }
            Commands::Invoice { id } => {
                let lookup = ctx.client.invoice(id).await?;
                if ctx.json {
                    return print_json(serde_json::to_value(&lookup)?);
                }
                print_invoice(&ctx.formatter, &lookup.invoice);
                if !lookup.payments.is_empty() {
                    println!();
                    println!("Payments:");
                    for payment in &lookup.payments {
                        println!("  {}", payment_row(&ctx.formatter, payment));
                    }
                }
                Ok(())
            }
            Commands::Download { id, output } => {
                let pdf = ctx.client.download_invoice_by_id(id).await?;
                let path = output.unwrap_or_else(|| PathBuf::from(format!("invoice-{}.pdf", id)));
                std::fs::write(&path, &pdf).with_context(|| format!("Failed to write {}", path.display()))?;
                info!(id, bytes = pdf.len(), "Invoice downloaded");
                println!("Saved {}", path.display());
                Ok(())
            }
            Commands::CreateInvoice {
                amount,
                currency,
                name,
                customer_name,
                customer_email,
                notes,
                expires_in,
            } => {
                let dollars = parse_leading_number(&amount)
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .with_context(|| format!("Invalid amount: {}", amount))?;
                let creation = InvoiceCreation {
                    currency,
                    name,
                    customer_name,
                    customer_email,
                    notes,
                    expiry_date: expires_in
                        .map(|days| Utc::now().timestamp() as f64 + days as f64 * SECS_PER_DAY),
                    ..InvoiceCreation::new((dollars * 100.0).round() as i64)
                };
                let invoice = ctx.client.create_invoice(&creation).await?;
                info!(id = invoice.id, "Invoice created");
                if ctx.json {
                    return print_json(serde_json::to_value(&invoice)?);
                }
                print_invoice(&ctx.formatter, &invoice);
                Ok(())
            }
            Commands::Payments { limit, offset } => {
                let payments = ctx.client.payments(limit, offset).await?;
                if ctx.json {
                    return print_json(serde_json::to_value(&payments)?);
                }
                if payments.is_empty() {
                    println!("No payments");
                }
                for payment in &payments {
                    println!("{}", payment_row(&ctx.formatter, payment));
                }
                Ok(())
            }
            Commands::Payment { id } => {
                let payment = ctx.client.payment(id).await?;
                if ctx.json {
                    return print_json(serde_json::to_value(&payment)?);
                }
                print_payment(&ctx.formatter, &payment);
                Ok(())
            }
            Commands::Coins => {
                let coins = ctx.client.coins().await?;
                if ctx.json {
                    return print_json(serde_json::to_value(&coins)?);
                }
                for coin in &coins.coins {
                    let fee = ctx.formatter.currency(coin.fee_estimate, Some("-")).unwrap_or_default();
                    println!("{:<6} {:<20} fee {}", coin.symbol, coin.name, fee);
                }
                for (code, rate) in &coins.currencies {
                    println!("USD/{} {}", code, rate);
                }
                Ok(())
            }
        }
    }
}

/// Log in with the configured email, prompting for whatever is missing.
pub async fn login(ctx: &mut Context, remember: bool) -> Result<()> {
    let email = match ctx.email.clone().or_else(|| ctx.config.last_email.clone()) {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = rpassword::prompt_password("Password: ")?;
    if email.is_empty() || password.is_empty() {
        anyhow::bail!("Email and password required");
    }

    ctx.client.authenticate(&email, &password, remember).await?;

    ctx.config.last_email = Some(email.clone());
    ctx.config.api_url = Some(ctx.client.base_url().to_string());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    if remember {
        println!("Logged in as {}", email);
    } else {
        println!("Logged in as {} for this command only (use --remember to stay logged in)", email);
    }
    Ok(())
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

async fn status(ctx: &Context) -> Result<()> {
    let session = ctx.client.session().read().await;
    if ctx.json {
        return print_json(status_json(ctx.client.base_url(), &session));
    }
    println!("Server: {}", ctx.client.base_url());
    if !session.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    let claims = session.claims().unwrap_or_default();
    println!("Logged in as {}", claims.email.as_deref().unwrap_or("(unknown)"));
    if let Some(exp) = claims.expires_at() {
        let date = ctx.formatter.date_string(Some(exp), &DateOptions::default());
        let time = ctx.formatter.time_string(Some(exp), None);
        println!(
            "Session expires {} {}",
            date.unwrap_or_default(),
            time.unwrap_or_default()
        );
    }
    Ok(())
}

fn status_json(server: &str, session: &Session) -> Value {
    let authenticated = session.is_authenticated();
    let claims = session.claims().filter(|_| authenticated).unwrap_or_default();
    json!({
        "server": server,
        "authenticated": authenticated,
        "email": claims.email,
        "expires_at": claims.expires_at().map(|exp| exp.to_rfc3339()),
    })
}

async fn dashboard(ctx: &Context) -> Result<()> {
    let (dashboard, coins) = futures::try_join!(ctx.client.dashboard(), ctx.client.coins())?;
    if ctx.json {
        return print_json(json!({ "dashboard": dashboard, "coins": coins }));
    }

    let fmt = &ctx.formatter;
    let money = |dollars: f64| fmt.currency(Some(dollars), Some("-")).unwrap_or_default();
    println!("Last 30 days");
    println!("  Created  {:>4}  {}", dashboard.created.count, money(dashboard.created.dollars));
    println!("  Paid     {:>4}  {}", dashboard.paid.count, money(dashboard.paid.dollars));
    println!("  Expired  {:>4}  {}", dashboard.expired.count, money(dashboard.expired.dollars));
    println!("  Open     {:>4}  {}", dashboard.open.len(), money(dashboard.open_dollars()));

    let symbols: Vec<&str> = coins.coins.iter().map(|c| c.symbol.as_str()).collect();
    if !symbols.is_empty() {
        println!("Accepting {}", symbols.join(", "));
    }
    Ok(())
}

fn invoice_row(fmt: &Formatter, invoice: &Invoice) -> String {
    let name = truncate_string(&invoice.display_name(), NAME_WIDTH);
    let amount = fmt.currency(invoice.amount_dollars(), Some("-")).unwrap_or_default();
    let created = fmt
        .date_string(invoice.creation_date, &DateOptions::default().without_weekday().with_default("-"))
        .unwrap_or_default();
    format!(
        "{:>6}  {:<width$}  {:<9}  {:>14} {:<3}  {}",
        invoice.id,
        name,
        invoice.status.label(),
        amount,
        invoice.currency.as_deref().unwrap_or(""),
        created,
        width = NAME_WIDTH
    )
}

fn print_invoice(fmt: &Formatter, invoice: &Invoice) {
    let date = |value: Option<f64>| {
        fmt.date_string(value, &DateOptions::default().with_default("-"))
            .unwrap_or_default()
    };
    println!("{} ({})", invoice.display_name(), invoice.status.label());
    println!(
        "  Amount    {} {}",
        fmt.currency(invoice.amount_dollars(), Some("-")).unwrap_or_default(),
        invoice.currency.as_deref().unwrap_or("")
    );
    println!("  Created   {}", date(invoice.creation_date));
    println!("  Expires   {}", date(invoice.expiry_date));
    if invoice.payment_date.is_some() {
        println!("  Paid      {}", date(invoice.payment_date));
    }
    if let Some(customer) = invoice.customer_name.as_deref().or(invoice.customer_email.as_deref()) {
        println!("  Customer  {}", customer);
    }
    if let Some(token) = &invoice.token {
        println!("  Token     {}", token);
    }
}

fn payment_row(fmt: &Formatter, payment: &Payment) -> String {
    let created = fmt
        .date_string(payment.creation_date, &DateOptions::default().without_weekday().with_default("-"))
        .unwrap_or_default();
    format!(
        "{:>6}  {:<5}  {:<9}  {:>14} sats  {}",
        payment.id,
        payment.symbol.as_deref().unwrap_or("?"),
        payment.status.label(),
        payment.amount_sats.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        created
    )
}

fn print_payment(fmt: &Formatter, payment: &Payment) {
    println!("{}", payment_row(fmt, payment));
    if let Some(address) = &payment.address {
        println!("  Address    {}", address);
    }
    if let Some(remaining) = payment.remaining_sats() {
        println!("  Remaining  {} sats", remaining);
    }
    if let Some(invoice) = &payment.invoice {
        println!("  Invoice    {}", invoice.display_name());
    }
}

fn print_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
