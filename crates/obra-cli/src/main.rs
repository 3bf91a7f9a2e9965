//! `obra`: terminal client for the Obra worker registry.
//!
//! # Usage
//!
//! ```
//! obra --url http://localhost:5282 --user secretaria --password secret
//! obra --config ~/.config/obra/config.toml summary
//! obra add --name "Maria Silva" --type pastor --sector "Setor Norte" --field Planalto
//! ```

mod app;
mod client;
mod ui;

use std::{io, time::Duration};

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use obra_core::{
  format::format_brl,
  form::RegistrationForm,
  worker::{PaymentKind, WorkerType},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use strum::IntoEnumIterator as _;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "obra", about = "Terminal client for the Obra worker registry")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the obra server (default: http://localhost:5282).
  #[arg(long, env = "OBRA_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "OBRA_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "OBRA_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Browse and filter workers interactively (default).
  Browse,
  /// Register a new worker.
  Add(AddArgs),
  /// Print the worker counters and the contribution total.
  Summary,
}

#[derive(clap::Args, Debug)]
struct AddArgs {
  /// Full name.
  #[arg(long)]
  name: String,

  /// pastor, missionary, evangelist or retired.
  #[arg(long = "type")]
  worker_type: WorkerType,

  #[arg(long)]
  sector: String,

  #[arg(long)]
  field: String,

  /// Mission field, for missionaries.
  #[arg(long)]
  missionary_field: Option<String>,

  /// Paid by bank transfer instead of cash.
  #[arg(long)]
  bank: bool,

  #[arg(long, requires = "bank")]
  agency: Option<String>,

  /// Savings account number.
  #[arg(long, requires = "bank")]
  savings: Option<String>,

  /// Checking account number.
  #[arg(long, requires = "bank")]
  checking: Option<String>,

  #[arg(long)]
  notes: Option<String>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_string()) }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| "http://localhost:5282".to_string()),
    username: args
      .user
      .or_else(|| non_empty(&file_cfg.username))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| non_empty(&file_cfg.password))
      .unwrap_or_default(),
  };
  let client = ApiClient::new(api_config)?;

  match args.command.unwrap_or(Command::Browse) {
    Command::Browse => browse(client).await,
    Command::Add(add) => {
      init_tracing();
      add_worker(&client, add).await
    }
    Command::Summary => {
      init_tracing();
      summary(&client).await
    }
  }
}

/// Log to stderr for the one-shot commands; the TUI keeps the terminal.
fn init_tracing() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();
}

// ─── add ──────────────────────────────────────────────────────────────────────

async fn add_worker(client: &ApiClient, args: AddArgs) -> Result<()> {
  let catalog = client.catalog().await?;

  let mut form = RegistrationForm::new();
  form.full_name = args.name;
  form.worker_type = Some(args.worker_type);
  form.select_sector(args.sector);
  if let Err(e) = form.select_field(&catalog, &args.field) {
    let choices = form.field_choices(&catalog).join(", ");
    bail!("{e}; fields of this sector: {choices}");
  }
  form.missionary_field = args.missionary_field.unwrap_or_default();
  form.notes = args.notes.unwrap_or_default();
  if args.bank {
    form.payment_kind = PaymentKind::Bank;
    form.agency = args.agency.unwrap_or_default();
    form.savings_account = args.savings.unwrap_or_default();
    form.checking_account = args.checking.unwrap_or_default();
  }

  if form.needs_account_hint() {
    eprintln!("hint: no savings or checking account given for a bank payment");
  }

  // Validate locally on a copy so the request carries the raw draft.
  form
    .clone()
    .submit(&catalog, client.username(), || {})
    .context("the registration is incomplete")?;

  let record = client.create_worker(&form).await?;
  tracing::debug!(id = %record.id, "worker created");
  println!("{} registered with id {}", record.full_name, record.id);
  Ok(())
}

// ─── summary ──────────────────────────────────────────────────────────────────

async fn summary(client: &ApiClient) -> Result<()> {
  let workers = client.summary().await?;
  let ledger = client.ledger_summary().await?;

  println!("Obreiros: {}", workers.total);
  for t in WorkerType::iter() {
    let n = workers.by_type.get(&t).copied().unwrap_or_default();
    println!("  {:<14}{n}", t.label());
  }
  for k in PaymentKind::iter() {
    let n = workers.by_payment.get(&k).copied().unwrap_or_default();
    println!("  {:<14}{n}", k.label());
  }
  println!(
    "Contribuições: {} ({} lançamentos)",
    format_brl(ledger.total),
    ledger.entries
  );
  Ok(())
}

// ─── browse ───────────────────────────────────────────────────────────────────

async fn browse(client: ApiClient) -> Result<()> {
  let mut app = App::new(client);

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let load_result = app.load().await;

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app).await
  } else {
    load_result
  };

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
