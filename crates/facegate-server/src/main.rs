//! facegate-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the face-login API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```text
//! cargo run -p facegate-server -- hash-password
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use facegate_core::account::AccountId;
use facegate_server::{ServerConfig, StoreConfig, build_app, open_store};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Face login server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Register an account so faces can be enrolled for it.
  AddAccount {
    /// Account id as known to the identity backend.
    #[arg(long)]
    id:         String,
    /// Login identifier (email) the identity backend issues links for.
    #[arg(long)]
    email:      String,
    /// Start with face login already enabled.
    #[arg(long)]
    enabled:    bool,
    /// SQLite file to write to; overrides `store_path` from the config.
    #[arg(long)]
    store_path: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      let salt = SaltString::generate(&mut OsRng);
      let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
        .to_string();
      println!("{hash}");
      Ok(())
    }
    Command::AddAccount { id, email, enabled, store_path } => {
      let store_path = match store_path {
        Some(p) => p,
        None => StoreConfig::load(&cli.config)?.store_path,
      };
      let store = open_store(&store_path).await?;
      let account = store
        .add_account(AccountId::new(id), &email, enabled)
        .await
        .context("failed to add account")?;
      println!(
        "added {} <{}> face_login_enabled={}",
        account.account_id, account.login_identifier, account.face_login_enabled
      );
      Ok(())
    }
    Command::Serve => serve(&cli.config).await,
  }
}

async fn serve(config_path: &std::path::Path) -> anyhow::Result<()> {
  let cfg = ServerConfig::load(config_path)?;
  let store = open_store(&cfg.store_path).await?;
  let app = build_app(&cfg, store)?;
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
