//! PassVault CLI - run the vault server and generate passwords.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use passvault_crypto::{generate_password, PasswordPolicy};
use passvault_server::state::AppState;
use passvault_vault::{Engine, EngineConfig};

#[derive(Parser)]
#[command(name = "passvault")]
#[command(about = "PassVault - Encrypted password vault server")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    ///
    /// Reads JWT_SECRET, CRYPTO_SECRET and the optional PASSVAULT_* settings
    /// from the environment.
    Serve {
        /// Address to listen on.
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },

    /// Generate random passwords.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Password length.
    #[arg(short, long, default_value_t = 16)]
    length: usize,

    /// How many passwords to print.
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Leave out uppercase letters.
    #[arg(long)]
    no_upper: bool,

    /// Leave out lowercase letters.
    #[arg(long)]
    no_lower: bool,

    /// Leave out digits.
    #[arg(long)]
    no_digits: bool,

    /// Leave out symbols.
    #[arg(long)]
    no_symbols: bool,

    /// Keep easily confused characters (O I o l 0 1).
    #[arg(long)]
    allow_look_alikes: bool,
}

impl GenerateArgs {
    fn policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            length: self.length,
            upper: !self.no_upper,
            lower: !self.no_lower,
            digits: !self.no_digits,
            symbols: !self.no_symbols,
            exclude_look_alikes: !self.allow_look_alikes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve { bind } => cmd_serve(bind).await,
        Commands::Generate(args) => cmd_generate(&args),
    }
}

/// Load configuration, build the engine and serve until interrupted.
async fn cmd_serve(bind: SocketAddr) -> Result<()> {
    let config = EngineConfig::from_env().context("Failed to load configuration")?;
    info!("Starting PassVault with {} store", config.store.backend);

    let engine = Engine::init(&config)
        .await
        .context("Failed to initialize vault engine")?;
    let state = Arc::new(AppState::new(Arc::new(engine)));

    passvault_server::serve(bind, state)
        .await
        .with_context(|| format!("Server on {} failed", bind))
}

/// Print freshly generated passwords, one per line.
fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    let policy = args.policy();
    if policy.alphabet().is_empty() {
        anyhow::bail!("At least one character class must be enabled");
    }
    if policy.length == 0 {
        anyhow::bail!("Length must be greater than zero");
    }

    for _ in 0..args.count {
        println!("{}", generate_password(&policy));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["passvault", "generate"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Generate(args) => args,
            Commands::Serve { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_defaults_match_policy_defaults() {
        assert_eq!(generate_args(&[]).policy(), PasswordPolicy::default());
    }

    #[test]
    fn test_generate_flags() {
        let policy = generate_args(&["-l", "24", "--no-symbols", "--allow-look-alikes"]).policy();
        assert_eq!(policy.length, 24);
        assert!(!policy.symbols);
        assert!(policy.upper && policy.lower && policy.digits);
        assert!(!policy.exclude_look_alikes);
    }

    #[test]
    fn test_serve_bind_default() {
        match Cli::try_parse_from(["passvault", "serve"]).unwrap().command {
            Commands::Serve { bind } => assert_eq!(bind, "127.0.0.1:3000".parse().unwrap()),
            Commands::Generate(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_generate_rejects_empty_alphabet() {
        let args = generate_args(&["--no-upper", "--no-lower", "--no-digits", "--no-symbols"]);
        assert!(cmd_generate(&args).is_err());
    }
}
