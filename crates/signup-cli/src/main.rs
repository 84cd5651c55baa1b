//! MySitterSquad signup - command-line entry point.

mod config;
mod error;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use airtable_client::AirtableClient;
use anyhow::Context;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use signup::{
    AirtableUserStore, FormResponse, MemorySession, MemoryUserStore, NoticeKind,
    RegistrationService, SessionStore, SignInOutcome, SignupForm, UserStore,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "signup-cli", about = "Create or sign in to a MySitterSquad account")]
struct Cli {
    /// Use an in-memory record store instead of Airtable
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        mobile: String,
    },
    /// Sign in with an existing mobile number
    SignIn {
        #[arg(long)]
        mobile: String,
    },
    /// Check that the record store is reachable
    Health,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log.level);

    let store = build_store(&config, cli.dry_run)?;
    let session: Arc<dyn SessionStore> = Arc::new(MemorySession::new());
    let mut service = RegistrationService::new(store.user_store(), session.clone());
    if let Some(country) = config.default_country()? {
        info!(country_code = country.as_str(), "National mobiles use default country");
        service = service.with_default_country(country);
    }
    let service = Arc::new(service);

    match cli.command {
        Command::Register {
            first_name,
            last_name,
            mobile,
        } => {
            let mut form = SignupForm::new(service);
            form.set_first_name(first_name);
            form.set_last_name(last_name);
            form.set_mobile(Some(mobile));

            let response = form.submit().await?;
            render(&response);

            if !response.outcome.is_created() {
                return Err(AppError::NotRegistered);
            }
            if let Some(user) = session.get_user().await {
                info!(user_id = %user.id, "Session established");
            }
        }
        Command::SignIn { mobile } => match service.sign_in(&mobile).await {
            SignInOutcome::SignedIn(user) => {
                println!("Signed in as {} ({})", user.full_name(), user.mobile);
            }
            SignInOutcome::UnknownMobile => {
                println!("No account found for this mobile number.");
                return Err(AppError::NotSignedIn);
            }
            SignInOutcome::InvalidInput(reason) => {
                println!("{}", reason);
                return Err(AppError::NotSignedIn);
            }
            SignInOutcome::Failed(e) => {
                warn!(error = %e, "Sign-in failed");
                println!("Failed to sign in. Please try again.");
                return Err(AppError::NotSignedIn);
            }
        },
        Command::Health => {
            if !store.health_check().await {
                return Err(AppError::StoreUnreachable);
            }
            println!("Record store healthy");
        }
    }

    Ok(())
}

/// Record store selected at start-up.
enum Store {
    Airtable(Arc<AirtableUserStore>),
    Memory(Arc<MemoryUserStore>),
}

impl Store {
    fn user_store(&self) -> Arc<dyn UserStore> {
        match self {
            Store::Airtable(store) => store.clone() as Arc<dyn UserStore>,
            Store::Memory(store) => store.clone() as Arc<dyn UserStore>,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            Store::Airtable(store) => store.health_check().await,
            Store::Memory(_) => true,
        }
    }
}

fn build_store(config: &Config, dry_run: bool) -> AppResult<Store> {
    if dry_run {
        info!("Dry run, using in-memory record store");
        return Ok(Store::Memory(Arc::new(MemoryUserStore::new())));
    }

    let airtable = config.airtable()?;
    let client = AirtableClient::new(
        airtable.api_key.expose_secret().as_str(),
        &airtable.base_url,
        &airtable.base_id,
        &airtable.table,
        airtable.timeout,
    )?;
    info!(
        "Using Airtable table '{}' in base {} (timeout={:?})",
        client.table(),
        airtable.base_id,
        airtable.timeout
    );

    Ok(Store::Airtable(Arc::new(AirtableUserStore::new(client))))
}

fn render(response: &FormResponse) {
    let marker = match response.notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Destructive => "error",
    };
    println!(
        "[{}] {}: {}",
        marker, response.notice.title, response.notice.description
    );
    if let Some(route) = response.navigate_to {
        println!("-> {}", route.path());
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
