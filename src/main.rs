mod config;
mod flash;
mod handler;
mod models;
mod presenter;
mod repository;
mod storage;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use flash::{FlashLevel, FlashMessage, FlashStore};
use handler::{ActionError, PaymentActionHandler, UploadPolicy};
use presenter::{render_page, ReviewPage};
use repository::lock::SnapshotLock;
use repository::snapshot::save_snapshot;
use repository::{ClaimPaymentRepository, SnapshotFileRepository};
use std::path::PathBuf;
use std::sync::Arc;
use storage::{InvoiceUpload, LocalInvoiceStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "claim-payments", about = "Review and confirm claim and deposit payments")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write sample claims to the data file
    Seed {
        /// Overwrite an existing data file
        #[arg(long)]
        force: bool,
    },
    /// Show the payment review page
    List {
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload the invoice for a payment
    UploadInvoice {
        #[arg(long)]
        payment: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Confirm a payment that has both invoice and proof
    Confirm {
        #[arg(long)]
        payment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the page itself
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claim_payments=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;
    let flash_store = FlashStore::new(&config.flash_file);

    match cli.command {
        Command::Seed { force } => seed(&config, &flash_store, force).await,
        Command::List { json } => {
            let repository =
                SnapshotFileRepository::new(&config.data_file, config.lock_timeout());
            let claims = repository.list_claims().await?;
            let page = render_page(&claims, flash_store.take().await?);
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_page(&page);
            }
            Ok(())
        }
        Command::UploadInvoice { payment, file } => {
            let max_bytes = config.max_invoice_bytes;
            let message = run_action(&config, |handler| async move {
                let upload = match file {
                    Some(path) => match InvoiceUpload::from_path(&path, max_bytes).await {
                        Ok(upload) => Some(upload),
                        Err(e) => {
                            return FlashMessage::from(&ActionError::Upload(format!("{:#}", e)));
                        }
                    },
                    None => None,
                };
                handler.upload_invoice(&payment, upload).await
            })
            .await;
            finish_action(&flash_store, message).await
        }
        Command::Confirm { payment } => {
            let message = run_action(&config, |handler| async move {
                handler.confirm_payment(&payment).await
            })
            .await;
            finish_action(&flash_store, message).await
        }
    }
}

async fn seed(config: &Config, flash_store: &FlashStore, force: bool) -> Result<()> {
    if config.data_file.exists() && !force {
        warn!(
            "{} already exists, pass --force to overwrite",
            config.data_file.display()
        );
        return Ok(());
    }

    if let Some(parent) = config.data_file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let _lock = SnapshotLock::acquire(&config.data_file, config.lock_timeout()).await?;
    let claims = repository::sample::sample_claims();
    save_snapshot(&config.data_file, &claims).await?;
    info!("🏠 Seeded {} sample claims", claims.len());
    flash_store
        .put(&FlashMessage::new(
            FlashLevel::Info,
            format!("Loaded {} sample claims", claims.len()),
        ))
        .await
}

/// Run one action against the data file; the repository persists its own changes
async fn run_action<F, Fut>(config: &Config, action: F) -> FlashMessage
where
    F: FnOnce(Arc<PaymentActionHandler>) -> Fut,
    Fut: std::future::Future<Output = FlashMessage>,
{
    let repository = Arc::new(SnapshotFileRepository::new(
        &config.data_file,
        config.lock_timeout(),
    ));
    let store = Arc::new(LocalInvoiceStore::new(
        &config.upload_dir,
        config.public_base_url.clone(),
    ));
    let handler = Arc::new(PaymentActionHandler::new(
        repository,
        store,
        UploadPolicy::from(config),
    ));

    action(handler).await
}

async fn finish_action(flash_store: &FlashStore, message: FlashMessage) -> Result<()> {
    println!("[{}] {}", message.level, message.text);
    flash_store.put(&message).await
}

fn print_page(page: &ReviewPage) {
    if let Some(flash) = &page.flash {
        println!("[{}] {}", flash.level, flash.text);
        println!();
    }

    if page.cards.is_empty() {
        println!("No claims awaiting payment review");
        return;
    }

    for card in &page.cards {
        println!("{} ({})", card.property_name, card.property_id);
        println!("   Location: {}", card.location);
        if let Some(image) = &card.image {
            println!("   Image: {}", image);
        }
        println!("   Claim: {} at {}", card.claim_id, card.claimed_at.format("%Y-%m-%d %H:%M"));
        match &card.meeting_report_path {
            Some(report) => println!("   Meeting report: {}", report),
            None => println!("   Meeting report: none"),
        }

        for row in &card.rows {
            println!(
                "   - {} {} | Invoice: {} | Proof: {} | Action: {} | Status: {}",
                row.payment_type,
                row.payment_id,
                row.view.invoice_cell,
                row.view.proof_cell,
                row.view.action_cell,
                row.view.status_cell,
            );
        }
        println!();
    }
}
