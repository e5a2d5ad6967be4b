//! Walks one action through its lifecycle against the in-memory backends.
//!
//! ```text
//! RUST_LOG=debug cargo run -p hookwork-service --example basic -- --config hookwork.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use hookwork_audit::{AuditQuery, AuditStore};
use hookwork_audit_memory::MemoryAuditStore;
use hookwork_core::{ActionDraft, ActionUpdate, Authentication, TenantId};
use hookwork_service::{ActionServiceBuilder, ServiceConfig};
use hookwork_store_memory::{MemoryActionStore, MemoryDistributedLock};

#[derive(Parser, Debug)]
#[command(name = "basic", about = "Action lifecycle walkthrough")]
struct Cli {
    /// Path to a TOML service configuration. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tenant to operate in.
    #[arg(long, default_value = "tenant1")]
    tenant: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    let audit = Arc::new(MemoryAuditStore::new());
    let service = ActionServiceBuilder::new()
        .store(Arc::new(MemoryActionStore::new()))
        .lock(Arc::new(MemoryDistributedLock::new()))
        .audit(audit.clone())
        .config(config)
        .build()?;
    let tenant = TenantId::new(cli.tenant);

    let draft = ActionDraft::new(
        "Token Enricher",
        "https://hooks.example.com/token",
        Authentication::bearer("s3cr3t"),
    );
    let action = service.add("preissueaccesstoken", &draft, &tenant).await?;
    info!(id = %action.id, status = %action.status.as_str(), "created");

    let listed = service.get_by_type("preissueaccesstoken", &tenant).await?;
    info!(count = listed.len(), "listed");

    let renamed = service
        .update(
            "preissueaccesstoken",
            action.id.as_str(),
            &ActionUpdate::default().with_name("Token Enricher v2"),
            &tenant,
        )
        .await?;
    info!(name = %renamed.name, "renamed");

    let inactive = service
        .deactivate("preissueaccesstoken", action.id.as_str(), &tenant)
        .await?;
    info!(status = %inactive.status.as_str(), "deactivated");

    service
        .delete("preissueaccesstoken", action.id.as_str(), &tenant)
        .await?;
    info!("deleted");

    service.shutdown().await;
    let page = audit.query(&AuditQuery::default()).await?;
    for record in page.records.iter().rev() {
        println!(
            "{} {} {}",
            record.recorded_at.to_rfc3339(),
            record.operation,
            serde_json::to_string(&record.after.as_ref().or(record.before.as_ref()))?
        );
    }
    Ok(())
}
