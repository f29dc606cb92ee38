//! End-to-end local flow: bootstrap, grant issuer, issue, retire, inspect.
//!
//! ```text
//! cargo run -p carbonledger-core --example local_flow [config.json]
//! ```
//!
//! Without a config file the admin is generated and `BASE_URI` (if set)
//! overrides the metadata base URI. `RUST_LOG` controls ledger logging.

use carbonledger_core::{Ledger, SharedLedger};
use carbonledger_types::{BatchMetadata, LedgerConfig, Principal, Result, Role};
use chrono::{Duration, Utc};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => LedgerConfig::load(path)?,
        None => {
            let config = LedgerConfig::new(Principal::new());
            match std::env::var("BASE_URI") {
                Ok(base) => config.with_metadata_base_uri(base),
                Err(_) => config,
            }
        }
    };
    let admin = config.admin;
    let issuer = Principal::new();
    let farmer = Principal::new();

    println!("Admin:  {admin}");
    println!("Issuer: {issuer}");
    println!("Farmer: {farmer}");

    let ledger = SharedLedger::new(Ledger::new(config)?);
    ledger.grant_role(admin, Role::Issuer, issuer)?;
    println!("Granted {} to {}", Role::Issuer, issuer.short());

    let now = Utc::now();
    let metadata = BatchMetadata::minimal("FARMER-12345", "ipfs://QmABCDEF")
        .with_location("45.4215 N, 75.6972 W")
        .with_dates(
            now - Duration::days(30),
            now - Duration::days(15),
            now - Duration::days(5),
            now,
        );

    let preview = ledger.preview_next_id();
    let batch_id = ledger.issue_batch_expecting(issuer, preview, farmer, 100, metadata)?;
    println!("Issued batch {batch_id} x 100 to farmer");

    let reason = "Reforestation project in North America";
    ledger.retire(farmer, batch_id, 25, reason)?;
    println!("Retired 25 from batch {batch_id} ({reason})");

    let (batch, balance, history, uri) = ledger.read(|l| -> Result<_> {
        Ok((
            l.get_batch(batch_id)?,
            l.balance_of(farmer, batch_id),
            l.get_retirement_history(batch_id)?,
            l.metadata_uri(batch_id)?,
        ))
    })?;

    println!("\n=== BATCH {batch_id} ===");
    println!("Producer reg no: {}", batch.metadata.producer_registration_no);
    println!("Location:        {}", batch.metadata.location);
    for (label, date) in [
        ("Vintage", batch.metadata.vintage_date),
        ("Verification", batch.metadata.verification_date),
        ("Issuance", batch.metadata.issuance_date),
        ("Tokenization", batch.metadata.tokenization_date),
    ] {
        if let Some(date) = date {
            println!("{label:<16} {}", date.to_rfc3339());
        }
    }
    println!("Evidence:        {}", batch.evidence_hash());
    println!("Metadata URI:    {uri}");
    println!("Issued / retired: {} / {}", batch.issued, batch.retired);
    println!("Farmer balance:  {balance}");

    println!("\n=== RETIREMENT HISTORY ===");
    for (i, record) in history.iter().enumerate() {
        println!(
            "{}. {} retired {} on {} ({})",
            i + 1,
            record.retired_by.short(),
            record.amount,
            record.timestamp.to_rfc3339(),
            record.reason
        );
    }

    ledger.verify_invariants()?;
    println!("\nsnapshot digest: {}", ledger.snapshot().digest()?);
    Ok(())
}
