//! System-wide constants for the CarbonLedger batch ledger.

/// The id assigned to the first issued batch.
pub const FIRST_BATCH_ID: u64 = 1;

/// Default prefix for per-batch metadata URIs.
pub const DEFAULT_METADATA_BASE_URI: &str = "https://example.com/metadata/";

/// Default upper bound on a retirement reason, in bytes.
pub const DEFAULT_MAX_REASON_LEN: usize = 1024;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ledger name.
pub const LEDGER_NAME: &str = "CarbonLedger";
