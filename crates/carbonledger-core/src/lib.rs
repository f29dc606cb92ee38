//! # carbonledger-core
//!
//! The **batch ledger** for carbon credits: creates batches, tracks
//! per-holder balances, merges additional issuance into existing batches,
//! and records retirements with an auditable history.
//!
//! ## Architecture
//!
//! Leaves first:
//! 1. **RoleRegistry**: admin and issuer membership; grant/revoke
//! 2. **IdAllocator**: dense ids with a side-effect-free preview
//! 3. **BatchStore**: metadata plus the issued/retired counter pair
//! 4. **BalanceLedger**: per-(holder, batch) quantities, never negative
//! 5. **RetirementHistory**: append-only per-batch retirement log
//! 6. **Ledger**: the facade composing the above into atomic operations
//!
//! ## Operation Flow
//!
//! ```text
//! caller → Ledger.authorize() → check_* on every store → apply → event
//! ```
//!
//! Supply conservation holds after every commit:
//! `Σ balances(batch) == issued - retired` and `retired ≤ issued`.

pub mod balance_ledger;
pub mod batch_store;
pub mod clock;
pub mod event_log;
pub mod id_allocator;
pub mod ledger;
pub mod retirement_history;
pub mod role_registry;
pub mod shared;
pub mod snapshot;
pub mod supply_conservation;

pub use balance_ledger::BalanceLedger;
pub use batch_store::BatchStore;
pub use clock::{Clock, FixedClock, SystemClock};
pub use event_log::EventLog;
pub use id_allocator::IdAllocator;
pub use ledger::Ledger;
pub use retirement_history::RetirementHistory;
pub use role_registry::RoleRegistry;
pub use shared::SharedLedger;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use supply_conservation::SupplyConservation;
