//! # carbonledger-types
//!
//! Shared types, errors, and configuration for the **CarbonLedger** batch
//! ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`BatchId`], [`Principal`]
//! - **Capabilities**: [`Role`]
//! - **Batch model**: [`Batch`], [`BatchMetadata`]
//! - **Retirement model**: [`RetirementRecord`]
//! - **Audit trail**: [`LedgerEvent`], [`LedgerEventKind`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`LedgerError`] with `CL_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod retirement;
pub mod role;

pub use batch::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use retirement::*;
pub use role::*;

// Constants are accessed via `carbonledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
