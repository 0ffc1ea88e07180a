//! # fuel-core: Pure Business Logic for the Fuel Ledger
//!
//! This crate is the **heart** of the fuel inventory ledger. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Fuel Ledger Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │   create-receipt, finalize, dispense, void, tank-snapshot      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                fuel-db (workflows + repositories)               │   │
//! │  │   transactions, guarded stock updates, audit side effects      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fuel-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │  volume   │  │ validation│  │    pin    │   │   │
//! │  │   │   Tank    │  │  Volume   │  │   rules   │  │  argon2   │   │   │
//! │  │   │ Movement  │  │ (no f64!) │  │   checks  │  │   hash    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Tank, Movement, Receipt, Dispense, AuditEntry)
//! - [`volume`] - Volume type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`pin`] - One-way PIN hashing and verification
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Volumes**: All fuel volumes are centiliters (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use fuel_core::volume::Volume;
//! use fuel_core::types::MovementKind;
//!
//! // Create a volume from centiliters (never from floats!)
//! let amount = Volume::from_centiliters(5_000); // 50.00 L
//!
//! // The sign of a stock delta is a total function of the movement kind
//! assert_eq!(MovementKind::Receipt.signed_delta(amount.centiliters()), 5_000);
//! assert_eq!(MovementKind::Dispense.signed_delta(amount.centiliters()), -5_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pin;
pub mod types;
pub mod validation;
pub mod volume;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use fuel_core::Volume` instead of
// `use fuel_core::volume::Volume`

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;
pub use volume::Volume;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines a single receipt may distribute fuel across.
///
/// ## Business Reason
/// A delivery truck unloads into a handful of tanks at most. A very large
/// line count is almost certainly a data-entry error.
pub const MAX_RECEIPT_LINES: usize = 20;

/// Minimum PIN length (ASCII digits).
pub const MIN_PIN_LEN: usize = 4;

/// Maximum PIN length (ASCII digits).
pub const MAX_PIN_LEN: usize = 8;
