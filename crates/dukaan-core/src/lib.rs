//! # dukaan-core: Pure Business Logic for Dukaan POS
//!
//! This crate is the **heart** of Dukaan POS. It contains the domain types
//! and the ledger arithmetic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Dukaan POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              API / UI layer (separate repo)                     │   │
//! │  │    resolves the tenant, deserializes commands, renders DTOs     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dukaan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │ ledger_math │  │  error   │  │   │
//! │  │   │  Invoice  │  │   Money   │  │ totals,     │  │ NotFound │  │   │
//! │  │   │  Product  │  │  (paisa)  │  │ floors,     │  │ Stock... │  │   │
//! │  │   │  Customer │  │           │  │ growth%     │  │          │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   dukaan-db (Database Layer)                    │   │
//! │  │      SQLite, transactional ledger, reports, migrations          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Invoice, Customer, Supplier, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`tenant`] - Explicit tenant scope threaded through every call
//! - [`commands`] - Write-side command inputs (CreateSale, CreatePurchase, ...)
//! - [`ledger_math`] - Totals, floors, growth/retention/margin math
//! - [`reports`] - Read-side DTOs (dashboard, date-range report)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paisa (i64) to avoid float errors
//! 4. **Explicit Tenancy**: Entity constructors require a `TenantId`; there is
//!    no ambient "current shop" anywhere
//! 5. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod error;
pub mod ledger_math;
pub mod money;
pub mod reports;
pub mod tenant;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use dukaan_core::Money` instead of
// `use dukaan_core::money::Money`

pub use commands::{CreatePurchase, CreateSale, CreateSalesReturn, PurchaseLine, ReturnLine, SaleLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger_math::ProductTier;
pub use money::Money;
pub use tenant::TenantId;
pub use types::*;
