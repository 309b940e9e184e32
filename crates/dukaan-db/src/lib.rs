//! # dukaan-db: Database Layer for Dukaan POS
//!
//! This crate provides storage and the transactional ledger for Dukaan
//! POS, on SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dukaan POS Data Flow                             │
//! │                                                                         │
//! │  API layer (out of scope): resolves TenantId, accepts commands          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dukaan-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌───────────────────┐  │   │
//! │  │   │    Ledger    │   │   Reports    │   │   Repositories    │  │   │
//! │  │   │ (ledger.rs)  │   │ (reports.rs) │   │  (repository/*)   │  │   │
//! │  │   │              │   │              │   │                   │  │   │
//! │  │   │ sale, return │   │  dashboard   │   │ catalog, parties, │  │   │
//! │  │   │ purchase and │   │  date-range  │   │ history reads,    │  │   │
//! │  │   │ its reversal │   │  report      │   │ expenses, audit   │  │   │
//! │  │   └──────┬───────┘   └──────┬───────┘   └─────────┬─────────┘  │   │
//! │  │          │ one transaction  │ read-only scans     │            │   │
//! │  │          ▼                  ▼                     ▼            │   │
//! │  │   ┌─────────────────────────────────────────────────────────┐  │   │
//! │  │   │       Database (pool.rs) + embedded migrations          │  │   │
//! │  │   └─────────────────────────────────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, foreign keys on)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`ledger`] - The transactional ledger protocols
//! - [`reports`] - Dashboard and date-range report rollups
//! - [`repository`] - Per-entity repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dukaan_db::{Database, DbConfig};
//! use dukaan_core::TenantId;
//!
//! let db = Database::new(DbConfig::new("path/to/shop.db")).await?;
//! let tenant = TenantId::new(claims.tenant_id);
//!
//! let invoice_id = db.ledger().create_sale(&tenant, checkout).await?;
//! let stats = db.reports().dashboard_stats(&tenant).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{Ledger, LedgerError, LedgerResult};
pub use pool::{Database, DbConfig};
pub use reports::Reports;

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sales_return::SalesReturnRepository;
pub use repository::supplier::SupplierRepository;
