//! # Repository Module
//!
//! Database repository implementations for Dukaan POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │     │   db.products().get(&tenant, id)                                  │
//! │     ▼                                                                   │
//! │  ProductRepository ── SQL, always filtered by tenant_id ──► SQLite      │
//! │                                                                         │
//! │  Repositories cover single-entity reads and catalog maintenance.        │
//! │  Anything that must move SEVERAL balances at once (a sale, a return,    │
//! │  a purchase) belongs to the [`crate::ledger`] module, which runs its    │
//! │  steps inside one transaction instead of one pool call per step.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method takes the `TenantId` explicitly. There is no unscoped
//! query in this crate.

pub mod audit;
pub mod category;
pub mod customer;
pub mod expense;
pub mod invoice;
pub mod product;
pub mod purchase;
pub mod sales_return;
pub mod supplier;
