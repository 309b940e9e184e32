//! # Error Types
//!
//! Domain-specific error types for dukaan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dukaan-core errors (this file)                                         │
//! │  ├── CoreError        - Ledger invariant violations                     │
//! │  └── ValidationError  - Bad input from the caller                       │
//! │                                                                         │
//! │  dukaan-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── LedgerError      - CoreError ∪ DbError for ledger protocols        │
//! │                                                                         │
//! │  Any error inside a ledger protocol aborts the whole transaction;       │
//! │  the caller sees either the full effect or no effect at all.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, id, shortfall)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger and domain errors.
///
/// These represent business rule violations. The surrounding API layer maps
/// `NotFound` to a 404-equivalent and everything else to a 400-equivalent.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist in tenant scope.
    ///
    /// Raised for Product/Customer/Supplier/Invoice/Purchase lookups.
    /// A row owned by another tenant is indistinguishable from a missing
    /// row on purpose.
    #[error("Entity \"{entity}\" ({id}) was not found")]
    NotFound { entity: &'static str, id: String },

    /// Not enough stock to cover a sale line.
    ///
    /// The check and the decrement happen atomically per product row, so
    /// two concurrent checkouts can never both drain the same stock.
    #[error("Not enough stock for '{name}'. Available: {available}, requested: {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The invoice was already returned.
    ///
    /// An invoice moves Completed → Returned at most once; a second return
    /// must not double-restock or double-reduce customer debt.
    #[error("Invoice {0} is already returned")]
    AlreadyReturned(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every message is human-readable as-is; the API layer surfaces them
/// verbatim.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A credit (udhaar) sale was submitted without a customer.
    #[error("Customer is required for credit sales")]
    CustomerRequired,

    /// A sale or purchase was submitted with no lines.
    #[error("At least one item is required")]
    NoItems,

    /// A line quantity was zero or negative.
    #[error("Quantity for '{name}' must be positive")]
    NonPositiveQuantity { name: String },

    /// A payment amount was zero or negative.
    #[error("{field} must be positive")]
    NonPositiveAmount { field: &'static str },

    /// Reversing this purchase would drive stock negative: part of the
    /// received quantity has already been sold onward.
    #[error(
        "Cannot delete purchase. Item '{name}' has already been sold. \
         Current stock: {available}, required to reverse: {required}"
    )]
    StockAlreadySold {
        name: String,
        available: i64,
        required: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Tapal Danedar 950g".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Not enough stock for 'Tapal Danedar 950g'. Available: 3, requested: 5"
        );

        let err = CoreError::not_found("Invoice", "abc-123");
        assert_eq!(err.to_string(), "Entity \"Invoice\" (abc-123) was not found");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::CustomerRequired.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: Customer is required for credit sales"
        );
    }

    #[test]
    fn test_stock_already_sold_names_the_shortfall() {
        let err = ValidationError::StockAlreadySold {
            name: "Lux Soap".to_string(),
            available: 2,
            required: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("Lux Soap"));
        assert!(msg.contains("Current stock: 2"));
        assert!(msg.contains("required to reverse: 10"));
    }
}
