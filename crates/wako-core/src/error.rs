//! # Error Types
//!
//! Domain-specific error types for wako-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wako-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── RenderError      - Invoice renderer failures                      │
//! │                                                                         │
//! │  wako-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures, NotFound, Conflict           │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the HTTP client sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice document was requested for an order that has no invoice.
    ///
    /// ## When This Occurs
    /// - Building an [`InvoiceDocument`](crate::invoice::InvoiceDocument)
    ///   before the issuance workflow has run for the order
    #[error("Purchase order {po_number} has not been invoiced")]
    NotInvoiced { po_number: String },

    /// A monetary computation left the i64 range.
    #[error("Amount overflow while computing {what}")]
    AmountOverflow { what: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write happens, so a rejected request never leaves
/// partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed price, bad username characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Only part of a field group was supplied.
    ///
    /// Consignment name and quantity travel together.
    #[error("{field} requires {missing}")]
    Incomplete { field: String, missing: String },
}

// =============================================================================
// Render Error
// =============================================================================

/// Failure reported by an [`InvoiceRenderer`](crate::invoice::InvoiceRenderer).
#[derive(Debug, Error)]
#[error("Failed to render invoice {invoice_number}: {reason}")]
pub struct RenderError {
    pub invoice_number: String,
    pub reason: String,
}

impl RenderError {
    /// Creates a render error for the given invoice.
    pub fn new(invoice_number: impl Into<String>, reason: impl Into<String>) -> Self {
        RenderError {
            invoice_number: invoice_number.into(),
            reason: reason.into(),
        }
    }
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
        let err = CoreError::NotInvoiced {
            po_number: "WK-240501-0007".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Purchase order WK-240501-0007 has not been invoiced"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "contact_name".to_string(),
        };
        assert_eq!(err.to_string(), "contact_name is required");

        let err = ValidationError::Incomplete {
            field: "consignment_name".to_string(),
            missing: "consignment_qty".to_string(),
        };
        assert_eq!(err.to_string(), "consignment_name requires consignment_qty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_render_error_message() {
        let err = RenderError::new("INV-2405-0001", "font missing");
        assert_eq!(
            err.to_string(),
            "Failed to render invoice INV-2405-0001: font missing"
        );
    }
}
