//! # Validation Module
//!
//! Business rule validation, run before any write.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (apps/api)                                       │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── Money parsing (number or string → minor units)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Required fields, lengths, quantity ranges                          │
//! │  └── Consignment name/quantity pairing                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE po_number, invoice_number, username                         │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wako_core::validation::{validate_contact_name, validate_quantity};
//!
//! validate_contact_name("Budi Santoso").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{Consignment, NewCustomer, NewTransaction, NewTransactionItem};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_PHONE_LEN: usize = 30;
const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 6;

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates a customer's contact name.
///
/// ## Example
/// ```rust
/// use wako_core::validation::validate_contact_name;
///
/// assert!(validate_contact_name("Budi").is_ok());
/// assert!(validate_contact_name("   ").is_err());
/// ```
pub fn validate_contact_name(name: &str) -> ValidationResult<()> {
    required_text("contact_name", name, MAX_NAME_LEN)
}

/// Validates a full customer record.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_contact_name(&customer.contact_name)?;
    optional_text(
        "company_name",
        customer.company_name.as_deref(),
        MAX_NAME_LEN,
    )?;
    optional_text("phone", customer.phone.as_deref(), MAX_PHONE_LEN)?;
    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates an item name.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required_text("item_name", name, MAX_NAME_LEN)
}

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_positive_quantity("quantity", qty)
}

fn validate_positive_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in minor units.
///
/// Zero is allowed (free items), negatives are not.
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Pairs the optional consignment fields of a submitted item.
///
/// Both absent means no consignment; a blank name counts as absent. Supplying
/// only one of the two is rejected.
///
/// ## Example
/// ```rust
/// use wako_core::validation::validate_consignment;
///
/// assert_eq!(validate_consignment(None, None).unwrap(), None);
/// assert!(validate_consignment(Some("Flyer"), Some(10)).unwrap().is_some());
/// assert!(validate_consignment(Some("Flyer"), None).is_err());
/// assert!(validate_consignment(None, Some(10)).is_err());
/// ```
pub fn validate_consignment(
    name: Option<&str>,
    quantity: Option<i64>,
) -> ValidationResult<Option<Consignment>> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    match (name, quantity) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ValidationError::Incomplete {
            field: "consignment_name".to_string(),
            missing: "consignment_qty".to_string(),
        }),
        (None, Some(_)) => Err(ValidationError::Incomplete {
            field: "consignment_qty".to_string(),
            missing: "consignment_name".to_string(),
        }),
        (Some(name), Some(quantity)) => {
            if name.chars().count() > MAX_NAME_LEN {
                return Err(ValidationError::TooLong {
                    field: "consignment_name".to_string(),
                    max: MAX_NAME_LEN,
                });
            }
            validate_positive_quantity("consignment_qty", quantity)?;
            Ok(Some(Consignment {
                name: name.to_string(),
                quantity,
            }))
        }
    }
}

/// Validates one submitted line item.
pub fn validate_item(item: &NewTransactionItem) -> ValidationResult<()> {
    validate_item_name(&item.item_name)?;
    validate_unit_price_cents(item.unit_price.cents())?;
    validate_quantity(item.quantity)?;

    if let Some(consignment) = &item.consignment {
        validate_consignment(Some(&consignment.name), Some(consignment.quantity))?;
        if item.unit_price.checked_multiply(consignment.quantity).is_none() {
            return Err(ValidationError::OutOfRange {
                field: "consignment_qty".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            });
        }
    }

    if item.line_total().is_none() {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: i64::MAX / item.quantity.max(1),
        });
    }

    Ok(())
}

/// Validates a whole order before anything is written.
///
/// ## Rules
/// - At least one item, at most [`MAX_ORDER_ITEMS`]
/// - Every item passes [`validate_item`]
pub fn validate_new_transaction(transaction: &NewTransaction) -> ValidationResult<()> {
    if transaction.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if transaction.items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    transaction.items.iter().try_for_each(validate_item)
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - 3 to 50 characters
/// - ASCII letters, digits, `_`, `.` and `-` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LEN,
        });
    }
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "only letters, digits, '_', '.' and '-' are allowed".to_string(),
        });
    }

    Ok(())
}

/// Validates a password on registration.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
