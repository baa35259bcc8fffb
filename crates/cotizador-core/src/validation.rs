//! # Validation Module
//!
//! Field-level validation rules for quote data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + builder step predicates (Rust)                 │
//! │  ├── Business rule validation                                          │
//! │  └── Errors returned as data, collected per step                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::BPS_SCALE;
use crate::types::ClientInfo;
use crate::{MAX_ITEM_QUANTITY, MAX_QUOTE_ITEMS, MAX_VALIDITY_DAYS, MIN_VALIDITY_DAYS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Client Field Validators
// =============================================================================

/// Validates a client legal name (razón social).
pub fn validate_legal_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "legal name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "legal name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a tax id (RUT).
///
/// ## Rules
/// - Must not be empty
/// - Digits, dots, hyphen and the K check digit only
///
/// Check-digit verification stays in the frontend; here we only refuse
/// obviously broken values before they reach persistence.
pub fn validate_tax_id(tax_id: &str) -> ValidationResult<()> {
    let tax_id = tax_id.trim();

    if tax_id.is_empty() {
        return Err(ValidationError::Required {
            field: "tax id".to_string(),
        });
    }

    if tax_id.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "tax id".to_string(),
            max: 20,
        });
    }

    if !tax_id
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == 'k' || c == 'K')
    {
        return Err(ValidationError::InvalidFormat {
            field: "tax id".to_string(),
            reason: "must contain only digits, dots, hyphen and K".to_string(),
        });
    }

    Ok(())
}

/// Validates a client address.
pub fn validate_address(address: &str) -> ValidationResult<()> {
    let address = address.trim();

    if address.is_empty() {
        return Err(ValidationError::Required {
            field: "address".to_string(),
        });
    }

    if address.len() > 300 {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: 300,
        });
    }

    Ok(())
}

/// Runs the three required-field checks of the client step and collects
/// every failure message.
///
/// Returned as data, never thrown: the builder stores these per step and
/// the UI renders them inline.
pub fn client_step_errors(client: &ClientInfo) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = validate_legal_name(&client.legal_name) {
        errors.push(e.to_string());
    }
    if let Err(e) = validate_tax_id(&client.tax_id) {
        errors.push(e.to_string());
    }
    if let Err(e) = validate_address(&client.address) {
        errors.push(e.to_string());
    }

    errors
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in pesos.
///
/// ## Rules
/// - Must be non-negative (zero is allowed: bonus lines)
pub fn validate_unit_price(pesos: i64) -> ValidationResult<()> {
    if pesos < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unit price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount in basis points (0% to 100%).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps as i64 > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: BPS_SCALE,
        });
    }

    Ok(())
}

/// Validates offer validity in days (1-365).
pub fn validate_validity_days(days: u32) -> ValidationResult<()> {
    if days < MIN_VALIDITY_DAYS || days > MAX_VALIDITY_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "validity days".to_string(),
            min: MIN_VALIDITY_DAYS as i64,
            max: MAX_VALIDITY_DAYS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items on a quote.
pub fn validate_item_count(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_QUOTE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: 0,
            max: MAX_QUOTE_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog search query.
///
/// ## Rules
/// - Can be empty (returns default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_legal_name() {
        assert!(validate_legal_name("Constructora Andes Ltda.").is_ok());
        assert!(validate_legal_name("").is_err());
        assert!(validate_legal_name("   ").is_err());
        assert!(validate_legal_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_tax_id() {
        assert!(validate_tax_id("76.543.210-K").is_ok());
        assert!(validate_tax_id("12345678-9").is_ok());
        assert!(validate_tax_id("").is_err());
        assert!(validate_tax_id("no es rut").is_err());
    }

    #[test]
    fn test_client_step_errors_collects_all() {
        let empty = ClientInfo::default();
        let errors = client_step_errors(&empty);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("legal name")));
        assert!(errors.iter().any(|e| e.contains("tax id")));
        assert!(errors.iter().any(|e| e.contains("address")));

        let valid = ClientInfo {
            legal_name: "Constructora Andes Ltda.".to_string(),
            tax_id: "76.543.210-K".to_string(),
            address: "Av. Las Obras 123".to_string(),
            ..ClientInfo::default()
        };
        assert!(client_step_errors(&valid).is_empty());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(0).is_ok());
        assert!(validate_unit_price(8_500).is_ok());
        assert!(validate_unit_price(-100).is_err());
    }

    #[test]
    fn test_validate_discount_bps() {
        assert!(validate_discount_bps(0).is_ok());
        assert!(validate_discount_bps(10_000).is_ok());
        assert!(validate_discount_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_validity_days() {
        assert!(validate_validity_days(1).is_ok());
        assert!(validate_validity_days(30).is_ok());
        assert!(validate_validity_days(365).is_ok());
        assert!(validate_validity_days(0).is_err());
        assert!(validate_validity_days(366).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  cemento ").unwrap(), "cemento");
        assert!(validate_search_query(&"x".repeat(150)).is_err());
    }
}
