//! # Validation
//!
//! Business rule validation: required fields, VAT rate membership, payment
//! terms bounds, and SIRET/SIREN checksums.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Runs                              │
//! │                                                                         │
//! │  ClientRegistry.create ──► validate_client ──► persist                 │
//! │  SettingsService.save  ──► validate_settings ──► persist               │
//! │  InvoiceService.create ──► validate_line (each)                        │
//! │                        ──► validate_vat_rate (unless VAT-exempt)       │
//! │                        ──► validate_payment_terms ──► compute ──► save │
//! │                                                                         │
//! │  is_valid_siret / is_valid_siren are offered to form layers; the       │
//! │  registry itself stores SIRET values as given.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::{ValidationError, ValidationResult};
use crate::types::{ClientInput, LineInput, SettingsInput};

// =============================================================================
// VAT Rates
// =============================================================================

/// The French VAT rates a line may carry: 0%, 5.5%, 10%, 20%.
pub fn allowed_vat_rates() -> [Decimal; 4] {
    [
        Decimal::ZERO,
        Decimal::new(55, 1),
        Decimal::new(10, 0),
        Decimal::new(20, 0),
    ]
}

/// Checks that a rate is one of the allowed French VAT rates.
///
/// Comparison is by value, so `20`, `20.0` and `20.00` all pass.
pub fn validate_vat_rate(rate: Decimal) -> ValidationResult<()> {
    if allowed_vat_rates().contains(&rate) {
        Ok(())
    } else {
        Err(ValidationError::NotAllowed {
            field: "vatRate".to_string(),
            allowed: allowed_vat_rates()
                .iter()
                .map(|r| r.to_string())
                .collect(),
        })
    }
}

// =============================================================================
// Field Rules
// =============================================================================

/// Payment terms must fit in 0..=3650 days (ten years).
pub fn validate_payment_terms(days: i64) -> ValidationResult<()> {
    if (0..=3650).contains(&days) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "paymentTermsDays".to_string(),
            min: 0,
            max: 3650,
        })
    }
}

/// A client needs a complete billing address; everything else is optional.
pub fn validate_client(input: &ClientInput) -> ValidationResult<()> {
    require("address", &input.address)?;
    require("postalCode", &input.postal_code)?;
    require("city", &input.city)?;
    require("country", &input.country)?;
    Ok(())
}

/// Issuer settings need the full legal identity before documents can be
/// created from them. The seller SIRET is checksummed: it is printed on
/// every document and a typo here would spread to all of them.
pub fn validate_settings(input: &SettingsInput) -> ValidationResult<()> {
    require("businessName", &input.business_name)?;
    require("firstName", &input.first_name)?;
    require("lastName", &input.last_name)?;
    require("siret", &input.siret)?;
    require("address", &input.address)?;
    require("postalCode", &input.postal_code)?;
    require("city", &input.city)?;

    if !is_valid_siret(&input.siret) {
        return Err(ValidationError::InvalidFormat {
            field: "siret".to_string(),
            reason: "must be 14 digits with a valid checksum".to_string(),
        });
    }

    Ok(())
}

/// A line needs a description and non-negative quantity and unit price.
pub fn validate_line(input: &LineInput) -> ValidationResult<()> {
    require("description", &input.description)?;

    if input.description.trim().len() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    if input.quantity.is_sign_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }
    if input.unit_price_ht.is_sign_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "unitPriceHt".to_string(),
        });
    }
    Ok(())
}

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::Required {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

// =============================================================================
// SIRET / SIREN Checksums
// =============================================================================

/// Validates a 14-digit SIRET (establishment number) with its Luhn checksum.
///
/// Whitespace is stripped first, so `"732 829 320 00074"` validates the same
/// as `"73282932000074"`.
///
/// ## Checksum
/// ```text
/// Index (0-based):  0  1  2  3 ...
/// Doubled:          ✓     ✓    ...   (even indexes)
/// Digit > 9 after doubling: subtract 9
/// Valid when the digit sum is a multiple of 10
/// ```
pub fn is_valid_siret(siret: &str) -> bool {
    luhn_valid(siret, 14, 0)
}

/// Validates a 9-digit SIREN (business number). Same Luhn scheme as SIRET
/// but doubling odd indexes, so a SIREN validates independently of the
/// 5-digit establishment suffix.
pub fn is_valid_siren(siren: &str) -> bool {
    luhn_valid(siren, 9, 1)
}

fn luhn_valid(value: &str, expected_len: usize, doubled_parity: usize) -> bool {
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() != expected_len || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = cleaned
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let mut digit = c.to_digit(10).unwrap_or(0);
            if i % 2 == doubled_parity {
                digit *= 2;
                if digit > 9 {
                    digit -= 9;
                }
            }
            digit
        })
        .sum();

    sum % 10 == 0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_vat_rate_membership() {
        assert!(validate_vat_rate(dec!(0)).is_ok());
        assert!(validate_vat_rate(dec!(5.5)).is_ok());
        assert!(validate_vat_rate(dec!(10)).is_ok());
        assert!(validate_vat_rate(dec!(20)).is_ok());
        // Value comparison ignores scale
        assert!(validate_vat_rate(dec!(20.00)).is_ok());

        assert!(validate_vat_rate(dec!(19.6)).is_err());
        assert!(validate_vat_rate(dec!(7)).is_err());
    }

    #[test]
    fn test_payment_terms_bounds() {
        assert!(validate_payment_terms(0).is_ok());
        assert!(validate_payment_terms(30).is_ok());
        assert!(validate_payment_terms(3650).is_ok());
        assert!(validate_payment_terms(-1).is_err());
        assert!(validate_payment_terms(3651).is_err());
    }

    #[test]
    fn test_client_requires_address_fields() {
        let mut input = ClientInput {
            address: "12 rue de la Paix".to_string(),
            postal_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: "France".to_string(),
            ..ClientInput::default()
        };
        assert!(validate_client(&input).is_ok());

        input.city = "   ".to_string();
        let err = validate_client(&input).unwrap_err();
        assert_eq!(err.to_string(), "city is required");
    }

    #[test]
    fn test_settings_requires_identity() {
        let mut input = SettingsInput {
            business_name: "Dupont Conseil".to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            siret: "73282932000074".to_string(),
            address: "3 allée des Tilleuls".to_string(),
            postal_code: "69003".to_string(),
            city: "Lyon".to_string(),
            ..SettingsInput::default()
        };
        assert!(validate_settings(&input).is_ok());

        input.siret = String::new();
        assert!(validate_settings(&input).is_err());

        input.siret = "73282932000075".to_string();
        assert!(matches!(
            validate_settings(&input),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_line_rules() {
        let line = LineInput {
            description: "Développement".to_string(),
            quantity: dec!(2),
            unit: crate::types::LineUnit::Jour,
            unit_price_ht: dec!(450.00),
            vat_rate: dec!(20),
        };
        assert!(validate_line(&line).is_ok());

        let blank = LineInput {
            description: " ".to_string(),
            ..line.clone()
        };
        assert!(validate_line(&blank).is_err());

        let negative = LineInput {
            quantity: dec!(-1),
            ..line.clone()
        };
        assert!(matches!(
            validate_line(&negative),
            Err(ValidationError::MustNotBeNegative { .. })
        ));

        let oversized = LineInput {
            description: "x".repeat(501),
            ..line.clone()
        };
        assert!(matches!(
            validate_line(&oversized),
            Err(ValidationError::TooLong { .. })
        ));

        // Zero quantity is allowed (free or placeholder line)
        let zero = LineInput {
            quantity: dec!(0),
            ..line
        };
        assert!(validate_line(&zero).is_ok());
    }

    #[test]
    fn test_siret_checksum() {
        assert!(is_valid_siret("73282932000074"));
        // Embedded whitespace is tolerated
        assert!(is_valid_siret("732 829 320 00074"));

        assert!(!is_valid_siret("73282932000075")); // bad checksum
        assert!(!is_valid_siret("12345678901234")); // bad checksum
        assert!(!is_valid_siret("7328293200007")); // 13 digits
        assert!(!is_valid_siret("7328293200007A")); // non-digit
        assert!(!is_valid_siret(""));
    }

    #[test]
    fn test_siren_checksum() {
        assert!(is_valid_siren("732829320"));
        assert!(is_valid_siren("732 829 320"));

        assert!(!is_valid_siren("732829321"));
        assert!(!is_valid_siren("73282932")); // 8 digits
        assert!(!is_valid_siren("73282932000074")); // SIRET length
    }
}
