//! Helpers shared by the SQLite models.
//!
//! Monetary columns are stored as TEXT so no precision is lost through SQLite's
//! REAL type. Rows written by older tools may contain float notation, which the
//! tolerant parser still accepts.

use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a stored decimal string, falling back to f64 parsing for scientific
/// notation. Unreadable values are logged and read as zero.
pub fn parse_decimal_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str) {
            Ok(f_val) => match Decimal::from_f64(f_val) {
                Some(dec_val) => dec_val,
                None => {
                    log::error!(
                        "Failed to convert {} '{}' (parsed as f64: {}) to Decimal.",
                        field_name,
                        value_str,
                        f_val
                    );
                    Decimal::ZERO
                }
            },
            Err(e_f64) => {
                log::error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name, value_str, e_decimal, e_f64
                );
                Decimal::ZERO
            }
        },
    }
}

/// Serializes a decimal for storage without trailing zeros.
pub fn decimal_to_db(value: Decimal) -> String {
    value.normalize().to_string()
}
