use bigdecimal::BigDecimal;
use std::fmt;
use uuid::Uuid;

use crate::error::Cause;

/// Orders are stored as NUMERIC(15, 2).
pub const AMOUNT_MAX_SCALE: i64 = 2;
pub const AMOUNT_MAX_DIGITS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Cause {
    fn from(err: ValidationError) -> Self {
        Cause::new(err.field, err.message)
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_positive_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_amount_precision(amount: &BigDecimal) -> ValidationResult {
    let normalized = amount.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale > AMOUNT_MAX_SCALE {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} decimal places", AMOUNT_MAX_SCALE),
        ));
    }

    let integer_digits = normalized.digits() as i64 - scale;
    if integer_digits > (AMOUNT_MAX_DIGITS as i64 - AMOUNT_MAX_SCALE) {
        return Err(ValidationError::new("amount", "is too large"));
    }

    Ok(())
}

pub fn validate_amount(amount: &BigDecimal) -> ValidationResult {
    validate_positive_amount(amount)?;
    validate_amount_precision(amount)
}

pub fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::new(field, "must be a valid UUID"))
}
