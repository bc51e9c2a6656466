use crate::errors::ServiceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Converts an API amount into integer cents.
///
/// Amounts with more than two decimal places are rejected instead of rounded.
pub fn to_cents(amount: Decimal) -> Result<i64, ServiceError> {
    if amount.normalize().scale() > 2 {
        return Err(ServiceError::ValidationError(format!(
            "El monto {} tiene más de dos decimales",
            amount
        )));
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(|| ServiceError::ValidationError(format!("Monto fuera de rango: {}", amount)))
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Validator hook for money fields: non-negative with at most two decimals.
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut err = ValidationError::new("amount_negative");
        err.message = Some("El monto no puede ser negativo".into());
        return Err(err);
    }
    if amount.normalize().scale() > 2 {
        let mut err = ValidationError::new("amount_scale");
        err.message = Some("El monto admite como máximo dos decimales".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_to_and_from_cents() {
        assert_eq!(to_cents(dec!(2500.50)).unwrap(), 250_050);
        assert_eq!(to_cents(dec!(0)).unwrap(), 0);
        assert_eq!(to_cents(dec!(12.300)).unwrap(), 1_230);
        assert_eq!(from_cents(250_050), dec!(2500.50));
        assert_eq!(from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn rejects_sub_cent_amounts() {
        assert_matches!(to_cents(dec!(1.005)), Err(ServiceError::ValidationError(_)));
        assert!(validate_amount(&dec!(1.005)).is_err());
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(validate_amount(&dec!(-1)).is_err());
        assert!(validate_amount(&dec!(0.00)).is_ok());
    }
}
