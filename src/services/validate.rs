//! Input checks shared by the resource operations. Each returns
//! `ServiceError::Validation` naming the offending field.

use rust_decimal::Decimal;

use super::{ServiceError, ServiceResult};
use crate::auth::password::MIN_PASSWORD_LENGTH;

/// One `@`, non-empty local part, and a dotted domain without empty labels.
pub fn email(value: &str) -> ServiceResult<()> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|label| !label.is_empty())
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ServiceError::validation(format!("Invalid email address: {}", value)))
    }
}

pub fn password(value: &str) -> ServiceResult<()> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn non_empty(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub fn non_empty_opt(field: &str, value: Option<&str>) -> ServiceResult<()> {
    value.map_or(Ok(()), |v| non_empty(field, v))
}

pub fn non_negative(field: &str, value: Decimal) -> ServiceResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

pub fn non_negative_opt(field: &str, value: Option<Decimal>) -> ServiceResult<()> {
    value.map_or(Ok(()), |v| non_negative(field, v))
}

pub fn non_negative_count(field: &str, value: i32) -> ServiceResult<()> {
    if value < 0 {
        return Err(ServiceError::validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

/// Largest quantity a single cart or order line may be set to in one request.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

pub fn quantity(value: i32) -> ServiceResult<()> {
    if value < 1 {
        return Err(ServiceError::validation("Quantity must be at least 1"));
    }
    if value > MAX_LINE_QUANTITY {
        return Err(ServiceError::validation(format!(
            "Quantity must be at most {}",
            MAX_LINE_QUANTITY
        )));
    }
    Ok(())
}

pub fn rating(value: i32) -> ServiceResult<()> {
    if !(1..=5).contains(&value) {
        return Err(ServiceError::validation("Rating must be between 1 and 5"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(email("shopper@example.com").is_ok());
        assert!(email("a.b+tag@mail.example.co").is_ok());

        for bad in ["", "plain", "@example.com", "a@", "a@localhost", "a@@b.com", "a@b..com", "a b@c.com"] {
            assert!(email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn password_length() {
        assert!(password("12345678").is_ok());
        assert!(password("1234567").is_err());
    }

    #[test]
    fn ratings_are_one_to_five() {
        assert!(rating(1).is_ok() && rating(5).is_ok());
        assert!(rating(0).is_err() && rating(6).is_err());
    }

    #[test]
    fn zero_is_not_negative() {
        assert!(non_negative("price", Decimal::ZERO).is_ok());
        assert!(non_negative("price", Decimal::new(-1, 2)).is_err());
        assert!(non_negative_opt("tax", None).is_ok());
    }
}
