//! Input validation for expense operations.
//!
//! Validation always runs before any store access or transition check.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use reimburse_shared::types::Amount;

use crate::expense::error::ValidationError;
use crate::expense::types::NewExpense;

/// Maximum rejection reason length, in characters.
pub const MAX_REJECTION_REASON_LEN: usize = 500;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Validates and trims a rejection reason.
pub fn rejection_reason(reason: &str) -> Result<String, ValidationError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RejectionReasonRequired);
    }
    let len = trimmed.chars().count();
    if len > MAX_REJECTION_REASON_LEN {
        return Err(ValidationError::RejectionReasonTooLong {
            len,
            max: MAX_REJECTION_REASON_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Rescales to whole cents, refusing values that would be rounded.
fn cents(amount: Amount) -> Result<Amount, ValidationError> {
    amount
        .to_cents()
        .ok_or(ValidationError::TooManyDecimalPlaces {
            value: amount.value(),
            max: Amount::SCALE,
        })
}

/// Validates an optional paid amount.
pub fn paid_amount(amount: Option<Decimal>) -> Result<Option<Amount>, ValidationError> {
    amount
        .map(|value| {
            Amount::positive(value)
                .map_err(|e| ValidationError::NonPositiveAmount(e.0))
                .and_then(cents)
        })
        .transpose()
}

/// Validates an optional paid date against `now`.
pub fn paid_date(
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match date {
        Some(date) if date > now => Err(ValidationError::FutureDate {
            date: date.date_naive(),
            today: now.date_naive(),
        }),
        other => Ok(other),
    }
}

/// Validates a new expense submission, trimming its description.
pub fn new_expense(mut input: NewExpense, today: NaiveDate) -> Result<NewExpense, ValidationError> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(ValidationError::DescriptionRequired);
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            len,
            max: MAX_DESCRIPTION_LEN,
        });
    }
    if !input.amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount(input.amount.value()));
    }
    if input.date > today {
        return Err(ValidationError::FutureDate {
            date: input.date,
            today,
        });
    }

    input.amount = cents(input.amount)?;
    input.description = description.to_string();
    input.image_url = input
        .image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn submission(description: &str, amount: Decimal, date: NaiveDate) -> NewExpense {
        NewExpense {
            description: description.to_string(),
            amount: Amount::new(amount),
            date,
            image_url: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_rejection_reason_trimmed() {
        assert_eq!(rejection_reason("  missing receipt ").unwrap(), "missing receipt");
    }

    #[test]
    fn test_rejection_reason_empty_or_blank() {
        assert_eq!(
            rejection_reason(""),
            Err(ValidationError::RejectionReasonRequired)
        );
        assert_eq!(
            rejection_reason(" \t\n"),
            Err(ValidationError::RejectionReasonRequired)
        );
    }

    #[test]
    fn test_rejection_reason_length_boundary() {
        assert!(rejection_reason(&"x".repeat(500)).is_ok());
        assert_eq!(
            rejection_reason(&"x".repeat(501)),
            Err(ValidationError::RejectionReasonTooLong { len: 501, max: 500 })
        );
    }

    #[test]
    fn test_rejection_reason_counts_characters_not_bytes() {
        assert!(rejection_reason(&"é".repeat(500)).is_ok());
    }

    #[test]
    fn test_paid_amount() {
        assert_eq!(paid_amount(None), Ok(None));
        assert_eq!(
            paid_amount(Some(dec!(10.5))),
            Ok(Some(Amount::new(dec!(10.5))))
        );
        assert_eq!(
            paid_amount(Some(dec!(0))),
            Err(ValidationError::NonPositiveAmount(dec!(0)))
        );
        assert!(paid_amount(Some(dec!(-1))).is_err());
    }

    #[test]
    fn test_paid_amount_rejects_sub_cent_values() {
        assert_eq!(
            paid_amount(Some(dec!(10.005))),
            Err(ValidationError::TooManyDecimalPlaces {
                value: dec!(10.005),
                max: 2
            })
        );
        let rescaled = paid_amount(Some(dec!(10.500))).unwrap().unwrap();
        assert_eq!(rescaled.to_string(), "10.50");
    }

    #[test]
    fn test_paid_date_not_in_future() {
        let now = Utc::now();
        assert_eq!(paid_date(None, now), Ok(None));
        assert_eq!(paid_date(Some(now), now), Ok(Some(now)));
        assert!(paid_date(Some(now + Duration::days(1)), now).is_err());
    }

    #[test]
    fn test_new_expense_valid() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let input = new_expense(submission("  Lunch  ", dec!(12.50), today), today).unwrap();
        assert_eq!(input.description, "Lunch");
        assert_eq!(input.amount.to_string(), "12.50");
        assert_eq!(input.image_url, None);
        assert!(matches!(
            new_expense(submission("Lunch", dec!(12.505), today), today),
            Err(ValidationError::TooManyDecimalPlaces { .. })
        ));
    }

    #[test]
    fn test_new_expense_rejects_future_date() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        assert_eq!(
            new_expense(submission("Hotel", dec!(100), tomorrow), today),
            Err(ValidationError::FutureDate {
                date: tomorrow,
                today
            })
        );
    }

    #[test]
    fn test_new_expense_rejects_bad_amount_and_description() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            new_expense(submission("Hotel", dec!(0), today), today),
            Err(ValidationError::NonPositiveAmount(dec!(0)))
        );
        assert_eq!(
            new_expense(submission("   ", dec!(5), today), today),
            Err(ValidationError::DescriptionRequired)
        );
        assert!(matches!(
            new_expense(submission(&"d".repeat(256), dec!(5), today), today),
            Err(ValidationError::DescriptionTooLong { len: 256, .. })
        ));
    }
}
