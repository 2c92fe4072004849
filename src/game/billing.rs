//! Card-input helpers backing the time-purchase form.
//!
//! No real charge happens anywhere in the product; these helpers only
//! validate and normalize what the purchase endpoint receives.

use thiserror::Error;

/// Longest PAN we accept (ISO/IEC 7812).
const MAX_PAN_DIGITS: usize = 19;
const MIN_PAN_DIGITS: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("Card number must be {MIN_PAN_DIGITS}-{MAX_PAN_DIGITS} digits")]
    InvalidLength,
    #[error("Card number failed checksum")]
    FailedChecksum,
    #[error("Expiry must be in MM/YY format")]
    InvalidExpiry,
    #[error("Card is expired")]
    Expired,
    #[error("Security code must be 3 or 4 digits")]
    InvalidCvc,
}

fn digits_of(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Formats digit input into space-separated groups of four:
/// `"4111111111111111"` becomes `"4111 1111 1111 1111"`.
/// Non-digits are stripped; input is truncated at the PAN maximum.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let mut digits = digits_of(input);
    digits.truncate(MAX_PAN_DIGITS);
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Masks all but the last four digits: `"**** **** **** 1111"`.
#[must_use]
pub fn mask_card_number(input: &str) -> String {
    let digits = digits_of(input);
    if digits.len() < 4 {
        return "****".to_string();
    }
    format!("**** **** **** {}", &digits[digits.len() - 4..])
}

#[must_use]
pub fn luhn_valid(input: &str) -> bool {
    let digits = digits_of(input);
    if digits.is_empty() {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let mut d = u32::from(b - b'0');
            if i % 2 == 1 {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum();

    sum % 10 == 0
}

/// Parses an `MM/YY` expiry into (month, four-digit year).
pub fn parse_expiry(input: &str) -> Result<(u8, u16), CardError> {
    let (month_str, year_str) = input.trim().split_once('/').ok_or(CardError::InvalidExpiry)?;

    let month: u8 = month_str.trim().parse().map_err(|_| CardError::InvalidExpiry)?;
    let year: u16 = year_str.trim().parse().map_err(|_| CardError::InvalidExpiry)?;

    if !(1..=12).contains(&month) || year_str.trim().len() != 2 {
        return Err(CardError::InvalidExpiry);
    }

    Ok((month, 2000 + year))
}

/// Validates a full card input against `now` = (year, month).
pub fn validate_card(
    number: &str,
    expiry: &str,
    cvc: &str,
    now: (u16, u8),
) -> Result<(), CardError> {
    let digits = digits_of(number);
    if !(MIN_PAN_DIGITS..=MAX_PAN_DIGITS).contains(&digits.len()) {
        return Err(CardError::InvalidLength);
    }
    if !luhn_valid(&digits) {
        return Err(CardError::FailedChecksum);
    }

    let (month, year) = parse_expiry(expiry)?;
    let (now_year, now_month) = now;
    if year < now_year || (year == now_year && month < now_month) {
        return Err(CardError::Expired);
    }

    let cvc = cvc.trim();
    if !(cvc.len() == 3 || cvc.len() == 4) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err(CardError::InvalidCvc);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_groups_of_four() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("4111 1111 1111 1111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("41112"), "4111 2");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("4111 1111 1111 1111"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask_card_number("4111111111111111"), "**** **** **** 1111");
        assert_eq!(mask_card_number("12"), "****");
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("04/31"), Ok((4, 2031)));
        assert_eq!(parse_expiry(" 12/29 "), Ok((12, 2029)));
        assert_eq!(parse_expiry("13/29"), Err(CardError::InvalidExpiry));
        assert_eq!(parse_expiry("0429"), Err(CardError::InvalidExpiry));
        assert_eq!(parse_expiry("04/2031"), Err(CardError::InvalidExpiry));
    }

    #[test]
    fn test_validate_card() {
        let now = (2026, 8);
        assert_eq!(validate_card("4111111111111111", "04/31", "123", now), Ok(()));
        assert_eq!(
            validate_card("4111111111111112", "04/31", "123", now),
            Err(CardError::FailedChecksum)
        );
        assert_eq!(
            validate_card("4111111111111111", "07/26", "123", now),
            Err(CardError::Expired)
        );
        assert_eq!(
            validate_card("4111111111111111", "08/26", "123", now),
            Ok(()),
            "a card expiring this month is still valid"
        );
        assert_eq!(
            validate_card("4111111111111111", "04/31", "12", now),
            Err(CardError::InvalidCvc)
        );
        assert_eq!(
            validate_card("411111", "04/31", "123", now),
            Err(CardError::InvalidLength)
        );
    }
}
