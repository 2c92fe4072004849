use super::ApiError;
use crate::game::Difficulty;

pub fn validate_vault_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid vault ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_offensive_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid offensive ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_vault_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Field 'name' cannot be empty"));
    }
    if trimmed.len() > 80 {
        return Err(ApiError::validation(
            "Field 'name' must be 80 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_item_amount(amount: i32) -> Result<i32, ApiError> {
    const MAX_ITEMS: i32 = 500;

    if !(0..=MAX_ITEMS).contains(&amount) {
        return Err(ApiError::validation(format!(
            "Field 'itemAmount' must be between 0 and {}",
            MAX_ITEMS
        )));
    }
    Ok(amount)
}

pub fn validate_difficulty(difficulty: &str) -> Result<Difficulty, ApiError> {
    difficulty
        .parse()
        .map_err(|e: String| ApiError::validation(format!("Field 'difficulty': {e}")))
}

pub fn validate_message_body(body: &str) -> Result<&str, ApiError> {
    const MAX_MESSAGE_LEN: usize = 1000;

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Message body cannot be empty"));
    }
    if trimmed.len() > MAX_MESSAGE_LEN {
        return Err(ApiError::validation(format!(
            "Message body must be {} characters or less",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_vault_id() {
        assert!(validate_vault_id(1).is_ok());
        assert!(validate_vault_id(12345).is_ok());
        assert!(validate_vault_id(0).is_err());
        assert!(validate_vault_id(-1).is_err());
    }

    #[test]
    fn test_validate_vault_name() {
        assert_eq!(validate_vault_name("Gilded Reliquary").unwrap(), "Gilded Reliquary");
        assert_eq!(validate_vault_name("  trimmed  ").unwrap(), "trimmed");
        assert!(validate_vault_name("").is_err());
        assert!(validate_vault_name("   ").is_err());
        assert!(validate_vault_name(&"a".repeat(81)).is_err());
    }

    #[test]
    fn test_validate_item_amount() {
        assert!(validate_item_amount(0).is_ok());
        assert!(validate_item_amount(12).is_ok());
        assert!(validate_item_amount(500).is_ok());
        assert!(validate_item_amount(-1).is_err());
        assert!(validate_item_amount(501).is_err());
    }

    #[test]
    fn test_validate_difficulty() {
        assert!(validate_difficulty("easy").is_ok());
        assert!(validate_difficulty("LEGENDARY").is_ok());
        assert!(validate_difficulty("nightmare").is_err());
    }

    #[test]
    fn test_validate_message_body() {
        assert!(validate_message_body("open sesame").is_ok());
        assert!(validate_message_body("  ").is_err());
        assert!(validate_message_body(&"x".repeat(1001)).is_err());
    }
}
