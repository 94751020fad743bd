use super::ApiError;

const MAX_EMAIL_LEN: usize = 254;
const MAX_CHIRP_LEN: usize = 140;
const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    if trimmed.len() > MAX_EMAIL_LEN {
        return Err(ApiError::validation(format!(
            "Email must be {} characters or less",
            MAX_EMAIL_LEN
        )));
    }

    if !trimmed.contains('@') {
        return Err(ApiError::validation("Email must contain '@'"));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(password)
}

/// Checks the length limit and returns the body with profane words masked.
pub fn validate_chirp(body: &str) -> Result<String, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::validation("Chirp is empty"));
    }

    if body.chars().count() > MAX_CHIRP_LEN {
        return Err(ApiError::validation("Chirp is too long"));
    }

    Ok(clean_profanity(body))
}

/// Whole words only, case-insensitive. Words split on single spaces so the
/// original spacing survives.
fn clean_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("walt@example.com").unwrap(), "walt@example.com");
        assert_eq!(validate_email("  walt@example.com ").unwrap(), "walt@example.com");
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("04234").is_ok());
        assert!(validate_password(" ").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_chirp_length() {
        assert!(validate_chirp(&"a".repeat(140)).is_ok());
        assert!(validate_chirp(&"é".repeat(140)).is_ok());
        assert!(validate_chirp(&"a".repeat(141)).is_err());
        assert!(validate_chirp("").is_err());
        assert!(validate_chirp("   ").is_err());
    }

    #[test]
    fn test_clean_profanity() {
        assert_eq!(
            validate_chirp("This is a kerfuffle opinion I need to share with the world").unwrap(),
            "This is a **** opinion I need to share with the world"
        );
        assert_eq!(
            validate_chirp("I hear Mastodon is better than Chirpy. sharbert I need to migrate")
                .unwrap(),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(validate_chirp("Fornax  FORNAX").unwrap(), "****  ****");
        // Punctuation makes it a different word.
        assert_eq!(validate_chirp("Sharbert! kerfuffles").unwrap(), "Sharbert! kerfuffles");
    }
}
