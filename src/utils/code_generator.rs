use crate::error::AppResult;
use crate::stores::SubscriberStore;
use rand::Rng;

/// Codes are case-insensitive: stored and compared upper-case with
/// surrounding whitespace removed.
pub fn canonicalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Build one personal-code candidate from the subscriber's email prefix
/// plus a random component.
pub fn personal_code_candidate(email: &str) -> String {
    let prefix: String = email
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();

    let mut rng = rand::thread_rng();
    let random: String = (0..8)
        .map(|_| {
            let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();

    format!("WELCOME{prefix}{random}")
}

/// Generate a personal discount code that no other subscriber holds.
/// Uniqueness is enforced by checking the ledger and retrying on collision.
pub async fn generate_unique_personal_code(
    store: &dyn SubscriberStore,
    email: &str,
) -> AppResult<String> {
    loop {
        let candidate = personal_code_candidate(email);

        if !store.personal_code_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_code() {
        assert_eq!(canonicalize_code("  welcome15 "), "WELCOME15");
        assert_eq!(canonicalize_code("FREESHIP"), "FREESHIP");
        assert_eq!(canonicalize_code("\tSaVe10\n"), "SAVE10");
    }

    #[test]
    fn test_personal_code_candidate_shape() {
        let code = personal_code_candidate("amara@example.com");
        assert!(code.starts_with("WELCOMEAMA"));
        assert_eq!(code.len(), "WELCOMEAMA".len() + 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_personal_code_candidate_short_prefix() {
        // An email with fewer than three leading alphanumerics still works
        let code = personal_code_candidate("a@x.io");
        assert!(code.starts_with("WELCOME"));
        assert!(code.len() >= "WELCOME".len() + 8);
    }
}
