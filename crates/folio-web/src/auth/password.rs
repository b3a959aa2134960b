use argon2::{password_hash::PasswordVerifier, Argon2, PasswordHash};

/// Checks `password` against an Argon2 PHC string. A malformed hash is an error,
/// a wrong password is `Ok(false)`.
pub fn verify_password(hash: &str, password: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};

    #[test]
    fn hash_then_verify() {
        let hash = Argon2::default()
            .hash_password(b"hunter22", &SaltString::generate(&mut OsRng))
            .unwrap()
            .to_string();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "hunter22").unwrap());
        assert!(!verify_password(&hash, "hunter23").unwrap());
    }

    #[test]
    fn malformed_hash_is_error() {
        assert!(verify_password("plaintext", "x").is_err());
    }
}
