//! Prints an Argon2 hash for `FOLIO_ADMIN_PASSWORD_HASH`.
//!
//! Reads the password from stdin so it never lands in shell history.

use std::io::{self, Write};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

const MIN_LENGTH: usize = 12;

fn main() -> anyhow::Result<()> {
    eprint!("Admin password: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    if password.chars().count() < MIN_LENGTH {
        anyhow::bail!("Password must be at least {MIN_LENGTH} characters");
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    eprintln!("Set this as FOLIO_ADMIN_PASSWORD_HASH (or admin.password_hash in the config file):");
    println!("{hash}");
    Ok(())
}
