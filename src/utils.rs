use actix_session::Session;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            AppError::Password(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(provided: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        log::error!("Stored password hash is malformed: {}", e);
        AppError::Password(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(provided.as_bytes(), &parsed)
        .is_ok())
}

const FLASH_KEY: &str = "flash";

/// One-shot status message carried in the session cookie across a redirect.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FlashMessage {
    pub kind: String,
    pub message: String,
}

pub fn flash(session: &Session, kind: &str, message: &str) {
    let msg = FlashMessage {
        kind: kind.to_owned(),
        message: message.to_owned(),
    };
    if let Err(e) = session.insert(FLASH_KEY, msg) {
        log::warn!("Failed to store flash message: {}", e);
    }
}

pub fn take_flash(session: &Session) -> Option<FlashMessage> {
    let msg = session.get::<FlashMessage>(FLASH_KEY).ok().flatten();
    if msg.is_some() {
        session.remove(FLASH_KEY);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
