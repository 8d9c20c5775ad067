//! Registration, login and password hashing.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand_core::OsRng;

use crate::error::{BlogError, StorageError};
use crate::models::{Credentials, Identity, NewUser, Registration, User};
use crate::storage::Storage;

/// Hash `password` with Argon2id and a fresh random salt, returning the PHC
/// string that is stored in place of the password.
///
/// # Errors
///
/// Returns an error if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a stored PHC string. A malformed stored hash
/// never verifies.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Create a new user after checking that neither the username nor the email
/// is taken.
///
/// # Errors
///
/// [`BlogError::Validation`] for blank or oversized fields,
/// [`BlogError::DuplicateCredential`] when the username or email exists.
pub async fn register(storage: &dyn Storage, form: &Registration) -> Result<User, BlogError> {
    form.validate()?;

    if storage
        .find_user_by_username_or_email(&form.username, &form.email)
        .await?
        .is_some()
    {
        return Err(BlogError::DuplicateCredential);
    }

    let new_user = NewUser {
        username: form.username.clone(),
        email: form.email.clone(),
        password_hash: hash_password(&form.password)?,
    };
    let id = match storage.add_user(&new_user).await {
        Ok(id) => id,
        // lost a race with a concurrent registration
        Err(StorageError::Conflict(_)) => return Err(BlogError::DuplicateCredential),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = id, username = %new_user.username, "registered user");

    Ok(User {
        id,
        username: new_user.username,
        email: new_user.email,
        password_hash: new_user.password_hash,
    })
}

/// Resolve credentials to the identity a session should be bound to.
///
/// # Errors
///
/// [`BlogError::InvalidCredentials`] for an unknown user or wrong password;
/// the two cases are indistinguishable to the caller.
pub async fn login(storage: &dyn Storage, creds: &Credentials) -> Result<Identity, BlogError> {
    match storage.find_user_by_username(&creds.username).await? {
        Some(user) if verify_password(&creds.password, &user.password_hash) => {
            Ok(Identity::from(&user))
        }
        _ => Err(BlogError::InvalidCredentials(creds.username.clone())),
    }
}
