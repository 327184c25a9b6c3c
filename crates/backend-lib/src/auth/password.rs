// ============================
// worksphere-backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng}, Params, Scrypt};
use zeroize::Zeroize;

/// Build scrypt parameters from a cost factor, keeping the recommended block
/// size, parallelism and output length.
pub fn scrypt_params(log_n: u8) -> anyhow::Result<Params> {
    Params::new(
        log_n,
        Params::RECOMMENDED_R,
        Params::RECOMMENDED_P,
        Params::RECOMMENDED_LEN,
    )
    .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))
}

/// Hash a password using scrypt. The output is a PHC string carrying its own
/// salt and parameters.
pub fn hash_password(plain: &str, params: Params) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Hash a password and zeroize the plaintext
pub fn hash_password_secure(plain: &mut String, params: Params) -> anyhow::Result<String> {
    let hash = hash_password(plain, params);
    plain.zeroize();
    hash
}
