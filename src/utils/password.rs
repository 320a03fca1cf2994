use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 100_000;
const KEY_LENGTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Falha ao calcular o hash da senha: {0}")]
    Derivation(String),
}

/// Hash de senha com salt fixo (configurado em PASSWORD_SALT)
/// PBKDF2-HMAC-SHA256, resultado em hexadecimal
pub fn hash_password(password: &str, salt: &str) -> Result<String, PasswordError> {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt.as_bytes(), ITERATIONS, &mut key)
        .map_err(|e| PasswordError::Derivation(e.to_string()))?;

    Ok(hex::encode(key))
}

/// Recalcula o hash com o mesmo salt e compara com o valor guardado
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let computed = hash_password(password, salt)?;
    Ok(computed.eq_ignore_ascii_case(stored_hash))
}
