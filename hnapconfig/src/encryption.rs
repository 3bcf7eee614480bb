//! Chiffrement des mots de passe d'équipement stockés dans la configuration
//!
//! La clé AES-256 est dérivée de l'identifiant matériel de la machine : le
//! fichier `config.yaml` n'est donc pas portable, mais le mot de passe HNAP
//! n'y apparaît jamais en clair.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Result};
use base64::Engine;
use sha2::{Digest, Sha256};

/// Préfixe pour identifier les mots de passe chiffrés
const ENCRYPTED_PREFIX: &str = "encrypted:";

const KEY_SALT: &[u8] = b"hnap-config-encryption-v1";
const NONCE_SALT: &[u8] = b"hnap-nonce-v1";
const NONCE_LEN: usize = 12;

/// Récupère l'identifiant matériel de la machine
///
/// Sur macOS, utilise `ioreg -d2 -c IOPlatformExpertDevice`
/// Sur Linux, utilise `/etc/machine-id` ou `/var/lib/dbus/machine-id`
/// Sur Windows, utilise `wmic csproduct get UUID`
fn get_machine_uuid() -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        let output = std::process::Command::new("ioreg")
            .args(["-d2", "-c", "IOPlatformExpertDevice"])
            .output()?;
        let output_str = String::from_utf8_lossy(&output.stdout);

        // Format: "IOPlatformUUID" = "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX"
        output_str
            .lines()
            .filter(|line| line.contains("IOPlatformUUID"))
            .find_map(|line| line.split('"').nth(3))
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Failed to extract IOPlatformUUID from ioreg"))
    }

    #[cfg(target_os = "linux")]
    {
        ["/etc/machine-id", "/var/lib/dbus/machine-id"]
            .iter()
            .filter_map(|path| std::fs::read_to_string(path).ok())
            .map(|id| id.trim().to_string())
            .find(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("Failed to read machine-id"))
    }

    #[cfg(target_os = "windows")]
    {
        let output = std::process::Command::new("wmic")
            .args(["csproduct", "get", "UUID"])
            .output()?;
        let output_str = String::from_utf8_lossy(&output.stdout);

        // La deuxième ligne contient l'UUID
        output_str
            .lines()
            .nth(1)
            .map(|uuid| uuid.trim().to_string())
            .ok_or_else(|| anyhow!("Failed to extract UUID from wmic"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Err(anyhow!("Unsupported platform for machine UUID extraction"))
    }
}

/// Dérive une clé AES-256 à partir d'un secret de machine
fn derive_key_from(machine_secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_secret.as_bytes());
    hasher.update(KEY_SALT);

    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

fn machine_key() -> Result<[u8; 32]> {
    Ok(derive_key_from(&get_machine_uuid()?))
}

/// Chiffre `password` avec une clé explicite
///
/// Le nonce est dérivé du mot de passe : un même mot de passe donne toujours
/// la même valeur, et `config.yaml` n'est pas réécrit inutilement.
/// Format encodé : `encrypted:` + base64(nonce(12 bytes) + ciphertext)
pub fn encrypt_with_key(password: &str, key: &[u8; 32]) -> Result<String> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(NONCE_SALT);
    let nonce_hash = hasher.finalize();
    let nonce_bytes = &nonce_hash[..NONCE_LEN];

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce_bytes), password.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}",
        ENCRYPTED_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&combined)
    ))
}

/// Déchiffre une valeur `encrypted:BASE64` avec une clé explicite
pub fn decrypt_with_key(encrypted: &str, key: &[u8; 32]) -> Result<String> {
    let base64_data = encrypted
        .strip_prefix(ENCRYPTED_PREFIX)
        .ok_or_else(|| anyhow!("Invalid encrypted password format (missing prefix)"))?;

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let combined = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;

    if combined.len() < NONCE_LEN {
        return Err(anyhow!("Invalid ciphertext (too short)"));
    }
    let (nonce, ciphertext) = combined.split_at(NONCE_LEN);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| anyhow!("Decryption failed (wrong machine or corrupted data): {}", e))?;

    String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

/// Chiffre un mot de passe avec la clé dérivée de la machine
///
/// ```rust,ignore
/// let encrypted = encrypt_password("my_password")?;
/// // encrypted = "encrypted:SGVsbG8gV29ybGQh..."
/// ```
pub fn encrypt_password(password: &str) -> Result<String> {
    encrypt_with_key(password, &machine_key()?)
}

/// Déchiffre un mot de passe avec la clé dérivée de la machine
///
/// # Errors
///
/// Retourne une erreur si le format est invalide ou si le déchiffrement échoue
pub fn decrypt_password(encrypted: &str) -> Result<String> {
    decrypt_with_key(encrypted, &machine_key()?)
}

/// Vérifie si une valeur est un mot de passe chiffré
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Obtient le mot de passe en clair, qu'il soit chiffré ou non
///
/// - Si la valeur commence par "encrypted:", elle est déchiffrée
/// - Sinon, elle est retournée telle quelle
pub fn get_password(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_password(value)
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        derive_key_from("00000000-test-machine")
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key = test_key();
        let encrypted = encrypt_with_key("SuperSecret123!", &key).unwrap();
        assert!(encrypted.starts_with(ENCRYPTED_PREFIX));
        assert!(!encrypted.contains("SuperSecret123!"));

        assert_eq!(decrypt_with_key(&encrypted, &key).unwrap(), "SuperSecret123!");
    }

    #[test]
    fn test_encryption_is_deterministic() {
        let key = test_key();
        assert_eq!(
            encrypt_with_key("admin", &key).unwrap(),
            encrypt_with_key("admin", &key).unwrap()
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = encrypt_with_key("admin", &test_key()).unwrap();
        let other = derive_key_from("another-machine");
        assert!(decrypt_with_key(&encrypted, &other).is_err());
    }

    #[test]
    fn test_invalid_formats() {
        let key = test_key();
        assert!(decrypt_with_key("admin", &key).is_err());
        assert!(decrypt_with_key("encrypted:!!!", &key).is_err());
        assert!(decrypt_with_key("encrypted:AAAA", &key).is_err());
    }

    #[test]
    fn test_is_encrypted() {
        assert!(is_encrypted("encrypted:SGVsbG8="));
        assert!(!is_encrypted("plaintext"));
        assert!(!is_encrypted(""));
    }

    #[test]
    fn test_get_password_plaintext() {
        assert_eq!(get_password("plaintext").unwrap(), "plaintext");
    }
}
