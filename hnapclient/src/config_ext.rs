//! Extension pour intégrer la configuration du boîtier HNAP dans hnapconfig
//!
//! Ce module fournit le trait `HnapConfigExt`, qui ajoute à
//! `hnapconfig::Config` la gestion de l'URL et des identifiants du boîtier.
//! Le mot de passe est stocké chiffré (`encrypted:...`).

use anyhow::{Result, anyhow};
use hnapconfig::Config;
use serde_yaml::Value;
use std::time::Duration;
use url::Url;

const URL_PATH: &[&str] = &["device", "url"];
const USERNAME_PATH: &[&str] = &["device", "username"];
const PASSWORD_PATH: &[&str] = &["device", "password"];

/// Trait d'extension pour gérer le boîtier HNAP dans hnapconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use hnapconfig::Config;
/// use hnapclient::HnapConfigExt;
///
/// let config = Config::load_config("")?;
/// let url = config.get_device_url()?;
/// let (username, password) = config.get_device_credentials()?;
/// ```
pub trait HnapConfigExt {
    /// URL HNAP du boîtier (ex: `http://192.168.0.60/HNAP1/`)
    ///
    /// # Errors
    ///
    /// Retourne une erreur si l'URL n'est pas configurée ou invalide
    fn get_device_url(&self) -> Result<Url>;

    fn set_device_url(&self, url: &Url) -> Result<()>;

    /// Nom d'utilisateur du boîtier (`admin` par défaut)
    fn get_device_username(&self) -> Result<String>;

    fn set_device_username(&self, username: &str) -> Result<()>;

    /// Mot de passe du boîtier, déchiffré si nécessaire
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le mot de passe n'est pas configuré ou si le
    /// déchiffrement échoue (configuration copiée depuis une autre machine)
    fn get_device_password(&self) -> Result<String>;

    /// Enregistre le mot de passe du boîtier, chiffré
    fn set_device_password(&self, password: &str) -> Result<()>;

    /// Récupère le couple (username, password)
    fn get_device_credentials(&self) -> Result<(String, String)>;

    /// Délai global des requêtes HTTP
    fn get_http_timeout(&self) -> Result<Duration>;
}

impl HnapConfigExt for Config {
    fn get_device_url(&self) -> Result<Url> {
        let url = self
            .get_string(URL_PATH)
            .ok_or_else(|| anyhow!("HNAP device URL not configured"))?;
        Url::parse(&url).map_err(|e| anyhow!("Invalid HNAP device URL {}: {}", url, e))
    }

    fn set_device_url(&self, url: &Url) -> Result<()> {
        self.set_value(URL_PATH, Value::String(url.to_string()))
    }

    fn get_device_username(&self) -> Result<String> {
        self.get_string(USERNAME_PATH)
            .ok_or_else(|| anyhow!("HNAP device username not configured"))
    }

    fn set_device_username(&self, username: &str) -> Result<()> {
        self.set_value(USERNAME_PATH, Value::String(username.to_string()))
    }

    fn get_device_password(&self) -> Result<String> {
        match self.get_value(PASSWORD_PATH)? {
            Value::String(s) if !s.is_empty() => hnapconfig::encryption::get_password(&s)
                .map_err(|e| anyhow!("Failed to decrypt password: {}", e)),
            _ => Err(anyhow!("HNAP device password not configured")),
        }
    }

    fn set_device_password(&self, password: &str) -> Result<()> {
        let encrypted = hnapconfig::encryption::encrypt_password(password)?;
        self.set_value(PASSWORD_PATH, Value::String(encrypted))
    }

    fn get_device_credentials(&self) -> Result<(String, String)> {
        let username = self.get_device_username()?;
        let password = self.get_device_password()?;
        Ok((username, password))
    }

    fn get_http_timeout(&self) -> Result<Duration> {
        Ok(Duration::from_secs(self.get_http_timeout_secs()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let (_dir, config) = load();

        assert!(config.get_device_url().is_err());
        assert_eq!(config.get_device_username().unwrap(), "admin");
        assert!(config.get_device_password().is_err());
        assert_eq!(config.get_http_timeout().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_device_section_round_trip() {
        let (_dir, config) = load();
        let url = Url::parse("http://192.168.0.60/HNAP1/").unwrap();

        config.set_device_url(&url).unwrap();
        config.set_device_username("operator").unwrap();
        assert_eq!(config.get_device_url().unwrap(), url);
        assert_eq!(config.get_device_username().unwrap(), "operator");
    }

    #[test]
    fn test_invalid_url() {
        let (_dir, config) = load();
        config
            .set_value(URL_PATH, Value::String("not a url".into()))
            .unwrap();
        assert!(config.get_device_url().is_err());
    }

    #[test]
    fn test_plain_password_is_accepted() {
        let (_dir, config) = load();
        config
            .set_value(PASSWORD_PATH, Value::String("1234".into()))
            .unwrap();
        assert_eq!(
            config.get_device_credentials().unwrap(),
            ("admin".to_string(), "1234".to_string())
        );
    }
}
