//! Session HNAP : dérivation des clés et signature des requêtes
//!
//! La poignée de main HNAP passe par deux états représentés par deux types :
//!
//! - [`PendingSession`] : challenge reçu, seule la signature du second
//!   `Login` est possible ;
//! - [`Session`] : authentifiée, acceptée par [`HnapClient::request`](crate::HnapClient::request).
//!
//! Un [`PendingSession`] ne peut être construit que si le challenge, la clé
//! publique et le cookie sont tous présents : une session incomplète
//! n'existe jamais, et ne peut donc rien signer.
//!
//! Tous les condensats du protocole sont des HMAC-MD5 en hexadécimal
//! majuscule, et c'est cette forme qui sert de clé aux étapes suivantes.

use crate::value::{HnapMap, HnapMapExt};
use hmac::{Hmac, Mac};
use md5::Md5;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacMd5 = Hmac<Md5>;

/// Borne des horodatages `HNAP_AUTH` (entier positif sur 31 bits)
pub const TIMESTAMP_MODULUS: u64 = 2_000_000_000;

/// Erreur de construction d'une session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Champ de la réponse `Login` absent ou vide
    #[error("missing {0} in login response")]
    MissingField(String),
}

/// HMAC-MD5 de `message` avec la clé `key`, en hexadécimal majuscule
pub fn hmac_md5(key: &str, message: &str) -> String {
    let mut mac =
        HmacMd5::new_from_slice(key.as_bytes()).expect("HMAC can take keys of any size");
    mac.update(message.as_bytes());
    hex::encode_upper(mac.finalize().into_bytes())
}

/// Horodatage courant des en-têtes `HNAP_AUTH`
///
/// Secondes Unix modulo [`TIMESTAMP_MODULUS`].
pub fn hnap_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        % TIMESTAMP_MODULUS
}

/// Clé privée de session
///
/// `HMAC(HMAC(publicKey, password), challenge)`
fn derive_private_key(public_key: &str, password: &str, challenge: &str) -> String {
    let intermediate = hmac_md5(public_key, password);
    hmac_md5(&intermediate, challenge)
}

struct SessionKeys {
    password: String,
    challenge: String,
    public_key: String,
    cookie: String,
    private_key: OnceLock<String>,
}

impl SessionKeys {
    fn private_key(&self) -> &str {
        self.private_key
            .get_or_init(|| derive_private_key(&self.public_key, &self.password, &self.challenge))
    }

    fn auth_at(&self, timestamp: u64, action: &str) -> String {
        let digest = hmac_md5(self.private_key(), &format!("{timestamp}{action}"));
        format!("{digest} {timestamp}")
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("challenge", &self.challenge)
            .field("public_key", &self.public_key)
            .field("cookie", &self.cookie)
            .field("password", &"<redacted>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Session en attente : challenge reçu, second `Login` pas encore accepté
#[derive(Debug)]
pub struct PendingSession {
    keys: SessionKeys,
}

impl PendingSession {
    /// Construit une session en attente ; tous les champs doivent être non vides
    pub fn new(
        password: impl Into<String>,
        challenge: impl Into<String>,
        public_key: impl Into<String>,
        cookie: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let challenge = non_empty(challenge.into(), "Challenge")?;
        let public_key = non_empty(public_key.into(), "PublicKey")?;
        let cookie = non_empty(cookie.into(), "Cookie")?;

        Ok(Self {
            keys: SessionKeys {
                password: password.into(),
                challenge,
                public_key,
                cookie,
                private_key: OnceLock::new(),
            },
        })
    }

    /// Lit `Challenge`, `PublicKey` et `Cookie` dans la réponse au premier `Login`
    pub fn from_login_response(
        response: &HnapMap,
        password: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let field = |name: &str| response.text(name).unwrap_or_default().to_string();
        Self::new(
            password,
            field("Challenge"),
            field("PublicKey"),
            field("Cookie"),
        )
    }

    /// Jeton `LoginPassword` du second `Login` : `HMAC(privateKey, challenge)`
    pub fn login_password(&self) -> String {
        hmac_md5(self.keys.private_key(), &self.keys.challenge)
    }

    /// Clé privée dérivée (secret : ne jamais la journaliser)
    pub fn private_key(&self) -> &str {
        self.keys.private_key()
    }

    pub fn cookie(&self) -> &str {
        &self.keys.cookie
    }

    pub fn challenge(&self) -> &str {
        &self.keys.challenge
    }

    /// Valeur `HNAP_AUTH` à l'instant présent
    pub fn auth(&self, action: &str) -> String {
        self.keys.auth_at(hnap_timestamp(), action)
    }

    /// Valeur `HNAP_AUTH` pour un horodatage donné
    pub fn auth_at(&self, timestamp: u64, action: &str) -> String {
        self.keys.auth_at(timestamp, action)
    }

    /// Passe à l'état authentifié, après un `LoginResult` à `success`
    pub(crate) fn authenticated(self) -> Session {
        Session {
            keys: Arc::new(self.keys),
        }
    }
}

/// Session authentifiée
///
/// Valeur immuable et partageable (`Clone`, `Send`, `Sync`) ; plusieurs
/// sessions peuvent coexister sur un même client.
#[derive(Debug, Clone)]
pub struct Session {
    keys: Arc<SessionKeys>,
}

impl Session {
    pub fn cookie(&self) -> &str {
        &self.keys.cookie
    }

    /// Clé privée dérivée (secret : ne jamais la journaliser)
    pub fn private_key(&self) -> &str {
        self.keys.private_key()
    }

    /// Valeur `HNAP_AUTH` à l'instant présent pour l'action SOAP `action`
    pub fn auth(&self, action: &str) -> String {
        self.keys.auth_at(hnap_timestamp(), action)
    }

    /// Valeur `HNAP_AUTH` pour un horodatage donné
    pub fn auth_at(&self, timestamp: u64, action: &str) -> String {
        self.keys.auth_at(timestamp, action)
    }
}

fn non_empty(value: String, name: &str) -> Result<String, SessionError> {
    if value.is_empty() {
        Err(SessionError::MissingField(name.to_string()))
    } else {
        Ok(value)
    }
}
