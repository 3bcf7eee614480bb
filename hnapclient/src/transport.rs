//! Transport HTTP des échanges HNAP
//!
//! Le client ne parle au boîtier qu'au travers du trait [`Transport`] :
//! un `GET` pour la découverte, des `POST` pour toutes les méthodes SOAP.
//! [`UreqTransport`] est l'implémentation par défaut ; les tests injectent
//! leurs propres implémentations.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use ureq::Agent;
use url::Url;

/// Délai global par défaut d'un échange HTTP
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// En-têtes HTTP ordonnés `(nom, valeur)`
pub type Headers = Vec<(String, String)>;

/// Erreurs de transport, propagées sans transformation par le client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Statut HTTP hors 2xx
    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    /// Échec réseau (connexion, DNS, délai dépassé...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Le corps de la réponse n'a pas pu être lu comme texte
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Canal HTTP synchrone vers un boîtier HNAP
pub trait Transport: Send + Sync {
    /// `GET` de `url`, renvoie le corps de la réponse
    fn get(&self, url: &Url, headers: &Headers) -> Result<String, TransportError>;

    /// `POST` de `body` vers `url`, renvoie le corps de la réponse
    fn post(&self, url: &Url, headers: &Headers, body: &str) -> Result<String, TransportError>;
}

/// Implémentation [`Transport`] basée sur `ureq`
///
/// Les statuts 4xx/5xx ne sont pas traités comme des erreurs par `ureq` :
/// le statut est examiné ici pour produire [`TransportError::Status`].
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn read_response(
        url: &Url,
        result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<String, TransportError> {
        let mut response = result.map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "HNAP HTTP response");

        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &Url, headers: &Headers) -> Result<String, TransportError> {
        let mut request = self.agent.get(url.as_str());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        Self::read_response(url, request.call())
    }

    fn post(&self, url: &Url, headers: &Headers, body: &str) -> Result<String, TransportError> {
        let mut request = self.agent.post(url.as_str());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        Self::read_response(url, request.send(body.to_string()))
    }
}
