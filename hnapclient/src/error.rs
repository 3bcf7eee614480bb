//! Gestion des erreurs pour le client HNAP

use crate::session::SessionError;
use crate::soap::{MarshalError, SoapFault};
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Type Result personnalisé pour hnapclient
pub type Result<T> = std::result::Result<T, HnapError>;

/// Erreurs possibles lors d'un échange HNAP
#[derive(Error, Debug)]
pub enum HnapError {
    /// Échec de conversion d'une charge utile (champ manquant, XML illisible...)
    #[error("HNAP client error: {0}")]
    Client(#[from] MarshalError),

    /// Réponse de poignée de main incomplète (challenge, clé publique ou cookie absent)
    #[error("Incomplete login handshake: {0}")]
    Handshake(#[from] SessionError),

    /// URL invalide (URL de base ou URL de présentation annoncée)
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Requête ou réponse XML mal formée
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Le boîtier a répondu `failed` au second `Login`
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// `LoginResult` absent ou inattendu
    #[error("Unexpected login result: {0:?}")]
    UnexpectedLoginResult(String),

    /// Le boîtier a répondu par un `soap:Fault`
    #[error("SOAP fault {0}")]
    Fault(SoapFault),

    /// Erreur HTTP ou réseau, propagée telle quelle
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl HnapError {
    /// Erreur imputable au client (données envoyées ou reçues inexploitables)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HnapError::Client(_)
                | HnapError::Handshake(_)
                | HnapError::InvalidUrl(_)
                | HnapError::Request(_)
        )
    }

    /// Vérifie si l'erreur est un refus d'authentification
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            HnapError::AuthenticationFailed(_) | HnapError::UnexpectedLoginResult(_)
        )
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, HnapError::Fault(_))
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, HnapError::Transport(_))
    }

    /// Code de statut HTTP, si l'erreur en porte un
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HnapError::Transport(TransportError::Status { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

/// Côté de l'échange où le XML invalide a été détecté
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSide {
    Request,
    Response,
}

impl fmt::Display for RequestSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSide::Request => f.write_str("Request contains invalid XML"),
            RequestSide::Response => f.write_str("Response contained invalid XML"),
        }
    }
}

/// XML invalide détecté avant l'envoi ou après la réception
///
/// Porte le corps de la requête et, côté réponse, le corps reçu, pour
/// faciliter le diagnostic d'un firmware capricieux.
#[derive(Error, Debug)]
#[error("{side}: {source}")]
pub struct RequestError {
    pub side: RequestSide,
    #[source]
    pub source: MarshalError,
    pub request_body: String,
    pub response_body: Option<String>,
}

impl RequestError {
    pub fn request(source: MarshalError, request_body: impl Into<String>) -> Self {
        Self {
            side: RequestSide::Request,
            source,
            request_body: request_body.into(),
            response_body: None,
        }
    }

    pub fn response(
        source: MarshalError,
        request_body: impl Into<String>,
        response_body: impl Into<String>,
    ) -> Self {
        Self {
            side: RequestSide::Response,
            source,
            request_body: request_body.into(),
            response_body: Some(response_body.into()),
        }
    }
}
