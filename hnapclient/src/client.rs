//! Client HNAP de haut niveau
//!
//! [`HnapClient`] porte la configuration d'un boîtier (URL, identifiants,
//! transport) et réalise les trois opérations du protocole :
//!
//! - [`discover`](HnapClient::discover) : `GET` non authentifié de l'URL HNAP
//! - [`login`](HnapClient::login) : poignée de main en deux `Login`
//! - [`request`](HnapClient::request) : appel SOAP signé avec une [`Session`]
//!
//! Le client ne conserve aucun état de session : la [`Session`] renvoyée par
//! `login()` est une valeur que l'appelant passe à chaque requête.

use crate::config_ext::HnapConfigExt;
use crate::error::{HnapError, RequestError, Result};
use crate::hnap_map;
use crate::models::DeviceSettings;
use crate::session::{PendingSession, Session};
use crate::soap::{
    from_xml, parse_fault, quoted_soap_action, soap_envelope, to_xml, validate_well_formed,
    wrap_method,
};
use crate::transport::{Headers, Transport, UreqTransport};
use crate::value::{HnapMap, HnapMapExt};
use hnapconfig::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Méthode de la poignée de main
pub const LOGIN_METHOD: &str = "Login";

/// `LoginResult` d'une authentification réussie
pub const LOGIN_SUCCESS: &str = "success";

/// `LoginResult` d'une authentification refusée
pub const LOGIN_FAILED: &str = "failed";

const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Client HNAP
///
/// # Exemple
///
/// ```no_run
/// use hnapclient::HnapClient;
/// use std::time::Duration;
/// use url::Url;
///
/// let url = Url::parse("http://192.168.0.60/HNAP1/")?;
/// let client = HnapClient::with_http(url, "admin", "123456", Duration::from_secs(10));
///
/// let settings = client.discover()?;
/// println!("{} {}", settings.vendor_name, settings.model_name);
///
/// let session = client.login()?;
/// let state = client.call(&session, "GetSocketSettings")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HnapClient {
    transport: Arc<dyn Transport>,
    url: Url,
    username: String,
    password: String,
}

impl HnapClient {
    /// Crée un client sur un transport quelconque
    pub fn new(
        transport: Arc<dyn Transport>,
        url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            url,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Crée un client HTTP (`ureq`) avec un délai global `timeout`
    pub fn with_http(
        url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::new(
            Arc::new(UreqTransport::new(timeout)),
            url,
            username,
            password,
        )
    }

    /// Crée un client depuis la section `device` de la configuration
    ///
    /// # Errors
    ///
    /// Retourne une erreur si l'URL ou les identifiants ne sont pas configurés
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing HNAP client from configuration");

        let url = config.get_device_url()?;
        let (username, password) = config.get_device_credentials()?;
        let timeout = config.get_http_timeout()?;

        Ok(Self::with_http(url, username, password, timeout))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Découverte du boîtier : `GET` de l'URL HNAP, sans en-tête ni authentification
    pub fn discover(&self) -> Result<DeviceSettings> {
        debug!("Discovering HNAP device at {}", self.url);

        let body = self.transport.get(&self.url, &Headers::new())?;
        let response = from_xml(&body)?;
        let settings = DeviceSettings::from_response(&response, &self.url)?;

        info!(
            "Discovered {} {} ({} SOAP actions)",
            settings.vendor_name,
            settings.model_name,
            settings.soap_actions.len()
        );
        Ok(settings)
    }

    /// Poignée de main HNAP
    ///
    /// 1. `Login` sans mot de passe : le boîtier renvoie challenge, clé
    ///    publique et cookie
    /// 2. `Login` signé, avec le jeton dérivé du challenge
    /// 3. `LoginResult` doit valoir `success`
    pub fn login(&self) -> Result<Session> {
        info!("Attempting HNAP login to {} as {}", self.url, self.username);

        let mut body = hnap_map! {
            "Action" => "login",
            "Username" => self.username.as_str(),
            "LoginPassword" => "",
            "Captcha" => "",
        };

        let challenge = self.soap_request(LOGIN_METHOD, &body, base_headers(LOGIN_METHOD))?;
        let pending = PendingSession::from_login_response(&challenge, self.password.as_str())
            .inspect_err(|e| warn!("Invalid login challenge from {}: {}", self.url, e))?;
        debug!("Login challenge received");

        body.insert("LoginPassword".into(), pending.login_password().into());
        let headers = signed_headers(
            LOGIN_METHOD,
            pending.auth(&quoted_soap_action(LOGIN_METHOD)),
            pending.cookie(),
        );

        let response = self.soap_request(LOGIN_METHOD, &body, headers)?;
        match response.text("LoginResult").unwrap_or_default() {
            LOGIN_SUCCESS => {
                info!("HNAP login successful");
                Ok(pending.authenticated())
            }
            LOGIN_FAILED => {
                warn!("HNAP login refused for user {}", self.username);
                Err(HnapError::AuthenticationFailed(LOGIN_FAILED.to_string()))
            }
            other => {
                warn!("Unexpected HNAP login result: {:?}", other);
                Err(HnapError::UnexpectedLoginResult(other.to_string()))
            }
        }
    }

    /// Appel authentifié de la méthode `method` avec les champs `body`
    pub fn request(&self, session: &Session, method: &str, body: &HnapMap) -> Result<HnapMap> {
        let headers = signed_headers(
            method,
            session.auth(&quoted_soap_action(method)),
            session.cookie(),
        );
        self.soap_request(method, body, headers)
    }

    /// Appel authentifié sans paramètre
    pub fn call(&self, session: &Session, method: &str) -> Result<HnapMap> {
        self.request(session, method, &HnapMap::new())
    }

    /// Enveloppe, valide, envoie et décode un appel SOAP
    fn soap_request(&self, method: &str, body: &HnapMap, headers: Headers) -> Result<HnapMap> {
        let fields =
            to_xml(body).map_err(|e| RequestError::request(e, format!("{method}: {body:?}")))?;
        let wrapped = wrap_method(method, &fields);

        if let Err(e) = validate_well_formed(&wrapped) {
            warn!("Refusing to send invalid {} request: {}", method, e);
            return Err(RequestError::request(e, wrapped).into());
        }

        let envelope = soap_envelope(&wrapped);
        debug!(
            method = %method,
            url = %self.url,
            bytes = envelope.len(),
            "Sending HNAP request"
        );

        let response = self.transport.post(&self.url, &headers, &envelope)?;
        debug!(method = %method, bytes = response.len(), "Received HNAP response");

        if let Err(e) = validate_well_formed(&response) {
            warn!("Invalid XML in {} response: {}", method, e);
            return Err(RequestError::response(e, envelope, response).into());
        }

        if let Some(fault) = parse_fault(&response)? {
            warn!("{} returned a SOAP fault: {}", method, fault);
            return Err(HnapError::Fault(fault));
        }

        Ok(from_xml(&response)?)
    }
}

fn base_headers(method: &str) -> Headers {
    vec![
        ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
        ("SOAPAction".to_string(), quoted_soap_action(method)),
    ]
}

fn signed_headers(method: &str, auth: String, cookie: &str) -> Headers {
    let mut headers = base_headers(method);
    headers.push(("HNAP_AUTH".to_string(), auth));
    headers.push(("Cookie".to_string(), format!("uid={cookie}")));
    headers
}
