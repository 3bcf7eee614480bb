//! # hnapclient - Client du protocole HNAP
//!
//! HNAP (Home Network Administration Protocol) est le protocole SOAP/XML
//! sur HTTP exposé par les routeurs, prises et caméras D-Link sous
//! `http://<boîtier>/HNAP1/`. Cette crate fournit :
//!
//! - la découverte du boîtier ([`HnapClient::discover`] → [`DeviceSettings`])
//! - l'authentification challenge/réponse HMAC-MD5 ([`HnapClient::login`] → [`Session`])
//! - les appels SOAP signés ([`HnapClient::request`])
//!
//! ## Utilisation
//!
//! ```no_run
//! use hnapclient::{hnap_map, HnapClient, HnapMapExt};
//! use std::time::Duration;
//! use url::Url;
//!
//! let client = HnapClient::with_http(
//!     Url::parse("http://192.168.0.60/HNAP1/")?,
//!     "admin",
//!     "123456",
//!     Duration::from_secs(10),
//! );
//!
//! let session = client.login()?;
//! let response = client.request(
//!     &session,
//!     "GetSocketSettings",
//!     &hnap_map! { "ModuleID" => "1" },
//! )?;
//! println!("{:?}", response.text("GetSocketSettingsResult"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration
//!
//! Avec [`HnapConfigExt`], l'URL et les identifiants sont lus dans
//! `hnapconfig` (section `device`, mot de passe chiffré) :
//!
//! ```rust,ignore
//! let config = hnapconfig::Config::load_config("")?;
//! let client = HnapClient::from_config(&config)?;
//! ```

pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
pub mod session;
pub mod soap;
pub mod transport;
pub mod value;

pub use client::{HnapClient, LOGIN_FAILED, LOGIN_METHOD, LOGIN_SUCCESS};
pub use config_ext::HnapConfigExt;
pub use error::{HnapError, RequestError, RequestSide, Result};
pub use models::{DeviceSettings, TaskExtension};
pub use session::{PendingSession, Session, SessionError};
pub use soap::{HNAP1_XMLNS, MarshalError, SoapFault};
pub use transport::{Headers, Transport, TransportError, UreqTransport};
pub use value::{HnapMap, HnapMapExt, HnapValue};
