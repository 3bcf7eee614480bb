//! # Module SOAP - couche XML du protocole HNAP
//!
//! HNAP n'utilise qu'une petite partie de SOAP : un élément par méthode,
//! dans l'espace de noms `http://purenetworks.com/HNAP1/`, contenant des
//! champs texte ou imbriqués. Ce module fournit :
//!
//! - [`to_xml`] / [`from_xml`] : conversion entre [`HnapMap`](crate::HnapMap) et XML
//! - [`validate_well_formed`] : vérification en flux de la bonne formation
//! - [`wrap_method`], [`soap_envelope`], [`soap_action`] : enveloppe HNAP
//! - [`parse_fault`] : détection des `soap:Fault`
//!
//! ## Example
//!
//! ```
//! use hnapclient::{hnap_map, soap};
//!
//! let body = soap::to_xml(&hnap_map! { "Action" => "login" }).unwrap();
//! let wrapped = soap::wrap_method("Login", &body);
//! assert_eq!(
//!     wrapped,
//!     r#"<Login xmlns="http://purenetworks.com/HNAP1/"><Action>login</Action></Login>"#
//! );
//! soap::validate_well_formed(&wrapped).unwrap();
//! ```

mod envelope;
mod fault;
mod marshal;
mod validate;

pub use envelope::{
    HNAP1_XMLNS, SOAP_ENVELOPE_NS, quoted_soap_action, soap_action, soap_envelope, wrap_method,
};
pub use fault::{SoapFault, parse_fault};
pub use marshal::{from_xml, to_xml};
pub use validate::validate_well_formed;

/// Erreur de marshalling XML
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("XML parse error: {0}")]
    Parse(#[from] xmltree::ParseError),

    #[error("XML write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ill-formed XML document: {0}")]
    IllFormed(String),

    #[error("Invalid XML element name: {0:?}")]
    InvalidName(String),

    #[error("Missing {0} element in HNAP payload")]
    MissingField(String),
}
