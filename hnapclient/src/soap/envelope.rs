//! Enveloppe des méthodes HNAP

/// Espace de noms des méthodes HNAP
pub const HNAP1_XMLNS: &str = "http://purenetworks.com/HNAP1/";

/// Espace de noms SOAP 1.1
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Enveloppe un corps XML dans l'élément de méthode HNAP
///
/// `<Method xmlns="http://purenetworks.com/HNAP1/">body</Method>`
pub fn wrap_method(method: &str, body: &str) -> String {
    format!(r#"<{method} xmlns="{HNAP1_XMLNS}">{body}</{method}>"#)
}

/// Action SOAP complète d'une méthode (ex: `http://purenetworks.com/HNAP1/Login`)
pub fn soap_action(method: &str) -> String {
    format!("{HNAP1_XMLNS}{method}")
}

/// Action SOAP entre guillemets, telle qu'envoyée dans l'en-tête `SOAPAction`
/// et signée dans `HNAP_AUTH`
pub fn quoted_soap_action(method: &str) -> String {
    format!("\"{}\"", soap_action(method))
}

/// Place un élément de méthode déjà enveloppé dans `soap:Envelope/soap:Body`
pub fn soap_envelope(wrapped_method: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="{ns}">"#,
            r#"<soap:Body>{body}</soap:Body></soap:Envelope>"#
        ),
        ns = SOAP_ENVELOPE_NS,
        body = wrapped_method
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_action() {
        assert_eq!(soap_action("Login"), "http://purenetworks.com/HNAP1/Login");
        assert_eq!(
            quoted_soap_action("GetDeviceSettings"),
            "\"http://purenetworks.com/HNAP1/GetDeviceSettings\""
        );
    }

    #[test]
    fn test_wrap_empty_body() {
        assert_eq!(
            wrap_method("GetDeviceSettings", ""),
            r#"<GetDeviceSettings xmlns="http://purenetworks.com/HNAP1/"></GetDeviceSettings>"#
        );
    }

    #[test]
    fn test_soap_envelope() {
        let xml = soap_envelope("<Login/>");
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(xml.contains("<soap:Body><Login/></soap:Body>"));
    }
}
