//! SOAP Faults renvoyés par les boîtiers

use super::MarshalError;
use std::fmt;
use xmltree::Element;

/// Erreur SOAP (Fault)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Code d'erreur (ex: "soap:Client")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Contenu texte de `detail`, s'il y en a un
    pub detail: Option<String>,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.fault_code, self.fault_string)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Cherche un `Fault` dans le `Body` d'une enveloppe SOAP
///
/// Renvoie `Ok(None)` pour une réponse normale ou un document sans enveloppe.
pub fn parse_fault(xml: &str) -> Result<Option<SoapFault>, MarshalError> {
    let root = Element::parse(xml.as_bytes())?;
    if root.name != "Envelope" {
        return Ok(None);
    }

    let Some(fault) = root
        .get_child("Body")
        .and_then(|body| body.get_child("Fault"))
    else {
        return Ok(None);
    };

    let text = |name: &str| {
        fault
            .get_child(name)
            .and_then(|e| e.get_text())
            .map(|t| t.trim().to_string())
    };

    Ok(Some(SoapFault {
        fault_code: text("faultcode").unwrap_or_default(),
        fault_string: text("faultstring").unwrap_or_default(),
        detail: text("detail").filter(|d| !d.is_empty()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fault() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>Unknown method</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

        let fault = parse_fault(xml).unwrap().unwrap();
        assert_eq!(fault.fault_code, "soap:Client");
        assert_eq!(fault.fault_string, "Unknown method");
        assert_eq!(fault.detail, None);
        assert_eq!(fault.to_string(), "soap:Client: Unknown method");
    }

    #[test]
    fn test_regular_response_has_no_fault() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><LoginResponse><LoginResult>OK</LoginResult></LoginResponse></soap:Body></soap:Envelope>"#;
        assert_eq!(parse_fault(xml).unwrap(), None);
        assert_eq!(parse_fault("<LoginResponse/>").unwrap(), None);
    }
}
