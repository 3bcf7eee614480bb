//! Structures de données renvoyées par la découverte HNAP

use crate::error::Result;
use crate::soap::soap_action;
use crate::value::{HnapMap, HnapMapExt};
use serde::Serialize;
use url::Url;

/// Description d'un boîtier, lue dans la réponse `GetDeviceSettings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSettings {
    pub device_type: Option<String>,
    pub device_name: Option<String>,
    pub vendor_name: String,
    pub model_description: Option<String>,
    pub model_name: String,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub device_mac: Option<String>,
    /// URL de l'interface web, résolue par rapport à l'URL HNAP
    pub presentation_url: Option<Url>,
    /// Actions SOAP annoncées (URI complètes)
    pub soap_actions: Vec<String>,
    pub sub_device_urls: Vec<String>,
    pub tasks: Vec<TaskExtension>,
}

/// Entrée `Tasks/TaskExtension`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskExtension {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub task_type: String,
}

impl DeviceSettings {
    /// Construit la description depuis la charge utile de découverte
    ///
    /// `VendorName` et `ModelName` sont obligatoires ; les groupes absents
    /// donnent des listes vides.
    pub fn from_response(response: &HnapMap, base: &Url) -> Result<Self> {
        let optional = |key: &str| {
            response
                .text(key)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let presentation_url = match optional("PresentationURL") {
            Some(href) => Some(base.join(&href)?),
            None => None,
        };

        Ok(Self {
            device_type: optional("Type"),
            device_name: optional("DeviceName"),
            vendor_name: response.require_text("VendorName")?.to_string(),
            model_description: optional("ModelDescription"),
            model_name: response.require_text("ModelName")?.to_string(),
            firmware_version: optional("FirmwareVersion"),
            hardware_version: optional("HardwareVersion"),
            device_mac: optional("DeviceMacId"),
            presentation_url,
            soap_actions: group_texts(response, "SOAPActions", "string"),
            sub_device_urls: group_texts(response, "SubDeviceURLs", "string"),
            tasks: tasks(response),
        })
    }

    /// Le boîtier annonce-t-il la méthode `method` ?
    pub fn supports(&self, method: &str) -> bool {
        let action = soap_action(method);
        self.soap_actions
            .iter()
            .any(|a| *a == action || a.rsplit('/').next() == Some(method))
    }
}

/// Textes des éléments `item` d'un groupe `group`
fn group_texts(response: &HnapMap, group: &str, item: &str) -> Vec<String> {
    response
        .get(group)
        .map(|value| {
            value
                .entries()
                .into_iter()
                .filter(|(name, _)| *name == item)
                .filter_map(|(_, v)| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn tasks(response: &HnapMap) -> Vec<TaskExtension> {
    let Some(group) = response.get("Tasks") else {
        return Vec::new();
    };

    group
        .entries()
        .into_iter()
        .filter(|(name, _)| *name == "TaskExtension")
        .filter_map(|(_, v)| v.as_map())
        .map(|task| TaskExtension {
            name: task.text("Name").unwrap_or_default().to_string(),
            url: task.text("URL").unwrap_or_default().to_string(),
            task_type: task.text("Type").unwrap_or_default().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HnapError;
    use crate::hnap_map;
    use crate::soap::{MarshalError, from_xml};

    const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetDeviceSettingsResponse xmlns="http://purenetworks.com/HNAP1/">
      <GetDeviceSettingsResult>OK</GetDeviceSettingsResult>
      <Type>Smart Plug</Type>
      <DeviceName>DSP-W215</DeviceName>
      <VendorName>D-Link</VendorName>
      <ModelDescription>Wi-Fi Smart Plug</ModelDescription>
      <ModelName>DSP-W215</ModelName>
      <FirmwareVersion>1.10b03</FirmwareVersion>
      <HardwareVersion>B1</HardwareVersion>
      <DeviceMacId>B0:C5:54:00:00:01</DeviceMacId>
      <PresentationURL>/</PresentationURL>
      <SOAPActions>
        <string>http://purenetworks.com/HNAP1/GetDeviceSettings</string>
        <string>http://purenetworks.com/HNAP1/Login</string>
        <string>http://purenetworks.com/HNAP1/GetSocketSettings</string>
      </SOAPActions>
      <SubDeviceURLs></SubDeviceURLs>
      <Tasks>
        <TaskExtension>
          <Name>Device Settings</Name>
          <URL>/setup.html</URL>
          <Type>Browser</Type>
        </TaskExtension>
      </Tasks>
    </GetDeviceSettingsResponse>
  </soap:Body>
</soap:Envelope>"#;

    fn base() -> Url {
        Url::parse("http://192.168.0.60/HNAP1/").unwrap()
    }

    #[test]
    fn test_from_response() {
        let response = from_xml(SETTINGS_XML).unwrap();
        let settings = DeviceSettings::from_response(&response, &base()).unwrap();

        assert_eq!(settings.vendor_name, "D-Link");
        assert_eq!(settings.model_name, "DSP-W215");
        assert_eq!(settings.device_type.as_deref(), Some("Smart Plug"));
        assert_eq!(settings.firmware_version.as_deref(), Some("1.10b03"));
        assert_eq!(settings.device_mac.as_deref(), Some("B0:C5:54:00:00:01"));
        assert_eq!(
            settings.presentation_url.as_ref().map(Url::as_str),
            Some("http://192.168.0.60/")
        );
        assert_eq!(settings.soap_actions.len(), 3);
        assert!(settings.sub_device_urls.is_empty());
        assert_eq!(
            settings.tasks,
            vec![TaskExtension {
                name: "Device Settings".into(),
                url: "/setup.html".into(),
                task_type: "Browser".into(),
            }]
        );
    }

    #[test]
    fn test_supports() {
        let response = from_xml(SETTINGS_XML).unwrap();
        let settings = DeviceSettings::from_response(&response, &base()).unwrap();

        assert!(settings.supports("GetSocketSettings"));
        assert!(settings.supports("Login"));
        assert!(!settings.supports("SetSocketSettings"));
    }

    #[test]
    fn test_minimal_response() {
        let response = hnap_map! { "VendorName" => "D-Link", "ModelName" => "DCH-S150" };
        let settings = DeviceSettings::from_response(&response, &base()).unwrap();

        assert_eq!(settings.device_name, None);
        assert_eq!(settings.presentation_url, None);
        assert!(settings.soap_actions.is_empty());
        assert!(settings.tasks.is_empty());
    }

    #[test]
    fn test_single_soap_action_group() {
        let response = hnap_map! {
            "VendorName" => "D-Link",
            "ModelName" => "DCH-S150",
            "SOAPActions" => hnap_map! { "string" => "http://purenetworks.com/HNAP1/Login" },
        };
        let settings = DeviceSettings::from_response(&response, &base()).unwrap();
        assert_eq!(settings.soap_actions, vec!["http://purenetworks.com/HNAP1/Login"]);
    }

    #[test]
    fn test_missing_model_name() {
        let response = hnap_map! { "VendorName" => "D-Link" };
        let err = DeviceSettings::from_response(&response, &base()).unwrap_err();
        assert!(matches!(
            err,
            HnapError::Client(MarshalError::MissingField(ref f)) if f == "ModelName"
        ));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_invalid_presentation_url() {
        let response = hnap_map! {
            "VendorName" => "D-Link",
            "ModelName" => "DCH-S150",
            "PresentationURL" => "http://[::1",
        };
        let err = DeviceSettings::from_response(&response, &base()).unwrap_err();
        assert!(matches!(err, HnapError::InvalidUrl(_)));
    }
}
