//! Échanges HTTP réels contre un serveur mockito

use hnapclient::{HnapClient, HnapError, HnapMapExt, Transport, TransportError, UreqTransport};
use mockito::{Matcher, Server};
use std::time::Duration;
use url::Url;

const TIMEOUT: Duration = Duration::from_secs(5);

fn soap_response(method: &str, fields: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><{method}Response xmlns="http://purenetworks.com/HNAP1/">{fields}</{method}Response></soap:Body></soap:Envelope>"#
    )
}

fn hnap_url(server: &Server) -> Url {
    Url::parse(&format!("{}/HNAP1/", server.url())).unwrap()
}

#[test]
fn discover_over_http() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/HNAP1/")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(soap_response(
            "GetDeviceSettings",
            "<VendorName>D-Link</VendorName><ModelName>DCH-S150</ModelName>",
        ))
        .create();

    let client = HnapClient::with_http(hnap_url(&server), "admin", "secret", TIMEOUT);
    let settings = client.discover().unwrap();

    assert_eq!(settings.vendor_name, "D-Link");
    assert_eq!(settings.model_name, "DCH-S150");
    mock.assert();
}

#[test]
fn login_and_request_over_http() {
    let mut server = Server::new();

    let challenge = server
        .mock("POST", "/HNAP1/")
        .match_header("SOAPAction", "\"http://purenetworks.com/HNAP1/Login\"")
        .match_header("Content-Type", "text/xml; charset=utf-8")
        .match_header("HNAP_AUTH", Matcher::Missing)
        .match_body(Matcher::Regex("<LoginPassword></LoginPassword>".into()))
        .with_status(200)
        .with_body(soap_response(
            "Login",
            "<LoginResult>OK</LoginResult><Challenge>C1</Challenge>\
             <Cookie>COOKIE</Cookie><PublicKey>PK1</PublicKey>",
        ))
        .create();

    let login = server
        .mock("POST", "/HNAP1/")
        .match_header("Cookie", "uid=COOKIE")
        .match_header("HNAP_AUTH", Matcher::Regex("^[0-9A-F]{32} [0-9]+$".into()))
        .match_body(Matcher::Regex(
            "<LoginPassword>7A8F4FE7972C8204436A5CFFCE3FDEC3</LoginPassword>".into(),
        ))
        .with_status(200)
        .with_body(soap_response("Login", "<LoginResult>success</LoginResult>"))
        .create();

    let socket = server
        .mock("POST", "/HNAP1/")
        .match_header(
            "SOAPAction",
            "\"http://purenetworks.com/HNAP1/GetSocketSettings\"",
        )
        .match_header("Cookie", "uid=COOKIE")
        .with_status(200)
        .with_body(soap_response(
            "GetSocketSettings",
            "<GetSocketSettingsResult>OK</GetSocketSettingsResult><OPStatus>true</OPStatus>",
        ))
        .create();

    let client = HnapClient::with_http(hnap_url(&server), "admin", "secret", TIMEOUT);
    let session = client.login().unwrap();
    let response = client.call(&session, "GetSocketSettings").unwrap();

    assert_eq!(response.text("OPStatus"), Some("true"));
    challenge.assert();
    login.assert();
    socket.assert();
}

#[test]
fn server_error_is_a_status_error() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/HNAP1/")
        .with_status(500)
        .with_body("<not-xml")
        .create();

    let client = HnapClient::with_http(hnap_url(&server), "admin", "secret", TIMEOUT);
    let err = client.login().unwrap_err();

    match &err {
        HnapError::Transport(TransportError::Status { code, reason }) => {
            assert_eq!(*code, 500);
            assert_eq!(reason, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status_code(), Some(500));
    mock.assert();
}

#[test]
fn transport_sends_headers_and_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/HNAP1/")
        .match_header("X-Test", "1")
        .match_body("<Ping/>")
        .with_status(200)
        .with_body("<Pong/>")
        .create();

    let transport = UreqTransport::new(TIMEOUT);
    let headers = vec![("X-Test".to_string(), "1".to_string())];
    let body = transport
        .post(&hnap_url(&server), &headers, "<Ping/>")
        .unwrap();

    assert_eq!(body, "<Pong/>");
    mock.assert();
}

#[test]
fn unreachable_device_is_a_connection_error() {
    let transport = UreqTransport::new(Duration::from_secs(2));
    let url = Url::parse("http://127.0.0.1:1/HNAP1/").unwrap();

    let err = transport.get(&url, &Vec::new()).unwrap_err();
    assert!(matches!(err, TransportError::Connection(_)));
}
