//! End-to-end tests: JSON settings file → provider resolution → each
//! protocol writer.
//!
//! Each test writes a settings file to a temp directory, points a
//! `JsonSettings` source at it, and runs a request through a
//! `RequestHandler` with one of the three writers.

use mail_autoconfig::{
    ActiveSyncWriter, Error, JsonSettings, MozillaWriter, OutlookWriter, Request, RequestHandler,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const SETTINGS: &str = r#"{
    "providers": [
        {
            "id": "example.com",
            "name": "Example mail services",
            "nameShort": "Example",
            "domains": ["example.com"],
            "username": "%EMAILLOCALPART%",
            "servers": [
                {
                    "type": "imap",
                    "hostname": "imap.example.com",
                    "endpoints": [{"socketType": "STARTTLS"}]
                },
                {
                    "type": "smtp",
                    "hostname": "smtp.example.com",
                    "endpoints": [{"socketType": "SSL"}]
                },
                {
                    "type": "activesync",
                    "hostname": "mail.example.com",
                    "endpoints": [{"socketType": "https", "port": 443}]
                }
            ]
        }
    ]
}"#;

fn settings_source(contents: &str) -> (NamedTempFile, JsonSettings) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    let source = JsonSettings::new(file.path());
    (file, source)
}

#[test]
fn mozilla_end_to_end() {
    let (_file, source) = settings_source(SETTINGS);
    let mut handler = RequestHandler::new(&source);

    let response = handler
        .handle(&MozillaWriter, Request::new("alice@example.com"))
        .unwrap();

    assert_eq!(response.content_type, "text/xml");

    let doc = &response.body;
    assert_eq!(doc.matches("<incomingServer").count(), 1);
    assert_eq!(doc.matches("<outgoingServer").count(), 1);
    assert!(doc.contains("<incomingServer type=\"imap\">"));
    assert!(doc.contains("<port>143</port>"));
    assert!(doc.contains("<socketType>STARTTLS</socketType>"));
    assert!(doc.contains("<port>465</port>"));
    assert!(doc.contains("<socketType>SSL</socketType>"));
    assert!(doc.contains("<username>alice</username>"));
    // The activesync server has no autoconfig rendering.
    assert!(!doc.contains("mail.example.com"));
}

#[test]
fn outlook_end_to_end() {
    let (_file, source) = settings_source(SETTINGS);
    let mut handler = RequestHandler::new(&source);

    let response = handler
        .handle(&OutlookWriter, Request::new("alice@example.com"))
        .unwrap();

    assert_eq!(response.content_type, "application/xml");

    let doc = &response.body;
    // imap, smtp, and activesync servers each contribute their first
    // acceptable endpoint.
    assert_eq!(doc.matches("<Protocol>").count(), 3);
    assert!(doc.contains("<Type>IMAP</Type>"));
    assert!(doc.contains("<Type>SMTP</Type>"));
    assert!(doc.contains("<Type>ACTIVESYNC</Type>"));
    assert!(doc.contains("<LoginName>alice</LoginName>"));
    assert!(doc.contains("<Encryption>TLS</Encryption>"));
    assert!(doc.contains("<UsePOPAuth>on</UsePOPAuth>"));
}

#[test]
fn activesync_end_to_end() {
    let (_file, source) = settings_source(SETTINGS);
    let mut handler = RequestHandler::new(&source);

    let response = handler
        .handle(&ActiveSyncWriter, Request::new("alice@example.com"))
        .unwrap();

    assert_eq!(response.content_type, "application/xml");

    let doc = &response.body;
    assert_eq!(doc.matches("<Server>").count(), 1);
    assert!(doc.contains("<EMailAddress>alice@example.com</EMailAddress>"));
    assert!(doc.contains("<Url>https://mail.example.com/Microsoft-Server-ActiveSync</Url>"));
}

#[test]
fn aliases_file_username_resolves_through_the_pipeline() {
    let mut aliases = NamedTempFile::new().unwrap();
    aliases.write_all(b"alice: ajones\n").unwrap();

    let settings = format!(
        r#"{{
            "providers": [
                {{
                    "id": "example.com",
                    "name": "Example",
                    "nameShort": "Ex",
                    "domains": ["example.com"],
                    "username": {{"aliasesFile": "{}"}},
                    "servers": [
                        {{
                            "type": "imap",
                            "hostname": "imap.example.com",
                            "endpoints": [{{"socketType": "SSL"}}]
                        }}
                    ]
                }}
            ]
        }}"#,
        aliases.path().display()
    );

    let (_file, source) = settings_source(&settings);
    let mut handler = RequestHandler::new(&source);

    let response = handler
        .handle(&MozillaWriter, Request::new("alice@example.com"))
        .unwrap();

    assert!(response.body.contains("<username>ajones</username>"));
}

#[test]
fn unknown_domain_fails_the_request() {
    let (_file, source) = settings_source(SETTINGS);
    let mut handler = RequestHandler::new(&source);

    let err = handler
        .handle(&MozillaWriter, Request::new("alice@elsewhere.net"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(domain) if domain == "elsewhere.net"));
}

#[test]
fn malformed_email_fails_the_request() {
    let (_file, source) = settings_source(SETTINGS);
    let mut handler = RequestHandler::new(&source);

    let err = handler
        .handle(&MozillaWriter, Request::new("no-at-sign"))
        .unwrap_err();
    assert!(matches!(err, Error::MalformedEmail(_)));
}

#[test]
fn domain_matching_is_case_insensitive_via_expansion() {
    let (_file, source) = settings_source(SETTINGS);
    let mut handler = RequestHandler::new(&source);

    let response = handler
        .handle(&MozillaWriter, Request::new("alice@EXAMPLE.COM"))
        .unwrap();

    assert!(response.body.contains("<emailProvider id=\"example.com\">"));
}
