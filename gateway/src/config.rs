//! Listener configuration and the pure validation rules §7(a) requires
//! before a listener is registered.

use serde::Deserialize;

use crate::error::{Error, ErrorKind};

/// Which transport a listener accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Telnet,
    Websocket,
}

/// One listener's configuration, as loaded from a daemon's config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenerConfig {
    pub name: String,
    pub interface: String,
    pub port: u32,
    pub protocol: Protocol,
    pub tls_context_name: Option<String>,
}

/// Resolve a configured interface string to a bindable address, applying
/// the small alias table (`localhost` -> 127.0.0.1, `any` -> 0.0.0.0).
pub(crate) fn resolve_interface(interface: &str) -> Option<&'static str> {
    match interface {
        "localhost" => Some("127.0.0.1"),
        "any" => Some("0.0.0.0"),
        "127.0.0.1" => Some("127.0.0.1"),
        "0.0.0.0" => Some("0.0.0.0"),
        _ => None,
    }
}

/// Validate a listener's configuration against the manager's current set of
/// registered names and available TLS contexts, before it is handed to
/// `Listener::bind`.
///
/// Pure: performs no I/O and mutates nothing, so embedders can call it
/// ahead of registration without side effects on rejection.
pub fn validate_listener(
    config: &ListenerConfig,
    existing_names: &[String],
    known_tls_contexts: &[String],
) -> Result<(), Error> {
    if existing_names.iter().any(|n| n == &config.name) {
        return Err(ErrorKind::NameCollision(config.name.clone()).into());
    }

    if resolve_interface(&config.interface).is_none() {
        return Err(ErrorKind::UnknownInterface(config.interface.clone()).into());
    }

    if config.port > u32::from(u16::MAX) {
        return Err(ErrorKind::PortOutOfRange(config.port).into());
    }

    if let Some(name) = &config.tls_context_name {
        if !known_tls_contexts.iter().any(|c| c == name) {
            return Err(ErrorKind::UnknownTlsContext(name.clone()).into());
        }
    }

    Ok(())
}

/// The daemon's top-level config file shape.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listener(name: &str, interface: &str, port: u32) -> ListenerConfig {
        ListenerConfig {
            name: name.to_string(),
            interface: interface.to_string(),
            port,
            protocol: Protocol::Telnet,
            tls_context_name: None,
        }
    }

    #[test]
    fn accepts_a_well_formed_listener() {
        let cfg = listener("mud", "any", 4000);
        assert!(validate_listener(&cfg, &[], &[]).is_ok());
    }

    #[test]
    fn rejects_name_collision() {
        let cfg = listener("mud", "any", 4000);
        let err = validate_listener(&cfg, &["mud".to_string()], &[]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NameCollision(_)));
    }

    #[test]
    fn rejects_unknown_interface() {
        let cfg = listener("mud", "eth99", 4000);
        let err = validate_listener(&cfg, &[], &[]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownInterface(_)));
    }

    #[test]
    fn rejects_out_of_range_port() {
        let cfg = listener("mud", "any", 70_000);
        let err = validate_listener(&cfg, &[], &[]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PortOutOfRange(_)));
    }

    #[test]
    fn rejects_unknown_tls_context() {
        let mut cfg = listener("mud", "any", 4000);
        cfg.tls_context_name = Some("missing".to_string());
        let err = validate_listener(&cfg, &[], &["prod".to_string()]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownTlsContext(_)));
    }

    #[test]
    fn resolves_interface_aliases() {
        assert_eq!(resolve_interface("localhost"), Some("127.0.0.1"));
        assert_eq!(resolve_interface("any"), Some("0.0.0.0"));
        assert_eq!(resolve_interface("eth0"), None);
    }
}
