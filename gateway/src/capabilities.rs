/// A snapshot of everything negotiated (or defaulted) for a session.
///
/// Cloned into a [`tokio::sync::watch`] channel on every mutation so embedders
/// can subscribe to capability changes without taking a lock on the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub width: u16,
    pub height: u16,

    pub ansi: bool,
    pub xterm256: bool,
    pub truecolor: bool,
    pub utf8: bool,
    pub vt100: bool,
    pub osc_color_palette: bool,
    pub mouse_tracking: bool,
    pub screen_reader: bool,
    pub proxy: bool,

    pub gmcp: bool,
    pub msdp: bool,
    pub mssp: bool,
    pub mccp2: bool,
    pub mccp3: bool,
    pub ttype: bool,
    pub mtts: bool,
    pub naws: bool,
    pub linemode: bool,
    pub force_endline: bool,
    pub suppress_ga: bool,
    pub mnes: bool,
    pub keepalive: bool,

    pub client_name: String,
    pub client_version: String,
    pub terminal_type: String,

    pub tls: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            width: 78,
            height: 24,
            ansi: false,
            xterm256: false,
            truecolor: false,
            utf8: false,
            vt100: false,
            osc_color_palette: false,
            mouse_tracking: false,
            screen_reader: false,
            proxy: false,
            gmcp: false,
            msdp: false,
            mssp: false,
            mccp2: false,
            mccp3: false,
            ttype: false,
            mtts: false,
            naws: false,
            linemode: false,
            force_endline: false,
            suppress_ga: true,
            mnes: false,
            keepalive: false,
            client_name: "UNKNOWN".to_string(),
            client_version: "UNKNOWN".to_string(),
            terminal_type: "UNKNOWN".to_string(),
            tls: false,
        }
    }
}

impl Capabilities {
    #[must_use]
    pub fn with_tls(tls: bool) -> Self {
        Self {
            tls,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_scenario_1() {
        let caps = Capabilities::default();
        assert!(!caps.ansi);
        assert_eq!(caps.width, 78);
        assert_eq!(caps.height, 24);
        assert!(caps.suppress_ga);
    }
}
