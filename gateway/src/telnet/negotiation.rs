//! Per-option handshake state, bitpacked into a fixed 256-entry table indexed
//! by option code so negotiation traffic never pays for a `HashMap` lookup.

use std::fmt::{Debug, Formatter};

const TABLE_SIZE: usize = 1 + u8::MAX as usize;

/// Per-option state for both perspectives (local = "we will do it", remote =
/// "they will do it").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Table {
    options: [Entry; TABLE_SIZE],
}

impl Default for Table {
    fn default() -> Self {
        Self {
            options: [Entry::default(); TABLE_SIZE],
        }
    }
}

impl Table {
    #[must_use]
    pub fn option(&self, opt: u8) -> &Entry {
        &self.options[opt as usize]
    }

    pub fn option_mut(&mut self, opt: u8) -> &mut Entry {
        &mut self.options[opt as usize]
    }
}

/// One option's negotiation state, packed into a single byte.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry(u8);

impl Entry {
    const LOCAL_SUPPORT: u8 = 1;
    const REMOTE_SUPPORT: u8 = 1 << 1;
    const LOCAL_ENABLED: u8 = 1 << 2;
    const REMOTE_ENABLED: u8 = 1 << 3;
    const LOCAL_NEGOTIATING: u8 = 1 << 4;
    const REMOTE_NEGOTIATING: u8 = 1 << 5;
    const LOCAL_ASKED: u8 = 1 << 6;
    const REMOTE_ASKED: u8 = 1 << 7;

    #[must_use]
    pub fn local_support(self) -> bool {
        self.0 & Self::LOCAL_SUPPORT != 0
    }

    pub fn set_local_support(&mut self) {
        self.0 |= Self::LOCAL_SUPPORT;
    }

    #[must_use]
    pub fn remote_support(self) -> bool {
        self.0 & Self::REMOTE_SUPPORT != 0
    }

    pub fn set_remote_support(&mut self) {
        self.0 |= Self::REMOTE_SUPPORT;
    }

    #[must_use]
    pub fn local_enabled(self) -> bool {
        self.0 & Self::LOCAL_ENABLED != 0
    }

    pub fn set_local_enabled(&mut self) {
        self.0 |= Self::LOCAL_ENABLED;
    }

    pub fn clear_local_enabled(&mut self) {
        self.0 &= !Self::LOCAL_ENABLED;
    }

    #[must_use]
    pub fn remote_enabled(self) -> bool {
        self.0 & Self::REMOTE_ENABLED != 0
    }

    pub fn set_remote_enabled(&mut self) {
        self.0 |= Self::REMOTE_ENABLED;
    }

    pub fn clear_remote_enabled(&mut self) {
        self.0 &= !Self::REMOTE_ENABLED;
    }

    #[must_use]
    pub fn local_negotiating(self) -> bool {
        self.0 & Self::LOCAL_NEGOTIATING != 0
    }

    pub fn set_local_negotiating(&mut self) {
        self.0 |= Self::LOCAL_NEGOTIATING;
    }

    pub fn clear_local_negotiating(&mut self) {
        self.0 &= !Self::LOCAL_NEGOTIATING;
    }

    #[must_use]
    pub fn remote_negotiating(self) -> bool {
        self.0 & Self::REMOTE_NEGOTIATING != 0
    }

    pub fn set_remote_negotiating(&mut self) {
        self.0 |= Self::REMOTE_NEGOTIATING;
    }

    pub fn clear_remote_negotiating(&mut self) {
        self.0 &= !Self::REMOTE_NEGOTIATING;
    }

    #[must_use]
    pub fn local_asked(self) -> bool {
        self.0 & Self::LOCAL_ASKED != 0
    }

    pub fn set_local_asked(&mut self) {
        self.0 |= Self::LOCAL_ASKED;
    }

    #[must_use]
    pub fn remote_asked(self) -> bool {
        self.0 & Self::REMOTE_ASKED != 0
    }

    pub fn set_remote_asked(&mut self) {
        self.0 |= Self::REMOTE_ASKED;
    }
}

impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entry")
            .field("local_support", &self.local_support())
            .field("local_enabled", &self.local_enabled())
            .field("local_negotiating", &self.local_negotiating())
            .field("remote_support", &self.remote_support())
            .field("remote_enabled", &self.remote_enabled())
            .field("remote_negotiating", &self.remote_negotiating())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_flags_are_independent() {
        let mut e = Entry::default();
        e.set_local_support();
        e.set_remote_negotiating();
        assert!(e.local_support());
        assert!(e.remote_negotiating());
        assert!(!e.remote_support());
        assert!(!e.local_negotiating());
    }

    #[test]
    fn table_indexes_by_option_code() {
        let mut table = Table::default();
        table.option_mut(86).set_local_support();
        assert!(table.option(86).local_support());
        assert!(!table.option(87).local_support());
    }
}
