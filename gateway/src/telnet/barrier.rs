//! The handshake barrier: tracks outstanding negotiation expectations and
//! fires readiness once they drain, or a grace timer elapses regardless.

use std::collections::HashSet;

/// Outstanding local/remote/special negotiation expectations.
///
/// Readiness fires once, the first time the barrier is drained (or the grace
/// timer elapses) and the session hasn't already been marked ready.
#[derive(Debug, Default)]
pub struct Barrier {
    local_pending: HashSet<u8>,
    remote_pending: HashSet<u8>,
    special_pending: HashSet<u8>,
    ready: bool,
}

impl Barrier {
    pub fn add_local(&mut self, opt: u8) {
        self.local_pending.insert(opt);
    }

    pub fn add_remote(&mut self, opt: u8) {
        self.remote_pending.insert(opt);
    }

    pub fn add_special(&mut self, codes: impl IntoIterator<Item = u8>) {
        self.special_pending.extend(codes);
    }

    pub fn drain_local(&mut self, opt: u8) {
        self.local_pending.remove(&opt);
    }

    pub fn drain_remote(&mut self, opt: u8) {
        self.remote_pending.remove(&opt);
    }

    pub fn drain_special(&mut self, code: u8) {
        self.special_pending.remove(&code);
    }

    pub fn drain_all_special(&mut self) {
        self.special_pending.clear();
    }

    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.local_pending.is_empty()
            && self.remote_pending.is_empty()
            && self.special_pending.is_empty()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Mark the barrier as ready if it isn't already and the barrier is
    /// drained (or `force` is set, as when the grace timer elapses).
    ///
    /// Returns `true` exactly the one time readiness transitions.
    pub fn check_ready(&mut self, force: bool) -> bool {
        if self.ready {
            return false;
        }
        if !force && !self.is_drained() {
            return false;
        }
        self.ready = true;
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.local_pending.len() + self.remote_pending.len() + self.special_pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fires_once_when_drained() {
        let mut barrier = Barrier::default();
        barrier.add_remote(31);
        assert!(!barrier.check_ready(false));
        barrier.drain_remote(31);
        assert!(barrier.check_ready(false));
        assert!(!barrier.check_ready(false), "must not fire twice");
    }

    #[test]
    fn grace_timer_forces_readiness_with_residue() {
        let mut barrier = Barrier::default();
        barrier.add_local(24);
        assert!(barrier.check_ready(true));
        assert_eq!(barrier.len(), 1, "residual pending entries are untouched");
    }

    #[test]
    fn monotonically_non_increasing_after_population() {
        let mut barrier = Barrier::default();
        barrier.add_local(24);
        barrier.add_remote(31);
        barrier.add_special([0, 1, 2]);
        let mut prev = barrier.len();
        for opt in [24u8, 31, 0, 1, 2] {
            barrier.drain_local(opt);
            barrier.drain_remote(opt);
            barrier.drain_special(opt);
            assert!(barrier.len() <= prev);
            prev = barrier.len();
        }
    }
}
