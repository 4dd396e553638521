#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out increasing request ids. Only the most recent id is current;
/// continuations holding an older id must not touch the overlay.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> RequestId {
        self.latest = self.latest.wrapping_add(1);
        RequestId(self.latest)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest != 0 && id.0 == self.latest
    }

    /// Marks every id issued so far as stale.
    pub fn retire(&mut self) {
        self.latest = self.latest.wrapping_add(1);
    }
}
