/// Logical timestamp carried by every chat message.
pub type ClockValue = i64;

/// Lamport logical clock.
///
/// Every local event advances the clock by at least one; receiving a remote
/// timestamp pulls the clock past it so that causally later events always
/// carry larger values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LamportClock {
    value: ClockValue,
}

impl LamportClock {
    pub fn new(seed: ClockValue) -> Self {
        Self { value: seed }
    }

    pub fn current(&self) -> ClockValue {
        self.value
    }

    /// Local event: increment and return the new value.
    pub fn tick(&mut self) -> ClockValue {
        self.value = self.value.saturating_add(1);
        self.value
    }

    /// Receive rule: the result exceeds both the remote timestamp and the
    /// previous local value.
    pub fn merge(
        &mut self,
        remote: ClockValue,
    ) -> ClockValue {
        self.value = if remote >= self.value {
            remote.saturating_add(1)
        } else {
            self.value.saturating_add(1)
        };
        self.value
    }

    /// Publish rule used by the coordinating server.
    ///
    /// A remote timestamp strictly ahead of the local clock is adopted as is,
    /// otherwise the event is stamped `local + 1`. The returned value is the
    /// timestamp the published message must carry.
    pub fn observe(
        &mut self,
        remote: ClockValue,
    ) -> ClockValue {
        if remote > self.value {
            self.value = remote;
        } else {
            self.value = self.value.saturating_add(1);
        }
        self.value
    }
}
