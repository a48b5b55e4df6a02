//! Admission gate for report fetch cycles.
//!
//! At most one fetch/decode/publish cycle is in flight per driver. Interrupts
//! that arrive while a cycle is running are coalesced: the device keeps its
//! interrupt asserted while data is pending, so nothing is lost.

/// Phase of the report fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Fetching,
}

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A new cycle was reserved; the caller must run it and then finish it.
    Admitted,
    /// A cycle is already in flight; the interrupt was coalesced.
    Busy,
    /// The device is suspending, asleep or offline.
    Refused,
}

#[derive(Debug)]
pub struct InterruptSerializer {
    phase: FetchPhase,
    admitted: u32,
    coalesced: u32,
}

impl Default for InterruptSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSerializer {
    pub const fn new() -> Self {
        Self {
            phase: FetchPhase::Idle,
            admitted: 0,
            coalesced: 0,
        }
    }

    /// Tries to move `Idle -> Fetching`. Never blocks.
    pub fn try_admit(&mut self, accepting: bool) -> Admission {
        if !accepting {
            return Admission::Refused;
        }
        match self.phase {
            FetchPhase::Idle => {
                self.phase = FetchPhase::Fetching;
                self.admitted = self.admitted.wrapping_add(1);
                Admission::Admitted
            }
            FetchPhase::Fetching => {
                self.coalesced = self.coalesced.wrapping_add(1);
                Admission::Busy
            }
        }
    }

    /// Ends the running cycle.
    pub fn finish(&mut self) {
        self.phase = FetchPhase::Idle;
    }

    #[cfg(test)]
    fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// True while an admitted cycle has not finished.
    pub fn drain_in_progress(&self) -> bool {
        self.phase == FetchPhase::Fetching
    }

    /// Number of cycles admitted so far.
    pub fn admitted(&self) -> u32 {
        self.admitted
    }

    /// Number of interrupts dropped because a cycle was in flight.
    pub fn coalesced(&self) -> u32 {
        self.coalesced
    }
}
