use portable_atomic::{AtomicU8, Ordering};

/// Lifecycle state of a peripheral handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Inert: clock disabled, no pins, no bindings.
    Reset,
    /// Configured and armed; accepts one transfer.
    Ready,
    /// A transfer is outstanding.
    Busy,
    /// Initialization or teardown failed part-way. Only `deinit` is accepted.
    Error,
}

impl State {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => State::Reset,
            1 => State::Ready,
            2 => State::Busy,
            _ => State::Error,
        }
    }

    const fn raw(self) -> u8 {
        match self {
            State::Reset => 0,
            State::Ready => 1,
            State::Busy => 2,
            State::Error => 3,
        }
    }
}

/// Lock-free state cell, readable from any context.
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub(crate) const fn new(state: State) -> Self {
        Self(AtomicU8::new(state.raw()))
    }

    pub(crate) fn load(&self) -> State {
        State::from_raw(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: State) {
        self.0.store(state.raw(), Ordering::Release);
    }

    /// Move from `from` to `to`. Returns the observed state on mismatch.
    pub(crate) fn transition(
        &self,
        from: State,
        to: State,
    ) -> Result<(), State> {
        self.0
            .compare_exchange(
                from.raw(),
                to.raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(State::from_raw)
    }
}
