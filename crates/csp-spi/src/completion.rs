use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::hal::Direction;

/// Hardware event forwarded from interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    TransferComplete,
    TransferError,
    DmaComplete(Direction),
    DmaHalfComplete(Direction),
    DmaError(Direction),
}

/// Single-slot completion signal between an interrupt handler (producer)
/// and the caller waiting on the peripheral (consumer).
///
/// A newer event overwrites one that has not been consumed yet.
pub struct Completion<M: RawMutex> {
    signal: Signal<M, Event>,
}

impl<M: RawMutex> Completion<M> {
    pub const fn new() -> Self {
        Self { signal: Signal::new() }
    }

    pub fn signal(&self, event: Event) {
        self.signal.signal(event);
    }

    /// Take the pending event, if any, without waiting.
    pub fn try_take(&self) -> Option<Event> {
        self.signal.try_take()
    }

    pub fn signaled(&self) -> bool {
        self.signal.signaled()
    }

    /// Wait for the next event.
    pub async fn wait(&self) -> Event {
        self.signal.wait().await
    }

    /// Drop any pending event.
    pub fn reset(&self) {
        self.signal.reset();
    }
}

impl<M: RawMutex> Default for Completion<M> {
    fn default() -> Self {
        Self::new()
    }
}
