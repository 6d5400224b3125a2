use embassy_time::Duration;

use crate::completion::Event;
use crate::config::{Alignment, Prescaler, SpiConfig};
use crate::instance::{DmaPriority, IrqConfig, Pin, PinMode, Remap, Vector};

/// Transfer direction of a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Device to memory.
    Rx,
    /// Memory to device.
    Tx,
}

/// Channel programming handed to [`SpiHardware::dma_init`].
///
/// Channels are always programmed in normal (non-circular) mode with a
/// fixed peripheral address and an incrementing memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaSetup {
    pub direction: Direction,
    pub controller: u8,
    pub channel: u8,
    pub priority: DmaPriority,
    pub alignment: Alignment,
    pub memory_increment: bool,
    pub peripheral_increment: bool,
    pub circular: bool,
}

/// Failure of [`SpiHardware::blocking_exchange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockingError<E> {
    /// Completion did not occur within the timeout.
    Timeout,
    Hardware(E),
}

/// Register-level driver for one peripheral instance.
///
/// Implementors program registers and nothing else: every method assumes
/// the lifecycle controller has already checked that the call is valid in
/// the current state. Methods take `&self` because register blocks are
/// shared volatile cells reachable from both thread and interrupt context.
pub trait SpiHardware {
    /// Error reported by register programming.
    type Error: core::fmt::Debug;

    /// Select the alternate-function pin mapping.
    fn apply_remap(&self, remap: Remap);

    /// Enable the port clock and configure `pin` in `mode`.
    fn pin_claim(&self, pin: Pin, mode: PinMode);

    /// Return `pin` to its reset configuration.
    fn pin_release(&self, pin: Pin);

    fn clock_enable(&self);

    fn clock_disable(&self);

    /// Program and enable the peripheral.
    fn hw_init(&self, config: &SpiConfig) -> Result<(), Self::Error>;

    /// Return the peripheral registers to their reset values.
    fn hw_deinit(&self) -> Result<(), Self::Error>;

    /// Set or clear the peripheral enable bit without touching anything else.
    fn set_enabled(&self, enabled: bool);

    /// Rewrite the baud-rate field. Only called with the peripheral disabled.
    fn write_prescaler(&self, prescaler: Prescaler);

    /// Enable the DMA controller clock and program one channel.
    fn dma_init(&self, setup: &DmaSetup) -> Result<(), Self::Error>;

    /// Return a channel to its reset configuration.
    fn dma_deinit(&self, direction: Direction) -> Result<(), Self::Error>;

    /// Abort whatever transfer the channel is running.
    fn dma_abort(&self, direction: Direction) -> Result<(), Self::Error>;

    fn interrupt_enable(&self, irq: IrqConfig);

    fn interrupt_disable(&self, vector: Vector);

    /// Exchange `words` frames, blocking until done or `timeout` elapses.
    ///
    /// `tx` and `rx` hold exactly `words` frames in memory layout.
    fn blocking_exchange(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        words: usize,
        timeout: Duration,
    ) -> Result<(), BlockingError<Self::Error>>;

    /// Service the peripheral's own interrupt.
    fn on_peripheral_event(&self) -> Option<Event>;

    /// Service the interrupt of the DMA channel bound to `direction`.
    fn on_dma_event(&self, direction: Direction) -> Option<Event>;
}
