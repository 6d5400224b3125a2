//! DMA channel bindings.
//!
//! A binding couples one transfer direction of a peripheral to one DMA
//! channel. It exists exactly as long as the channel's interrupt vector is
//! enabled, and its word alignment is fixed when it is created.

use crate::config::{Alignment, DataWidth};
use crate::error::BindError;
use crate::hal::{Direction, DmaSetup, SpiHardware};
use crate::instance::DmaChannel;
use crate::irq::InterruptBinding;

/// An owned association between a transfer direction and a DMA channel.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaBinding {
    direction: Direction,
    channel: DmaChannel,
    alignment: Alignment,
    irq: InterruptBinding,
}

impl DmaBinding {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn channel(&self) -> &DmaChannel {
        &self.channel
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }
}

/// One optional binding per direction.
#[derive(Debug, Default)]
pub(crate) struct DmaSlots {
    rx: Option<DmaBinding>,
    tx: Option<DmaBinding>,
}

impl DmaSlots {
    pub(crate) const fn new() -> Self {
        Self { rx: None, tx: None }
    }

    pub(crate) fn get(&self, direction: Direction) -> Option<&DmaBinding> {
        match direction {
            Direction::Rx => self.rx.as_ref(),
            Direction::Tx => self.tx.as_ref(),
        }
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<DmaBinding> {
        match direction {
            Direction::Rx => &mut self.rx,
            Direction::Tx => &mut self.tx,
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.rx.is_some() as usize + self.tx.is_some() as usize
    }

    /// Program `channel` for `direction` and arm its interrupt.
    ///
    /// The interrupt is enabled only after the channel is fully programmed.
    pub(crate) fn bind<H: SpiHardware>(
        &mut self,
        hw: &H,
        direction: Direction,
        channel: DmaChannel,
        width: DataWidth,
    ) -> Result<(), BindError<H::Error>> {
        let slot = self.slot(direction);
        if slot.is_some() {
            return Err(BindError::ChannelUnavailable);
        }

        let alignment = width.alignment();
        let setup = DmaSetup {
            direction,
            controller: channel.controller,
            channel: channel.channel,
            priority: channel.priority,
            alignment,
            memory_increment: true,
            peripheral_increment: false,
            circular: false,
        };
        hw.dma_init(&setup).map_err(BindError::InitFailed)?;

        let irq = InterruptBinding::arm(hw, channel.irq);
        *slot = Some(DmaBinding { direction, channel, alignment, irq });
        Ok(())
    }

    /// Release the binding for `direction`, if any.
    ///
    /// The vector is disabled first and the in-flight transfer is aborted
    /// unconditionally; an abort failure is logged and teardown continues.
    /// The slot is empty on return even if the channel teardown failed.
    pub(crate) fn unbind<H: SpiHardware>(
        &mut self,
        hw: &H,
        direction: Direction,
    ) -> Result<(), BindError<H::Error>> {
        let Some(binding) = self.slot(direction).take() else {
            return Ok(());
        };

        binding.irq.disarm(hw);

        if let Err(_e) = hw.dma_abort(direction) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{:?} DMA abort failed: {:?}",
                direction,
                defmt::Debug2Format(&_e)
            );
        }

        hw.dma_deinit(direction).map_err(BindError::TeardownFailed)
    }
}
