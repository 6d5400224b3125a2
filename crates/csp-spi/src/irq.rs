use crate::hal::SpiHardware;
use crate::instance::{IrqConfig, Vector};

/// An enabled interrupt vector.
///
/// Only created by [`arm`](Self::arm), after the resource the vector
/// reports on has been programmed, and only destroyed by
/// [`disarm`](Self::disarm), before that resource is torn down.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptBinding {
    irq: IrqConfig,
}

impl InterruptBinding {
    pub(crate) fn arm<H: SpiHardware>(hw: &H, irq: IrqConfig) -> Self {
        hw.interrupt_enable(irq);
        Self { irq }
    }

    pub(crate) fn disarm<H: SpiHardware>(self, hw: &H) {
        hw.interrupt_disable(self.irq.vector);
    }

    pub fn vector(&self) -> Vector {
        self.irq.vector
    }

    pub fn config(&self) -> IrqConfig {
        self.irq
    }
}
