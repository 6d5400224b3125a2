//! Static description of one physical peripheral instance.
//!
//! An [`Instance`] names the register block and pins. [`Resources`] selects
//! the optional interrupt and DMA bindings. Both are plain values so a chip
//! crate can build them in `const` context.

/// GPIO port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

/// A single GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pub port: Port,
    pub number: u8,
}

impl Pin {
    pub const fn new(port: Port, number: u8) -> Self {
        Self { port, number }
    }

    pub const fn const_eq(&self, other: &Pin) -> bool {
        self.port as u8 == other.port as u8 && self.number == other.number
    }
}

/// Electrical mode a pin is claimed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Alternate function, push-pull, pull-up, high speed.
    AlternatePushPull,
}

/// Pins routed to the peripheral. SCK is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinTable {
    pub sck: Pin,
    pub miso: Option<Pin>,
    pub mosi: Option<Pin>,
    pub nss: Option<Pin>,
}

impl PinTable {
    pub const fn new(sck: Pin) -> Self {
        Self { sck, miso: None, mosi: None, nss: None }
    }

    /// Present pins in claim order: SCK, MISO, MOSI, NSS.
    pub fn iter(&self) -> impl Iterator<Item = Pin> {
        [Some(self.sck), self.miso, self.mosi, self.nss].into_iter().flatten()
    }
}

/// Alternate-function remap selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Remap(pub u8);

/// Interrupt source identifier as known to the interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector(pub u16);

/// An interrupt vector with its preemption priority and sub-priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqConfig {
    pub vector: Vector,
    pub priority: u8,
    pub subpriority: u8,
}

impl IrqConfig {
    pub const fn new(vector: Vector, priority: u8, subpriority: u8) -> Self {
        Self { vector, priority, subpriority }
    }
}

/// DMA channel arbitration priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaPriority {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

/// A DMA channel and the interrupt vector that reports on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaChannel {
    /// DMA controller number (1-based, as in the reference manual).
    pub controller: u8,
    /// Channel number within the controller (1-based).
    pub channel: u8,
    pub priority: DmaPriority,
    pub irq: IrqConfig,
}

impl DmaChannel {
    pub const fn same_channel(&self, other: &DmaChannel) -> bool {
        self.controller == other.controller && self.channel == other.channel
    }
}

/// Identity of one physical peripheral. Not reassignable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instance {
    pub name: &'static str,
    pub register_base: usize,
    pub remap: Remap,
    pub pins: PinTable,
}

/// Optional interrupt and DMA resources selected for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resources {
    /// The peripheral's own vector, for interrupt-driven operation.
    pub interrupt: Option<IrqConfig>,
    pub dma_rx: Option<DmaChannel>,
    pub dma_tx: Option<DmaChannel>,
}

impl Resources {
    /// No interrupt, no DMA.
    pub const fn none() -> Self {
        Self { interrupt: None, dma_rx: None, dma_tx: None }
    }

    pub const fn with_interrupt(mut self, irq: IrqConfig) -> Self {
        self.interrupt = Some(irq);
        self
    }

    pub const fn with_rx_dma(mut self, channel: DmaChannel) -> Self {
        self.dma_rx = Some(channel);
        self
    }

    pub const fn with_tx_dma(mut self, channel: DmaChannel) -> Self {
        self.dma_tx = Some(channel);
        self
    }
}
