use csp_spi::{
    Direction, DmaChannel, DmaPriority, Instance, IrqConfig, Pin, PinTable,
    Port, Remap, Resources, Vector,
};

use crate::device;
use crate::dma;

/// The SPI peripherals of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiId {
    Spi1,
    Spi2,
    Spi3,
}

impl SpiId {
    pub const fn name(self) -> &'static str {
        match self {
            SpiId::Spi1 => "SPI1",
            SpiId::Spi2 => "SPI2",
            SpiId::Spi3 => "SPI3",
        }
    }

    pub const fn register_base(self) -> usize {
        match self {
            SpiId::Spi1 => 0x4001_3000,
            SpiId::Spi2 => 0x4000_3800,
            SpiId::Spi3 => 0x4000_3C00,
        }
    }

    /// The peripheral's own interrupt vector.
    pub const fn vector(self) -> Vector {
        match self {
            SpiId::Spi1 => Vector(35),
            SpiId::Spi2 => Vector(36),
            SpiId::Spi3 => Vector(51),
        }
    }

    /// Number of alternate pin mappings.
    pub const fn remaps(self) -> u8 {
        match self {
            SpiId::Spi2 => 1,
            SpiId::Spi1 | SpiId::Spi3 => 2,
        }
    }
}

/// Pins routed to one instance under one remap setting.
struct Route {
    sck: Pin,
    miso: Pin,
    mosi: Pin,
    nss: Pin,
}

const fn pin(port: Port, number: u8) -> Pin {
    Pin::new(port, number)
}

const fn route(id: SpiId, remap: u8) -> Route {
    match (id, remap) {
        (SpiId::Spi1, 0) => Route {
            sck: pin(Port::A, 5),
            miso: pin(Port::A, 6),
            mosi: pin(Port::A, 7),
            nss: pin(Port::A, 4),
        },
        (SpiId::Spi1, 1) | (SpiId::Spi3, 0) => Route {
            sck: pin(Port::B, 3),
            miso: pin(Port::B, 4),
            mosi: pin(Port::B, 5),
            nss: pin(Port::A, 15),
        },
        (SpiId::Spi2, 0) => Route {
            sck: pin(Port::B, 13),
            miso: pin(Port::B, 14),
            mosi: pin(Port::B, 15),
            nss: pin(Port::B, 12),
        },
        (SpiId::Spi3, 1) => Route {
            sck: pin(Port::C, 10),
            miso: pin(Port::C, 11),
            mosi: pin(Port::C, 12),
            nss: pin(Port::A, 4),
        },
        _ => panic!("invalid SPI IO remap"),
    }
}

pub const IT_PRIORITY: u8 = 2;
pub const IT_SUB: u8 = 3;
pub const RX_DMA_IT_PRIORITY: u8 = 2;
pub const RX_DMA_IT_SUB: u8 = 2;
pub const TX_DMA_IT_PRIORITY: u8 = 1;
pub const TX_DMA_IT_SUB: u8 = 4;

/// Highest preemption priority or sub-priority the NVIC accepts.
pub const MAX_PRIORITY: u8 = 15;

const fn irq(vector: Vector, priority: u8, subpriority: u8) -> IrqConfig {
    if priority > MAX_PRIORITY || subpriority > MAX_PRIORITY {
        panic!("interrupt priority out of range");
    }
    IrqConfig::new(vector, priority, subpriority)
}

const fn dma_channel(
    id: SpiId,
    direction: Direction,
    priority: DmaPriority,
    irq_priority: u8,
    irq_sub: u8,
) -> DmaChannel {
    let (controller, channel) = dma::request_channel(id, direction);
    if controller > device::DMA_CONTROLLERS {
        panic!("DMA controller not present on this device");
    }
    DmaChannel {
        controller,
        channel,
        priority,
        irq: irq(
            dma::channel_vector(controller, channel),
            irq_priority,
            irq_sub,
        ),
    }
}

/// Compile-time selection of one SPI instance and its resources.
///
/// ```
/// use csp_stm32f1::{SpiId, SpiSelect};
///
/// const SPI1: SpiSelect =
///     SpiSelect::new(SpiId::Spi1).nss(true).rx_dma().tx_dma();
/// let (instance, resources) = SPI1.build();
/// assert_eq!(instance.name, "SPI1");
/// assert!(resources.dma_rx.is_some());
/// ```
///
/// Invalid selections (a remap the instance lacks, an instance or DMA
/// controller the device lacks, an out-of-range priority) panic, which in
/// a `const` item fails the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSelect {
    id: SpiId,
    remap: u8,
    nss: bool,
    miso: bool,
    mosi: bool,
    interrupt: Option<IrqConfig>,
    dma_rx: Option<DmaChannel>,
    dma_tx: Option<DmaChannel>,
}

impl SpiSelect {
    /// Default remap, MISO and MOSI routed, NSS under software control, no
    /// interrupt, no DMA.
    pub const fn new(id: SpiId) -> Self {
        Self {
            id,
            remap: 0,
            nss: false,
            miso: true,
            mosi: true,
            interrupt: None,
            dma_rx: None,
            dma_tx: None,
        }
    }

    pub const fn id(&self) -> SpiId {
        self.id
    }

    pub const fn remap(mut self, remap: u8) -> Self {
        if remap >= self.id.remaps() {
            panic!("invalid SPI IO remap");
        }
        self.remap = remap;
        self
    }

    /// Route the NSS pin to the peripheral (hardware chip select).
    pub const fn nss(mut self, enabled: bool) -> Self {
        self.nss = enabled;
        self
    }

    pub const fn miso(mut self, enabled: bool) -> Self {
        self.miso = enabled;
        self
    }

    pub const fn mosi(mut self, enabled: bool) -> Self {
        self.mosi = enabled;
        self
    }

    /// Bind the peripheral's own vector at the default priority.
    pub const fn interrupt(self) -> Self {
        self.interrupt_with(IT_PRIORITY, IT_SUB)
    }

    pub const fn interrupt_with(
        mut self,
        priority: u8,
        subpriority: u8,
    ) -> Self {
        self.interrupt = Some(irq(self.id.vector(), priority, subpriority));
        self
    }

    /// Bind the receive DMA channel with default priorities.
    pub const fn rx_dma(self) -> Self {
        self.rx_dma_with(DmaPriority::Low, RX_DMA_IT_PRIORITY, RX_DMA_IT_SUB)
    }

    pub const fn rx_dma_with(
        mut self,
        priority: DmaPriority,
        irq_priority: u8,
        irq_sub: u8,
    ) -> Self {
        self.dma_rx = Some(dma_channel(
            self.id,
            Direction::Rx,
            priority,
            irq_priority,
            irq_sub,
        ));
        self
    }

    /// Bind the transmit DMA channel with default priorities.
    pub const fn tx_dma(self) -> Self {
        self.tx_dma_with(DmaPriority::Low, TX_DMA_IT_PRIORITY, TX_DMA_IT_SUB)
    }

    pub const fn tx_dma_with(
        mut self,
        priority: DmaPriority,
        irq_priority: u8,
        irq_sub: u8,
    ) -> Self {
        self.dma_tx = Some(dma_channel(
            self.id,
            Direction::Tx,
            priority,
            irq_priority,
            irq_sub,
        ));
        self
    }

    pub const fn instance(&self) -> Instance {
        if !device::is_available(self.id) {
            panic!("SPI instance not present on this device");
        }
        let route = route(self.id, self.remap);
        let mut pins = PinTable::new(route.sck);
        if self.miso {
            pins.miso = Some(route.miso);
        }
        if self.mosi {
            pins.mosi = Some(route.mosi);
        }
        if self.nss {
            pins.nss = Some(route.nss);
        }
        Instance {
            name: self.id.name(),
            register_base: self.id.register_base(),
            remap: Remap(self.remap),
            pins,
        }
    }

    pub const fn resources(&self) -> Resources {
        Resources {
            interrupt: self.interrupt,
            dma_rx: self.dma_rx,
            dma_tx: self.dma_tx,
        }
    }

    pub const fn build(self) -> (Instance, Resources) {
        (self.instance(), self.resources())
    }
}
