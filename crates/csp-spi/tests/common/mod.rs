#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use csp_spi::{
    BlockingError, Direction, DmaChannel, DmaPriority, DmaSetup, Event,
    Instance, IrqConfig, Pin, PinMode, PinTable, Port, Prescaler, Remap,
    Resources, Spi, SpiConfig, SpiHardware, Vector,
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Duration;

// ---------------------------------------------------------------------------
// Recording mock driver
// ---------------------------------------------------------------------------

/// One call made into the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Remap(Remap),
    PinClaim(Pin),
    PinRelease(Pin),
    ClockEnable,
    ClockDisable,
    HwInit(SpiConfig),
    HwDeinit,
    SetEnabled(bool),
    WritePrescaler(Prescaler),
    DmaInit(DmaSetup),
    DmaDeinit(Direction),
    DmaAbort(Direction),
    IrqEnable(IrqConfig),
    IrqDisable(Vector),
    Exchange { words: usize },
    PeripheralEvent,
    DmaEvent(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Called from inside the driver, the way an interrupt would preempt it.
pub type Reentry = Box<dyn Fn() -> bool>;

/// Loopback driver that records every call and fails on request.
#[derive(Default)]
pub struct MockHardware {
    calls: RefCell<Vec<Call>>,
    /// `dma_init` fails for this direction.
    pub fail_dma_init: Cell<Option<Direction>>,
    /// `dma_deinit` fails for this direction, once.
    pub fail_dma_deinit: Cell<Option<Direction>>,
    pub fail_dma_abort: Cell<bool>,
    pub fail_hw_init: Cell<bool>,
    /// `hw_deinit` fails, once.
    pub fail_hw_deinit: Cell<bool>,
    /// Next `blocking_exchange` fails with this error, once.
    pub exchange_error: Cell<Option<BlockingError<MockError>>>,
    /// Event reported by the next forwarded interrupt.
    pub next_event: Cell<Option<Event>>,
    /// Run from `hw_init`, `hw_deinit`, `dma_init` and `dma_deinit`.
    reentry: RefCell<Option<Reentry>>,
    reentry_results: RefCell<Vec<bool>>,
}

impl MockHardware {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| f(c)).count()
    }

    /// Index of the first call equal to `call`.
    pub fn position(&self, call: Call) -> Option<usize> {
        self.calls.borrow().iter().position(|c| *c == call)
    }

    /// Whether the clock is enabled after replaying the recorded calls.
    pub fn clock_on(&self) -> bool {
        self.calls.borrow().iter().fold(false, |on, c| match c {
            Call::ClockEnable => true,
            Call::ClockDisable => false,
            _ => on,
        })
    }

    pub fn set_reentry(&self, reentry: Option<Reentry>) {
        *self.reentry.borrow_mut() = reentry;
    }

    /// What each re-entrant call returned, in order.
    pub fn reentry_results(&self) -> Vec<bool> {
        self.reentry_results.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn reenter(&self) {
        if let Some(reentry) = self.reentry.borrow().as_ref() {
            let result = reentry();
            self.reentry_results.borrow_mut().push(result);
        }
    }
}

impl SpiHardware for MockHardware {
    type Error = MockError;

    fn apply_remap(&self, remap: Remap) {
        self.record(Call::Remap(remap));
    }

    fn pin_claim(&self, pin: Pin, mode: PinMode) {
        assert_eq!(mode, PinMode::AlternatePushPull);
        self.record(Call::PinClaim(pin));
    }

    fn pin_release(&self, pin: Pin) {
        self.record(Call::PinRelease(pin));
    }

    fn clock_enable(&self) {
        self.record(Call::ClockEnable);
    }

    fn clock_disable(&self) {
        self.record(Call::ClockDisable);
    }

    fn hw_init(&self, config: &SpiConfig) -> Result<(), MockError> {
        self.record(Call::HwInit(*config));
        self.reenter();
        if self.fail_hw_init.get() {
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn hw_deinit(&self) -> Result<(), MockError> {
        self.record(Call::HwDeinit);
        self.reenter();
        if self.fail_hw_deinit.replace(false) {
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn set_enabled(&self, enabled: bool) {
        self.record(Call::SetEnabled(enabled));
    }

    fn write_prescaler(&self, prescaler: Prescaler) {
        self.record(Call::WritePrescaler(prescaler));
    }

    fn dma_init(&self, setup: &DmaSetup) -> Result<(), MockError> {
        self.record(Call::DmaInit(*setup));
        self.reenter();
        if self.fail_dma_init.get() == Some(setup.direction) {
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn dma_deinit(&self, direction: Direction) -> Result<(), MockError> {
        self.record(Call::DmaDeinit(direction));
        self.reenter();
        if self.fail_dma_deinit.get() == Some(direction) {
            self.fail_dma_deinit.set(None);
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn dma_abort(&self, direction: Direction) -> Result<(), MockError> {
        self.record(Call::DmaAbort(direction));
        if self.fail_dma_abort.get() {
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn interrupt_enable(&self, irq: IrqConfig) {
        self.record(Call::IrqEnable(irq));
    }

    fn interrupt_disable(&self, vector: Vector) {
        self.record(Call::IrqDisable(vector));
    }

    fn blocking_exchange(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        words: usize,
        _timeout: Duration,
    ) -> Result<(), BlockingError<MockError>> {
        self.record(Call::Exchange { words });
        if let Some(e) = self.exchange_error.take() {
            // Leave garbage behind so callers can check zero-fill.
            rx.fill(0xEE);
            return Err(e);
        }
        rx.copy_from_slice(tx);
        Ok(())
    }

    fn on_peripheral_event(&self) -> Option<Event> {
        self.record(Call::PeripheralEvent);
        self.next_event.take()
    }

    fn on_dma_event(&self, direction: Direction) -> Option<Event> {
        self.record(Call::DmaEvent(direction));
        self.next_event.take()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const SCK: Pin = Pin::new(Port::A, 5);
pub const MISO: Pin = Pin::new(Port::A, 6);
pub const MOSI: Pin = Pin::new(Port::A, 7);
pub const NSS: Pin = Pin::new(Port::A, 4);

pub const INSTANCE: Instance = Instance {
    name: "SPI1",
    register_base: 0x4001_3000,
    remap: Remap(0),
    pins: PinTable { sck: SCK, miso: Some(MISO), mosi: Some(MOSI), nss: None },
};

pub const PERIPHERAL_IRQ: IrqConfig = IrqConfig::new(Vector(35), 2, 3);

pub const RX_DMA: DmaChannel = DmaChannel {
    controller: 1,
    channel: 2,
    priority: DmaPriority::Low,
    irq: IrqConfig::new(Vector(12), 2, 2),
};

pub const TX_DMA: DmaChannel = DmaChannel {
    controller: 1,
    channel: 3,
    priority: DmaPriority::Low,
    irq: IrqConfig::new(Vector(13), 1, 4),
};

pub type TestSpi = Spi<NoopRawMutex, MockHardware>;

pub fn full_resources() -> Resources {
    Resources::none()
        .with_interrupt(PERIPHERAL_IRQ)
        .with_rx_dma(RX_DMA)
        .with_tx_dma(TX_DMA)
}

pub fn make_spi(resources: Resources) -> TestSpi {
    Spi::new(INSTANCE, resources, MockHardware::default())
}

pub fn make_spi_with(instance: Instance, resources: Resources) -> TestSpi {
    Spi::new(instance, resources, MockHardware::default())
}
