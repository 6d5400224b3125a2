use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Duration;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::completion::{Completion, Event};
use crate::config::{
    Alignment, BitOrder, ClockMode, DataWidth, InitConfig, Mode, Prescaler,
    SpiConfig,
};
use crate::dma::DmaSlots;
use crate::error::{
    BindError, ConfigError, DeinitError, InitError, SpeedError, TransferError,
};
use crate::hal::{Direction, SpiHardware};
use crate::instance::{Instance, PinMode, Resources};
use crate::irq::InterruptBinding;
use crate::state::{AtomicState, State};

/// Timeout used by [`Spi::read_write_byte`] and [`Spi::read_write_word`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Everything a transition mutates, kept behind the handle's mutex.
struct Bindings {
    config: SpiConfig,
    resources: Resources,
    pins_claimed: bool,
    clock_enabled: bool,
    dma: DmaSlots,
    irq: Option<InterruptBinding>,
}

/// Ownership of the `Busy` window, handed out by
/// [`Spi::begin_transfer`].
///
/// Only the ticket of the transfer currently holding the window releases
/// it; a ticket outlived by a `deinit` is stale and ignored.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferTicket {
    sequence: u32,
}

/// Interrupt source forwarded by the platform's vector dispatch.
#[derive(Clone, Copy)]
enum Source {
    Peripheral,
    Dma(Direction),
}

/// Handle for one physical SPI peripheral.
///
/// Owns the peripheral's configuration, lifecycle state, DMA and interrupt
/// bindings, and the completion slot its interrupt handlers feed. Create
/// one per physical peripheral, typically in a `static`:
///
/// ```ignore
/// static SPI1: Spi<CriticalSectionRawMutex, Stm32Spi> =
///     Spi::new(SPI1_INSTANCE, SPI1_RESOURCES, Stm32Spi::SPI1);
/// ```
///
/// Lifecycle transitions run under the handle's mutex with a transition
/// flag raised; interrupt entry points that arrive during a transition, or
/// for a vector that is not bound, are discarded. With
/// `CriticalSectionRawMutex` a whole `init` or `deinit`, driver calls
/// included, runs with every interrupt masked, not just the vectors this
/// handle owns. Keep the driver's init and teardown short, or use a mutex
/// that masks less if that latency matters.
pub struct Spi<M: RawMutex, H: SpiHardware> {
    instance: Instance,
    hw: H,
    state: AtomicState,
    transitioning: AtomicBool,
    sequence: AtomicU32,
    bindings: Mutex<M, RefCell<Bindings>>,
    completion: Completion<M>,
}

impl<M: RawMutex, H: SpiHardware> Spi<M, H> {
    /// Create an inert handle in [`State::Reset`]. Touches no hardware.
    pub const fn new(instance: Instance, resources: Resources, hw: H) -> Self {
        Self {
            instance,
            hw,
            state: AtomicState::new(State::Reset),
            transitioning: AtomicBool::new(false),
            sequence: AtomicU32::new(0),
            bindings: Mutex::new(RefCell::new(Bindings {
                config: SpiConfig::pending(),
                resources,
                pins_claimed: false,
                clock_enabled: false,
                dma: DmaSlots::new(),
                irq: None,
            })),
            completion: Completion::new(),
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The low-level driver this handle sequences.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn state(&self) -> State {
        self.state.load()
    }

    /// Current (or pending, while in `Reset`) configuration.
    pub fn config(&self) -> SpiConfig {
        self.bindings.lock(|cell| cell.borrow().config)
    }

    pub fn resources(&self) -> Resources {
        self.bindings.lock(|cell| cell.borrow().resources)
    }

    pub fn prescaler(&self) -> Prescaler {
        self.config().prescaler
    }

    /// Number of live DMA bindings.
    pub fn dma_bindings(&self) -> usize {
        self.bindings.lock(|cell| cell.borrow().dma.count())
    }

    /// Word alignment of the binding for `direction`, if bound.
    pub fn dma_alignment(&self, direction: Direction) -> Option<Alignment> {
        self.bindings.lock(|cell| {
            cell.borrow().dma.get(direction).map(|b| b.alignment())
        })
    }

    /// Whether the peripheral's own interrupt vector is bound.
    pub fn interrupt_bound(&self) -> bool {
        self.bindings.lock(|cell| cell.borrow().irq.is_some())
    }

    /// Replace the interrupt and DMA selection. Only allowed in `Reset`.
    pub fn set_resources(
        &self,
        resources: Resources,
    ) -> Result<(), ConfigError> {
        self.bindings.lock(|cell| {
            if self.state.load() != State::Reset
                || self.transitioning.load(Ordering::Acquire)
            {
                return Err(ConfigError::NotReset);
            }
            cell.borrow_mut().resources = resources;
            Ok(())
        })
    }

    /// Initialize the peripheral. See [`init_with`](Self::init_with).
    pub fn init(
        &self,
        mode: Mode,
        clock_mode: ClockMode,
        data_width: DataWidth,
        bit_order: BitOrder,
    ) -> Result<(), InitError<H::Error>> {
        self.init_with(InitConfig::new(mode, clock_mode, data_width, bit_order))
    }

    /// Move the handle from `Reset` to `Ready`.
    ///
    /// Runs, in order: pin remap and claim, clock enable, DMA binding for
    /// each selected direction, the peripheral interrupt binding, and the
    /// final hardware arm. A failure part-way leaves whatever was already
    /// claimed in place and the handle in `Error`; call
    /// [`deinit`](Self::deinit) before retrying.
    pub fn init_with(
        &self,
        init: InitConfig,
    ) -> Result<(), InitError<H::Error>> {
        self.bindings.lock(|cell| {
            match self.state.load() {
                State::Reset => {}
                State::Error => return Err(InitError::NotReset),
                State::Ready | State::Busy => {
                    return Err(InitError::AlreadyInitialized)
                }
            }

            let mut bindings = cell.borrow_mut();
            self.transitioning.store(true, Ordering::Release);
            let result = self.run_init(&mut bindings, init);
            match result {
                Ok(()) => {
                    self.state.store(State::Ready);
                    #[cfg(feature = "defmt")]
                    defmt::debug!("{}: ready", self.instance.name);
                }
                Err(ref _e) => {
                    self.state.store(State::Error);
                    #[cfg(feature = "defmt")]
                    defmt::error!(
                        "{}: init failed: {:?}",
                        self.instance.name,
                        defmt::Debug2Format(_e)
                    );
                }
            }
            self.transitioning.store(false, Ordering::Release);
            result
        })
    }

    fn run_init(
        &self,
        b: &mut Bindings,
        init: InitConfig,
    ) -> Result<(), InitError<H::Error>> {
        let pins = &self.instance.pins;
        b.config.apply(init, pins.nss.is_some());

        self.hw.apply_remap(self.instance.remap);
        for pin in pins.iter() {
            self.hw.pin_claim(pin, PinMode::AlternatePushPull);
        }
        b.pins_claimed = true;

        self.hw.clock_enable();
        b.clock_enabled = true;

        let resources = b.resources;
        let width = b.config.data_width;
        for (direction, channel) in [
            (Direction::Rx, resources.dma_rx),
            (Direction::Tx, resources.dma_tx),
        ] {
            if let Some(channel) = channel {
                b.dma
                    .bind(&self.hw, direction, channel, width)
                    .map_err(|e| InitError::DmaInitFailed(direction, e))?;
            }
        }

        if let Some(irq) = resources.interrupt {
            b.irq = Some(InterruptBinding::arm(&self.hw, irq));
        }

        self.hw.hw_init(&b.config).map_err(InitError::HardwareInitFailed)
    }

    /// Return the handle to `Reset`, releasing everything `init` claimed.
    ///
    /// Tears down in reverse order: peripheral interrupt, DMA bindings
    /// (aborting in-flight work), peripheral registers, clock, pins. On a
    /// hardware failure the handle is left in `Error` with the remaining
    /// resources still claimed; calling `deinit` again resumes from there.
    pub fn deinit(&self) -> Result<(), DeinitError<H::Error>> {
        self.bindings.lock(|cell| {
            if self.state.load() == State::Reset {
                return Err(DeinitError::NotInitialized);
            }

            let mut bindings = cell.borrow_mut();
            self.transitioning.store(true, Ordering::Release);
            let result = self.run_deinit(&mut bindings);
            match result {
                Ok(()) => {
                    self.completion.reset();
                    self.state.store(State::Reset);
                    #[cfg(feature = "defmt")]
                    defmt::debug!("{}: reset", self.instance.name);
                }
                Err(ref _e) => {
                    self.state.store(State::Error);
                    #[cfg(feature = "defmt")]
                    defmt::error!(
                        "{}: deinit failed: {:?}",
                        self.instance.name,
                        defmt::Debug2Format(_e)
                    );
                }
            }
            self.transitioning.store(false, Ordering::Release);
            result
        })
    }

    fn run_deinit(
        &self,
        b: &mut Bindings,
    ) -> Result<(), DeinitError<H::Error>> {
        if let Some(irq) = b.irq.take() {
            irq.disarm(&self.hw);
        }

        for direction in [Direction::Rx, Direction::Tx] {
            match b.dma.unbind(&self.hw, direction) {
                Ok(()) | Err(BindError::ChannelUnavailable) => {}
                Err(
                    BindError::InitFailed(e) | BindError::TeardownFailed(e),
                ) => return Err(DeinitError::DmaTeardownFailed(direction, e)),
            }
        }

        if b.clock_enabled {
            self.hw
                .hw_deinit()
                .map_err(DeinitError::HardwareTeardownFailed)?;
            self.hw.clock_disable();
            b.clock_enabled = false;
        }

        if b.pins_claimed {
            for pin in self.instance.pins.iter() {
                self.hw.pin_release(pin);
            }
            b.pins_claimed = false;
        }

        Ok(())
    }

    /// Claim the `Busy` window for an externally driven transfer.
    ///
    /// Hand the ticket back to [`complete_transfer`](Self::complete_transfer)
    /// when the transfer is done. Only one transfer may be outstanding.
    pub fn begin_transfer(
        &self,
    ) -> Result<TransferTicket, TransferError<H::Error>> {
        self.bindings.lock(|_| self.claim_window())
    }

    /// Release the `Busy` window held by `ticket`.
    ///
    /// Returns `false` if the ticket no longer owns the window, because a
    /// `deinit` cancelled its transfer.
    pub fn complete_transfer(&self, ticket: TransferTicket) -> bool {
        self.bindings.lock(|_| self.release_window(ticket))
    }

    /// Ready -> Busy. Caller holds the bindings lock.
    fn claim_window(&self) -> Result<TransferTicket, TransferError<H::Error>> {
        if self.transitioning.load(Ordering::Acquire) {
            return Err(TransferError::NotReady);
        }
        self.state
            .transition(State::Ready, State::Busy)
            .map_err(|_| TransferError::NotReady)?;
        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel);
        Ok(TransferTicket { sequence: sequence.wrapping_add(1) })
    }

    /// Busy -> Ready if `ticket` owns the window. Caller holds the
    /// bindings lock.
    fn release_window(&self, ticket: TransferTicket) -> bool {
        self.sequence.load(Ordering::Acquire) == ticket.sequence
            && self.state.transition(State::Busy, State::Ready).is_ok()
    }

    /// Exchange `tx` for `rx`, blocking until done or `timeout` elapses.
    ///
    /// Both buffers hold whole words of the configured data width in memory
    /// layout. On any error `rx` is zero-filled. Never call this from
    /// interrupt context.
    pub fn transfer(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Duration,
    ) -> Result<(), TransferError<H::Error>> {
        let result = self.run_transfer(tx, rx, timeout);
        if result.is_err() {
            rx.fill(0);
        }
        result
    }

    fn run_transfer(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Duration,
    ) -> Result<(), TransferError<H::Error>> {
        let (words, ticket) = self.bindings.lock(|cell| {
            if self.transitioning.load(Ordering::Acquire)
                || self.state.load() != State::Ready
            {
                return Err(TransferError::NotReady);
            }
            let width = cell.borrow().config.data_width.bytes();
            if tx.is_empty() || tx.len() != rx.len() || tx.len() % width != 0
            {
                return Err(TransferError::InvalidLength);
            }
            self.claim_window().map(|ticket| (tx.len() / width, ticket))
        })?;

        let result = self.hw.blocking_exchange(tx, rx, words, timeout);
        self.complete_transfer(ticket);

        result.map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{}: exchange failed: {:?}",
                self.instance.name,
                defmt::Debug2Format(&e)
            );
            TransferError::from(e)
        })
    }

    /// Exchange a fixed number of bytes and return what was received.
    pub fn exchange<const N: usize>(
        &self,
        tx: [u8; N],
        timeout: Duration,
    ) -> Result<[u8; N], TransferError<H::Error>> {
        let mut rx = [0u8; N];
        self.transfer(&tx, &mut rx, timeout).map(|()| rx)
    }

    /// Exchange one byte. Returns `0` if the exchange did not happen.
    ///
    /// Check [`state`](Self::state) before relying on the result.
    pub fn read_write_byte(&self, byte: u8) -> u8 {
        self.exchange([byte], DEFAULT_TIMEOUT).map(|rx| rx[0]).unwrap_or(0)
    }

    /// Exchange one 16-bit value: one frame in 16-bit mode, two frames
    /// (low byte first) in 8-bit mode. Returns `0` if the exchange did not
    /// happen.
    pub fn read_write_word(&self, word: u16) -> u16 {
        self.exchange(word.to_le_bytes(), DEFAULT_TIMEOUT)
            .map(u16::from_le_bytes)
            .unwrap_or(0)
    }

    /// Change the SCK rate to the kernel clock divided by `divisor`.
    ///
    /// See [`set_prescaler`](Self::set_prescaler).
    pub fn set_speed(&self, divisor: u16) -> Result<(), SpeedError> {
        self.reprogram(Prescaler::from_divisor(divisor))
    }

    /// Change the baud-rate prescaler.
    ///
    /// In `Reset` only the pending configuration is rewritten. In `Ready`
    /// the enable bit is cleared, the rate field rewritten and the enable
    /// bit set again; clock and bindings are untouched. The lifecycle state
    /// never changes.
    pub fn set_prescaler(
        &self,
        prescaler: Prescaler,
    ) -> Result<(), SpeedError> {
        self.reprogram(Some(prescaler))
    }

    fn reprogram(
        &self,
        prescaler: Option<Prescaler>,
    ) -> Result<(), SpeedError> {
        self.bindings.lock(|cell| {
            if self.transitioning.load(Ordering::Acquire) {
                return Err(SpeedError::Busy);
            }
            let state = self.state.load();
            if !matches!(state, State::Reset | State::Ready) {
                return Err(SpeedError::Busy);
            }
            let prescaler = prescaler.ok_or(SpeedError::InvalidParameter)?;

            let mut bindings = cell.borrow_mut();
            if state == State::Ready {
                self.hw.set_enabled(false);
                self.hw.write_prescaler(prescaler);
                self.hw.set_enabled(true);
            }
            bindings.config.prescaler = prescaler;
            Ok(())
        })
    }

    /// Entry point for the peripheral's own interrupt vector.
    ///
    /// Returns `false` if the interrupt was discarded as spurious.
    pub fn on_interrupt(&self) -> bool {
        self.forward(Source::Peripheral)
    }

    /// Entry point for the interrupt vector of the DMA channel bound to
    /// `direction`.
    ///
    /// Returns `false` if the interrupt was discarded as spurious.
    pub fn on_dma_interrupt(&self, direction: Direction) -> bool {
        self.forward(Source::Dma(direction))
    }

    fn forward(&self, source: Source) -> bool {
        let serviced = if self.transitioning.load(Ordering::Acquire) {
            None
        } else {
            self.bindings.lock(|cell| {
                let bindings = cell.try_borrow().ok()?;
                match source {
                    Source::Peripheral => {
                        bindings.irq.as_ref()?;
                        Some(self.hw.on_peripheral_event())
                    }
                    Source::Dma(direction) => {
                        bindings.dma.get(direction)?;
                        Some(self.hw.on_dma_event(direction))
                    }
                }
            })
        };

        match serviced {
            Some(event) => {
                if let Some(event) = event {
                    self.completion.signal(event);
                }
                true
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("{}: spurious interrupt", self.instance.name);
                false
            }
        }
    }

    /// The completion slot fed by this handle's interrupt entry points.
    pub fn completion(&self) -> &Completion<M> {
        &self.completion
    }

    /// Wait for the next event forwarded from interrupt context.
    pub async fn wait_event(&self) -> Event {
        self.completion.wait().await
    }

    /// Take a pending event without waiting.
    pub fn try_take_event(&self) -> Option<Event> {
        self.completion.try_take()
    }
}
