//! Peripheral configuration value types.
//!
//! These describe *how* a peripheral is programmed. *Which* peripheral, and
//! which pins, vectors and DMA channels it owns, lives in
//! [`instance`](crate::instance).

/// Operating role of the peripheral on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// The peripheral drives SCK.
    Controller,
    /// The peripheral is clocked by a remote controller.
    Peripheral,
}

/// Clock polarity and phase.
///
/// The numeric encoding matches the register convention: bit 0 is the
/// phase (CPHA), bit 1 is the polarity (CPOL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockMode {
    /// CPOL = 0, CPHA = 0
    Mode0 = 0b00,
    /// CPOL = 0, CPHA = 1
    Mode1 = 0b01,
    /// CPOL = 1, CPHA = 0
    Mode2 = 0b10,
    /// CPOL = 1, CPHA = 1
    Mode3 = 0b11,
}

impl ClockMode {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(Self::Mode0),
            0b01 => Some(Self::Mode1),
            0b10 => Some(Self::Mode2),
            0b11 => Some(Self::Mode3),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` when SCK idles high.
    pub const fn polarity(self) -> bool {
        self.bits() & 0b10 != 0
    }

    /// Returns `true` when data is captured on the second clock edge.
    pub const fn phase(self) -> bool {
        self.bits() & 0b01 != 0
    }
}

/// Word alignment used when programming a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alignment {
    Byte,
    HalfWord,
}

/// Size of one data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataWidth {
    Eight,
    Sixteen,
}

impl DataWidth {
    /// Number of bytes occupied by one word in memory.
    pub const fn bytes(self) -> usize {
        match self {
            DataWidth::Eight => 1,
            DataWidth::Sixteen => 2,
        }
    }

    /// DMA memory and peripheral alignment for this width.
    pub const fn alignment(self) -> Alignment {
        match self {
            DataWidth::Eight => Alignment::Byte,
            DataWidth::Sixteen => Alignment::HalfWord,
        }
    }
}

/// Bit order on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Chip-select discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipSelect {
    /// NSS is managed by software (typically a GPIO owned by the caller).
    Software,
    /// NSS is driven by the peripheral.
    HardwareOutput,
    /// NSS is an input sampled by the peripheral.
    HardwareInput,
}

impl ChipSelect {
    /// Discipline implied by the role and whether an NSS pin is routed.
    pub const fn derive(mode: Mode, nss_routed: bool) -> Self {
        match (nss_routed, mode) {
            (false, _) => ChipSelect::Software,
            (true, Mode::Controller) => ChipSelect::HardwareOutput,
            (true, Mode::Peripheral) => ChipSelect::HardwareInput,
        }
    }
}

/// Baud-rate prescaler applied to the peripheral kernel clock.
///
/// This is the complete hardware-supported set; any other divisor is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div2 = 0,
    Div4 = 1,
    #[default]
    Div8 = 2,
    Div16 = 3,
    Div32 = 4,
    Div64 = 5,
    Div128 = 6,
    Div256 = 7,
}

impl Prescaler {
    const ALL: [Prescaler; 8] = [
        Prescaler::Div2,
        Prescaler::Div4,
        Prescaler::Div8,
        Prescaler::Div16,
        Prescaler::Div32,
        Prescaler::Div64,
        Prescaler::Div128,
        Prescaler::Div256,
    ];

    pub const fn from_divisor(divisor: u16) -> Option<Self> {
        match divisor {
            2 => Some(Prescaler::Div2),
            4 => Some(Prescaler::Div4),
            8 => Some(Prescaler::Div8),
            16 => Some(Prescaler::Div16),
            32 => Some(Prescaler::Div32),
            64 => Some(Prescaler::Div64),
            128 => Some(Prescaler::Div128),
            256 => Some(Prescaler::Div256),
            _ => None,
        }
    }

    pub const fn divisor(self) -> u16 {
        2 << (self as u16)
    }

    /// Value of the 3-bit baud-rate field.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// The fastest setting whose SCK rate does not exceed `target_hz`.
    ///
    /// Returns `None` if even the largest divisor is too fast.
    pub fn at_most(kernel_hz: u32, target_hz: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| kernel_hz / u32::from(p.divisor()) <= target_hz)
    }
}

/// Arguments of [`Spi::init`](crate::Spi::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitConfig {
    pub mode: Mode,
    pub clock_mode: ClockMode,
    pub data_width: DataWidth,
    pub bit_order: BitOrder,
}

impl InitConfig {
    pub const fn new(
        mode: Mode,
        clock_mode: ClockMode,
        data_width: DataWidth,
        bit_order: BitOrder,
    ) -> Self {
        Self { mode, clock_mode, data_width, bit_order }
    }
}

impl Default for InitConfig {
    fn default() -> Self {
        Self::new(
            Mode::Controller,
            ClockMode::Mode0,
            DataWidth::Eight,
            BitOrder::MsbFirst,
        )
    }
}

/// Complete configuration handed to the low-level driver.
///
/// Two-line full duplex operation, disabled TI framing and disabled CRC are
/// fixed properties of this layer and are not represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    pub mode: Mode,
    pub clock_mode: ClockMode,
    pub data_width: DataWidth,
    pub bit_order: BitOrder,
    pub chip_select: ChipSelect,
    pub prescaler: Prescaler,
}

impl SpiConfig {
    /// Configuration of a handle that has never been initialized.
    pub const fn pending() -> Self {
        Self {
            mode: Mode::Controller,
            clock_mode: ClockMode::Mode0,
            data_width: DataWidth::Eight,
            bit_order: BitOrder::MsbFirst,
            chip_select: ChipSelect::Software,
            prescaler: Prescaler::Div8,
        }
    }

    pub(crate) fn apply(&mut self, init: InitConfig, nss_routed: bool) {
        self.mode = init.mode;
        self.clock_mode = init.clock_mode;
        self.data_width = init.data_width;
        self.bit_order = init.bit_order;
        self.chip_select = ChipSelect::derive(init.mode, nss_routed);
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_mode_bits() {
        assert!(!ClockMode::Mode0.polarity() && !ClockMode::Mode0.phase());
        assert!(!ClockMode::Mode1.polarity() && ClockMode::Mode1.phase());
        assert!(ClockMode::Mode2.polarity() && !ClockMode::Mode2.phase());
        assert!(ClockMode::Mode3.polarity() && ClockMode::Mode3.phase());
        assert_eq!(ClockMode::from_bits(4), None);
    }

    #[test]
    fn prescaler_divisors() {
        for p in Prescaler::ALL {
            assert_eq!(Prescaler::from_divisor(p.divisor()), Some(p));
        }
        assert_eq!(Prescaler::Div256.divisor(), 256);
        assert_eq!(Prescaler::Div8.bits(), 0b010);
        assert_eq!(Prescaler::from_divisor(3), None);
        assert_eq!(Prescaler::from_divisor(512), None);
        assert_eq!(Prescaler::default(), Prescaler::Div8);
    }

    #[test]
    fn prescaler_at_most() {
        const KERNEL_HZ: u32 = 72_000_000;
        let at_most = |hz| Prescaler::at_most(KERNEL_HZ, hz);
        assert_eq!(at_most(36_000_000), Some(Prescaler::Div2));
        assert_eq!(at_most(10_000_000), Some(Prescaler::Div8));
        assert_eq!(at_most(1_000_000), Some(Prescaler::Div128));
        assert_eq!(at_most(100_000), None);
    }

    #[test]
    fn chip_select_follows_role() {
        use ChipSelect::*;
        assert_eq!(ChipSelect::derive(Mode::Controller, false), Software);
        assert_eq!(ChipSelect::derive(Mode::Controller, true), HardwareOutput);
        assert_eq!(ChipSelect::derive(Mode::Peripheral, true), HardwareInput);
    }
}
