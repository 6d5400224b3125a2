//! Device line selection.
//!
//! Low-density parts carry SPI1 only, medium-density parts add SPI2, and
//! high-density parts add SPI3 together with the second DMA controller.

use crate::spi::SpiId;

const _ENABLED_FEATURES: u32 = 0
    + if cfg!(feature = "low-density") { 1 } else { 0 }
    + if cfg!(feature = "medium-density") { 1 } else { 0 }
    + if cfg!(feature = "high-density") { 1 } else { 0 };
const _: () = if _ENABLED_FEATURES > 1 {
    panic!("At most one device density feature may be enabled.");
};

cfg_if::cfg_if! {
    if #[cfg(feature = "low-density")] {
        /// SPI instances present on this device.
        pub const AVAILABLE: &[SpiId] = &[SpiId::Spi1];
        pub const DMA_CONTROLLERS: u8 = 1;
    } else if #[cfg(feature = "medium-density")] {
        /// SPI instances present on this device.
        pub const AVAILABLE: &[SpiId] = &[SpiId::Spi1, SpiId::Spi2];
        pub const DMA_CONTROLLERS: u8 = 1;
    } else {
        // High density unless told otherwise.
        /// SPI instances present on this device.
        pub const AVAILABLE: &[SpiId] =
            &[SpiId::Spi1, SpiId::Spi2, SpiId::Spi3];
        pub const DMA_CONTROLLERS: u8 = 2;
    }
}

/// Whether `id` exists on the selected device line.
pub const fn is_available(id: SpiId) -> bool {
    let mut i = 0;
    while i < AVAILABLE.len() {
        if AVAILABLE[i] as u8 == id as u8 {
            return true;
        }
        i += 1;
    }
    false
}
