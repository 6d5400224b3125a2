#![no_std]
//! Chip-support layer for SPI peripherals.
//!
//! Each physical peripheral gets one [`Spi`] handle that owns its
//! configuration and walks a fixed lifecycle:
//!
//! ```text
//! Reset --init--> Ready --transfer--> Busy --done--> Ready
//!   ^               |                   |
//!   +----deinit-----+-------------------+
//! ```
//!
//! A failure part-way through `init` or `deinit` parks the handle in
//! `Error`, from which only `deinit` is accepted. The handle binds the
//! peripheral's DMA channels and interrupt vectors during `init` and
//! releases them during `deinit`; the register work itself is delegated to
//! a [`SpiHardware`] implementation supplied by the chip crate.

mod completion;
mod config;
mod dma;
mod error;
mod hal;
mod instance;
mod irq;
mod spi;
mod state;

pub use completion::{Completion, Event};
pub use config::{
    Alignment, BitOrder, ChipSelect, ClockMode, DataWidth, InitConfig, Mode,
    Prescaler, SpiConfig,
};
pub use dma::DmaBinding;
pub use error::{
    BindError, ConfigError, DeinitError, Error, InitError, SpeedError,
    TransferError,
};
pub use hal::{BlockingError, Direction, DmaSetup, SpiHardware};
pub use instance::{
    DmaChannel, DmaPriority, Instance, IrqConfig, Pin, PinMode, PinTable, Port,
    Remap, Resources, Vector,
};
pub use irq::InterruptBinding;
pub use spi::{Spi, TransferTicket, DEFAULT_TIMEOUT};
pub use state::State;
