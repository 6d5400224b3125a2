#![no_std]
//! SPI instance tables for the STM32F1 family.
//!
//! Builds the [`Instance`](csp_spi::Instance) and
//! [`Resources`](csp_spi::Resources) values a [`csp_spi::Spi`] handle is
//! created from: register base, pin routing for each IO remap, the
//! hard-wired DMA request channels and the NVIC vector numbers. Every
//! selection is a `const fn`, so a bad configuration is a build error:
//!
//! ```
//! use csp_stm32f1::{assert_disjoint, SpiId, SpiSelect};
//!
//! const SPI1: SpiSelect = SpiSelect::new(SpiId::Spi1).remap(1).interrupt();
//! const SPI2: SpiSelect =
//!     SpiSelect::new(SpiId::Spi2).nss(true).rx_dma().tx_dma();
//! const _: () = assert_disjoint(&[SPI1.build(), SPI2.build()]);
//! ```
//!
//! The device line is chosen with one of the `low-density`,
//! `medium-density` or `high-density` features; with none enabled the
//! high-density table is used.

mod device;
mod dma;
mod spi;
mod validate;

pub use device::{is_available, AVAILABLE, DMA_CONTROLLERS};
pub use dma::{channel_vector, request_channel};
pub use spi::*;
pub use validate::{assert_disjoint, check_disjoint, Conflict};
