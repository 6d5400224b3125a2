use core::fmt;

use derive_more::From;

use crate::hal::{BlockingError, Direction};

/// Errors from binding or releasing a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError<E> {
    /// The direction already has a channel bound.
    ChannelUnavailable,
    /// Channel programming reported failure.
    InitFailed(E),
    /// Channel teardown reported failure. The binding is released anyway.
    TeardownFailed(E),
}

/// Errors from [`Spi::init`](crate::Spi::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError<E> {
    /// The handle is `Ready` or `Busy`. Nothing was touched.
    AlreadyInitialized,
    /// The handle is in `Error`; call `deinit` first. Nothing was touched.
    NotReset,
    /// Binding the DMA channel for the given direction failed.
    DmaInitFailed(Direction, BindError<E>),
    /// Final peripheral programming failed.
    HardwareInitFailed(E),
}

/// Errors from [`Spi::deinit`](crate::Spi::deinit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeinitError<E> {
    /// The handle is already in `Reset`. Nothing was touched.
    NotInitialized,
    DmaTeardownFailed(Direction, E),
    HardwareTeardownFailed(E),
}

/// Errors from the synchronous transfer primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError<E> {
    /// The handle is not `Ready`. The driver was not called.
    NotReady,
    /// Buffers are empty, differ in length, or do not hold whole words.
    InvalidLength,
    Timeout,
    Hardware(E),
}

impl<E> From<BlockingError<E>> for TransferError<E> {
    fn from(e: BlockingError<E>) -> Self {
        match e {
            BlockingError::Timeout => TransferError::Timeout,
            BlockingError::Hardware(e) => TransferError::Hardware(e),
        }
    }
}

/// Errors from runtime speed changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedError {
    /// A transfer is outstanding, or the handle is in `Error`.
    Busy,
    /// The rate is not in the hardware-supported set.
    InvalidParameter,
}

/// Errors from reconfiguring a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Configuration is only writable in `Reset`.
    NotReset,
}

/// Any error this crate reports, for callers that mix operations with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Init(InitError<E>),
    Deinit(DeinitError<E>),
    Transfer(TransferError<E>),
    Speed(SpeedError),
    Config(ConfigError),
}

impl<E: fmt::Debug> fmt::Display for BindError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::ChannelUnavailable => {
                write!(f, "DMA direction already bound")
            }
            BindError::InitFailed(e) => {
                write!(f, "DMA channel init failed: {:?}", e)
            }
            BindError::TeardownFailed(e) => {
                write!(f, "DMA channel teardown failed: {:?}", e)
            }
        }
    }
}

impl<E: fmt::Debug> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::AlreadyInitialized => {
                write!(f, "peripheral already initialized")
            }
            InitError::NotReset => {
                write!(f, "peripheral in error state, deinit first")
            }
            InitError::DmaInitFailed(dir, e) => {
                write!(f, "{:?} DMA init failed: {}", dir, e)
            }
            InitError::HardwareInitFailed(e) => {
                write!(f, "peripheral init failed: {:?}", e)
            }
        }
    }
}

impl<E: fmt::Debug> fmt::Display for DeinitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeinitError::NotInitialized => {
                write!(f, "peripheral not initialized")
            }
            DeinitError::DmaTeardownFailed(dir, e) => {
                write!(f, "{:?} DMA teardown failed: {:?}", dir, e)
            }
            DeinitError::HardwareTeardownFailed(e) => {
                write!(f, "peripheral teardown failed: {:?}", e)
            }
        }
    }
}

impl<E: fmt::Debug> fmt::Display for TransferError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::NotReady => write!(f, "peripheral not ready"),
            TransferError::InvalidLength => write!(f, "invalid buffer length"),
            TransferError::Timeout => write!(f, "transfer timed out"),
            TransferError::Hardware(e) => {
                write!(f, "transfer failed: {:?}", e)
            }
        }
    }
}

impl fmt::Display for SpeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedError::Busy => write!(f, "peripheral busy"),
            SpeedError::InvalidParameter => write!(f, "unsupported rate"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotReset => {
                write!(f, "configuration is only writable in reset")
            }
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Init(e) => write!(f, "{}", e),
            Error::Deinit(e) => write!(f, "{}", e),
            Error::Transfer(e) => write!(f, "{}", e),
            Error::Speed(e) => write!(f, "{}", e),
            Error::Config(e) => write!(f, "{}", e),
        }
    }
}
