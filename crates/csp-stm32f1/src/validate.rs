//! Build-time resource ownership checks.
//!
//! Every pin, DMA channel and interrupt vector may be owned by at most one
//! configured instance. Use [`assert_disjoint`] in a `const` item so an
//! overlap fails the build:
//!
//! ```
//! use csp_stm32f1::{assert_disjoint, SpiId, SpiSelect};
//!
//! const SPI1: SpiSelect = SpiSelect::new(SpiId::Spi1).rx_dma();
//! const SPI2: SpiSelect = SpiSelect::new(SpiId::Spi2).interrupt();
//! const _: () = assert_disjoint(&[SPI1.build(), SPI2.build()]);
//! ```

use csp_spi::{DmaChannel, Instance, Pin, Resources, Vector};

/// The first overlap found between two configured instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Conflict {
    /// The same peripheral is configured twice.
    Instance { name: &'static str },
    Pin {
        first: &'static str,
        second: &'static str,
        pin: Pin,
    },
    DmaChannel {
        first: &'static str,
        second: &'static str,
        controller: u8,
        channel: u8,
    },
    Vector {
        first: &'static str,
        second: &'static str,
        vector: Vector,
    },
}

const fn pins(instance: &Instance) -> [Option<Pin>; 4] {
    let p = &instance.pins;
    [Some(p.sck), p.miso, p.mosi, p.nss]
}

const fn channels(resources: &Resources) -> [Option<DmaChannel>; 2] {
    [resources.dma_rx, resources.dma_tx]
}

const fn vectors(resources: &Resources) -> [Option<Vector>; 3] {
    [
        match resources.interrupt {
            Some(irq) => Some(irq.vector),
            None => None,
        },
        match resources.dma_rx {
            Some(ch) => Some(ch.irq.vector),
            None => None,
        },
        match resources.dma_tx {
            Some(ch) => Some(ch.irq.vector),
            None => None,
        },
    ]
}

const fn check_pair(
    a: &(Instance, Resources),
    b: &(Instance, Resources),
) -> Result<(), Conflict> {
    let (first, second) = (a.0.name, b.0.name);
    if a.0.register_base == b.0.register_base {
        return Err(Conflict::Instance { name: first });
    }

    let (pa, pb) = (pins(&a.0), pins(&b.0));
    let mut i = 0;
    while i < pa.len() {
        let mut j = 0;
        while j < pb.len() {
            if let (Some(x), Some(y)) = (pa[i], pb[j]) {
                if x.const_eq(&y) {
                    return Err(Conflict::Pin { first, second, pin: x });
                }
            }
            j += 1;
        }
        i += 1;
    }

    let (ca, cb) = (channels(&a.1), channels(&b.1));
    let mut i = 0;
    while i < ca.len() {
        let mut j = 0;
        while j < cb.len() {
            if let (Some(x), Some(y)) = (ca[i], cb[j]) {
                if x.same_channel(&y) {
                    return Err(Conflict::DmaChannel {
                        first,
                        second,
                        controller: x.controller,
                        channel: x.channel,
                    });
                }
            }
            j += 1;
        }
        i += 1;
    }

    let (va, vb) = (vectors(&a.1), vectors(&b.1));
    let mut i = 0;
    while i < va.len() {
        let mut j = 0;
        while j < vb.len() {
            if let (Some(x), Some(y)) = (va[i], vb[j]) {
                if x.0 == y.0 {
                    return Err(Conflict::Vector { first, second, vector: x });
                }
            }
            j += 1;
        }
        i += 1;
    }

    Ok(())
}

/// Find the first resource claimed by two of `configs`.
pub const fn check_disjoint(
    configs: &[(Instance, Resources)],
) -> Result<(), Conflict> {
    let mut i = 0;
    while i < configs.len() {
        let mut j = i + 1;
        while j < configs.len() {
            if let Err(conflict) = check_pair(&configs[i], &configs[j]) {
                return Err(conflict);
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

/// Panic if any resource is claimed by two of `configs`.
pub const fn assert_disjoint(configs: &[(Instance, Resources)]) {
    match check_disjoint(configs) {
        Ok(()) => {}
        Err(Conflict::Instance { .. }) => {
            panic!("SPI instance configured twice")
        }
        Err(Conflict::Pin { .. }) => panic!("pin claimed by two SPI instances"),
        Err(Conflict::DmaChannel { .. }) => {
            panic!("DMA channel claimed by two SPI instances")
        }
        Err(Conflict::Vector { .. }) => {
            panic!("interrupt vector claimed by two SPI instances")
        }
    }
}
