//! Fixed DMA request mapping and interrupt vectors.

use csp_spi::{Direction, Vector};

use crate::spi::SpiId;

/// DMA controller and channel that serve `id` in `direction`.
///
/// The request lines are hard-wired; there is no channel selection on
/// this family.
pub const fn request_channel(id: SpiId, direction: Direction) -> (u8, u8) {
    match (id, direction) {
        (SpiId::Spi1, Direction::Rx) => (1, 2),
        (SpiId::Spi1, Direction::Tx) => (1, 3),
        (SpiId::Spi2, Direction::Rx) => (1, 4),
        (SpiId::Spi2, Direction::Tx) => (1, 5),
        (SpiId::Spi3, Direction::Rx) => (2, 1),
        (SpiId::Spi3, Direction::Tx) => (2, 2),
    }
}

/// Interrupt vector of a DMA channel.
///
/// DMA1 channels 1..=7 sit at vectors 11..=17. DMA2 channels 1..=3 sit at
/// 56..=58 and channels 4 and 5 share vector 59.
pub const fn channel_vector(controller: u8, channel: u8) -> Vector {
    match (controller, channel) {
        (1, 1..=7) => Vector(10 + channel as u16),
        (2, 1..=3) => Vector(55 + channel as u16),
        (2, 4..=5) => Vector(59),
        _ => panic!("no such DMA channel"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors() {
        assert_eq!(channel_vector(1, 1), Vector(11));
        assert_eq!(channel_vector(1, 7), Vector(17));
        assert_eq!(channel_vector(2, 1), Vector(56));
        assert_eq!(channel_vector(2, 3), Vector(58));
        assert_eq!(channel_vector(2, 4), channel_vector(2, 5));
    }

    #[test]
    fn request_lines_do_not_overlap() {
        let ids = [SpiId::Spi1, SpiId::Spi2, SpiId::Spi3];
        let mut seen = [(0u8, 0u8); 6];
        let mut n = 0;
        for id in ids {
            for dir in [Direction::Rx, Direction::Tx] {
                let ch = request_channel(id, dir);
                assert!(!seen[..n].contains(&ch));
                seen[n] = ch;
                n += 1;
            }
        }
    }
}
