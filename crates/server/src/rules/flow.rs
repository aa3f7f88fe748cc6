//! Bit layout of a liquid check's payload byte.
//!
//! ```text
//!  7 6 5 | 4  3  2  1  0
//!  delay | -Y -Z +Z -X +X
//! ```
//!
//! The low five bits record directions already spread into (or found
//! blocked); the top three bits count lava's remaining start-up delay.

use bitflags::bitflags;

bitflags! {
    /// Spread directions of a liquid cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FlowDirs: u8 {
        const X_MAX = 1 << 0;
        const X_MIN = 1 << 1;
        const Z_MAX = 1 << 2;
        const Z_MIN = 1 << 3;
        const Y_MIN = 1 << 4;
    }
}

/// The five spread directions in dispatch order, with their offsets.
pub const DIRECTIONS: [(FlowDirs, i32, i32, i32); 5] = [
    (FlowDirs::X_MAX, 1, 0, 0),
    (FlowDirs::X_MIN, -1, 0, 0),
    (FlowDirs::Z_MAX, 0, 0, 1),
    (FlowDirs::Z_MIN, 0, 0, -1),
    (FlowDirs::Y_MIN, 0, -1, 0),
];

/// Dispatches lava waits before it first spreads.
pub const LAVA_DELAY_TICKS: u8 = 4;

const DELAY_SHIFT: u8 = 5;
const MASK_BITS: u8 = 0x1F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowState(u8);

impl FlowState {
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn flowed(self) -> FlowDirs {
        FlowDirs::from_bits_truncate(self.0 & MASK_BITS)
    }

    pub fn has_flowed(self, dir: FlowDirs) -> bool {
        self.flowed().contains(dir)
    }

    pub fn mark(&mut self, dir: FlowDirs) {
        self.0 |= dir.bits();
    }

    /// Every direction has been spread into or found blocked.
    pub fn is_complete(self) -> bool {
        self.flowed().is_all()
    }

    pub const fn delay(self) -> u8 {
        self.0 >> DELAY_SHIFT
    }

    /// Replace the delay counter; values above 7 are truncated.
    pub fn set_delay(&mut self, delay: u8) {
        self.0 = (self.0 & MASK_BITS) | ((delay & 0x07) << DELAY_SHIFT);
    }

    /// Count one dispatch of lava start-up delay. Returns `true` while the
    /// lava must keep waiting.
    pub fn wait_lava_delay(&mut self) -> bool {
        let delay = self.delay();
        if delay < LAVA_DELAY_TICKS {
            self.set_delay(delay + 1);
            true
        } else {
            false
        }
    }
}
