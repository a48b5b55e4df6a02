//! Per-finger contact state.

use crate::reg::MAX_FINGERS;

/// State of one finger slot.
///
/// Slots are indexed by the device's finger number, not by touch order, so a
/// finger keeps its slot for as long as it stays down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerSlot {
    pub slot_index: u8,
    /// The finger was present in the most recent report.
    pub is_valid: bool,
    /// Last reported position; held over after the finger lifts.
    pub x: u16,
    pub y: u16,
    pub button_down: bool,
    pub tip_switch: bool,
    /// Raw pressure plus the device's pressure adjustment, clamped to 255.
    pub pressure: u8,
    /// Larger contact axis in millimeters.
    pub touch_major: u16,
    /// Smaller contact axis in millimeters.
    pub touch_minor: u16,
}

impl FingerSlot {
    const fn empty(slot_index: u8) -> Self {
        Self {
            slot_index,
            is_valid: false,
            x: 0,
            y: 0,
            button_down: false,
            tip_switch: false,
            pressure: 0,
            touch_major: 0,
            touch_minor: 0,
        }
    }

    /// Marks the finger as lifted, keeping its last position.
    pub(crate) fn lift(&mut self) {
        self.is_valid = false;
        self.tip_switch = false;
        self.button_down = false;
        self.pressure = 0;
    }
}

/// Fixed table of finger slots, allocated once per driver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerTable {
    slots: [FingerSlot; MAX_FINGERS],
}

impl Default for FingerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerTable {
    pub const fn new() -> Self {
        let mut slots = [FingerSlot::empty(0); MAX_FINGERS];
        let mut i = 0;
        while i < MAX_FINGERS {
            slots[i].slot_index = i as u8;
            i += 1;
        }
        Self { slots }
    }

    /// Returns every slot to its power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn get(&self, index: usize) -> Option<&FingerSlot> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut FingerSlot {
        &mut self.slots[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FingerSlot> {
        self.slots.iter()
    }

    /// Slots whose finger is currently down.
    pub fn active(&self) -> impl Iterator<Item = &FingerSlot> {
        self.slots.iter().filter(|slot| slot.is_valid)
    }
}
