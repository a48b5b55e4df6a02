//! Touch report decoding.
//!
//! A report is a fixed 34-byte frame:
//!
//! | offset | content                                               |
//! |--------|-------------------------------------------------------|
//! | 2      | report id, `0x5D` (or `0xFF` for an idle frame)       |
//! | 3      | touch info: bit 0 button, bits 3..8 finger 0..5 valid |
//! | 4..29  | packed 5-byte records, one per *valid* finger         |
//! | 30     | hover info, bit 6 set while hovering                  |
//!
//! Each finger record packs two 12-bit coordinates into three bytes:
//! `x = (b0 & 0xF0) << 4 | b1`, `y = (b0 & 0x0F) << 8 | b2`, followed by the
//! contact size nibbles and the raw pressure.

use embassy_time::{Duration, Instant};

use crate::conf::YAxis;
use crate::finger::FingerTable;
use crate::handshake::DeviceCapabilities;
use crate::reg::*;

/// One raw report as read from the device.
pub type RawReport = [u8; MAX_REPORT_LEN];

/// Why a report was dropped without touching the finger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The device sent an all-`0xFF` idle frame.
    IdleSentinel,
    /// A key was pressed less than the configured quiet time ago.
    QuietPeriod,
    /// The driver was stopped while the report was being read.
    Offline,
}

/// Summary of a successfully decoded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    pub contact_count: u32,
    pub hovering: bool,
}

/// Result of decoding one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The finger table was updated.
    Decoded(FrameSummary),
    /// The report was benign and dropped.
    Ignored(IgnoreReason),
    /// The report carried an unexpected report id.
    InvalidReport(u8),
}

/// Decodes raw reports into a [`FingerTable`].
///
/// Holds no state besides its configuration and the last key-press time, so
/// decoding the same report against the same table always yields the same
/// result.
#[derive(Debug, Clone, Copy)]
pub struct ReportDecoder {
    y_axis: YAxis,
    quiet_time: Duration,
    last_key_press: Option<Instant>,
}

impl ReportDecoder {
    pub fn new(y_axis: YAxis, quiet_time: Duration) -> Self {
        Self {
            y_axis,
            quiet_time,
            last_key_press: None,
        }
    }

    /// Records a key press from the keyboard; reports are suppressed for the
    /// quiet time that follows.
    pub fn note_key_press(&mut self, at: Instant) {
        self.last_key_press = Some(at);
    }

    /// True while `now` falls inside the quiet period after the last key press.
    pub fn in_quiet_period(&self, now: Instant) -> bool {
        if self.quiet_time == Duration::from_ticks(0) {
            return false;
        }
        match self.last_key_press {
            Some(pressed) => match now.checked_duration_since(pressed) {
                Some(elapsed) => elapsed < self.quiet_time,
                None => true,
            },
            None => false,
        }
    }

    /// Decodes `raw` into `slots`.
    ///
    /// The table is only written once the report has been accepted; ignored
    /// and invalid reports leave it untouched.
    pub fn decode(
        &self,
        raw: &RawReport,
        caps: &DeviceCapabilities,
        slots: &mut FingerTable,
        now: Instant,
    ) -> DecodeOutcome {
        let report_id = raw[REPORT_ID_OFFSET];
        if report_id == IDLE_SENTINEL {
            return DecodeOutcome::Ignored(IgnoreReason::IdleSentinel);
        }
        if report_id != REPORT_ID {
            return DecodeOutcome::InvalidReport(report_id);
        }
        if self.in_quiet_period(now) {
            return DecodeOutcome::Ignored(IgnoreReason::QuietPeriod);
        }

        let touch_info = raw[TOUCH_INFO_OFFSET];
        let button_down = touch_info & TOUCH_INFO_BUTTON_MASK != 0;
        let mut cursor = FINGER_DATA_OFFSET;
        let mut contact_count = 0;

        for i in 0..MAX_FINGERS {
            let slot = slots.slot_mut(i);
            if touch_info & (1 << (TOUCH_INFO_CONTACT_SHIFT + i)) == 0 {
                slot.lift();
                continue;
            }

            let record = &raw[cursor..cursor + FINGER_DATA_LEN];
            let (x, y) = unpack_position(record);
            let (touch_major, touch_minor) = contact_size(record[3], caps);

            slot.is_valid = true;
            slot.x = x;
            slot.y = match self.y_axis {
                YAxis::Inverted => caps.logical_max_y.saturating_sub(y),
                YAxis::Raw => y,
            };
            slot.button_down = button_down;
            slot.tip_switch = true;
            slot.pressure =
                (record[4] as i32 + caps.pressure_adjustment).clamp(0, MAX_PRESSURE) as u8;
            slot.touch_major = touch_major;
            slot.touch_minor = touch_minor;

            cursor += FINGER_DATA_LEN;
            contact_count += 1;
        }

        DecodeOutcome::Decoded(FrameSummary {
            contact_count,
            hovering: raw[HOVER_INFO_OFFSET] & HOVER_MASK != 0,
        })
    }
}

/// Extracts the 12-bit X and Y coordinates of a finger record.
pub fn unpack_position(record: &[u8]) -> (u16, u16) {
    let x = ((record[0] as u16 & 0xF0) << 4) | record[1] as u16;
    let y = ((record[0] as u16 & 0x0F) << 8) | record[2] as u16;
    (x, y)
}

fn contact_size(mk: u8, caps: &DeviceCapabilities) -> (u16, u16) {
    let area_x = (mk & 0x0F) as u32 * caps.width_per_trace_x;
    let area_y = (mk >> 4) as u32 * caps.width_per_trace_y;
    let major = area_x.max(area_y).min(u16::MAX as u32) as u16;
    let minor = area_x.min(area_y).min(u16::MAX as u32) as u16;
    (major, minor)
}
