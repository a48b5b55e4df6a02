//! ELAN I2C register map, command words and fixed transfer lengths.
//!
//! Register ids and command words are sent little-endian, two bytes each.

// --- Command registers ---
/// Device descriptor.
pub const DESC_CMD: u16 = 0x0001;
/// HID report descriptor.
pub const REPORT_DESC_CMD: u16 = 0x0002;
/// Standby control: reset, wake up and sleep are written here.
pub const STAND_CMD: u16 = 0x0005;
/// Unique id, the first byte is the product id.
pub const UNIQUEID_CMD: u16 = 0x0101;
/// Firmware version.
pub const FW_VERSION_CMD: u16 = 0x0102;
/// SM version (byte 0) and IC type (byte 1).
pub const SM_VERSION_CMD: u16 = 0x0103;
/// X and Y trace counts.
pub const XY_TRACENUM_CMD: u16 = 0x0105;
/// Logical maximum of the X axis.
pub const MAX_X_AXIS_CMD: u16 = 0x0106;
/// Logical maximum of the Y axis.
pub const MAX_Y_AXIS_CMD: u16 = 0x0107;
/// Raw resolution nibbles.
pub const RESOLUTION_CMD: u16 = 0x0108;
/// Pressure capability byte.
pub const PRESSURE_CMD: u16 = 0x010A;
/// In-application-programming version.
pub const IAP_VERSION_CMD: u16 = 0x0110;
/// Report mode selection.
pub const SET_CMD: u16 = 0x0300;
/// Power control.
pub const POWER_CMD: u16 = 0x0307;
/// Firmware checksum.
pub const FW_CHECKSUM_CMD: u16 = 0x030F;

// --- Command words ---
pub const RESET: u16 = 0x0100;
pub const WAKE_UP: u16 = 0x0800;
pub const SLEEP: u16 = 0x0801;
pub const ENABLE_ABS: u16 = 0x0001;

// --- Transfer lengths ---
/// Length of every command-register response.
pub const INF_LENGTH: usize = 2;
pub const DESC_LENGTH: usize = 30;
pub const REPORT_DESC_LENGTH: usize = 158;

// --- Report layout ---
pub const MAX_REPORT_LEN: usize = 34;
pub const REPORT_ID: u8 = 0x5D;
pub const REPORT_ID_OFFSET: usize = 2;
pub const TOUCH_INFO_OFFSET: usize = 3;
pub const FINGER_DATA_OFFSET: usize = 4;
pub const HOVER_INFO_OFFSET: usize = 30;
pub const FINGER_DATA_LEN: usize = 5;
pub const MAX_FINGERS: usize = 5;

/// Report id byte of an idle frame.
pub const IDLE_SENTINEL: u8 = 0xFF;

// --- Bitmasks ---
pub const AXIS_MAX_MASK: u16 = 0x0FFF;
pub const TOUCH_INFO_BUTTON_MASK: u8 = 0b0000_0001;
/// Bit of finger 0's contact flag; finger `i` uses `TOUCH_INFO_CONTACT_SHIFT + i`.
pub const TOUCH_INFO_CONTACT_SHIFT: usize = 3;
pub const HOVER_MASK: u8 = 0b0100_0000;
/// Set when the device reports pressure without the fixed offset.
pub const PRESSURE_ABSOLUTE_MASK: u8 = 0b0001_0000;

/// Offset added to raw pressure when the device reports relative pressure.
pub const PRESSURE_OFFSET: i32 = 25;
pub const MAX_PRESSURE: i32 = 255;
