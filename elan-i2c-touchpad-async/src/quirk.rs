//! Firmware quirks that change the bring-up command order.

const IC_TYPE_ASUS_0E: u8 = 0x0E;
const IC_TYPE_ASUS_08: u8 = 0x08;

/// Returns true for ASUS firmware that must be woken up before absolute
/// reporting is enabled.
///
/// Standard firmware expects `ENABLE_ABS` followed by `WAKE_UP`; the
/// affected parts only accept the enable command after a wake-up and an
/// extra settle delay.
pub fn requires_alternate_ordering(product_id: u8, ic_type: u8) -> bool {
    match ic_type {
        IC_TYPE_ASUS_0E => matches!(product_id, 0x05..=0x07 | 0x09 | 0x13),
        IC_TYPE_ASUS_08 => product_id == 0x26,
        _ => false,
    }
}
