//! Device bring-up: reset, identify and configure.
//!
//! [`initialize`] drives the full sequence against a [`CommandTransport`] and
//! either returns the device's [`DeviceCapabilities`] or the first failure.

use embedded_hal_async::delay::DelayNs;

use crate::err::{HandshakeError, HandshakeStep, Status};
use crate::quirk::requires_alternate_ordering;
use crate::reg::*;
use crate::transport::CommandTransport;

const RESET_SETTLE_MS: u32 = 100;
const QUIRK_WAKE_SETTLE_MS: u32 = 200;

/// Identity and geometry of an initialized touchpad.
///
/// Built once per handshake and replaced wholesale on re-initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub product_id: u8,
    pub sm_version: u8,
    pub ic_type: u8,
    pub firmware_version: u8,
    pub firmware_checksum: u16,
    pub iap_version: u8,
    /// Largest reported X coordinate (12 bits).
    pub logical_max_x: u16,
    /// Largest reported Y coordinate (12 bits).
    pub logical_max_y: u16,
    pub x_trace_count: u8,
    pub y_trace_count: u8,
    /// Raw resolution nibble for X.
    pub hw_resolution_x: u8,
    /// Raw resolution nibble for Y.
    pub hw_resolution_y: u8,
    /// X resolution in dots per mm.
    pub resolution_dpmm_x: u32,
    /// Y resolution in dots per mm.
    pub resolution_dpmm_y: u32,
    /// Physical width in hundredths of a millimeter.
    pub physical_max_x: u32,
    /// Physical height in hundredths of a millimeter.
    pub physical_max_y: u32,
    /// Millimeters covered by one X trace.
    pub width_per_trace_x: u32,
    /// Millimeters covered by one Y trace.
    pub width_per_trace_y: u32,
    /// Offset added to every raw pressure sample.
    pub pressure_adjustment: i32,
    pub max_fingers: u8,
}

/// Raw register values collected during the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterDump {
    pub product_id: u8,
    pub sm_version: u8,
    pub ic_type: u8,
    pub firmware_version: u8,
    pub firmware_checksum: u16,
    pub iap_version: u8,
    pub pressure: u8,
    pub max_x: u16,
    pub max_y: u16,
    pub x_traces: u8,
    pub y_traces: u8,
    pub resolution: u8,
}

/// Converts a raw resolution nibble to dots per mm.
pub fn convert_resolution(raw: u8) -> u32 {
    (raw as u32 * 10 + 790) * 10 / 254
}

impl DeviceCapabilities {
    /// Validates a register dump and derives the physical geometry.
    pub fn from_registers(regs: &RegisterDump) -> Result<Self, HandshakeError> {
        if regs.x_traces == 0 || regs.y_traces == 0 {
            return Err(HandshakeError::InvalidTraceCount {
                x: regs.x_traces,
                y: regs.y_traces,
            });
        }

        let hw_resolution_x = regs.resolution & 0x0F;
        let hw_resolution_y = (regs.resolution & 0xF0) >> 4;
        let resolution_dpmm_x = convert_resolution(hw_resolution_x);
        let resolution_dpmm_y = convert_resolution(hw_resolution_y);
        if resolution_dpmm_x == 0 || resolution_dpmm_y == 0 {
            return Err(HandshakeError::InvalidHardwareResolution {
                x: hw_resolution_x,
                y: hw_resolution_y,
            });
        }

        let logical_max_x = regs.max_x & AXIS_MAX_MASK;
        let logical_max_y = regs.max_y & AXIS_MAX_MASK;
        let physical_max_x = logical_max_x as u32 * 100 / resolution_dpmm_x;
        let physical_max_y = logical_max_y as u32 * 100 / resolution_dpmm_y;

        let pressure_adjustment = if regs.pressure & PRESSURE_ABSOLUTE_MASK != 0 {
            0
        } else {
            PRESSURE_OFFSET
        };

        Ok(Self {
            product_id: regs.product_id,
            sm_version: regs.sm_version,
            ic_type: regs.ic_type,
            firmware_version: regs.firmware_version,
            firmware_checksum: regs.firmware_checksum,
            iap_version: regs.iap_version,
            logical_max_x,
            logical_max_y,
            x_trace_count: regs.x_traces,
            y_trace_count: regs.y_traces,
            hw_resolution_x,
            hw_resolution_y,
            resolution_dpmm_x,
            resolution_dpmm_y,
            physical_max_x,
            physical_max_y,
            width_per_trace_x: physical_max_x / regs.x_traces as u32 / 100,
            width_per_trace_y: physical_max_y / regs.y_traces as u32 / 100,
            pressure_adjustment,
            max_fingers: MAX_FINGERS as u8,
        })
    }
}

fn failed_at(step: HandshakeStep) -> impl FnOnce(Status) -> HandshakeError {
    move |status| {
        log::warn!("Handshake failed at {step:?}: {status:?}");
        HandshakeError::Transport { step, status }
    }
}

/// Resets the touchpad and brings it into absolute reporting mode.
///
/// Every step is a blocking transport call; the first failing step aborts the
/// sequence and is named in the returned error.
pub async fn initialize<T: CommandTransport, D: DelayNs>(
    transport: &mut T,
    delay: &mut D,
) -> Result<DeviceCapabilities, HandshakeError> {
    log::trace!("elan::init reset");
    transport
        .write_cmd(STAND_CMD, RESET)
        .await
        .map_err(failed_at(HandshakeStep::Reset))?;
    delay.delay_ms(RESET_SETTLE_MS).await;

    let mut ack = [0u8; INF_LENGTH];
    transport
        .read(&mut ack)
        .await
        .map_err(failed_at(HandshakeStep::ResetAck))?;
    log::trace!("elan::init reset acknowledged: {ack:02x?}");

    let mut desc = [0u8; DESC_LENGTH];
    transport
        .write_read(DESC_CMD, &[], &mut desc)
        .await
        .map_err(failed_at(HandshakeStep::DeviceDescriptor))?;

    let mut report_desc = [0u8; REPORT_DESC_LENGTH];
    transport
        .write_read(REPORT_DESC_CMD, &[], &mut report_desc)
        .await
        .map_err(failed_at(HandshakeStep::ReportDescriptor))?;

    let mut regs = RegisterDump::default();

    let val = transport
        .read_cmd(UNIQUEID_CMD)
        .await
        .map_err(failed_at(HandshakeStep::ProductId))?;
    regs.product_id = val[0];

    let val = transport
        .read_cmd(SM_VERSION_CMD)
        .await
        .map_err(failed_at(HandshakeStep::IcType))?;
    regs.sm_version = val[0];
    regs.ic_type = val[1];

    if requires_alternate_ordering(regs.product_id, regs.ic_type) {
        log::info!(
            "Quirky ASUS firmware detected (product {:#04x}, ic {:#04x}), waking before enable",
            regs.product_id,
            regs.ic_type
        );
        transport
            .write_cmd(STAND_CMD, WAKE_UP)
            .await
            .map_err(failed_at(HandshakeStep::WakeUp))?;
        delay.delay_ms(QUIRK_WAKE_SETTLE_MS).await;
        transport
            .write_cmd(SET_CMD, ENABLE_ABS)
            .await
            .map_err(failed_at(HandshakeStep::EnableAbsolute))?;
    } else {
        transport
            .write_cmd(SET_CMD, ENABLE_ABS)
            .await
            .map_err(failed_at(HandshakeStep::EnableAbsolute))?;
        transport
            .write_cmd(STAND_CMD, WAKE_UP)
            .await
            .map_err(failed_at(HandshakeStep::WakeUp))?;
    }

    let val = transport
        .read_cmd(FW_VERSION_CMD)
        .await
        .map_err(failed_at(HandshakeStep::FirmwareVersion))?;
    regs.firmware_version = val[0];

    let val = transport
        .read_cmd(FW_CHECKSUM_CMD)
        .await
        .map_err(failed_at(HandshakeStep::FirmwareChecksum))?;
    regs.firmware_checksum = u16::from_le_bytes(val);

    let val = transport
        .read_cmd(IAP_VERSION_CMD)
        .await
        .map_err(failed_at(HandshakeStep::IapVersion))?;
    regs.iap_version = val[0];

    let val = transport
        .read_cmd(PRESSURE_CMD)
        .await
        .map_err(failed_at(HandshakeStep::Pressure))?;
    regs.pressure = val[0];

    let val = transport
        .read_cmd(MAX_X_AXIS_CMD)
        .await
        .map_err(failed_at(HandshakeStep::MaxX))?;
    regs.max_x = u16::from_le_bytes(val);

    let val = transport
        .read_cmd(MAX_Y_AXIS_CMD)
        .await
        .map_err(failed_at(HandshakeStep::MaxY))?;
    regs.max_y = u16::from_le_bytes(val);

    let val = transport
        .read_cmd(XY_TRACENUM_CMD)
        .await
        .map_err(failed_at(HandshakeStep::TraceCount))?;
    regs.x_traces = val[0];
    regs.y_traces = val[1];

    let val = transport
        .read_cmd(RESOLUTION_CMD)
        .await
        .map_err(failed_at(HandshakeStep::Resolution))?;
    regs.resolution = val[0];

    let caps = DeviceCapabilities::from_registers(&regs).map_err(|err| {
        log::warn!("Rejecting device geometry: {err:?}");
        err
    })?;

    log::info!(
        "ELAN product {:#04x} fw {} csum {:#06x} sm {} ic {:#04x} iap {} max {}x{} traces {}x{}",
        caps.product_id,
        caps.firmware_version,
        caps.firmware_checksum,
        caps.sm_version,
        caps.ic_type,
        caps.iap_version,
        caps.logical_max_x,
        caps.logical_max_y,
        caps.x_trace_count,
        caps.y_trace_count
    );

    Ok(caps)
}
