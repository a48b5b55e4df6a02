//! Error types for the ELAN touchpad driver.

use core::fmt;

use embedded_hal_async::i2c::ErrorKind;

/// Failure status of a single transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The request could not be encoded (e.g. payload too long).
    BadArgument,
    /// The bus aborted the transaction.
    Aborted,
    /// Bus arbitration was lost to another controller.
    CannotLock,
    /// The transfer was refused mid-flight (data overrun).
    NotPermitted,
    /// The device did not acknowledge its address or a data byte.
    NoAcknowledge,
    /// The transaction did not complete within the configured timeout.
    Timeout,
    /// Any other bus failure.
    Other,
}

impl From<ErrorKind> for Status {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Bus => Status::Aborted,
            ErrorKind::ArbitrationLoss => Status::CannotLock,
            ErrorKind::NoAcknowledge(_) => Status::NoAcknowledge,
            ErrorKind::Overrun => Status::NotPermitted,
            _ => Status::Other,
        }
    }
}

/// The handshake step that was running when a transport call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    Reset,
    ResetAck,
    DeviceDescriptor,
    ReportDescriptor,
    ProductId,
    IcType,
    WakeUp,
    EnableAbsolute,
    FirmwareVersion,
    FirmwareChecksum,
    IapVersion,
    Pressure,
    MaxX,
    MaxY,
    TraceCount,
    Resolution,
}

/// Errors returned by the device handshake.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HandshakeError {
    /// A transport call failed; the sequence was aborted at `step`.
    Transport { step: HandshakeStep, status: Status },
    /// The device reported zero X or Y traces.
    InvalidTraceCount { x: u8, y: u8 },
    /// The converted hardware resolution was zero.
    InvalidHardwareResolution { x: u8, y: u8 },
}

impl fmt::Debug for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { step, status } => write!(f, "Transport({step:?}: {status:?})"),
            Self::InvalidTraceCount { x, y } => write!(f, "InvalidTraceCount(x={x}, y={y})"),
            Self::InvalidHardwareResolution { x, y } => {
                write!(f, "InvalidHardwareResolution(x={x}, y={y})")
            }
        }
    }
}

/// Errors returned by a report fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// Fetching the report failed.
    Transport(Status),
    /// The report carried an unexpected report id.
    InvalidReport(u8),
}

impl From<Status> for ReportError {
    fn from(status: Status) -> Self {
        ReportError::Transport(status)
    }
}

/// Errors returned by power transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    /// The requested transition is not valid from the current state.
    InvalidState(crate::power::PowerState),
    /// Re-initializing the device during resume failed; it stays asleep.
    Resume(HandshakeError),
}

impl From<HandshakeError> for PowerError {
    fn from(err: HandshakeError) -> Self {
        PowerError::Resume(err)
    }
}
