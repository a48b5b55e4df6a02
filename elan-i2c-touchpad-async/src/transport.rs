//! Register-addressed command transport.
//!
//! The driver only talks to the device through [`CommandTransport`]. The
//! provided [`I2cTransport`] implements it on top of any
//! `embedded-hal-async` I2C bus.

use embassy_time::{with_timeout, Duration};
use embedded_hal_async::i2c::{Error, I2c, SevenBitAddress};
use heapless::Vec;

use crate::err::Status;
use crate::reg::INF_LENGTH;

/// Default 7-bit address of ELAN touchpads.
pub const DEFAULT_ADDRESS: u8 = 0x15;

const DEFAULT_TIMEOUT_MS: u64 = 100;
const MAX_FRAME_LEN: usize = 8;

/// Synchronous request/response primitive over a register-addressed bus.
#[allow(async_fn_in_trait)]
pub trait CommandTransport {
    /// Writes `payload` to `register`.
    async fn write(&mut self, register: u16, payload: &[u8]) -> Result<(), Status>;

    /// Writes `register` followed by `payload`, then reads `response.len()` bytes.
    async fn write_read(
        &mut self,
        register: u16,
        payload: &[u8],
        response: &mut [u8],
    ) -> Result<(), Status>;

    /// Reads `response.len()` bytes without addressing a register.
    async fn read(&mut self, response: &mut [u8]) -> Result<(), Status>;

    /// Writes a 16-bit command word to `register`.
    async fn write_cmd(&mut self, register: u16, cmd: u16) -> Result<(), Status> {
        self.write(register, &cmd.to_le_bytes()).await
    }

    /// Reads the two-byte response of a command register.
    async fn read_cmd(&mut self, register: u16) -> Result<[u8; INF_LENGTH], Status> {
        let mut val = [0u8; INF_LENGTH];
        self.write_read(register, &[], &mut val).await?;
        Ok(val)
    }
}

/// [`CommandTransport`] over an `embedded-hal-async` I2C bus.
///
/// Every transaction is bounded by a timeout so a stuck bus surfaces as
/// [`Status::Timeout`] instead of blocking the caller forever.
pub struct I2cTransport<I2cType> {
    i2c: I2cType,
    address: SevenBitAddress,
    timeout: Duration,
}

impl<I2cType: I2c<SevenBitAddress>> I2cTransport<I2cType> {
    /// Creates a transport for a touchpad at [`DEFAULT_ADDRESS`].
    pub fn new(i2c: I2cType) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Creates a transport for a touchpad at `address`.
    pub fn with_address(i2c: I2cType, address: SevenBitAddress) -> Self {
        Self {
            i2c,
            address,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Sets the per-transaction timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I2cType {
        self.i2c
    }

    fn frame(register: u16, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_LEN>, Status> {
        let mut frame = Vec::new();
        frame
            .extend_from_slice(&register.to_le_bytes())
            .map_err(|_| Status::BadArgument)?;
        frame
            .extend_from_slice(payload)
            .map_err(|_| Status::BadArgument)?;
        Ok(frame)
    }
}

fn timed_out(register: u16) -> Status {
    log::warn!("Timeout accessing register {register:#06x}");
    Status::Timeout
}

impl<I2cType: I2c<SevenBitAddress>> CommandTransport for I2cTransport<I2cType> {
    async fn write(&mut self, register: u16, payload: &[u8]) -> Result<(), Status> {
        let frame = Self::frame(register, payload)?;
        with_timeout(self.timeout, self.i2c.write(self.address, &frame))
            .await
            .map_err(|_| timed_out(register))?
            .map_err(|err| {
                log::warn!("Error writing register {register:#06x}: {err:?}");
                Status::from(err.kind())
            })
    }

    async fn write_read(
        &mut self,
        register: u16,
        payload: &[u8],
        response: &mut [u8],
    ) -> Result<(), Status> {
        let frame = Self::frame(register, payload)?;
        with_timeout(
            self.timeout,
            self.i2c.write_read(self.address, &frame, response),
        )
        .await
        .map_err(|_| timed_out(register))?
        .map_err(|err| {
            log::warn!("Error reading register {register:#06x}: {err:?}");
            Status::from(err.kind())
        })
    }

    async fn read(&mut self, response: &mut [u8]) -> Result<(), Status> {
        let len = response.len();
        with_timeout(self.timeout, self.i2c.read(self.address, response))
            .await
            .map_err(|_| {
                log::warn!("Timeout reading {len} bytes");
                Status::Timeout
            })?
            .map_err(|err| {
                log::warn!("Error reading {len} bytes: {err:?}");
                Status::from(err.kind())
            })
    }
}
