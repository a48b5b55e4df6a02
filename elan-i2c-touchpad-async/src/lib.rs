//! An asynchronous, `no_std` driver for ELAN I2C touchpads.
//!
//! This driver brings an ELAN touchpad from power-on into absolute multi-touch
//! reporting mode, decodes its touch reports into a fixed table of finger
//! slots, and handles suspend and resume without tearing down an in-flight
//! report read.
//!
//! # Usage
//!
//! You need an I2C peripheral that implements `embedded-hal-async::i2c::I2c`,
//! a delay provider implementing `embedded-hal-async::delay::DelayNs`, and the
//! touchpad's interrupt line.
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use embassy_time::Delay;
//! use elan_i2c_touchpad_async::{I2cTransport, Touchpad, TouchpadConfig};
//!
//! type Pad = Touchpad<CriticalSectionRawMutex, I2cTransport<I2c<'static, Async>>, Delay>;
//!
//! #[esp_hal_embassy::main]
//! async fn main(spawner: Spawner) {
//!     let transport = I2cTransport::new(i2c);
//!     let touchpad = Touchpad::attach(transport, Delay, TouchpadConfig::default())
//!         .await
//!         .unwrap();
//!     let touchpad: &'static Pad = TOUCHPAD.init(touchpad);
//!
//!     spawner.spawn(watch_interrupt(touchpad, int_pin)).unwrap();
//!     spawner.spawn(worker(touchpad)).unwrap();
//! }
//!
//! #[embassy_executor::task]
//! async fn worker(touchpad: &'static Pad) {
//!     touchpad
//!         .run(&mut |event: &TouchEvent| log::info!("{} fingers", event.contact_count))
//!         .await
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod conf;
pub mod decoder;
mod driver;
pub mod err;
pub mod finger;
pub mod handshake;
pub mod power;
pub mod quirk;
pub mod reg;
pub mod serializer;
pub mod sink;
pub mod transport;

pub use conf::{ResumeMode, TouchpadConfig, YAxis};
pub use decoder::{DecodeOutcome, FrameSummary, IgnoreReason, RawReport, ReportDecoder};
pub use driver::Touchpad;
pub use err::{HandshakeError, HandshakeStep, PowerError, ReportError, Status};
pub use finger::{FingerSlot, FingerTable};
pub use handshake::DeviceCapabilities;
pub use power::PowerState;
pub use sink::{ChannelSink, TouchEvent, TouchSink};
pub use transport::{CommandTransport, I2cTransport};
