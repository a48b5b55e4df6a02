//! Suspend and resume.
//!
//! Suspending first clears the awake flag, which stops the interrupt gate
//! from admitting new cycles, then waits for any admitted cycle to publish
//! before the device is put to sleep.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::conf::ResumeMode;
use crate::driver::Touchpad;
use crate::err::{HandshakeError, HandshakeStep, PowerError};
use crate::handshake;
use crate::reg::{SLEEP, STAND_CMD, WAKE_UP};
use crate::transport::CommandTransport;

/// Power state of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Awake,
    /// No new cycles are admitted; waiting for the in-flight one.
    Suspending,
    Asleep,
    /// Re-initializing the device.
    Resuming,
}

impl PowerState {
    pub fn is_awake(self) -> bool {
        self == PowerState::Awake
    }
}

impl<M, T, D> Touchpad<M, T, D>
where
    M: RawMutex,
    T: CommandTransport,
    D: DelayNs + Clone,
{
    /// Puts the device to sleep.
    ///
    /// Returns once no fetch cycle is running and the sleep command has been
    /// sent. A failed sleep command is logged; the driver still ends up
    /// `Asleep`. Suspending an asleep device is a no-op.
    pub async fn suspend(&self) -> Result<(), PowerError> {
        let start = self.with_state(|s| match s.power {
            PowerState::Awake => {
                s.power = PowerState::Suspending;
                Ok(true)
            }
            PowerState::Asleep => Ok(false),
            other => Err(PowerError::InvalidState(other)),
        })?;
        if !start {
            log::debug!("elan::suspend already asleep");
            return Ok(());
        }

        let mut delay = self.delay.clone();
        while self.with_state(|s| s.serializer.drain_in_progress()) {
            log::trace!("elan::suspend waiting for report cycle to drain");
            delay.delay_ms(self.config.drain_poll_interval_ms).await;
        }

        if let Err(status) = self.bus.lock().await.write_cmd(STAND_CMD, SLEEP).await {
            log::warn!("Failed to send sleep command: {status:?}");
        }

        self.with_state(|s| s.power = PowerState::Asleep);
        log::info!("elan: asleep");
        Ok(())
    }

    /// Wakes the device up.
    ///
    /// On failure the driver stays `Asleep` and the resume can be retried.
    /// Resuming an awake device is a no-op.
    pub async fn resume(&self) -> Result<(), PowerError> {
        let start = self.with_state(|s| match s.power {
            PowerState::Asleep => {
                s.power = PowerState::Resuming;
                Ok(true)
            }
            PowerState::Awake => Ok(false),
            other => Err(PowerError::InvalidState(other)),
        })?;
        if !start {
            log::debug!("elan::resume already awake");
            return Ok(());
        }

        let result = self.reinitialize().await;
        self.with_state(|s| {
            s.power = match result {
                Ok(()) => PowerState::Awake,
                Err(_) => PowerState::Asleep,
            }
        });

        match result {
            Ok(()) => {
                self.released.signal(());
                log::info!("elan: awake");
            }
            Err(err) => log::error!("Failed to resume touchpad: {err:?}"),
        }
        result
    }

    async fn reinitialize(&self) -> Result<(), PowerError> {
        let mut bus = self.bus.lock().await;
        match self.config.resume_mode {
            ResumeMode::Handshake => {
                let mut delay = self.delay.clone();
                let caps = handshake::initialize(&mut *bus, &mut delay).await?;
                self.with_state(|s| {
                    s.caps = caps;
                    s.slots.reset();
                });
            }
            ResumeMode::WakeCommand => {
                bus.write_cmd(STAND_CMD, WAKE_UP).await.map_err(|status| {
                    HandshakeError::Transport {
                        step: HandshakeStep::WakeUp,
                        status,
                    }
                })?;
            }
        }
        Ok(())
    }
}
