//! The touchpad driver instance.

use core::cell::RefCell;

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

use crate::conf::TouchpadConfig;
use crate::decoder::{DecodeOutcome, IgnoreReason, RawReport, ReportDecoder};
use crate::err::{HandshakeError, ReportError};
use crate::finger::FingerTable;
use crate::handshake::{self, DeviceCapabilities};
use crate::power::PowerState;
use crate::reg::MAX_REPORT_LEN;
use crate::serializer::{Admission, InterruptSerializer};
use crate::sink::{TouchEvent, TouchSink};
use crate::transport::CommandTransport;

/// State shared between the interrupt path, the worker and power transitions.
pub(crate) struct DriverState {
    pub(crate) caps: DeviceCapabilities,
    pub(crate) slots: FingerTable,
    pub(crate) decoder: ReportDecoder,
    pub(crate) serializer: InterruptSerializer,
    pub(crate) power: PowerState,
    pub(crate) online: bool,
}

/// Releases the interrupt gate when a fetch cycle ends, including when the
/// cycle's future is dropped mid-read.
struct CycleGuard<'a, M: RawMutex> {
    state: &'a BlockingMutex<M, RefCell<DriverState>>,
    released: &'a Signal<M, ()>,
}

impl<M: RawMutex> Drop for CycleGuard<'_, M> {
    fn drop(&mut self) {
        self.state.lock(|cell| cell.borrow_mut().serializer.finish());
        self.released.signal(());
    }
}

/// An initialized ELAN I2C touchpad.
///
/// The driver is shared by reference between an interrupt watcher
/// ([`Touchpad::watch_interrupt_line`] or direct calls to
/// [`Touchpad::interrupt_occurred`]), one worker running [`Touchpad::run`], and
/// whoever drives [`Touchpad::suspend`] / [`Touchpad::resume`].
pub struct Touchpad<M: RawMutex, T, D> {
    pub(crate) bus: Mutex<M, T>,
    pub(crate) delay: D,
    pub(crate) config: TouchpadConfig,
    state: BlockingMutex<M, RefCell<DriverState>>,
    pending: Signal<M, ()>,
    /// Raised whenever the gate may admit again: a cycle ended or the
    /// device woke up.
    pub(crate) released: Signal<M, ()>,
}

impl<M, T, D> Touchpad<M, T, D>
where
    M: RawMutex,
    T: CommandTransport,
    D: DelayNs + Clone,
{
    /// Runs the handshake and brings the driver online.
    ///
    /// A device that fails the handshake is never brought online.
    pub async fn attach(
        mut transport: T,
        mut delay: D,
        config: TouchpadConfig,
    ) -> Result<Self, HandshakeError> {
        let caps = handshake::initialize(&mut transport, &mut delay).await?;
        let state = DriverState {
            caps,
            slots: FingerTable::new(),
            decoder: ReportDecoder::new(config.y_axis, config.quiet_time()),
            serializer: InterruptSerializer::new(),
            power: PowerState::Awake,
            online: true,
        };
        log::debug!("elan: attached, product {:#04x}", caps.product_id);
        Ok(Self {
            bus: Mutex::new(transport),
            delay,
            config,
            state: BlockingMutex::new(RefCell::new(state)),
            pending: Signal::new(),
            released: Signal::new(),
        })
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut DriverState) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.with_state(|s| s.caps)
    }

    pub fn power_state(&self) -> PowerState {
        self.with_state(|s| s.power)
    }

    /// Copy of the finger table as of the last completed cycle.
    pub fn slots(&self) -> FingerTable {
        self.with_state(|s| s.slots)
    }

    pub fn is_online(&self) -> bool {
        self.with_state(|s| s.online)
    }

    /// True while an admitted fetch cycle has not finished publishing.
    pub fn drain_in_progress(&self) -> bool {
        self.with_state(|s| s.serializer.drain_in_progress())
    }

    /// Number of fetch cycles admitted since attach.
    pub fn admitted_cycles(&self) -> u32 {
        self.with_state(|s| s.serializer.admitted())
    }

    /// Number of interrupts dropped because a cycle was already in flight.
    pub fn coalesced_interrupts(&self) -> u32 {
        self.with_state(|s| s.serializer.coalesced())
    }

    /// Records a key press; touch reports are dropped for the configured
    /// quiet time after it.
    pub fn note_key_press(&self, at: Instant) {
        self.with_state(|s| s.decoder.note_key_press(at));
    }

    /// Takes the driver offline and clears the finger table.
    ///
    /// A cycle already reading a report finishes without decoding or
    /// publishing it.
    pub fn stop(&self) {
        self.with_state(|s| {
            s.online = false;
            s.slots.reset();
        });
        log::info!("elan: stopped");
    }

    fn try_admit(&self) -> Admission {
        self.with_state(|s| {
            let accepting = s.online && s.power.is_awake();
            s.serializer.try_admit(accepting)
        })
    }

    fn admit(&self) -> Admission {
        let admission = self.try_admit();
        match admission {
            Admission::Admitted => self.pending.signal(()),
            Admission::Busy => log::trace!("elan: interrupt coalesced"),
            Admission::Refused => log::trace!("elan: interrupt while not accepting input"),
        }
        admission
    }

    /// Interrupt entry point.
    ///
    /// Reserves a fetch cycle and wakes the worker. Never blocks; returns
    /// whether a cycle was admitted.
    pub fn interrupt_occurred(&self) -> bool {
        self.admit() == Admission::Admitted
    }

    /// Admits and runs one cycle directly, for callers that poll instead of
    /// running a worker. Returns `None` if no cycle could be admitted.
    pub async fn poll<S: TouchSink>(
        &self,
        sink: &mut S,
    ) -> Option<Result<DecodeOutcome, ReportError>> {
        match self.try_admit() {
            Admission::Admitted => Some(self.fetch_cycle(sink).await),
            _ => None,
        }
    }

    /// Worker loop: runs one cycle per admitted interrupt.
    pub async fn run<S: TouchSink>(&self, sink: &mut S) -> ! {
        loop {
            self.pending.wait().await;
            if let Err(err) = self.fetch_cycle(sink).await {
                log::warn!("Error handling touch report: {err:?}");
            }
        }
    }

    /// Feeds admissions from the device's active-low interrupt line.
    ///
    /// The line is level-triggered: the device holds it low for as long as a
    /// report is pending. The level is sampled again every time the gate is
    /// released, so a report that arrived during a cycle is still fetched.
    pub async fn watch_interrupt_line<P: Wait>(&self, int: &mut P) -> ! {
        loop {
            if let Err(err) = int.wait_for_low().await {
                log::warn!("Error waiting for touchpad interrupt: {err:?}");
                continue;
            }
            self.released.reset();
            match self.admit() {
                Admission::Admitted | Admission::Busy => self.released.wait().await,
                Admission::Refused => {
                    select(self.released.wait(), int.wait_for_high()).await;
                }
            }
        }
    }

    /// Runs an admitted cycle and releases the gate, whatever the outcome.
    async fn fetch_cycle<S: TouchSink>(&self, sink: &mut S) -> Result<DecodeOutcome, ReportError> {
        let _release = CycleGuard {
            state: &self.state,
            released: &self.released,
        };
        self.fetch_and_publish(sink).await
    }

    async fn fetch_and_publish<S: TouchSink>(
        &self,
        sink: &mut S,
    ) -> Result<DecodeOutcome, ReportError> {
        let mut raw: RawReport = [0u8; MAX_REPORT_LEN];
        self.bus.lock().await.read(&mut raw).await?;

        let now = Instant::now();
        let (outcome, event) = self.with_state(|s| {
            if !s.online {
                return (DecodeOutcome::Ignored(IgnoreReason::Offline), None);
            }
            let outcome = s.decoder.decode(&raw, &s.caps, &mut s.slots, now);
            let event = match outcome {
                DecodeOutcome::Decoded(summary) => Some(TouchEvent {
                    contact_count: summary.contact_count,
                    slots: s.slots,
                    hovering: summary.hovering,
                    timestamp: now,
                }),
                _ => None,
            };
            (outcome, event)
        });

        match outcome {
            DecodeOutcome::Decoded(_) => {}
            DecodeOutcome::Ignored(reason) => log::trace!("elan: report ignored ({reason:?})"),
            DecodeOutcome::InvalidReport(id) => {
                log::warn!("Unexpected report id {id:#04x}");
                return Err(ReportError::InvalidReport(id));
            }
        }

        if let Some(event) = event {
            sink.publish(&event);
        }
        Ok(outcome)
    }
}
