//! Delivery of decoded frames to the multi-touch consumer.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;

use crate::finger::FingerTable;

/// A fully decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub contact_count: u32,
    /// Snapshot of the finger table after the frame was applied.
    pub slots: FingerTable,
    pub hovering: bool,
    pub timestamp: Instant,
}

/// Consumer of decoded frames.
///
/// Called once per completed report cycle. There is no backpressure: the
/// driver publishes and moves on.
pub trait TouchSink {
    fn publish(&mut self, event: &TouchEvent);
}

impl<F: FnMut(&TouchEvent)> TouchSink for F {
    fn publish(&mut self, event: &TouchEvent) {
        self(event)
    }
}

/// [`TouchSink`] that queues frames on a bounded channel.
///
/// Frames that do not fit are dropped and logged.
pub struct ChannelSink<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, TouchEvent, N>,
    dropped: u32,
}

impl<'a, M: RawMutex, const N: usize> ChannelSink<'a, M, N> {
    pub fn new(channel: &'a Channel<M, TouchEvent, N>) -> Self {
        Self {
            channel,
            dropped: 0,
        }
    }

    /// Number of frames dropped because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<M: RawMutex, const N: usize> TouchSink for ChannelSink<'_, M, N> {
    fn publish(&mut self, event: &TouchEvent) {
        if self.channel.try_send(*event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            log::warn!("Touch event queue full, dropped {} frames", self.dropped);
        }
    }
}
