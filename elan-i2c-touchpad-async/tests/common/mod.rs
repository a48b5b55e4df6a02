#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use elan_i2c_touchpad_async::reg::*;
use elan_i2c_touchpad_async::{CommandTransport, RawReport, Status};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// One bus transaction as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write(u16, Vec<u8>),
    WriteRead(u16, usize),
    Read(usize),
}

impl Op {
    pub fn cmd(register: u16, cmd: u16) -> Self {
        Op::Write(register, cmd.to_le_bytes().to_vec())
    }
}

#[derive(Default)]
struct MockState {
    log: Vec<Op>,
    registers: HashMap<u16, [u8; INF_LENGTH]>,
    reports: VecDeque<RawReport>,
    write_failures: Vec<(u16, u16, Status)>,
    read_failures: Vec<(u16, Status)>,
    report_failure: Option<Status>,
    report_stall: usize,
}

/// Scripted touchpad. Clones share state so a test can keep a handle after
/// moving one into the driver.
#[derive(Clone)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    /// A well-behaved standard (non-quirky) touchpad.
    pub fn standard() -> Self {
        let mock = Self {
            state: Rc::new(RefCell::new(MockState::default())),
        };
        mock.set_register(UNIQUEID_CMD, [0x2A, 0x00]);
        mock.set_register(SM_VERSION_CMD, [0x03, 0x0D]);
        mock.set_register(FW_VERSION_CMD, [0x11, 0x00]);
        mock.set_register(FW_CHECKSUM_CMD, [0x34, 0x12]);
        mock.set_register(IAP_VERSION_CMD, [0x07, 0x00]);
        mock.set_register(PRESSURE_CMD, [0x10, 0x00]);
        mock.set_register(MAX_X_AXIS_CMD, 3100u16.to_le_bytes());
        mock.set_register(MAX_Y_AXIS_CMD, (0xF000u16 | 1860).to_le_bytes());
        mock.set_register(XY_TRACENUM_CMD, [31, 20]);
        mock.set_register(RESOLUTION_CMD, [0x22, 0x00]);
        mock
    }

    pub fn set_register(&self, register: u16, value: [u8; INF_LENGTH]) {
        self.state.borrow_mut().registers.insert(register, value);
    }

    pub fn fail_write(&self, register: u16, cmd: u16, status: Status) {
        self.state
            .borrow_mut()
            .write_failures
            .push((register, cmd, status));
    }

    pub fn fail_read(&self, register: u16, status: Status) {
        self.state.borrow_mut().read_failures.push((register, status));
    }

    pub fn fail_reports(&self, status: Option<Status>) {
        self.state.borrow_mut().report_failure = status;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.write_failures.clear();
        state.read_failures.clear();
        state.report_failure = None;
    }

    pub fn push_report(&self, report: RawReport) {
        self.state.borrow_mut().reports.push_back(report);
    }

    /// Makes every report read yield `polls` times before completing.
    pub fn stall_reports(&self, polls: usize) {
        self.state.borrow_mut().report_stall = polls;
    }

    pub fn log(&self) -> Vec<Op> {
        self.state.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    pub fn position(&self, op: &Op) -> Option<usize> {
        self.state.borrow().log.iter().position(|o| o == op)
    }

    pub fn pending_reports(&self) -> usize {
        self.state.borrow().reports.len()
    }

    /// The device's interrupt line: held low while any report is queued.
    pub fn interrupt_line(&self) -> InterruptLine {
        InterruptLine {
            state: self.state.clone(),
        }
    }
}

/// Level-triggered interrupt pin backed by the mock's report queue.
pub struct InterruptLine {
    state: Rc<RefCell<MockState>>,
}

impl InterruptLine {
    fn is_low(&self) -> bool {
        !self.state.borrow().reports.is_empty()
    }
}

impl embedded_hal::digital::ErrorType for InterruptLine {
    type Error = Infallible;
}

impl Wait for InterruptLine {
    async fn wait_for_high(&mut self) -> Result<(), Infallible> {
        while self.is_low() {
            embassy_futures::yield_now().await;
        }
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Infallible> {
        while !self.is_low() {
            embassy_futures::yield_now().await;
        }
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
        self.wait_for_low().await?;
        self.wait_for_high().await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
        self.wait_for_high().await?;
        self.wait_for_low().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
        if self.is_low() {
            self.wait_for_high().await
        } else {
            self.wait_for_low().await
        }
    }
}

impl CommandTransport for MockTransport {
    async fn write(&mut self, register: u16, payload: &[u8]) -> Result<(), Status> {
        let mut state = self.state.borrow_mut();
        state.log.push(Op::Write(register, payload.to_vec()));
        let cmd = u16::from_le_bytes([payload[0], payload[1]]);
        match state
            .write_failures
            .iter()
            .find(|(r, c, _)| *r == register && *c == cmd)
        {
            Some((_, _, status)) => Err(*status),
            None => Ok(()),
        }
    }

    async fn write_read(
        &mut self,
        register: u16,
        _payload: &[u8],
        response: &mut [u8],
    ) -> Result<(), Status> {
        let mut state = self.state.borrow_mut();
        state.log.push(Op::WriteRead(register, response.len()));
        if let Some((_, status)) = state.read_failures.iter().find(|(r, _)| *r == register) {
            return Err(*status);
        }
        match state.registers.get(&register) {
            Some(value) if response.len() == INF_LENGTH => response.copy_from_slice(value),
            _ => response.fill(0),
        }
        Ok(())
    }

    async fn read(&mut self, response: &mut [u8]) -> Result<(), Status> {
        self.state.borrow_mut().log.push(Op::Read(response.len()));
        if response.len() != MAX_REPORT_LEN {
            response.fill(0);
            return Ok(());
        }

        let stall = self.state.borrow().report_stall;
        for _ in 0..stall {
            embassy_futures::yield_now().await;
        }

        let mut state = self.state.borrow_mut();
        if let Some(status) = state.report_failure {
            return Err(status);
        }
        let report = state.reports.pop_front().unwrap_or([0xFF; MAX_REPORT_LEN]);
        response.copy_from_slice(&report);
        Ok(())
    }
}

/// Delay that completes after one yield and records the requested time.
#[derive(Clone, Default)]
pub struct MockDelay {
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
        embassy_futures::yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ns
            .set(self.total_ns.get() + ms as u64 * 1_000_000);
        embassy_futures::yield_now().await;
    }
}

pub fn pack(x: u16, y: u16) -> [u8; FINGER_DATA_LEN] {
    [
        (((x >> 8) as u8) << 4) | (y >> 8) as u8,
        x as u8,
        y as u8,
        0,
        0,
    ]
}

pub fn report(touch_info: u8, fingers: &[[u8; FINGER_DATA_LEN]]) -> RawReport {
    let mut raw = [0u8; MAX_REPORT_LEN];
    raw[REPORT_ID_OFFSET] = REPORT_ID;
    raw[TOUCH_INFO_OFFSET] = touch_info;
    for (i, finger) in fingers.iter().enumerate() {
        let start = FINGER_DATA_OFFSET + i * FINGER_DATA_LEN;
        raw[start..start + FINGER_DATA_LEN].copy_from_slice(finger);
    }
    raw
}
