//! Interval timer handle
//!
//! An [`IntervalTimer`] is either `Off` or `Running` on exactly one physical
//! timer. [`begin`](IntervalTimer::begin) is the only way into `Running`;
//! [`end`](IntervalTimer::end), a failed re-`begin` and dropping the handle
//! all lead back to `Off` with the peripheral stopped and reset, the
//! interrupt line disabled and the slot returned to the registry.

use itimer_hal::{ClockGate, InterruptController, TimeBase, TimerPeripheral};
use log::{debug, warn};

use crate::board::Board;
use crate::config::{Interval, Scale};
use crate::dispatch::Callback;
use crate::registry::{registry, Registry};
use crate::slot::{Slot, SlotRequest};
use crate::{SitError, SitResult};

/// Lifecycle state of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Off,
    /// Owns the slot; peripheral counting, interrupt routed
    Running(Slot),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Status::Off => defmt::write!(fmt, "Off"),
            Status::Running(slot) => defmt::write!(fmt, "Running({})", slot),
        }
    }
}

/// Interrupt line action for [`IntervalTimer::set_interrupt_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    Enable,
    Disable,
}

/// One logical periodic timer.
///
/// The callback runs in interrupt context on every period and must finish
/// well within one period.
pub struct IntervalTimer<'r, B: Board> {
    board: B,
    registry: &'r Registry,
    status: Status,
    callback: Option<Callback>,
    interval: Option<Interval>,
}

impl<B: Board> IntervalTimer<'static, B> {
    /// Handle allocating from the process-wide registry, the one every
    /// hardware entry point dispatches through
    pub fn new(board: B) -> Self {
        Self::from_parts(board, registry())
    }
}

impl<'r, B: Board> IntervalTimer<'r, B> {
    /// Handle allocating from a private `registry`.
    ///
    /// Only for host tests that drive [`Registry::service`] themselves; the
    /// `on_timer_interrupt` entry points never see this registry.
    #[cfg(any(test, feature = "mock"))]
    pub fn with_registry(board: B, registry: &'r Registry) -> Self {
        Self::from_parts(board, registry)
    }

    fn from_parts(board: B, registry: &'r Registry) -> Self {
        Self {
            board,
            registry,
            status: Status::Off,
            callback: None,
            interval: None,
        }
    }

    /// Start calling `callback` every `period` units of `scale`.
    ///
    /// A running handle is torn down first, so `begin` also re-arms with new
    /// parameters. On failure the handle is left `Off`.
    pub fn begin<R>(
        &mut self,
        callback: Callback,
        period: u16,
        scale: Scale,
        request: R,
    ) -> SitResult<Slot>
    where
        R: Into<SlotRequest>,
    {
        let interval = Interval::new(period, scale)?;
        self.begin_interval(callback, interval, request)
    }

    /// [`begin`](Self::begin) with a prevalidated [`Interval`]
    pub fn begin_interval<R>(
        &mut self,
        callback: Callback,
        interval: Interval,
        request: R,
    ) -> SitResult<Slot>
    where
        R: Into<SlotRequest>,
    {
        let request = request.into();
        self.end();

        let slot = match self.registry.claim(request) {
            Ok(slot) => slot,
            Err(err) => {
                warn!("interval timer: begin({}) failed: {}", request, err);
                return Err(err);
            }
        };

        self.start(slot, callback, interval);
        self.status = Status::Running(slot);
        self.callback = Some(callback);
        self.interval = Some(interval);
        debug!(
            "interval timer: running on {} ({}) every {}",
            slot,
            self.board.descriptor(slot).name,
            interval
        );
        Ok(slot)
    }

    /// Stop the timer and give its slot back. No-op when `Off`.
    pub fn end(&mut self) {
        if let Status::Running(slot) = self.status {
            self.stop(slot);
            debug!(
                "interval timer: {} ({}) stopped",
                slot,
                self.board.descriptor(slot).name
            );
        }
        self.status = Status::Off;
        self.callback = None;
        self.interval = None;
    }

    /// Mask or unmask the owned interrupt line without stopping the counter
    pub fn set_interrupt_state(&mut self, state: InterruptState) -> SitResult<()> {
        let slot = self.running_slot()?;
        let irq = self.board.descriptor(slot).irq;
        let priority = self.board.config().priority;
        self.board
            .interrupts()
            .set_interrupt(irq, priority, state == InterruptState::Enable);
        Ok(())
    }

    /// Change the period in place.
    ///
    /// The counter keeps running; the slot and callback binding are untouched.
    pub fn reconfigure_period(&mut self, period: u16, scale: Scale) -> SitResult<()> {
        let slot = self.running_slot()?;
        let interval = Interval::new(period, scale)?;
        let prescaler = self.board.config().prescaler(scale);

        let timer = self.board.timer(slot);
        timer.set_reload_and_prescaler(period, prescaler);
        timer.force_reload();
        // the forced update event raises the flag
        timer.clear_update_pending();

        self.interval = Some(interval);
        debug!("interval timer: {} now every {}", slot, interval);
        Ok(())
    }

    /// Owned slot, if running
    pub fn is_allocated(&self) -> Option<Slot> {
        match self.status {
            Status::Running(slot) => Some(slot),
            Status::Off => None,
        }
    }

    /// Current lifecycle state
    pub fn status(&self) -> Status {
        self.status
    }

    /// `true` while the handle owns a slot
    pub fn is_running(&self) -> bool {
        matches!(self.status, Status::Running(_))
    }

    /// Period currently programmed, if running
    pub fn interval(&self) -> Option<Interval> {
        self.interval
    }

    /// Board the handle programs
    pub fn board(&self) -> &B {
        &self.board
    }

    fn running_slot(&self) -> SitResult<Slot> {
        self.is_allocated().ok_or(SitError::NotRunning)
    }

    fn start(&mut self, slot: Slot, callback: Callback, interval: Interval) {
        let config = self.board.config();
        let descriptor = self.board.descriptor(slot);
        let time_base = TimeBase::new(config.prescaler(interval.scale()), interval.period());

        self.board.clocks().enable_clock(descriptor.clock);

        let timer = self.board.timer(slot);
        timer.configure(&time_base);
        timer.set_counting(true);
        timer.set_update_interrupt(true);
        timer.clear_update_pending();

        self.registry.bind(slot, callback);
        self.board
            .interrupts()
            .set_interrupt(descriptor.irq, config.priority, true);
    }

    fn stop(&mut self, slot: Slot) {
        let config = self.board.config();
        let irq = self.board.descriptor(slot).irq;

        self.board.timer(slot).set_counting(false);
        self.board.interrupts().set_interrupt(irq, config.priority, false);

        let timer = self.board.timer(slot);
        timer.set_update_interrupt(false);
        // an update latched before the counter stopped must not fire later
        timer.clear_update_pending();
        timer.reset_to_default();

        self.registry.retire(slot);
    }
}

impl<B: Board> Drop for IntervalTimer<'_, B> {
    fn drop(&mut self) {
        self.end();
    }
}
