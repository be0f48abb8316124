//! Mock timer bank for host tests
//!
//! Clones of a [`MockBoard`] share the same simulated hardware, so a test can
//! hand one clone to an [`IntervalTimer`](crate::IntervalTimer) and inspect
//! registers through another.

use std::cell::RefCell;
use std::rc::Rc;

use itimer_hal::{
    ClockGate, ClockId, InterruptController, IrqNumber, IrqPriority, TimeBase, TimerPeripheral,
};

use crate::board::{Board, SlotDescriptor};
use crate::config::SitConfig;
use crate::registry::{DispatchOutcome, Registry};
use crate::slot::{Slot, NUM_SLOTS};

/// Register-level state of one simulated timer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockTimerState {
    /// Last full time base written by `configure`
    pub time_base: Option<TimeBase>,
    pub prescaler: u16,
    pub reload: u16,
    pub counter: u32,
    pub counting: bool,
    pub update_interrupt: bool,
    pub pending: bool,
    /// Number of `clear_update_pending` calls
    pub clear_count: usize,
    /// Number of `force_reload` calls
    pub reload_forced: usize,
    /// Number of `reset_to_default` calls
    pub resets: usize,
}

/// Simulated timer peripheral
#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    state: Rc<RefCell<MockTimerState>>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the registers
    pub fn state(&self) -> MockTimerState {
        self.state.borrow().clone()
    }

    /// Set the update flag as the hardware would on overflow
    pub fn raise_update(&self) {
        self.state.borrow_mut().pending = true;
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clear_count
    }

    /// Count `ticks` counter clocks. Like the up-counting hardware, the
    /// counter runs `0..=reload` and raises the update flag when it wraps
    /// back to 0, once every `reload + 1` ticks. Returns the number of
    /// updates.
    pub fn advance(&self, ticks: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        if !state.counting || state.reload == 0 {
            return 0;
        }
        let mut updates = 0;
        for _ in 0..ticks {
            state.counter += 1;
            if state.counter > u32::from(state.reload) {
                state.counter = 0;
                state.pending = true;
                updates += 1;
            }
        }
        updates
    }
}

impl TimerPeripheral for MockTimer {
    fn configure(&mut self, time_base: &TimeBase) {
        let mut state = self.state.borrow_mut();
        state.time_base = Some(*time_base);
        state.prescaler = time_base.prescaler;
        state.reload = time_base.period;
        state.counter = 0;
        // initialisation generates an update event
        state.pending = true;
    }

    fn set_counting(&mut self, enabled: bool) {
        self.state.borrow_mut().counting = enabled;
    }

    fn set_update_interrupt(&mut self, enabled: bool) {
        self.state.borrow_mut().update_interrupt = enabled;
    }

    fn is_update_pending(&self) -> bool {
        self.state.borrow().pending
    }

    fn clear_update_pending(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pending = false;
        state.clear_count += 1;
    }

    fn set_reload_and_prescaler(&mut self, period: u16, prescaler: u16) {
        let mut state = self.state.borrow_mut();
        state.reload = period;
        state.prescaler = prescaler;
    }

    fn force_reload(&mut self) {
        let mut state = self.state.borrow_mut();
        state.counter = 0;
        state.pending = true;
        state.reload_forced += 1;
    }

    fn reset_to_default(&mut self) {
        let mut state = self.state.borrow_mut();
        *state = MockTimerState {
            clear_count: state.clear_count,
            reload_forced: state.reload_forced,
            resets: state.resets + 1,
            ..MockTimerState::default()
        };
    }
}

/// Simulated clock controller
#[derive(Debug, Clone, Default)]
pub struct MockClocks {
    enabled: Rc<RefCell<Vec<ClockId>>>,
}

impl MockClocks {
    pub fn is_enabled(&self, clock: ClockId) -> bool {
        self.enabled.borrow().contains(&clock)
    }
}

impl ClockGate for MockClocks {
    fn enable_clock(&mut self, clock: ClockId) {
        let mut enabled = self.enabled.borrow_mut();
        if !enabled.contains(&clock) {
            enabled.push(clock);
        }
    }
}

/// One `set_interrupt` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqEvent {
    pub line: IrqNumber,
    pub priority: IrqPriority,
    pub enabled: bool,
}

#[derive(Debug, Default)]
struct IrqState {
    enabled: Vec<(IrqNumber, IrqPriority)>,
    log: Vec<IrqEvent>,
}

/// Simulated interrupt controller
#[derive(Debug, Clone, Default)]
pub struct MockInterrupts {
    state: Rc<RefCell<IrqState>>,
}

impl MockInterrupts {
    /// Priority an enabled line was programmed with
    pub fn priority(&self, line: IrqNumber) -> Option<IrqPriority> {
        self.state
            .borrow()
            .enabled
            .iter()
            .find(|(l, _)| *l == line)
            .map(|(_, p)| *p)
    }

    /// Every `set_interrupt` call so far
    pub fn log(&self) -> Vec<IrqEvent> {
        self.state.borrow().log.clone()
    }
}

impl InterruptController for MockInterrupts {
    fn set_interrupt(&mut self, line: IrqNumber, priority: IrqPriority, enabled: bool) {
        let mut state = self.state.borrow_mut();
        state.enabled.retain(|(l, _)| *l != line);
        if enabled {
            state.enabled.push((line, priority));
        }
        state.log.push(IrqEvent {
            line,
            priority,
            enabled,
        });
    }

    fn is_enabled(&self, line: IrqNumber) -> bool {
        self.priority(line).is_some()
    }
}

/// Three simulated timers wired like TIM2/TIM3/TIM4 of an STM32F1
#[derive(Debug, Clone, Default)]
pub struct MockBoard {
    timers: [MockTimer; NUM_SLOTS],
    clocks: MockClocks,
    interrupts: MockInterrupts,
    config: SitConfig,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SitConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Shared handle to the timer behind `slot`
    pub fn timer_handle(&self, slot: Slot) -> MockTimer {
        self.timers[slot.index()].clone()
    }

    pub fn timer_state(&self, slot: Slot) -> MockTimerState {
        self.timers[slot.index()].state()
    }

    pub fn clock_enabled(&self, slot: Slot) -> bool {
        self.clocks.is_enabled(Self::SLOTS[slot.index()].clock)
    }

    pub fn irq_enabled(&self, slot: Slot) -> bool {
        self.interrupts.is_enabled(Self::SLOTS[slot.index()].irq)
    }

    pub fn irq_priority(&self, slot: Slot) -> Option<IrqPriority> {
        self.interrupts.priority(Self::SLOTS[slot.index()].irq)
    }

    pub fn interrupt_log(&self) -> Vec<IrqEvent> {
        self.interrupts.log()
    }

    /// Enter the entry point of `slot` once, as the vector would
    pub fn fire(&self, registry: &Registry, slot: Slot) -> DispatchOutcome {
        let mut timer = self.timer_handle(slot);
        registry.service(slot, &mut timer)
    }

    /// Count `ticks` counter clocks on `slot`, entering the entry point
    /// whenever the update flag is raised with the interrupt source and the
    /// line enabled. Returns how many callbacks were delivered.
    pub fn run(&self, registry: &Registry, slot: Slot, ticks: u32) -> usize {
        let timer = self.timer_handle(slot);
        let mut delivered = 0;
        for _ in 0..ticks {
            timer.advance(1);
            let state = timer.state();
            if state.pending
                && state.update_interrupt
                && self.irq_enabled(slot)
                && self.fire(registry, slot) == DispatchOutcome::Delivered
            {
                delivered += 1;
            }
        }
        delivered
    }
}

impl Board for MockBoard {
    type Timer = MockTimer;
    type Clocks = MockClocks;
    type Interrupts = MockInterrupts;

    const SLOTS: [SlotDescriptor; NUM_SLOTS] = [
        SlotDescriptor::new("TIM2", ClockId(0), IrqNumber(28)),
        SlotDescriptor::new("TIM3", ClockId(1), IrqNumber(29)),
        SlotDescriptor::new("TIM4", ClockId(2), IrqNumber(30)),
    ];

    fn config(&self) -> SitConfig {
        self.config
    }

    fn timer(&mut self, slot: Slot) -> &mut MockTimer {
        &mut self.timers[slot.index()]
    }

    fn clocks(&mut self) -> &mut MockClocks {
        &mut self.clocks
    }

    fn interrupts(&mut self) -> &mut MockInterrupts {
        &mut self.interrupts
    }
}
