//! Timer peripheral register interface

/// Counter direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountMode {
    #[default]
    Up,
    Down,
    CenterAligned,
}

/// Division between the timer kernel clock and the dead-time/filter sampling clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDivision {
    #[default]
    Div1,
    Div2,
    Div4,
}

/// Time-base settings written in one go when a timer is (re)initialised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeBase {
    /// Prescaler register value; the counter clock is `input / (prescaler + 1)`
    pub prescaler: u16,
    /// Auto-reload value
    pub period: u16,
    pub count_mode: CountMode,
    pub clock_division: ClockDivision,
    /// Number of overflows between update events (advanced timers only)
    pub repetition_counter: u8,
}

impl TimeBase {
    /// Count-up, undivided, non-repeating time base
    pub const fn new(prescaler: u16, period: u16) -> Self {
        Self {
            prescaler,
            period,
            count_mode: CountMode::Up,
            clock_division: ClockDivision::Div1,
            repetition_counter: 0,
        }
    }

    pub const fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.count_mode = mode;
        self
    }

    pub const fn with_clock_division(mut self, division: ClockDivision) -> Self {
        self.clock_division = division;
        self
    }

    pub const fn with_repetition(mut self, count: u8) -> Self {
        self.repetition_counter = count;
        self
    }
}

/// Register-level services of one hardware timer.
///
/// Every operation is a plain register access and cannot fail once the
/// peripheral clock is running. Implementations must be callable from
/// interrupt context for [`is_update_pending`](Self::is_update_pending) and
/// [`clear_update_pending`](Self::clear_update_pending).
pub trait TimerPeripheral {
    /// Write the full time base and latch it into the shadow registers
    fn configure(&mut self, time_base: &TimeBase);

    /// Start or stop the counter
    fn set_counting(&mut self, enabled: bool);

    /// Enable or disable the update (overflow) event as an interrupt source
    fn set_update_interrupt(&mut self, enabled: bool);

    /// Check the update interrupt flag
    fn is_update_pending(&self) -> bool;

    /// Clear the update interrupt flag
    fn clear_update_pending(&mut self);

    /// Write new auto-reload and prescaler values without stopping the counter
    fn set_reload_and_prescaler(&mut self, period: u16, prescaler: u16);

    /// Generate an update event so that new prescaler/reload values apply now
    fn force_reload(&mut self);

    /// Return every register of the peripheral to its reset value
    fn reset_to_default(&mut self);
}
