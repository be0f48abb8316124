//! Tick scales, intervals and prescaler configuration

use core::fmt;

use itimer_hal::IrqPriority;

use crate::{SitError, SitResult};

/// Resolution of one period unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// 1 unit = 1 µs
    #[default]
    Micros,
    /// 1 unit = 0.5 ms
    HalfMillis,
}

impl Scale {
    /// Counter frequency this scale programs
    pub const fn ticks_per_second(self) -> u32 {
        match self {
            Scale::Micros => 1_000_000,
            Scale::HalfMillis => 2_000,
        }
    }

    /// Length of one unit in microseconds
    pub const fn unit_micros(self) -> u32 {
        1_000_000 / self.ticks_per_second()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Scale {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Scale::Micros => defmt::write!(fmt, "us"),
            Scale::HalfMillis => defmt::write!(fmt, "hms"),
        }
    }
}

/// A repeating tick period: `period` units of `scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period: u16,
    scale: Scale,
}

impl Interval {
    /// Create an interval; the period must be at least one unit
    pub const fn new(period: u16, scale: Scale) -> SitResult<Self> {
        if period == 0 {
            Err(SitError::InvalidPeriod)
        } else {
            Ok(Self { period, scale })
        }
    }

    /// Pick the finest scale that can express `micros`.
    ///
    /// Values above the microsecond range are rounded to the nearest half
    /// millisecond.
    pub const fn from_micros(micros: u32) -> SitResult<Self> {
        if micros <= u16::MAX as u32 {
            return Self::new(micros as u16, Scale::Micros);
        }
        let unit = Scale::HalfMillis.unit_micros();
        let halves = micros.saturating_add(unit / 2) / unit;
        if halves > u16::MAX as u32 {
            Err(SitError::InvalidPeriod)
        } else {
            Self::new(halves as u16, Scale::HalfMillis)
        }
    }

    pub const fn period(&self) -> u16 {
        self.period
    }

    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// Nominal time between ticks
    pub const fn as_micros(&self) -> u32 {
        self.period as u32 * self.scale.unit_micros()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scale {
            Scale::Micros => write!(f, "{}us", self.period),
            Scale::HalfMillis => write!(f, "{}x500us", self.period),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Interval {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}{}", self.period, self.scale);
    }
}

/// Clock and interrupt settings shared by every slot of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitConfig {
    /// Frequency feeding the timer prescalers
    pub timer_clock_hz: u32,
    /// Interrupt priority used for every slot; slots never preempt each other
    pub priority: IrqPriority,
}

impl Default for SitConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SitConfig {
    /// 72 MHz timer clock, preemption priority 0, sub-priority 1
    pub const DEFAULT: SitConfig = SitConfig {
        timer_clock_hz: 72_000_000,
        priority: IrqPriority::new(0, 1),
    };

    /// Creates a new configuration builder.
    pub fn builder() -> SitConfigBuilder {
        SitConfigBuilder::default()
    }

    /// Prescaler register value that yields one counter tick per unit of
    /// `scale`. Saturates at the register limits; see [`validate`](Self::validate).
    pub const fn prescaler(&self, scale: Scale) -> u16 {
        let divisor = self.timer_clock_hz / scale.ticks_per_second();
        if divisor == 0 {
            0
        } else if divisor - 1 > u16::MAX as u32 {
            u16::MAX
        } else {
            (divisor - 1) as u16
        }
    }

    /// Check that both scales can be produced exactly from the timer clock
    pub fn validate(&self) -> SitResult<()> {
        for scale in [Scale::Micros, Scale::HalfMillis] {
            let tps = scale.ticks_per_second();
            let divisor = self.timer_clock_hz / tps;
            if divisor == 0 || divisor - 1 > u16::MAX as u32 || self.timer_clock_hz % tps != 0 {
                return Err(SitError::InvalidConfig);
            }
        }
        Ok(())
    }
}

/// Builder for ergonomic [`SitConfig`] construction.
#[derive(Debug, Clone)]
pub struct SitConfigBuilder {
    config: SitConfig,
}

impl Default for SitConfigBuilder {
    fn default() -> Self {
        Self {
            config: SitConfig::DEFAULT,
        }
    }
}

impl SitConfigBuilder {
    /// Sets the frequency feeding the timer prescalers.
    pub fn timer_clock_hz(mut self, hz: u32) -> Self {
        self.config.timer_clock_hz = hz;
        self
    }

    /// Sets the preemption and sub-priority of every slot's interrupt.
    pub fn priority(mut self, preemption: u8, sub: u8) -> Self {
        self.config.priority = IrqPriority::new(preemption, sub);
        self
    }

    /// Builds the configuration without validation.
    pub fn build(self) -> SitConfig {
        self.config
    }

    /// Builds the configuration, rejecting clocks that cannot produce both scales.
    pub fn try_build(self) -> SitResult<SitConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
