//! Single-colour status LED with a time-sliced blink engine.
//!
//! The scheduler calls [`IndicatorPort::update`] once per iteration; the
//! LED measures the time since the previous call and advances its
//! pattern phase.  Nothing here blocks.
//!
//! | Pattern      | Description                    | Rate  |
//! |--------------|--------------------------------|-------|
//! | Heartbeat    | 50 % square wave               | 1 Hz  |
//! | DoubleBlink  | Two quick flashes, then pause  | 1 Hz  |
//! | FastBlink    | On/off square wave             | 4 Hz  |
//! | Solid / Off  | Constant level                 | -     |

use std::time::Instant;

use log::trace;

use crate::app::ports::IndicatorPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPattern {
    Heartbeat,
    DoubleBlink,
    FastBlink,
    Solid,
    Off,
}

/// Phase accumulator producing the LED level for a pattern.
#[derive(Debug)]
pub struct BlinkEngine {
    pattern: BlinkPattern,
    phase_ms: u32,
}

impl BlinkEngine {
    pub const fn new(pattern: BlinkPattern) -> Self {
        Self {
            pattern,
            phase_ms: 0,
        }
    }

    pub fn pattern(&self) -> BlinkPattern {
        self.pattern
    }

    /// Switch pattern.  The phase restarts only when the pattern changes.
    pub fn set_pattern(&mut self, pattern: BlinkPattern) {
        if pattern != self.pattern {
            self.pattern = pattern;
            self.phase_ms = 0;
        }
    }

    /// Advance by `delta_ms` and return whether the LED is lit.
    pub fn tick(&mut self, delta_ms: u32) -> bool {
        self.phase_ms = self.phase_ms.wrapping_add(delta_ms);
        self.level()
    }

    fn level(&self) -> bool {
        match self.pattern {
            BlinkPattern::Solid => true,
            BlinkPattern::Off => false,
            BlinkPattern::Heartbeat => (self.phase_ms % 1000) < 500,
            BlinkPattern::FastBlink => (self.phase_ms % 250) < 125,
            BlinkPattern::DoubleBlink => {
                let cycle = self.phase_ms % 1000;
                cycle < 100 || (200..300).contains(&cycle)
            }
        }
    }
}

pub struct StatusLed {
    engine: BlinkEngine,
    lit: bool,
    last_update: Option<Instant>,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self {
            engine: BlinkEngine::new(BlinkPattern::Heartbeat),
            lit: false,
            last_update: None,
        }
    }

    pub fn set_pattern(&mut self, pattern: BlinkPattern) {
        self.engine.set_pattern(pattern);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl IndicatorPort for StatusLed {
    fn update(&mut self) {
        let now = Instant::now();
        let delta_ms = self
            .last_update
            .map_or(0, |prev| now.duration_since(prev).as_millis() as u32);
        self.last_update = Some(now);

        let lit = self.engine.tick(delta_ms);
        if lit != self.lit {
            trace!("LED: {}", if lit { "on" } else { "off" });
            self.lit = lit;
        }
    }
}
