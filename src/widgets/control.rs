#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStep {
    Increase,
    Decrease,
}

impl KeyStep {
    const fn delta(self) -> f64 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    Accepted,
    Rejected,
}

impl SlideOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderMode {
    Single { value: f64 },
    Range { start: f64, end: f64 },
}

/// State of a rendered slider: bounds, resolution and handle positions.
///
/// Programmatic updates clamp into bounds. Interactive moves in range mode
/// refuse to cross one handle over the other instead of clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderControl {
    pub orientation: Orientation,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    mode: SliderMode,
}

impl SliderControl {
    pub fn single(orientation: Orientation, max: f64, value: f64, step: f64) -> Self {
        let mut control = Self {
            orientation,
            min: 0.0,
            max: max.max(0.0),
            step,
            mode: SliderMode::Single { value: 0.0 },
        };
        control.set_value(value);
        control
    }

    pub fn range(orientation: Orientation, max: f64, start: f64, end: f64, step: f64) -> Self {
        let mut control = Self {
            orientation,
            min: 0.0,
            max: max.max(0.0),
            step,
            mode: SliderMode::Range { start: 0.0, end: 0.0 },
        };
        control.set_values(start, end);
        control
    }

    pub fn mode(&self) -> SliderMode {
        self.mode
    }

    pub fn is_range(&self) -> bool {
        matches!(self.mode, SliderMode::Range { .. })
    }

    pub fn value(&self) -> f64 {
        match self.mode {
            SliderMode::Single { value } => value,
            SliderMode::Range { start, .. } => start,
        }
    }

    pub fn values(&self) -> (f64, f64) {
        match self.mode {
            SliderMode::Single { value } => (value, value),
            SliderMode::Range { start, end } => (start, end),
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn snap(&self, value: f64) -> f64 {
        let snapped = if self.step > 0.0 {
            ((value - self.min) / self.step).round() * self.step + self.min
        } else {
            value
        };
        self.clamp(snapped)
    }

    /// Moves the single handle. Has no effect in range mode.
    pub fn set_value(&mut self, value: f64) -> bool {
        let value = self.clamp(value);
        match self.mode {
            SliderMode::Single { value: current } if current != value => {
                self.mode = SliderMode::Single { value };
                true
            }
            _ => false,
        }
    }

    /// Moves both range handles. Has no effect in single mode.
    pub fn set_values(&mut self, start: f64, end: f64) -> bool {
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        match self.mode {
            SliderMode::Range {
                start: current_start,
                end: current_end,
            } if (current_start, current_end) != (start, end) => {
                self.mode = SliderMode::Range { start, end };
                true
            }
            _ => false,
        }
    }

    /// Drags `handle` to `value`. The single handle ignores `handle`.
    pub fn slide(&mut self, handle: Handle, value: f64) -> SlideOutcome {
        let value = self.snap(value);
        match (self.mode, handle) {
            (SliderMode::Single { .. }, _) => {
                self.mode = SliderMode::Single { value };
                SlideOutcome::Accepted
            }
            (SliderMode::Range { end, .. }, Handle::Lower) if value > end => SlideOutcome::Rejected,
            (SliderMode::Range { start, .. }, Handle::Upper) if value < start => {
                SlideOutcome::Rejected
            }
            (SliderMode::Range { end, .. }, Handle::Lower) => {
                self.mode = SliderMode::Range { start: value, end };
                SlideOutcome::Accepted
            }
            (SliderMode::Range { start, .. }, Handle::Upper) => {
                self.mode = SliderMode::Range { start, end: value };
                SlideOutcome::Accepted
            }
        }
    }

    /// Keyboard move: one whole step, landing on the nearest integer.
    pub fn key_step(&mut self, handle: Handle, step: KeyStep) -> SlideOutcome {
        let current = match (self.mode, handle) {
            (SliderMode::Single { value }, _) => value,
            (SliderMode::Range { start, .. }, Handle::Lower) => start,
            (SliderMode::Range { end, .. }, Handle::Upper) => end,
        };
        let target = self.clamp((current + step.delta()).round());
        self.slide(handle, target)
    }

    /// Moves every handle by `delta`; refused if any handle would leave the bounds.
    pub fn shift(&mut self, delta: f64) -> SlideOutcome {
        match self.mode {
            SliderMode::Single { value } => {
                let target = value + delta;
                if target < self.min || target > self.max {
                    return SlideOutcome::Rejected;
                }
                self.mode = SliderMode::Single { value: target };
                SlideOutcome::Accepted
            }
            SliderMode::Range { start, end } => {
                if start + delta < self.min || end + delta > self.max {
                    return SlideOutcome::Rejected;
                }
                self.mode = SliderMode::Range {
                    start: start + delta,
                    end: end + delta,
                };
                SlideOutcome::Accepted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Handle, KeyStep, Orientation, SlideOutcome, SliderControl, SliderMode};

    #[test]
    fn programmatic_updates_clamp_into_bounds() {
        let mut control = SliderControl::single(Orientation::Horizontal, 9.0, 4.0, 0.01);
        assert!(control.set_value(42.0));
        assert_eq!(control.value(), 9.0);
        assert!(!control.set_values(1.0, 2.0));
    }

    #[test]
    fn slide_snaps_to_resolution() {
        let mut control = SliderControl::single(Orientation::Vertical, 9.0, 0.0, 0.01);
        assert_eq!(control.slide(Handle::Lower, 4.5671), SlideOutcome::Accepted);
        assert!((control.value() - 4.57).abs() < 1e-9);
    }

    #[test]
    fn key_step_rounds_to_whole_planes() {
        let mut control = SliderControl::single(Orientation::Horizontal, 9.0, 2.37, 0.01);
        control.key_step(Handle::Lower, KeyStep::Increase);
        assert_eq!(control.value(), 3.0);
        control.key_step(Handle::Lower, KeyStep::Decrease);
        control.key_step(Handle::Lower, KeyStep::Decrease);
        assert_eq!(control.value(), 1.0);
    }

    #[test]
    fn range_key_step_respects_handle_order() {
        let mut control = SliderControl::range(Orientation::Vertical, 9.0, 4.0, 4.0, 0.01);
        assert_eq!(
            control.key_step(Handle::Lower, KeyStep::Increase),
            SlideOutcome::Rejected
        );
        assert_eq!(
            control.key_step(Handle::Upper, KeyStep::Increase),
            SlideOutcome::Accepted
        );
        assert_eq!(control.mode(), SliderMode::Range { start: 4.0, end: 5.0 });
    }

    #[test]
    fn shift_moves_both_handles_or_nothing() {
        let mut control = SliderControl::range(Orientation::Vertical, 9.0, 2.0, 8.0, 0.01);
        assert_eq!(control.shift(1.0), SlideOutcome::Accepted);
        assert_eq!(control.values(), (3.0, 9.0));
        assert_eq!(control.shift(1.0), SlideOutcome::Rejected);
        assert_eq!(control.values(), (3.0, 9.0));
    }

    proptest! {
        #[test]
        fn lower_handle_never_passes_upper(lo in 0_u32..50, hi in 0_u32..50, target in 0_u32..50) {
            let (lo, hi) = (lo.min(hi) as f64, lo.max(hi) as f64);
            let mut control = SliderControl::range(Orientation::Vertical, 49.0, lo, hi, 0.01);
            let outcome = control.slide(Handle::Lower, target as f64);
            if target as f64 > hi {
                prop_assert_eq!(outcome, SlideOutcome::Rejected);
                prop_assert_eq!(control.values(), (lo, hi));
            } else {
                prop_assert_eq!(outcome, SlideOutcome::Accepted);
                prop_assert_eq!(control.values(), (target as f64, hi));
            }
        }

        #[test]
        fn upper_handle_never_passes_lower(lo in 0_u32..50, hi in 0_u32..50, target in 0_u32..50) {
            let (lo, hi) = (lo.min(hi) as f64, lo.max(hi) as f64);
            let mut control = SliderControl::range(Orientation::Vertical, 49.0, lo, hi, 0.01);
            let outcome = control.slide(Handle::Upper, target as f64);
            if (target as f64) < lo {
                prop_assert_eq!(outcome, SlideOutcome::Rejected);
                prop_assert_eq!(control.values(), (lo, hi));
            } else {
                prop_assert_eq!(outcome, SlideOutcome::Accepted);
                prop_assert_eq!(control.values(), (lo, target as f64));
            }
        }
    }
}
