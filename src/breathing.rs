//! Box-breathing state machine. Purely visual: the shell advances it by the
//! frame delta and renders the phase label plus a scaled circle.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Inhale,
    HoldFull,
    Exhale,
    HoldEmpty,
}

impl Phase {
    fn next(self) -> Phase {
        match self {
            Phase::Inhale => Phase::HoldFull,
            Phase::HoldFull => Phase::Exhale,
            Phase::Exhale => Phase::HoldEmpty,
            Phase::HoldEmpty => Phase::Inhale,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Phase::Inhale => Duration::from_secs(4),
            Phase::HoldFull => Duration::from_secs(4),
            Phase::Exhale => Duration::from_secs(6),
            Phase::HoldEmpty => Duration::from_secs(4),
        }
    }

    fn caption(self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::HoldFull | Phase::HoldEmpty => "Hold",
            Phase::Exhale => "Exhale",
        }
    }
}

/// One full cycle of the exercise.
pub fn cycle_duration() -> Duration {
    Phase::Inhale.duration()
        + Phase::HoldFull.duration()
        + Phase::Exhale.duration()
        + Phase::HoldEmpty.duration()
}

pub struct BreathingExercise {
    running: bool,
    phase: Phase,
    phase_elapsed: Duration,
}

impl Default for BreathingExercise {
    fn default() -> Self {
        Self {
            running: false,
            phase: Phase::Inhale,
            phase_elapsed: Duration::ZERO,
        }
    }
}

impl BreathingExercise {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_elapsed(&self) -> Duration {
        self.phase_elapsed
    }

    pub fn start(&mut self) {
        self.running = true;
        self.phase = Phase::Inhale;
        self.phase_elapsed = Duration::ZERO;
    }

    /// Stopping when not running is a no-op. The final visual state is left
    /// for the shell to clear.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance by a frame delta, stepping through as many phase boundaries
    /// as the delta crosses.
    pub fn advance(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        self.phase_elapsed += dt;
        while self.phase_elapsed >= self.phase.duration() {
            self.phase_elapsed -= self.phase.duration();
            self.phase = self.phase.next();
        }
    }

    /// Progress within the current phase, 0.0 to 1.0.
    pub fn progress(&self) -> f32 {
        let duration = self.phase.duration().as_secs_f32();
        (self.phase_elapsed.as_secs_f32() / duration).clamp(0.0, 1.0)
    }

    /// Render scale for the circle: grows over the inhale, holds full,
    /// shrinks over the exhale, rests empty.
    pub fn scale(&self) -> f32 {
        const REST: f32 = 1.0;
        const FULL: f32 = 1.35;
        match self.phase {
            Phase::Inhale => REST + (FULL - REST) * self.progress(),
            Phase::HoldFull => FULL,
            Phase::Exhale => FULL - (FULL - REST) * self.progress(),
            Phase::HoldEmpty => REST,
        }
    }

    /// Caption with a countdown, e.g. "Inhale (3s)".
    pub fn label(&self) -> String {
        let remaining = self.phase.duration().saturating_sub(self.phase_elapsed);
        let seconds = remaining.as_secs_f32().ceil() as u32;
        format!("{} ({}s)", self.phase.caption(), seconds.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_cycle_in_order() {
        let mut exercise = BreathingExercise::default();
        exercise.start();
        assert_eq!(exercise.phase(), Phase::Inhale);

        exercise.advance(Duration::from_secs(4));
        assert_eq!(exercise.phase(), Phase::HoldFull);
        exercise.advance(Duration::from_secs(4));
        assert_eq!(exercise.phase(), Phase::Exhale);
        exercise.advance(Duration::from_secs(6));
        assert_eq!(exercise.phase(), Phase::HoldEmpty);
        exercise.advance(Duration::from_secs(4));
        assert_eq!(exercise.phase(), Phase::Inhale);
    }

    #[test]
    fn one_full_cycle_returns_to_inhale_at_zero() {
        let mut exercise = BreathingExercise::default();
        exercise.start();
        exercise.advance(cycle_duration());
        assert_eq!(exercise.phase(), Phase::Inhale);
        assert_eq!(exercise.phase_elapsed(), Duration::ZERO);
    }

    #[test]
    fn large_delta_crosses_multiple_boundaries() {
        let mut exercise = BreathingExercise::default();
        exercise.start();
        exercise.advance(Duration::from_secs(9));
        assert_eq!(exercise.phase(), Phase::Exhale);
        assert_eq!(exercise.phase_elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn stop_then_start_resets_regardless_of_prior_phase() {
        let mut exercise = BreathingExercise::default();
        exercise.start();
        exercise.advance(Duration::from_secs(11));
        assert_eq!(exercise.phase(), Phase::Exhale);

        exercise.stop();
        assert!(!exercise.is_running());
        exercise.start();
        assert_eq!(exercise.phase(), Phase::Inhale);
        assert_eq!(exercise.phase_elapsed(), Duration::ZERO);
    }

    #[test]
    fn stop_when_not_running_is_a_no_op() {
        let mut exercise = BreathingExercise::default();
        exercise.stop();
        assert!(!exercise.is_running());
        assert_eq!(exercise.phase(), Phase::Inhale);
    }

    #[test]
    fn advance_is_ignored_while_stopped() {
        let mut exercise = BreathingExercise::default();
        exercise.advance(Duration::from_secs(30));
        assert_eq!(exercise.phase(), Phase::Inhale);
        assert_eq!(exercise.phase_elapsed(), Duration::ZERO);
    }

    #[test]
    fn scale_grows_over_inhale_and_holds_full() {
        let mut exercise = BreathingExercise::default();
        exercise.start();
        assert_eq!(exercise.scale(), 1.0);

        exercise.advance(Duration::from_secs(2));
        let mid = exercise.scale();
        assert!(mid > 1.0 && mid < 1.35);

        exercise.advance(Duration::from_secs(2));
        assert_eq!(exercise.phase(), Phase::HoldFull);
        assert_eq!(exercise.scale(), 1.35);
    }
}
