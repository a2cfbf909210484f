//! Threshold nudge policy.
//!
//! A pure function of `(kind, elapsed, flags, extended_mode)`; the state
//! machine applies the returned flags and the engine dispatches the
//! effect. Boundaries are compared with `>=` so a tick that lands past a
//! threshold (background-tab throttling, suspended laptop) still fires
//! the nudge on the next tick that observes it.

use crate::config::NudgeThresholds;
use crate::types::SessionKind;

use super::session::NudgeFlags;

/// Which threshold a nudge effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    /// 60 minutes of debugging: prompt to log attempts and a hypothesis.
    DebuggingCheckpoint,
    /// 90 minutes of debugging: hard cutoff, session is stopped.
    DebuggingCutoff,
    /// 120 minutes of building: suggest a break.
    BuildingBreak,
}

/// What the policy asks the caller to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeEffect {
    None,
    /// Surface a notification; the timer keeps running.
    Notify(Nudge),
    /// Surface a notification and stop the session through the normal
    /// reconciliation path.
    NotifyAndStop(Nudge),
}

impl NudgeEffect {
    pub fn is_none(self) -> bool {
        self == NudgeEffect::None
    }
}

/// Evaluates the policy for one tick.
///
/// Each flag fires at most once per session, and evaluation is
/// idempotent: a second call with the same elapsed value and the updated
/// flags yields `None`. When a single tick jumps past both debugging
/// thresholds the cutoff wins (one effect per tick) and the checkpoint
/// flag is set as fired - the session is stopping, so the checkpoint
/// prompt is moot. Under extended mode the cutoff is suppressed entirely
/// and the checkpoint can still fire on its own.
pub fn evaluate(
    kind: SessionKind,
    elapsed_seconds: u64,
    flags: NudgeFlags,
    extended_mode: bool,
    thresholds: &NudgeThresholds,
) -> (NudgeFlags, NudgeEffect) {
    let mut flags = flags;

    match kind {
        SessionKind::Debugging => {
            if elapsed_seconds >= thresholds.debugging_cutoff_secs
                && !flags.ninety_min_fired
                && !extended_mode
            {
                flags.ninety_min_fired = true;
                flags.sixty_min_fired = true;
                return (flags, NudgeEffect::NotifyAndStop(Nudge::DebuggingCutoff));
            }
            if elapsed_seconds >= thresholds.debugging_checkpoint_secs && !flags.sixty_min_fired {
                flags.sixty_min_fired = true;
                return (flags, NudgeEffect::Notify(Nudge::DebuggingCheckpoint));
            }
        }
        SessionKind::Building => {
            if elapsed_seconds >= thresholds.building_break_secs && !flags.one_twenty_min_fired {
                flags.one_twenty_min_fired = true;
                return (flags, NudgeEffect::Notify(Nudge::BuildingBreak));
            }
        }
        SessionKind::Learning => {}
    }

    (flags, NudgeEffect::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> NudgeThresholds {
        NudgeThresholds::default()
    }

    #[test]
    fn test_debugging_below_checkpoint_is_quiet() {
        let (flags, effect) = evaluate(
            SessionKind::Debugging,
            3599,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::None);
        assert_eq!(flags, NudgeFlags::default());
    }

    #[test]
    fn test_debugging_checkpoint_fires_once() {
        let (flags, effect) = evaluate(
            SessionKind::Debugging,
            3600,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::Notify(Nudge::DebuggingCheckpoint));
        assert!(flags.sixty_min_fired);

        // Same inputs with the updated flags: nothing more to do.
        let (flags2, effect2) = evaluate(SessionKind::Debugging, 3600, flags, false, &thresholds());
        assert_eq!(effect2, NudgeEffect::None);
        assert_eq!(flags2, flags);
    }

    #[test]
    fn test_checkpoint_fires_on_late_tick() {
        // A tick that jumps from 3599 straight to 3700 must still fire.
        let (flags, effect) = evaluate(
            SessionKind::Debugging,
            3700,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::Notify(Nudge::DebuggingCheckpoint));
        assert!(flags.sixty_min_fired);
        assert!(!flags.ninety_min_fired);
    }

    #[test]
    fn test_debugging_cutoff_stops_the_session() {
        let after_checkpoint = NudgeFlags {
            sixty_min_fired: true,
            ..NudgeFlags::default()
        };
        let (flags, effect) = evaluate(
            SessionKind::Debugging,
            5400,
            after_checkpoint,
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::NotifyAndStop(Nudge::DebuggingCutoff));
        assert!(flags.ninety_min_fired);
    }

    #[test]
    fn test_cutoff_wins_when_tick_jumps_past_both_thresholds() {
        let (flags, effect) = evaluate(
            SessionKind::Debugging,
            5460,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::NotifyAndStop(Nudge::DebuggingCutoff));
        assert!(flags.sixty_min_fired);
        assert!(flags.ninety_min_fired);
    }

    #[test]
    fn test_extended_mode_suppresses_cutoff_entirely() {
        let flags = NudgeFlags {
            sixty_min_fired: true,
            ..NudgeFlags::default()
        };
        for elapsed in [5400, 5460, 9000] {
            let (flags2, effect) =
                evaluate(SessionKind::Debugging, elapsed, flags, true, &thresholds());
            assert_eq!(effect, NudgeEffect::None);
            assert!(!flags2.ninety_min_fired);
        }
    }

    #[test]
    fn test_extended_mode_still_allows_checkpoint() {
        // Extended before the checkpoint fired: the checkpoint is its own
        // threshold and is not suppressed.
        let (flags, effect) = evaluate(
            SessionKind::Debugging,
            6000,
            NudgeFlags::default(),
            true,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::Notify(Nudge::DebuggingCheckpoint));
        assert!(flags.sixty_min_fired);
        assert!(!flags.ninety_min_fired);
    }

    #[test]
    fn test_building_break_is_non_terminal() {
        let (flags, effect) = evaluate(
            SessionKind::Building,
            7200,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::Notify(Nudge::BuildingBreak));
        assert!(flags.one_twenty_min_fired);

        let (_, effect2) = evaluate(SessionKind::Building, 7260, flags, false, &thresholds());
        assert_eq!(effect2, NudgeEffect::None);
    }

    #[test]
    fn test_building_ignores_debugging_thresholds() {
        let (flags, effect) = evaluate(
            SessionKind::Building,
            5400,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::None);
        assert_eq!(flags, NudgeFlags::default());
    }

    #[test]
    fn test_learning_has_no_thresholds() {
        let (flags, effect) = evaluate(
            SessionKind::Learning,
            100_000,
            NudgeFlags::default(),
            false,
            &thresholds(),
        );
        assert_eq!(effect, NudgeEffect::None);
        assert_eq!(flags, NudgeFlags::default());
    }

    #[test]
    fn test_simulated_session_fires_each_nudge_exactly_once() {
        // Coarse, irregular tick schedule from 0s to past every threshold.
        let mut flags = NudgeFlags::default();
        let mut fired = Vec::new();
        for elapsed in [100, 3599, 3601, 3700, 5399, 5401, 6000] {
            let (next, effect) =
                evaluate(SessionKind::Debugging, elapsed, flags, false, &thresholds());
            flags = next;
            if !effect.is_none() {
                fired.push(effect);
            }
        }
        assert_eq!(
            fired,
            vec![
                NudgeEffect::Notify(Nudge::DebuggingCheckpoint),
                NudgeEffect::NotifyAndStop(Nudge::DebuggingCutoff),
            ]
        );
    }
}
