use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::memory::MemorySample;
use crate::session::ClientMessage;
use crate::watcher::{HintCache, StageCleared, WatcherState};

/// Outbound action decided by a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Reveal the item at `location`, earned by clearing a stage
    CreateHint { location: i64, outcome: StageCleared },
    /// A stage was cleared but every missing location is already hinted
    StageCleared { outcome: StageCleared },
}

impl Action {
    /// Terminal outcome of the clear that produced this action
    pub fn outcome(&self) -> StageCleared {
        match *self {
            Action::CreateHint { outcome, .. } | Action::StageCleared { outcome } => outcome,
        }
    }

    /// Packet to send to the server, if the action needs one.
    ///
    /// Only [`Action::CreateHint`] talks to the server directly; a bare clear
    /// is left to relays such as Ring Link.
    pub fn to_message(&self) -> Option<ClientMessage> {
        match *self {
            Action::CreateHint { location, .. } => Some(ClientMessage::CreateHints {
                locations: vec![location],
            }),
            Action::StageCleared { .. } => None,
        }
    }
}

/// Stage state machine
///
/// Classifies periodically sampled memory values into game events:
/// - game start (first nonzero counter)
/// - stage start (a character is selected)
/// - stage loss (character cleared before the result counter reaches 4)
/// - perfect (every ring collected while spheres remain)
/// - stage clear (character cleared with the result counter at 4)
///
/// Each stage clear picks one hintable location at random and yields a
/// single [`Action::CreateHint`]. When nothing is left to hint the clear is
/// still reported as [`Action::StageCleared`].
pub struct StageWatcher<R = StdRng> {
    state: WatcherState,
    hints: HintCache,
    rng: R,
}

impl StageWatcher<StdRng> {
    /// Create a watcher seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for StageWatcher<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> StageWatcher<R> {
    /// Create a watcher drawing hint locations from `rng`.
    ///
    /// Tests pass a seeded generator to make the pick reproducible.
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: WatcherState::new(),
            hints: HintCache::new(),
            rng,
        }
    }

    /// Current session flags
    pub fn state(&self) -> &WatcherState {
        &self.state
    }

    /// Missing and hinted locations known for this session
    pub fn hints(&self) -> &HintCache {
        &self.hints
    }

    /// Mutable hint cache, updated from `Connected`, `Retrieved` and `SetReply` packets
    pub fn hints_mut(&mut self) -> &mut HintCache {
        &mut self.hints
    }

    /// Drop all state tied to the previous server session.
    ///
    /// Called by [`BlueSphereClient::reset_session`](crate::BlueSphereClient::reset_session)
    /// whenever the emulator or server connection is rebuilt. The RNG is kept.
    pub fn reset(&mut self) {
        self.state = WatcherState::new();
        self.hints = HintCache::new();
    }

    /// Advance the state machine by one sample.
    ///
    /// Transitions are evaluated in a fixed order and several may fire in the
    /// same call. At most one action is returned.
    pub fn poll(&mut self, sample: &MemorySample) -> Option<Action> {
        if !self.state.game_started && sample.has_activity() {
            self.state.game_started = true;
            info!("Game started!");
        }

        if !self.state.game_started {
            return None;
        }

        if sample.in_stage() && self.state.stage_cleared != StageCleared::InProgress {
            self.state.stage_started = true;
            self.state.stage_perfected = false;
            self.state.stage_cleared = StageCleared::InProgress;
            info!("Get Blue Spheres!");
        }

        if !self.state.stage_started {
            return None;
        }

        // Re-applied every tick while the condition holds
        if !sample.in_stage() && !sample.is_result_cleared() {
            self.state.stage_started = false;
            self.state.stage_perfected = false;
            self.state.stage_cleared = StageCleared::None;
            info!("Stage lost...");
        }

        if self.state.stage_started
            && sample.rings_left == 0
            && sample.spheres_left != 0
            && !self.state.stage_perfected
        {
            self.state.stage_perfected = true;
            info!("PERFECT!");
        }

        if self.state.stage_started
            && !sample.in_stage()
            && sample.is_result_cleared()
            && self.state.stage_cleared == StageCleared::InProgress
        {
            return self.clear_stage();
        }

        None
    }

    fn clear_stage(&mut self) -> Option<Action> {
        let outcome = StageCleared::outcome(self.state.stage_perfected);
        self.state.stage_cleared = outcome;
        self.state.stage_started = false;
        self.state.stage_perfected = false;
        info!("CONGRATULATIONS!");
        debug!("Stage cleared with outcome {}", outcome);

        let hintable = self.hints.hintable();
        if hintable.is_empty() {
            warn!("No unhinted locations left, skipping hint");
            return Some(Action::StageCleared { outcome });
        }

        let location = hintable[self.rng.gen_range(0..hintable.len())];
        Some(Action::CreateHint { location, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::HintSet;

    fn watcher() -> StageWatcher<StdRng> {
        let mut watcher = StageWatcher::with_rng(StdRng::seed_from_u64(7));
        watcher.hints_mut().set_missing(1..=20);
        watcher
    }

    fn sample(character: u32, spheres: u32, rings: u32, result: u32) -> MemorySample {
        MemorySample::new(character, spheres, rings, result)
    }

    #[test]
    fn test_idle_does_not_start_game() {
        let mut watcher = watcher();
        for character in [0, 1, 2, 0xF] {
            assert_eq!(watcher.poll(&sample(character, 0, 0, 0)), None);
            assert!(!watcher.state().game_started);
            assert!(!watcher.state().stage_started);
        }
    }

    #[test]
    fn test_game_start_on_any_counter() {
        for s in [sample(0, 1, 0, 0), sample(0, 0, 1, 0), sample(0, 0, 0, 1)] {
            let mut watcher = watcher();
            watcher.poll(&s);
            assert!(watcher.state().game_started);
        }
    }

    #[test]
    fn test_game_start_is_irreversible() {
        let mut watcher = watcher();
        watcher.poll(&sample(0, 10, 0, 0));
        watcher.poll(&sample(0, 0, 0, 0));
        assert!(watcher.state().game_started);
    }

    #[test]
    fn test_game_and_stage_start_in_one_poll() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        assert!(watcher.state().game_started);
        assert!(watcher.state().stage_started);
        assert_eq!(watcher.state().stage_cleared, StageCleared::InProgress);
    }

    #[test]
    fn test_start_then_loss_resets() {
        let mut watcher = watcher();
        assert_eq!(watcher.poll(&sample(2, 10, 5, 0)), None);
        assert!(watcher.state().stage_started);

        assert_eq!(watcher.poll(&sample(0, 10, 5, 0)), None);
        let state = watcher.state();
        assert!(!state.stage_started);
        assert!(!state.stage_perfected);
        assert_eq!(state.stage_cleared, StageCleared::None);
        assert!(state.game_started);
    }

    #[test]
    fn test_stage_restarts_after_loss() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        watcher.poll(&sample(0, 10, 5, 0));
        watcher.poll(&sample(2, 10, 5, 0));
        assert!(watcher.state().stage_started);
        assert_eq!(watcher.state().stage_cleared, StageCleared::InProgress);
    }

    #[test]
    fn test_loss_is_idempotent() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        watcher.poll(&sample(0, 10, 5, 1));
        let after_loss = *watcher.state();
        watcher.poll(&sample(0, 10, 5, 2));
        watcher.poll(&sample(0, 10, 5, 3));
        assert_eq!(*watcher.state(), after_loss);
    }

    #[test]
    fn test_perfect_latches_once() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        for _ in 0..10 {
            assert_eq!(watcher.poll(&sample(2, 10, 0, 0)), None);
            assert!(watcher.state().stage_perfected);
        }
    }

    #[test]
    fn test_perfect_requires_spheres_left() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        watcher.poll(&sample(2, 0, 0, 0));
        assert!(!watcher.state().stage_perfected);
    }

    #[test]
    fn test_clear_emits_one_hint() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        watcher.poll(&sample(2, 1, 3, 0));

        let action = watcher.poll(&sample(0, 0, 3, 4));
        let Some(Action::CreateHint { location, outcome }) = action else {
            panic!("expected a hint action");
        };
        assert_eq!(outcome, StageCleared::Cleared);
        assert!((1..=20).contains(&location));

        let state = watcher.state();
        assert!(!state.stage_started);
        assert!(!state.stage_perfected);
        assert_eq!(state.stage_cleared, StageCleared::Cleared);

        // Result screen lingers: no further actions
        for _ in 0..5 {
            assert_eq!(watcher.poll(&sample(0, 0, 3, 4)), None);
        }
        assert_eq!(watcher.state().stage_cleared, StageCleared::Cleared);
    }

    #[test]
    fn test_perfect_clear_scenario() {
        let mut watcher = watcher();
        let mut actions = Vec::new();

        actions.extend(watcher.poll(&sample(2, 10, 5, 0)));
        actions.extend(watcher.poll(&sample(2, 10, 0, 0)));
        assert!(watcher.state().stage_perfected);
        actions.extend(watcher.poll(&sample(0, 10, 0, 4)));

        assert_eq!(actions.len(), 1);
        assert!(matches!(
            actions[0],
            Action::CreateHint {
                outcome: StageCleared::Perfect,
                ..
            }
        ));
        assert_eq!(watcher.state().stage_cleared, StageCleared::Perfect);
        assert!(!watcher.state().stage_perfected);
    }

    #[test]
    fn test_next_stage_after_clear() {
        let mut watcher = watcher();
        watcher.poll(&sample(2, 10, 5, 0));
        assert!(watcher.poll(&sample(0, 0, 5, 4)).is_some());

        watcher.poll(&sample(2, 10, 5, 0));
        assert!(watcher.state().stage_started);
        assert_eq!(watcher.state().stage_cleared, StageCleared::InProgress);
        assert!(watcher.poll(&sample(0, 0, 5, 4)).is_some());
    }

    #[test]
    fn test_clear_without_stage_start_is_ignored() {
        let mut watcher = watcher();
        assert_eq!(watcher.poll(&sample(0, 0, 0, 4)), None);
        assert!(watcher.state().game_started);
        assert_eq!(watcher.state().stage_cleared, StageCleared::None);
    }

    #[test]
    fn test_selection_excludes_hinted_locations() {
        let hinted: HintSet = (1..=20).filter(|l| l % 3 != 0).collect();
        for seed in 0..50 {
            let mut watcher = StageWatcher::with_rng(StdRng::seed_from_u64(seed));
            watcher.hints_mut().set_missing(1..=20);
            watcher.hints_mut().set_hinted(Some(hinted.clone()));

            watcher.poll(&sample(2, 10, 5, 0));
            let Some(Action::CreateHint { location, .. }) = watcher.poll(&sample(0, 0, 5, 4))
            else {
                panic!("expected a hint action");
            };
            assert!(!hinted.contains(&location));
            assert_eq!(location % 3, 0);
        }
    }

    #[test]
    fn test_empty_hintable_reports_clear_without_hint() {
        let mut watcher = watcher();
        watcher.hints_mut().set_hinted(Some((1..=20).collect()));

        watcher.poll(&sample(2, 10, 5, 0));
        let action = watcher.poll(&sample(0, 0, 5, 4));
        assert_eq!(
            action,
            Some(Action::StageCleared {
                outcome: StageCleared::Cleared
            })
        );
        assert_eq!(action.and_then(|a| a.to_message()), None);
        assert_eq!(watcher.state().stage_cleared, StageCleared::Cleared);
        assert!(!watcher.state().stage_started);
    }

    #[test]
    fn test_stage_started_implies_game_started() {
        let mut watcher = watcher();
        let samples = [
            sample(3, 0, 0, 0),
            sample(0, 0, 0, 0),
            sample(2, 10, 5, 0),
            sample(2, 10, 0, 0),
            sample(0, 10, 0, 2),
            sample(1, 8, 2, 0),
            sample(0, 1, 2, 4),
        ];
        for s in &samples {
            watcher.poll(s);
            let state = watcher.state();
            assert!(!state.stage_started || state.game_started);
            assert!(!state.stage_perfected || state.stage_started);
        }
    }

    #[test]
    fn test_action_to_message() {
        let action = Action::CreateHint {
            location: 77,
            outcome: StageCleared::Perfect,
        };
        assert_eq!(action.outcome(), StageCleared::Perfect);
        assert_eq!(
            action.to_message(),
            Some(ClientMessage::CreateHints {
                locations: vec![77]
            })
        );
    }
}
