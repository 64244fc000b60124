use strum::{Display, FromRepr};

/// Progress of the current stage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, Display)]
#[repr(i8)]
pub enum StageCleared {
    /// No attempt yet, or the last attempt was lost
    #[default]
    #[strum(serialize = "NONE")]
    None = -1,
    #[strum(serialize = "IN PROGRESS")]
    InProgress = 0,
    #[strum(serialize = "CLEARED")]
    Cleared = 1,
    #[strum(serialize = "PERFECT")]
    Perfect = 2,
}

impl StageCleared {
    /// Terminal outcome for a clear, depending on whether the perfect latch was set
    pub fn outcome(perfected: bool) -> Self {
        if perfected { Self::Perfect } else { Self::Cleared }
    }
}

/// Per-session watcher flags, mutated only by [`StageWatcher::poll`](super::StageWatcher::poll)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatcherState {
    pub game_started: bool,
    pub stage_started: bool,
    pub stage_cleared: StageCleared,
    pub stage_perfected: bool,
}

impl WatcherState {
    /// Fresh state for a new session: no game, no stage, no outcome
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = WatcherState::new();
        assert!(!state.game_started);
        assert!(!state.stage_started);
        assert!(!state.stage_perfected);
        assert_eq!(state.stage_cleared, StageCleared::None);
    }

    #[test]
    fn test_stage_cleared_repr() {
        assert_eq!(StageCleared::from_repr(-1), Some(StageCleared::None));
        assert_eq!(StageCleared::from_repr(2), Some(StageCleared::Perfect));
        assert_eq!(StageCleared::from_repr(3), None);
        assert_eq!(StageCleared::InProgress as i8, 0);
    }

    #[test]
    fn test_outcome() {
        assert_eq!(StageCleared::outcome(false), StageCleared::Cleared);
        assert_eq!(StageCleared::outcome(true), StageCleared::Perfect);
        assert_eq!(StageCleared::Perfect.to_string(), "PERFECT");
    }
}
