//! Events produced by playback transitions

/// Events emitted by the sequencer when its state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Run lifecycle
    /// Playback (re)started from the first step
    Started,
    /// User paused playback
    Paused,
    /// User resumed playback
    Resumed,
    /// Playback returned to idle defaults
    Reset,

    // Step progression
    /// A new step became current (by tick or skip)
    StepAdvanced { index: usize },
    /// The last step completed or total time ran out
    Finished,
}

impl Event {
    /// Check if this event can only come from a user action
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            Event::Started | Event::Paused | Event::Resumed | Event::Reset
        )
    }

    /// Check if this event opens a new playback run
    pub fn begins_run(&self) -> bool {
        matches!(self, Event::Started)
    }

    /// Check if this event closes the current playback run
    pub fn ends_run(&self) -> bool {
        matches!(self, Event::Finished | Event::Reset)
    }

    /// Check if this event changes the playback phase
    pub fn is_transition(&self) -> bool {
        !matches!(self, Event::StepAdvanced { .. })
    }

    /// Check if this event changes the current step or its target
    pub fn changes_step(&self) -> bool {
        matches!(
            self,
            Event::Started | Event::StepAdvanced { .. } | Event::Reset
        )
    }
}
