/// Which top-level screen the simulation is running under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScreenMode {
    /// Regular park play.
    #[default]
    Playing,
    /// Scenario editor.
    ScenarioEditor,
    /// Track designer.
    TrackDesigner,
}

impl ScreenMode {
    /// Editor screens permit world-authoring actions.
    pub const fn is_editor(self) -> bool {
        matches!(self, Self::ScenarioEditor | Self::TrackDesigner)
    }

    pub(crate) const fn as_byte(self) -> u8 {
        match self {
            Self::Playing => 0,
            Self::ScenarioEditor => 1,
            Self::TrackDesigner => 2,
        }
    }
}

/// Session-wide mode flags consulted by action admission and queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionState {
    pub mode: ScreenMode,
    pub paused: bool,
    /// Sandbox cheat: lifts editor-only restrictions during play.
    pub sandbox: bool,
}

impl SessionState {
    pub const fn new(mode: ScreenMode) -> Self {
        Self {
            mode,
            paused: false,
            sandbox: false,
        }
    }

    /// True when editor-only actions are admissible.
    pub const fn allows_editor_actions(&self) -> bool {
        self.mode.is_editor() || self.sandbox
    }
}
