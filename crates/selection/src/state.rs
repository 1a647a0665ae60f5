use serde::{Deserialize, Serialize};

/// Selection state of one map view. There is no terminal state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NoSelection,
    SelectedWithMatch,
    /// A location is set but the current collection has no matching listing,
    /// e.g. after paging away from it.
    SelectedNoMatch,
}

impl SelectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionState::NoSelection => "no_selection",
            SelectionState::SelectedWithMatch => "selected_with_match",
            SelectionState::SelectedNoMatch => "selected_no_match",
        }
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
