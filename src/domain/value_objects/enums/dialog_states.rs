use std::fmt::Display;
use serde::{Deserialize, Serialize};

/// Open modes the confirm-delete step can fall back to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OpenMode {
    Create,
    Edit,
}

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    OpenForCreate,
    OpenForEdit,
    ConfirmDelete { return_to: OpenMode },
}

impl DialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn from_open_mode(mode: OpenMode) -> Self {
        match mode {
            OpenMode::Create => DialogState::OpenForCreate,
            OpenMode::Edit => DialogState::OpenForEdit,
        }
    }

    pub fn open_mode(&self) -> Option<OpenMode> {
        match self {
            DialogState::OpenForCreate => Some(OpenMode::Create),
            DialogState::OpenForEdit => Some(OpenMode::Edit),
            DialogState::Closed | DialogState::ConfirmDelete { .. } => None,
        }
    }
}

impl Display for DialogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            DialogState::Closed => "closed",
            DialogState::OpenForCreate => "open-for-create",
            DialogState::OpenForEdit => "open-for-edit",
            DialogState::ConfirmDelete { .. } => "open-for-confirm-delete",
        };
        write!(f, "{}", state)
    }
}
