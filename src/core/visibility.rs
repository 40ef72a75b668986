use serde::Serialize;

/// Whether the widget window is on screen. Not persisted; launch starts `Shown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    #[default]
    Shown,
    Hidden,
}

impl VisibilityState {
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Self::Shown
        } else {
            Self::Hidden
        }
    }

    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Shown => Self::Hidden,
            Self::Hidden => Self::Shown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_shown_and_toggles_back() {
        let s = VisibilityState::default();
        assert_eq!(s, VisibilityState::Shown);
        assert_eq!(s.toggled(), VisibilityState::Hidden);
        assert_eq!(s.toggled().toggled(), VisibilityState::Shown);
    }

    #[test]
    fn from_visible_matches_is_shown() {
        assert!(VisibilityState::from_visible(true).is_shown());
        assert!(!VisibilityState::from_visible(false).is_shown());
    }
}
