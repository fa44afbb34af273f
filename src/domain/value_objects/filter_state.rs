//! Filter state value object - per-node inclusion marker
//!
//! - `IncludeAll`: the node and everything below it is backed up
//! - `ExcludeAll`: the node and everything below it is skipped
//! - `Partial`: some, but not all, descendants are included

/// Tri-state inclusion marker of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterState {
    /// Whole subtree included
    #[default]
    IncludeAll,
    /// Whole subtree excluded
    ExcludeAll,
    /// Mixed subtree
    Partial,
}

impl FilterState {
    /// Single-character code used by the tree file format
    pub fn code(&self) -> char {
        match self {
            FilterState::IncludeAll => 'I',
            FilterState::ExcludeAll => 'E',
            FilterState::Partial => 'P',
        }
    }

    /// Parse a single-character code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'I' => Some(FilterState::IncludeAll),
            'E' => Some(FilterState::ExcludeAll),
            'P' => Some(FilterState::Partial),
            _ => None,
        }
    }

    /// Parse a stored value, tolerating whitespace and trailing characters
    ///
    /// Only the first non-whitespace character is significant.
    pub fn parse_stored(value: &str) -> Option<Self> {
        value.trim().chars().next().and_then(Self::from_code)
    }

    pub fn is_included(&self) -> bool {
        matches!(self, FilterState::IncludeAll)
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, FilterState::ExcludeAll)
    }

    /// Derive a directory's state from its immediate children's states
    ///
    /// Returns `None` when there are no children; an empty directory keeps
    /// whatever state was last forced on it.
    pub fn derive(children: impl IntoIterator<Item = FilterState>) -> Option<Self> {
        let mut any = false;
        let mut all_included = true;
        let mut all_excluded = true;
        for state in children {
            any = true;
            all_included &= state.is_included();
            all_excluded &= state.is_excluded();
        }

        if !any {
            None
        } else if all_excluded {
            Some(FilterState::ExcludeAll)
        } else if all_included {
            Some(FilterState::IncludeAll)
        } else {
            Some(FilterState::Partial)
        }
    }
}

impl std::fmt::Display for FilterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterState::IncludeAll => write!(f, "include-all"),
            FilterState::ExcludeAll => write!(f, "exclude-all"),
            FilterState::Partial => write!(f, "partial"),
        }
    }
}
