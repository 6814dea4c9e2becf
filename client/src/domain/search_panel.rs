//! Expandable search panel sitting in front of the query coordinator.
//!
//! The panel only decides whether it is open; every edit goes straight to the
//! coordinator, which owns the filters and the debounce.

use std::sync::Arc;

use super::{FilterField, FilterPatch, QueryCoordinator};

/// Visibility of the filter inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// Only the search affordance is shown.
    #[default]
    Collapsed,
    /// Filter inputs are shown.
    Expanded,
}

/// Open/closed state of the filter inputs.
pub struct SearchPanel {
    coordinator: Arc<QueryCoordinator>,
    state: PanelState,
}

impl SearchPanel {
    /// Collapsed panel editing `coordinator`'s filters.
    pub fn new(coordinator: Arc<QueryCoordinator>) -> Self {
        Self {
            coordinator,
            state: PanelState::Collapsed,
        }
    }

    /// Current visibility.
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Return whether the inputs are shown.
    pub fn is_expanded(&self) -> bool {
        self.state == PanelState::Expanded
    }

    /// Show the inputs.
    pub fn expand(&mut self) {
        self.state = PanelState::Expanded;
    }

    /// Forward a one-field edit, opening the panel if needed.
    pub fn edit(&mut self, field: FilterField, value: impl Into<String>) {
        self.expand();
        self.coordinator.set_filter(FilterPatch::field(field, value));
    }

    /// A click outside the panel. Active filters keep it open.
    pub fn outside_click(&mut self) {
        self.collapse_if_idle();
    }

    /// Escape key. Same rule as an outside click.
    pub fn escape(&mut self) {
        self.collapse_if_idle();
    }

    /// Reset every filter and collapse. The query follows after the usual
    /// quiet period.
    pub fn clear(&mut self) {
        self.coordinator.set_filter(FilterPatch::clear_all());
        self.state = PanelState::Collapsed;
    }

    /// Number of filter fields carrying a constraint, for the badge.
    pub fn active_filter_count(&self) -> usize {
        self.coordinator.filters().active_count()
    }

    fn collapse_if_idle(&mut self) {
        if self.active_filter_count() == 0 {
            self.state = PanelState::Collapsed;
        }
    }
}
