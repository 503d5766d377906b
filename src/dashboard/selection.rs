//! Selection of instruments for bulk actions
//!
//! A selection is always read against the currently filtered view. Toggling
//! and selecting never prune on their own: an id that leaves the view stays
//! selected until [`Selection::retain_visible`] runs. Bulk actions call
//! `retain_visible` first, so they only ever touch instruments the user can
//! see.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppError, models::Instrument};

/// Checkbox action applied to a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAction {
    /// Flip one id; needs `id`
    Toggle,
    SelectAll,
    ToggleAll,
    Clear,
    /// Only re-read the selection against the view
    Refresh,
}

/// Selection as seen from one filtered view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SelectionState {
    pub selected: Vec<String>,
    pub selected_count: usize,
    pub all_selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Flip membership of `id`
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.shift_remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Replace the selection with exactly the visible ids
    pub fn select_all(&mut self, visible: &[Instrument]) {
        self.ids = visible.iter().map(|inst| inst.id.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Select/deselect-all checkbox: clears when everything visible is
    /// already selected, otherwise selects the visible set
    pub fn toggle_all(&mut self, visible: &[Instrument]) {
        if self.ids.len() == visible.len() {
            self.clear();
        } else {
            self.select_all(visible);
        }
    }

    /// Drop ids that are not part of the visible view
    pub fn retain_visible(&mut self, visible: &[Instrument]) {
        self.ids.retain(|id| visible.iter().any(|inst| &inst.id == id));
    }

    pub fn is_all_selected(&self, visible: &[Instrument]) -> bool {
        !self.ids.is_empty() && self.ids.len() == visible.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Parse a comma-separated id list; blanks are skipped
    pub fn parse_list(list: &str) -> Self {
        Self::from_ids(list.split(',').map(str::trim).filter(|id| !id.is_empty()))
    }

    pub fn apply(
        &mut self,
        action: SelectionAction,
        id: Option<&str>,
        visible: &[Instrument],
    ) -> Result<(), AppError> {
        match action {
            SelectionAction::Toggle => {
                let id = id.ok_or_else(|| AppError::BadRequest("Toggle needs an instrument id".to_string()))?;
                self.toggle(id);
            }
            SelectionAction::SelectAll => self.select_all(visible),
            SelectionAction::ToggleAll => self.toggle_all(visible),
            SelectionAction::Clear => self.clear(),
            SelectionAction::Refresh => {}
        }
        Ok(())
    }

    /// Prune to `visible` and report counts against it
    pub fn state_in(mut self, visible: &[Instrument]) -> SelectionState {
        self.retain_visible(visible);
        SelectionState {
            all_selected: self.is_all_selected(visible),
            selected_count: self.len(),
            selected: self.ids.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::filter::{filter_and_sort, InstrumentFilter};
    use crate::models::InstrumentStatus;
    use chrono::Utc;

    fn inst(id: &str, location: &str) -> Instrument {
        Instrument {
            id: id.to_string(),
            name: format!("Instrument {}", id),
            instrument_type: "Balance".to_string(),
            serial_number: id.to_string(),
            location: location.to_string(),
            status: InstrumentStatus::Available,
            last_maintenance: Utc::now(),
            next_maintenance: Utc::now(),
        }
    }

    fn inventory() -> Vec<Instrument> {
        vec![inst("1", "Lab A"), inst("2", "Lab A"), inst("3", "Lab B")]
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut selection = Selection::new();
        selection.toggle("1");
        assert!(selection.contains("1"));
        selection.toggle("1");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_replaces() {
        let all = inventory();
        let mut selection = Selection::from_ids(["stale"]);
        selection.select_all(&all);
        assert_eq!(selection.len(), 3);
        assert!(!selection.contains("stale"));
        assert!(selection.is_all_selected(&all));
    }

    #[test]
    fn test_toggle_all_clears_when_everything_selected() {
        let all = inventory();
        let mut selection = Selection::new();
        selection.toggle_all(&all);
        assert!(selection.is_all_selected(&all));
        selection.toggle_all(&all);
        assert!(selection.is_empty());
        assert!(!selection.is_all_selected(&all));
    }

    #[test]
    fn test_narrowing_filter_after_select_all() {
        let all = inventory();
        let mut selection = Selection::new();
        selection.select_all(&all);

        let narrowed = filter_and_sort(
            &all,
            &InstrumentFilter {
                location: Some("Lab B".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(narrowed.len(), 1);

        // hidden ids are still held until the view prunes them
        assert_eq!(selection.len(), 3);
        assert!(!selection.is_all_selected(&narrowed));

        selection.retain_visible(&narrowed);
        assert_eq!(selection.len(), 1);
        assert!(selection.is_all_selected(&narrowed));
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn test_apply_actions() {
        let all = inventory();
        let mut selection = Selection::parse_list("1, ,3,");
        assert_eq!(selection.len(), 2);

        selection.apply(SelectionAction::Toggle, Some("2"), &all).unwrap();
        assert!(selection.is_all_selected(&all));
        selection.apply(SelectionAction::ToggleAll, None, &all).unwrap();
        assert!(selection.is_empty());
        selection.apply(SelectionAction::SelectAll, None, &all).unwrap();
        assert_eq!(selection.len(), 3);
        selection.apply(SelectionAction::Clear, None, &all).unwrap();
        assert!(selection.is_empty());

        assert!(matches!(
            selection.apply(SelectionAction::Toggle, None, &all),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_state_is_pruned_to_view() {
        let all = inventory();
        let narrowed: Vec<Instrument> = all.iter().filter(|i| i.location == "Lab A").cloned().collect();
        let state = Selection::from_ids(["3", "1"]).state_in(&narrowed);
        assert_eq!(state.selected, vec!["1"]);
        assert_eq!(state.selected_count, 1);
        assert!(!state.all_selected);
    }

    #[test]
    fn test_empty_view_is_never_all_selected() {
        let selection = Selection::new();
        assert!(!selection.is_all_selected(&[]));
    }
}
