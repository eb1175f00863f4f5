//! Boat tile
//!
//! Renders one catalog item. Activation emits `boatselect` and keeps a local
//! hint so the tile highlights immediately; the container's authoritative
//! selection overwrites the hint when it propagates back down.

use crate::events::{EventSink, UiEvent};
use crate::model::BoatRecord;

pub const TILE_WRAPPER_SELECTED_CLASS: &str = "tile-wrapper selected";
pub const TILE_WRAPPER_UNSELECTED_CLASS: &str = "tile-wrapper";

/// A tile is selected iff its boat is the current selection
pub fn is_tile_selected(boat: &BoatRecord, current_selection: Option<&str>) -> bool {
    current_selection == Some(boat.id.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectableTile {
    boat: BoatRecord,
    selected_boat_id: Option<String>,
}

impl SelectableTile {
    pub fn new(boat: BoatRecord, current_selection: Option<&str>) -> Self {
        Self {
            boat,
            selected_boat_id: current_selection.map(str::to_string),
        }
    }

    pub fn boat(&self) -> &BoatRecord {
        &self.boat
    }

    pub fn is_selected(&self) -> bool {
        is_tile_selected(&self.boat, self.selected_boat_id.as_deref())
    }

    pub fn tile_class(&self) -> &'static str {
        if self.is_selected() {
            TILE_WRAPPER_SELECTED_CLASS
        } else {
            TILE_WRAPPER_UNSELECTED_CLASS
        }
    }

    pub fn background_style(&self) -> String {
        format!(
            "background-image: url({})",
            self.boat.picture_url.as_deref().unwrap_or_default()
        )
    }

    /// Emit `boatselect` for this boat and highlight locally
    pub fn on_activate(&mut self, sink: &EventSink) {
        self.selected_boat_id = Some(self.boat.id.clone());
        sink.emit(UiEvent::BoatSelect {
            boat_id: self.boat.id.clone(),
        });
    }

    /// Take the authoritative selection from the container
    pub fn sync_selection(&mut self, current_selection: Option<&str>) {
        self.selected_boat_id = current_selection.map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str, selection: Option<&str>) -> SelectableTile {
        let mut boat = BoatRecord::new(id, "Sea Breeze");
        boat.picture_url = Some(format!("https://img/{id}.png"));
        SelectableTile::new(boat, selection)
    }

    #[test]
    fn selection_is_id_equality() {
        assert!(tile("b1", Some("b1")).is_selected());
        assert!(!tile("b1", Some("b2")).is_selected());
        assert!(!tile("b1", None).is_selected());
        assert_eq!(tile("b1", Some("b1")).tile_class(), "tile-wrapper selected");
        assert_eq!(tile("b1", None).tile_class(), "tile-wrapper");
    }

    #[test]
    fn activation_emits_once_and_highlights() {
        let (sink, mut rx) = EventSink::channel();
        let mut t = tile("b1", Some("b2"));

        t.on_activate(&sink);

        assert!(t.is_selected());
        assert_eq!(
            rx.try_recv().unwrap(),
            UiEvent::BoatSelect {
                boat_id: "b1".into()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn authoritative_selection_overrides_hint() {
        let (sink, _rx) = EventSink::channel();
        let mut t = tile("b1", None);
        t.on_activate(&sink);

        t.sync_selection(Some("b7"));
        assert!(!t.is_selected());
    }

    #[test]
    fn background_uses_picture_url() {
        assert_eq!(
            tile("b1", None).background_style(),
            "background-image: url(https://img/b1.png)"
        );
    }
}
