//! The four browser components
//!
//! Components never reference each other. They emit [`UiEvent`](crate::events::UiEvent)s
//! that the container routes, and receive their inputs through plain method
//! calls.

pub mod near_me;
pub mod results;
pub mod tile;
pub mod type_filter;

pub use near_me::{GeoMapOverlay, NearQuery, OverlayState};
pub use results::{ResultsCoordinator, SearchApplied, SearchTicket};
pub use tile::SelectableTile;
pub use type_filter::TypeFilterSource;
