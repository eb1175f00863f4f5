//! Render functions for each screen region
//!
//! Each component takes the slice of state it draws and the area to draw it
//! in; none of them mutate application state.

pub mod filter_bar;
pub mod logs_panel;
pub mod near_me_panel;
pub mod results_table;
pub mod status_bar;
pub mod toast;
