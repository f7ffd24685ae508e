//! Plain data structures flowing through a table pipeline.

pub mod params;
pub mod state;
pub mod table;
pub mod ui_state;

pub use params::*;
pub use state::*;
pub use table::*;
pub use ui_state::*;
