//! Output generation for the calendar feed.
//!
//! # Submodules
//!
//! - [`ics`]: Renders [`crate::models::GameRecord`]s into an iCalendar document
//! - [`json`]: Optional JSON dump of the same records
//!
//! # Output Structure
//!
//! ```text
//! ics/
//! ├── game_release.ics   # always written
//! └── games.json         # only with --json-output
//! ```

pub mod ics;
pub mod json;
