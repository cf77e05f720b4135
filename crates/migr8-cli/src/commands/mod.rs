//! Command implementations.
//!
//! - [`run`] - Migrate the project
//! - [`list`] - Print the rule catalogue

pub mod list;
pub mod run;

pub use list::execute as list_execute;
pub use run::{CANCELLED_MESSAGE, execute as run_execute};
