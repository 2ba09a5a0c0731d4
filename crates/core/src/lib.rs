pub mod error;
pub mod state;

pub use error::{MonError, Result};
pub use state::SystemSnapshot;
