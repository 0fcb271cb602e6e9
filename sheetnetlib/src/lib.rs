pub mod error;
pub mod neural_network;
pub mod files;
pub mod config;
pub mod session;

pub mod prelude {
    pub use super::error::{Error, Result};

    pub use super::neural_network::prelude::*;

    pub use super::files::weights::{load_weights, save_weights};
    pub use super::files::cases::{load_cases, save_cases};
    pub use super::files::truth_table::{parse_truth_table, convert_truth_table};

    pub use super::config::prelude::*;
    pub use super::session::*;
}
