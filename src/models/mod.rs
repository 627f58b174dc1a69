pub mod enums;
pub mod input;
pub mod profile;
pub mod ingredient;
pub mod verdict;
pub mod report;

pub use enums::*;
pub use input::*;
pub use profile::*;
pub use ingredient::*;
pub use verdict::*;
pub use report::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Unrecognized health condition: {0}")]
    UnknownCondition(String),
}
