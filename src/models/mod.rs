pub mod enums;
pub mod metric;
pub mod schema;
pub mod threshold;

pub use enums::*;
pub use metric::*;
pub use schema::*;
pub use threshold::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
