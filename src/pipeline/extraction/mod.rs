pub mod sanitize;
pub mod value;
pub mod sections;
pub mod llm_response;
pub mod extractor;

pub use sanitize::*;
pub use value::*;
pub use sections::*;
pub use llm_response::*;
pub use extractor::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}
