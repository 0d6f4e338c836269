//! Middleware layer.
//!
//! Middleware wraps a handler and returns a handler, so it composes by plain
//! function application and registers on the router like any other route.

mod validate;

pub use validate::{
    INVALID_REQUEST, MALFORMED_JSON, PROCESSING_ERROR, ValidateSchema, validate_schema,
};
