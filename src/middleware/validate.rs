//! Request / response schema validation around a single handler.
//!
//! ```text
//! request ──► body JSON? ──no──► 400 {"message": "Malformed JSON body."}
//!               │yes
//!               ▼
//!         request schema ──fail──► 422 {"message": "Invalid request body.", "errors": {…}}
//!               │ok (payload attached to Request::validated)
//!               ▼
//!           handler  (runs exactly once)
//!               │
//!               ▼
//!         response schema ──fail──► 500 {"message": "there was an error while processing you request."}
//!               │ok
//!               ▼
//!        handler's response, untouched
//! ```
//!
//! Either schema is optional; a missing schema skips its check. Response
//! field errors are logged, never sent: a response that breaks its own
//! schema is a server bug, not something the caller can fix.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::schema::Schema;
use crate::status::Status;
use crate::validate::{FieldErrors, Validated, validate};

pub const INVALID_REQUEST: &str = "Invalid request body.";
pub const MALFORMED_JSON: &str = "Malformed JSON body.";
/// Wording kept byte-for-byte for existing clients.
pub const PROCESSING_ERROR: &str = "there was an error while processing you request.";

/// Wraps `handler` with optional request and response schemas.
///
/// ```rust
/// use std::sync::Arc;
/// use vetted::middleware::validate_schema;
/// use vetted::schema::{FieldType, Schema};
/// use vetted::{Method, Request, Router, Status};
///
/// async fn ping(_req: Request) -> Status { Status::NoContent }
///
/// let body = Arc::new(Schema::new("Ping").field("seq", FieldType::Integer));
/// let app = Router::new().on(Method::Post, "/ping", validate_schema(ping, Some(body), None));
/// ```
pub fn validate_schema(
    handler: impl Handler,
    request: Option<Arc<Schema>>,
    response: Option<Arc<Schema>>,
) -> impl Handler {
    ValidateSchema { inner: handler.into_boxed_handler(), request, response }.into_handler()
}

/// Builder form of [`validate_schema`].
///
/// ```rust
/// # use vetted::middleware::ValidateSchema;
/// # use vetted::schema::{FieldType, Schema};
/// # use vetted::{Request, Status};
/// # async fn ping(_req: Request) -> Status { Status::NoContent }
/// let wrapped = ValidateSchema::new(ping)
///     .request(Schema::new("Ping").field("seq", FieldType::Integer))
///     .into_handler();
/// ```
pub struct ValidateSchema {
    inner: BoxedHandler,
    request: Option<Arc<Schema>>,
    response: Option<Arc<Schema>>,
}

impl ValidateSchema {
    pub fn new(handler: impl Handler) -> Self {
        Self { inner: handler.into_boxed_handler(), request: None, response: None }
    }

    pub fn request(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.request = Some(schema.into());
        self
    }

    pub fn response(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.response = Some(schema.into());
        self
    }

    pub fn into_handler(self) -> impl Handler {
        let this = Arc::new(self);
        move |req: Request| {
            let this = Arc::clone(&this);
            async move { this.call(req).await }
        }
    }

    async fn call(&self, mut req: Request) -> Response {
        if let Some(schema) = &self.request {
            match check_request(&req, schema) {
                Ok(validated) => req.validated = Some(validated),
                Err(rejection) => return rejection,
            }
        }

        let res = self.inner.call(req).await;

        match &self.response {
            Some(schema) => check_response(res, schema),
            None => res,
        }
    }
}

fn check_request(req: &Request, schema: &Schema) -> Result<Validated, Response> {
    let payload = req.json().map_err(|e| {
        warn!(path = %req.path(), schema = schema.name(), "request body is not JSON: {e}");
        reject(Status::BadRequest, MALFORMED_JSON, None)
    })?;

    validate(&payload, schema).map_err(|errors| {
        warn!(path = %req.path(), schema = schema.name(), %errors, "request rejected");
        reject(Status::UnprocessableContent, INVALID_REQUEST, Some(&errors))
    })
}

fn check_response(res: Response, schema: &Schema) -> Response {
    let outcome = res
        .body_json()
        .map_err(|e| format!("body is not JSON: {e}"))
        .and_then(|body| validate(&body, schema).map_err(|errors| errors.to_string()));

    match outcome {
        Ok(_) => {
            debug!(schema = schema.name(), status = res.status_code(), "response validated");
            res
        }
        Err(reason) => {
            error!(schema = schema.name(), status = res.status_code(), "response failed validation: {reason}");
            reject(Status::InternalServerError, PROCESSING_ERROR, None)
        }
    }
}

#[derive(Serialize)]
struct Rejection<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

fn reject(status: Status, message: &str, errors: Option<&FieldErrors>) -> Response {
    Response::builder()
        .status(status)
        .json_value(&Rejection { message, errors })
}
