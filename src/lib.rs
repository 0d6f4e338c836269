//! # vetted
//!
//! Schema validation around HTTP handlers. A handler wrapped with
//! [`middleware::validate_schema`] never sees a malformed request, and a
//! caller never receives a malformed response.
//!
//! ## The contract
//!
//! - **Bad request body** — `422` with one message per failing field. The
//!   handler does not run.
//! - **Body that is not JSON** — `400`.
//! - **Bad response body** — `500` with a generic message. Field errors go to
//!   the log, not to the caller.
//! - **Handler runs once** — the response that passed validation is the
//!   response that is sent.
//!
//! Extra keys not declared in a [`schema::Schema`] are ignored.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vetted::middleware::validate_schema;
//! use vetted::schema::{FieldType, Schema};
//! use vetted::{IntoResponse, Json, Method, Request, Response, Router, Server, Status};
//!
//! #[tokio::main]
//! async fn main() {
//!     let body = Arc::new(Schema::new("Signup").field("email", FieldType::String));
//!     let reply = Arc::new(Schema::new("Signed").field("email", FieldType::String));
//!
//!     let app = Router::new()
//!         .on(Method::Post, "/signup", validate_schema(signup, Some(body), Some(reply)));
//!
//!     Server::bind(([127, 0, 0, 1], 5000).into()).serve(app).await.unwrap();
//! }
//!
//! async fn signup(req: Request) -> Response {
//!     let email = req.validated().and_then(|v| v.str("email")).unwrap_or_default();
//!     (Status::Created, Json(serde_json::json!({ "email": email }))).into_response()
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod middleware;
pub mod schema;
pub mod user;
pub mod validate;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
