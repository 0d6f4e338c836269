//! The `POST /user` demo endpoint.
//!
//! ```text
//! POST /user  {"name": "Ann", "age": 30, "email": "a@b.com"}
//!   → 201     {"id": "<uuid v4>", "name": "Ann", "timestamp": "2026-10-18 09:15:02"}
//!   → 422     {"message": "Invalid request body.", "errors": {"age": "field required"}}
//! ```

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::validate_schema;
use crate::response::{IntoResponse, Json, Response};
use crate::schema::{FieldType, Schema};
use crate::{Method, Request, Router, Status};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
pub struct User {
    pub name: String,
    pub age: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub timestamp: String,
}

pub fn user_schema() -> Schema {
    Schema::new("User")
        .field("name", FieldType::String)
        .field("age", FieldType::Integer)
        .field("email", FieldType::String)
}

pub fn user_response_schema() -> Schema {
    Schema::new("UserResponse")
        .field("id", FieldType::String)
        .field("name", FieldType::String)
        .field("timestamp", FieldType::Timestamp)
}

/// Creates a user record from an already-validated payload.
pub async fn create_user(req: Request) -> Response {
    let Some(Ok(user)) = req.validated().map(|v| v.decode::<User>()) else {
        // Only reachable when mounted without the request schema.
        return Response::status(Status::BadRequest);
    };

    let body = UserResponse {
        id: Uuid::new_v4().to_string(),
        name: user.name,
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    };
    (Status::Created, Json(body)).into_response()
}

/// Router with `POST /user` validated against both schemas.
pub fn router() -> Router {
    Router::new().on(
        Method::Post,
        "/user",
        validate_schema(
            create_user,
            Some(Arc::new(user_schema())),
            Some(Arc::new(user_response_schema())),
        ),
    )
}
