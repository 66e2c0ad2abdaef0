pub mod contact;
pub mod health;
pub mod metrics;
pub mod pumps;
pub mod staff;
pub mod stations;
pub mod supplies;
pub mod tanks;

use std::str::FromStr;

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::error::ApiError;

/// Success body shared by every API route.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

pub fn ok<T>(message: impl Into<String>, data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        message: message.into(),
        data,
    }))
}

pub fn created<T>(message: impl Into<String>, data: T) -> Created<T> {
    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            message: message.into(),
            data,
        }),
    ))
}

/// Parses an id taken from the URL path.
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid id '{raw}': {e}")))
}
