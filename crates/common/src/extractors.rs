//! Custom axum extractors
//!
//! Both extractors deserialize, then run `validator` rules, and report
//! every input problem as `Error::Validation` so clients always receive
//! the JSON error body with a 400.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::Error;

/// JSON body extractor that validates the deserialized value.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// Query string extractor that validates the deserialized value.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

/// Rejection shared by the validating extractors
#[derive(Debug)]
pub enum ValidationRejection {
    Json(JsonRejection),
    Query(QueryRejection),
    Invalid(Error),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        match self {
            ValidationRejection::Json(e) => Error::Validation(e.body_text()).into_response(),
            ValidationRejection::Query(e) => Error::Validation(e.body_text()).into_response(),
            ValidationRejection::Invalid(e) => e.into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value
            .validate()
            .map_err(|e| ValidationRejection::Invalid(e.into()))?;
        Ok(ValidatedJson(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value
            .validate()
            .map_err(|e| ValidationRejection::Invalid(e.into()))?;
        Ok(ValidatedQuery(value))
    }
}
