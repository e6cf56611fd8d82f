//! Request extractors that reject with the JSON error envelope.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};

use customer_registry_core::{CustomerId, PageRequest};

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{Validate, ValidationErrors};

/// JSON body that has passed its [`Validate`] pass.
///
/// A body that is not valid JSON for `T` is rejected as `BAD_FORMAT_JSON`;
/// a body that parses but breaks field rules is rejected as `VALIDATION_ERROR`.
pub struct ValidatedJson<T: Validate>(pub T::Output);

impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: Validate + DeserializeOwned + Send,
    T::Output: Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let detail = rejection.body_text();
                tracing::debug!(error = %detail, "Rejected request body");
                AppError::BadFormatJson(detail)
            })?;

        body.validate(state.clock())
            .map(Self)
            .map_err(AppError::Validation)
    }
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
}

/// Pagination parameters from the query string.
///
/// Invalid values are reported under their parameter name.
pub struct Pagination(pub PageRequest);

impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadFormatJson(rejection.body_text()))?;

        PageRequest::from_query(
            params.page.as_deref(),
            params.size.as_deref(),
            params.sort.as_deref(),
        )
        .map(Self)
        .map_err(|problems| {
            let mut errors = ValidationErrors::new();
            for problem in problems {
                errors.add(problem.field(), problem.to_string());
            }
            AppError::Validation(errors)
        })
    }
}

/// Customer ID from the `{id}` path segment.
pub struct CustomerIdPath(pub CustomerId);

impl<S: Send + Sync> FromRequestParts<S> for CustomerIdPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                let mut errors = ValidationErrors::new();
                errors.add("id", "must be an integer");
                AppError::Validation(errors)
            })?;

        Ok(Self(CustomerId::new(id)))
    }
}
