//! Customer record routes.
//!
//! Every route here requires a bearer token.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use customer_registry_core::{Clock, Email, NationalId};

use crate::error::Result;
use crate::extract::{CustomerIdPath, Pagination, ValidatedJson};
use crate::middleware::RequireBearer;
use crate::models::customer::CustomerInput;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::{Validate, ValidationErrors, past_date, person_name, required_text};

/// Build the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list_all).post(create))
        .route("/api/customers/search", get(search))
        .route(
            "/api/customers/identifier/{identifier}",
            get(get_by_identifier),
        )
        .route(
            "/api/customers/{id}",
            get(get_by_id).put(update).delete(delete),
        )
}

// =============================================================================
// Request Types
// =============================================================================

/// Body of create and update requests.
///
/// Every field is optional at the JSON level so that missing fields are
/// reported alongside the other validation failures.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
}

impl Validate for CustomerRequest {
    type Output = CustomerInput;

    fn validate(self, clock: &dyn Clock) -> std::result::Result<CustomerInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let identifier = errors.check(
            "identifier",
            required_text(self.identifier).and_then(|raw| {
                NationalId::parse(&raw)
                    .map(|_| raw)
                    .map_err(|e| e.to_string())
            }),
        );
        let name = errors.check("name", person_name(self.name));
        let birth_date = errors.check("birth_date", past_date(self.birth_date, clock.today()));
        let email = errors.check(
            "email",
            required_text(self.email).and_then(|raw| {
                Email::parse(&raw).map_err(|_| "must be a well-formed email address".to_owned())
            }),
        );

        match (identifier, name, birth_date, email) {
            (Some(identifier), Some(name), Some(birth_date), Some(email)) if errors.is_empty() => {
                Ok(CustomerInput {
                    identifier,
                    name,
                    birth_date,
                    email,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn create(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    ValidatedJson(input): ValidatedJson<CustomerRequest>,
) -> Result<Response> {
    let customer = state.customer_service().create(input).await?;
    Ok(ApiResponse::success(customer).with_status(StatusCode::CREATED))
}

async fn update(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    CustomerIdPath(id): CustomerIdPath,
    ValidatedJson(input): ValidatedJson<CustomerRequest>,
) -> Result<Response> {
    let customer = state.customer_service().update(id, input).await?;
    Ok(ApiResponse::success(customer).with_status(StatusCode::OK))
}

async fn delete(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    CustomerIdPath(id): CustomerIdPath,
) -> Result<Response> {
    state.customer_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn get_by_id(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    CustomerIdPath(id): CustomerIdPath,
) -> Result<Response> {
    let customer = state.customer_service().get_by_id(id).await?;
    Ok(ApiResponse::success(customer).with_status(StatusCode::OK))
}

async fn get_by_identifier(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    Path(identifier): Path<String>,
) -> Result<Response> {
    let customer = state
        .customer_service()
        .get_by_identifier(identifier.trim())
        .await?;
    Ok(ApiResponse::success(customer).with_status(StatusCode::OK))
}

async fn search(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    Query(query): Query<NameQuery>,
    Pagination(page): Pagination,
) -> Result<Response> {
    let fragment = query.name.unwrap_or_default();
    let customers = state
        .customer_service()
        .list_by_name(&fragment, &page)
        .await?;
    Ok(ApiResponse::success(customers).with_status(StatusCode::OK))
}

async fn list_all(
    State(state): State<AppState>,
    RequireBearer(_): RequireBearer,
    Pagination(page): Pagination,
) -> Result<Response> {
    let customers = state.customer_service().list_all(&page).await?;
    Ok(ApiResponse::success(customers).with_status(StatusCode::OK))
}
