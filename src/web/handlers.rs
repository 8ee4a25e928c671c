use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::{compute_with, merge_with, missing_fields, sensitivity_with, Feasibility};
use crate::error::FeasibilityError;
use crate::models::{ParameterPatch, ParameterSet};
use crate::rates::RateQuote;

use super::state::AppState;

// ---------------------------------------------------------------------------
// Error wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: String,
}

#[derive(Debug)]
pub(crate) struct WebError(FeasibilityError);

impl From<FeasibilityError> for WebError {
    fn from(e: FeasibilityError) -> Self {
        WebError(e)
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            FeasibilityError::ValidationError(_)
            | FeasibilityError::ParseError(_)
            | FeasibilityError::Json(_)
            | FeasibilityError::Toml(_)
            | FeasibilityError::Csv(_) => StatusCode::BAD_REQUEST,
            FeasibilityError::NotFound(_) => StatusCode::NOT_FOUND,
            FeasibilityError::MissingField(_) | FeasibilityError::InvalidEnum { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FeasibilityError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            details: self.0.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// A stored scenario as returned to the caller.
#[derive(Debug, Serialize)]
struct ScenarioView {
    id: Uuid,
    params: ParameterSet,
    missing: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Feasibility>,
    /// Set when the scenario is complete but still cannot be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ScenarioView {
    fn new(id: Uuid, params: ParameterSet) -> Self {
        Self {
            id,
            missing: missing_fields(&params),
            params,
            result: None,
            error: None,
        }
    }

    /// Attach a computation once every mandatory field is present.
    fn with_result(mut self, state: &AppState) -> Self {
        if self.missing.is_empty() {
            let rate = state.effective_rate(None);
            match compute_with(&self.params, rate, state.defaults()) {
                Ok(result) => self.result = Some(result),
                Err(e) => self.error = Some(e.to_string()),
            }
        }
        self
    }
}

/// Body of the stateless compute and sensitivity endpoints.
#[derive(Debug, Deserialize)]
struct ComputeRequest {
    params: ParameterPatch,
    #[serde(default)]
    exchange_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RateUpdate {
    rate: Option<f64>,
    #[serde(default)]
    as_of_date: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a patch body; an empty body is an empty patch.
fn parse_patch(body: &[u8]) -> Result<ParameterPatch, FeasibilityError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ParameterPatch::default());
    }
    let value: serde_json::Value = serde_json::from_slice(body)?;
    ParameterPatch::from_json(&value)
}

fn parse_compute_request(body: &[u8]) -> Result<(ParameterSet, Option<f64>), FeasibilityError> {
    let request: ComputeRequest = serde_json::from_slice(body)?;
    let mut params = ParameterSet::new();
    request.params.apply_to(&mut params);
    Ok((params, request.exchange_rate))
}

fn not_found(id: &Uuid) -> WebError {
    WebError(FeasibilityError::NotFound(format!("Scenario {id} not found")))
}

fn stored_scenario(state: &AppState, id: &Uuid) -> Result<ParameterSet, WebError> {
    state.get_scenario(id).ok_or_else(|| not_found(id))
}

// ---------------------------------------------------------------------------
// Scenario sessions
// ---------------------------------------------------------------------------

pub async fn create_scenario(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, WebError> {
    let patch = parse_patch(&body)?;
    let params = merge_with(&ParameterSet::new(), &patch, state.defaults());
    let id = Uuid::new_v4();
    state.insert_scenario(id, params.clone());

    let view = ScenarioView::new(id, params);
    info!(%id, missing = view.missing.len(), "created scenario");
    Ok(HttpResponse::Created().json(view))
}

pub async fn get_scenario(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let params = stored_scenario(&state, &id)?;
    Ok(HttpResponse::Ok().json(ScenarioView::new(id, params)))
}

pub async fn patch_scenario(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let patch = parse_patch(&body)?;
    let params = state
        .update_scenario(&id, |current| merge_with(current, &patch, state.defaults()))
        .ok_or_else(|| not_found(&id))?;
    Ok(HttpResponse::Ok().json(ScenarioView::new(id, params).with_result(&state)))
}

pub async fn scenario_feasibility(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let params = stored_scenario(&state, &id)?;
    let result = compute_with(&params, state.effective_rate(None), state.defaults())?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn scenario_sensitivity(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let params = stored_scenario(&state, &id)?;
    let grid = sensitivity_with(&params, state.effective_rate(None), state.defaults())?;
    Ok(HttpResponse::Ok().json(grid))
}

// ---------------------------------------------------------------------------
// Stateless computation
// ---------------------------------------------------------------------------

pub async fn compute(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, WebError> {
    let (params, rate) = parse_compute_request(&body)?;
    let result = compute_with(&params, state.effective_rate(rate), state.defaults())?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn sensitivity(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, WebError> {
    let (params, rate) = parse_compute_request(&body)?;
    let grid = sensitivity_with(&params, state.effective_rate(rate), state.defaults())?;
    Ok(HttpResponse::Ok().json(grid))
}

// ---------------------------------------------------------------------------
// Exchange rate
// ---------------------------------------------------------------------------

pub async fn get_exchange_rate(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.exchange_rate())
}

pub async fn put_exchange_rate(
    state: web::Data<AppState>,
    body: web::Json<RateUpdate>,
) -> Result<HttpResponse, WebError> {
    let update = body.into_inner();
    let quote = RateQuote {
        rate: update.rate,
        as_of_date: update.as_of_date,
        source: update.source.unwrap_or_else(|| "manual".to_string()),
    };
    state.set_exchange_rate(quote)?;
    info!(rate = ?update.rate, "exchange rate updated");
    Ok(HttpResponse::Ok().json(state.exchange_rate()))
}
