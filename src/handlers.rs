use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use bytes::Bytes;
use serde_json::{json, Map, Value};

use crate::daemon::AppState;
use crate::error::ApiError;
use crate::model::{NewPlan, NewStep, DEFAULT_PLAN_STATUS};
use crate::response;
use crate::statement::{StepColumn, UpdateStatement};

const PLAN_NAME_REQUIRED: &str = "name is required";
const STEP_FIELDS_REQUIRED: &str = "plan_id and title are required";

pub async fn health() -> Response {
    response::ok(json!({ "ok": true }))
}

pub async fn list_plans(State(state): State<AppState>) -> Result<Response, ApiError> {
    let plans = state.store.list_plans().await?;
    Ok(response::ok(plans))
}

pub async fn create_plan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = json_object(&body)?;
    let plan = new_plan(&body)?;
    let plan = state.store.insert_plan(plan).await?;
    tracing::debug!(plan_id = plan.id, "Created plan");
    Ok(response::created(plan))
}

pub async fn list_steps(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let plan_id = path_id(path)?;
    let steps = state.store.list_steps(plan_id).await?;
    Ok(response::ok(steps))
}

pub async fn create_step(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = json_object(&body)?;
    let step = new_step(&body)?;
    let step = state.store.insert_step(step).await?;
    tracing::debug!(step_id = step.id, plan_id = step.plan_id, "Created step");
    Ok(response::created(step))
}

pub async fn update_step(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let step_id = path_id(path)?;
    let body = json_object(&body)?;
    let statement = UpdateStatement::build(step_id, &body)?;
    tracing::debug!(step_id, set = %statement.set_clause(), "Updating step");
    match state.store.update_step(&statement).await? {
        Some(step) => Ok(response::ok(step)),
        None => Err(ApiError::RowNotFound),
    }
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn path_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    let Path(raw) = path.map_err(|_| ApiError::RouteNotFound)?;
    raw.parse().map_err(|_| ApiError::RouteNotFound)
}

/// An empty or `null` body reads as `{}`.
fn json_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(ApiError::InvalidBody(
            "expected a JSON object".to_string(),
        )),
        Err(err) => Err(ApiError::InvalidBody(err.to_string())),
    }
}

fn new_plan(body: &Map<String, Value>) -> Result<NewPlan, ApiError> {
    let name = required_text(body, "name")?.ok_or(ApiError::MissingField(PLAN_NAME_REQUIRED))?;
    let status = match body.get("status") {
        None | Some(Value::Null) => DEFAULT_PLAN_STATUS.to_string(),
        Some(Value::String(status)) => status.clone(),
        Some(other) => {
            return Err(ApiError::InvalidField {
                column: "status",
                detail: format!("expected a string but got {other}"),
            })
        }
    };
    Ok(NewPlan { name, status })
}

fn new_step(body: &Map<String, Value>) -> Result<NewStep, ApiError> {
    let plan_id = required_id(body, "plan_id")?;
    let title = required_text(body, "title")?;
    let (Some(plan_id), Some(title)) = (plan_id, title) else {
        return Err(ApiError::MissingField(STEP_FIELDS_REQUIRED));
    };

    let mut step = NewStep::new(plan_id, title);
    for column in StepColumn::ALL {
        if column == StepColumn::Title {
            continue;
        }
        let Some(value) = body.get(column.name()) else {
            continue;
        };
        let bound = column.bind(value)?;
        match column {
            StepColumn::Owner => step.owner = bound.into_text(),
            StepColumn::StartDue => step.start_due = bound.into_text(),
            StepColumn::EndDue => step.end_due = bound.into_text(),
            StepColumn::StartReal => step.start_real = bound.into_text(),
            StepColumn::EndReal => step.end_real = bound.into_text(),
            StepColumn::PctPlanned => step.pct_planned = bound.into_float(),
            StepColumn::PctReal => step.pct_real = bound.into_float(),
            StepColumn::Status => {
                if let Some(status) = bound.into_text() {
                    step.status = status;
                }
            }
            StepColumn::Position => step.position = bound.into_integer(),
            StepColumn::Title => {}
        }
    }
    Ok(step)
}

/// `Ok(None)` for an absent, `null` or empty value.
fn required_text(body: &Map<String, Value>, field: &'static str) -> Result<Option<String>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ApiError::InvalidField {
            column: field,
            detail: format!("expected a string but got {other}"),
        }),
    }
}

/// Accepts integers and numeric strings; `0` counts as absent.
fn required_id(body: &Map<String, Value>, field: &'static str) -> Result<Option<i64>, ApiError> {
    let id = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) if text.is_empty() => return Ok(None),
        Some(Value::String(text)) => text.trim().parse().ok(),
        Some(_) => None,
    };
    match id {
        Some(0) => Ok(None),
        Some(id) => Ok(Some(id)),
        None => Err(ApiError::InvalidField {
            column: field,
            detail: "expected an integer id".to_string(),
        }),
    }
}
