//! Generator endpoints
//!
//! `GET/POST /v1/generators` and `GET/PUT /v1/generators/{id}`. Every handler
//! consults the route gate before touching the request.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    routing::get,
    Form, Json, Router,
};
use serde_json::{Map, Value};

use crate::{
    api::envelope::{respond, Envelope},
    db::GeneratorRepository,
    middleware::Actor,
    models::{Generator, GeneratorPatch, NewGenerator},
    services::ApiRoute,
    utils::{AppError, AppResult},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_generators).post(create_generator))
        .route("/{id}", get(get_generator).put(update_generator))
}

async fn list_generators(State(state): State<AppState>) -> AppResult<Envelope<Vec<Generator>>> {
    state.route_gate.check(ApiRoute::ListGenerators)?;

    let generators = GeneratorRepository::new(&state.db)
        .find_all()
        .await
        .map_err(|e| persistence(e, "The Generators could not be retrieved."))?;

    if generators.is_empty() {
        return Err(AppError::not_found("No Generators available"));
    }

    Ok(respond(ApiRoute::ListGenerators, generators))
}

async fn get_generator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Envelope<Generator>> {
    state.route_gate.check(ApiRoute::GetGenerator)?;

    let id = parse_id(&id).ok_or_else(|| AppError::validation("id", "Generator ID is invalid."))?;

    let generator = GeneratorRepository::new(&state.db)
        .find(id)
        .await
        .map_err(|e| persistence(e, "The Generator could not be retrieved."))?;

    Ok(respond(ApiRoute::GetGenerator, generator))
}

async fn create_generator(
    State(state): State<AppState>,
    actor: Actor,
    request: Request,
) -> AppResult<Envelope<Generator>> {
    state.route_gate.check(ApiRoute::CreateGenerator)?;

    let params = request_params(request).await;
    let new = NewGenerator::from_params(&params);

    let generator = GeneratorRepository::new(&state.db)
        .insert(&new, actor.id())
        .await
        .map_err(|e| match e {
            AppError::Validation { .. } => e,
            other => persistence(
                AppError::database(other.to_string()),
                "The Generator could not be added to the database.",
            ),
        })?;

    tracing::info!(generator_id = generator.id, actor = ?actor.id(), "Generator created");
    Ok(respond(ApiRoute::CreateGenerator, generator))
}

async fn update_generator(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Envelope<Generator>> {
    state.route_gate.check(ApiRoute::UpdateGenerator)?;

    let id = parse_id(&id).ok_or_else(|| {
        AppError::validation("id", "The Generator ID is missing from the request.")
    })?;

    let patch = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(fields)) if !fields.is_empty() => GeneratorPatch::from_json(&fields)?,
        _ => return Err(AppError::bad_request("No parameters were provided.")),
    };
    if patch.is_empty() {
        return Err(AppError::bad_request("No parameters were provided."));
    }

    let generator = GeneratorRepository::new(&state.db)
        .update(id, &patch, actor.id())
        .await
        .map_err(|e| match e {
            AppError::Validation { .. } => e,
            AppError::NotFound(_) => AppError::not_found("The generator could not be updated."),
            other => persistence(
                AppError::database(other.to_string()),
                "The generator could not be updated.",
            ),
        })?;

    tracing::info!(generator_id = generator.id, actor = ?actor.id(), "Generator updated");
    Ok(respond(ApiRoute::UpdateGenerator, generator))
}

/// Strict path id: a positive integer, nothing else
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Log a persistence failure and replace its message with `message`
fn persistence(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Database(cause) => {
            tracing::error!(error = %cause, "{}", message);
            AppError::database(message)
        }
        other => other,
    }
}

/// Flat create parameters: the query string merged with a JSON object or
/// form body. Body keys win. An unreadable body contributes nothing.
async fn request_params(request: Request) -> Map<String, Value> {
    let mut params: Map<String, Value> =
        Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map(|Query(query)| query)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        match Json::<Value>::from_request(request, &()).await {
            Ok(Json(Value::Object(body))) => params.extend(body),
            Ok(_) => tracing::debug!("Ignoring non-object JSON body"),
            Err(rejection) => tracing::debug!(%rejection, "Ignoring unreadable JSON body"),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        match Form::<HashMap<String, String>>::from_request(request, &()).await {
            Ok(Form(body)) => params.extend(
                body.into_iter()
                    .map(|(key, value)| (key, Value::String(value))),
            ),
            Err(rejection) => tracing::debug!(%rejection, "Ignoring unreadable form body"),
        }
    }

    params
}
