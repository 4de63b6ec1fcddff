use crate::cli::Args;
use crate::config::persona::PersonaConfig;
use crate::error::AgentError;
use crate::llm::InferenceClient;
use crate::maps::MapsClient;
use crate::models::chat::{ ChatMessage, ChatRequest };
use crate::models::maps::{
    AutocompleteRequest,
    DirectionsRequest,
    DirectionsResponse,
    GeocodeRequest,
    GeocodeResponse,
    PlacesRequest,
    PlacesResponse,
    ProbeResponse,
    TrafficRequest,
    TrafficResponse,
};
use crate::prompt::compose_system_prompt;
use crate::relay::ndjson_relay;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    body::Body,
    extract::State,
    http::{ header, StatusCode },
    response::{ IntoResponse, Response },
};
use serde_json::json;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn, error };
use uuid::Uuid;

#[derive(Clone)]
struct AppState {
    args: Args,
    personas: Arc<PersonaConfig>,
    inference: Option<Arc<InferenceClient>>,
    maps: Option<Arc<MapsClient>>,
}

pub async fn start_http_server(
    args: Args,
    personas: Arc<PersonaConfig>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args.server_addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    // Clients are built once at startup; a missing credential leaves the
    // slot empty and the matching endpoints answer 500 without any I/O.
    let inference = if args.inference_token.trim().is_empty() {
        warn!("INFERENCE_TOKEN not set; /api/chat will reject requests.");
        None
    } else {
        Some(
            Arc::new(
                InferenceClient::new(args.inference_token.clone(), args.inference_endpoint.clone())?
            )
        )
    };

    let maps = if args.maps_api_key.trim().is_empty() {
        warn!("MAPS_API_KEY not set; map endpoints will reject requests.");
        None
    } else {
        Some(Arc::new(MapsClient::new(args.maps_api_key.clone(), args.maps_endpoint.clone())))
    };

    let app_state = AppState {
        args: args.clone(),
        personas,
        inference,
        maps,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/maps/geocode", post(geocode_handler))
        .route("/api/maps/autocomplete", post(autocomplete_handler))
        .route("/api/maps/directions", post(directions_handler))
        .route("/api/maps/places", post(places_handler))
        .route("/api/maps/traffic", post(traffic_handler))
        .route("/api/maps/test", get(probe_handler))
        .layer(cors)
        .with_state(app_state);

    if let (true, Some(cert_path), Some(key_path)) =
        (args.enable_tls, args.tls_cert_path.as_ref(), args.tls_key_path.as_ref())
    {
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("HTTPS server started with TLS enabled");
        axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener
            ::bind(addr).await
            .map_err(|e|
                format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
            )?;

        info!("HTTP server started");
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

/// Streams the model response as NDJSON chunks. The body is produced by the
/// relay as provider events arrive; nothing is accumulated server-side.
async fn chat_handler(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let request_id = Uuid::new_v4();

    let Some(inference) = state.inference.clone() else {
        error!("[{}] chat request rejected: no inference token configured", request_id);
        return AgentError::Config("INFERENCE_TOKEN not configured".to_string()).into_response();
    };

    let model = req.model.clone().unwrap_or_else(|| state.args.chat_model.clone());
    info!(
        "[{}] Using model: {} (agent: {}, {} messages)",
        request_id,
        model,
        req.agent.as_deref().unwrap_or("general"),
        req.messages.len()
    );

    let base = state.personas.resolve_system_prompt(
        req.agent.as_deref(),
        req.system_prompt.as_deref()
    );
    let system = compose_system_prompt(base, req.agent.as_deref(), req.map_data.as_ref());

    let mut messages = Vec::with_capacity(req.messages.len() + 1);
    messages.push(ChatMessage { role: "system".to_string(), content: system });
    messages.extend(req.messages);

    match
        inference.stream_chat(
            messages,
            &model,
            state.args.max_tokens,
            state.args.temperature
        ).await
    {
        Ok(events) =>
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/plain"),
                    (header::CACHE_CONTROL, "no-cache"),
                    (header::CONNECTION, "keep-alive"),
                ],
                Body::from_stream(ndjson_relay(events)),
            ).into_response(),
        Err(e) => {
            error!("[{}] chat completion request failed: {}", request_id, e);
            AgentError::Upstream { message: e.to_string(), details: None }.into_response()
        }
    }
}

fn require_maps(state: &AppState) -> Result<Arc<MapsClient>, AgentError> {
    state.maps
        .clone()
        .ok_or_else(|| AgentError::Config("Google Maps API key not configured".to_string()))
}

async fn geocode_handler(
    State(state): State<AppState>,
    Json(req): Json<GeocodeRequest>
) -> Result<Json<GeocodeResponse>, AgentError> {
    let maps = require_maps(&state)?;
    Ok(Json(maps.geocode(&req).await?))
}

/// Unlike the other map endpoints, autocomplete failures still carry an
/// empty `predictions` array so the browser's suggestion list code never
/// sees a missing key.
async fn autocomplete_handler(
    State(state): State<AppState>,
    Json(req): Json<AutocompleteRequest>
) -> Response {
    let result = match require_maps(&state) {
        Ok(maps) => maps.autocomplete(&req).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let mut body = e.body();
            body["predictions"] = json!([]);
            (e.status_code(), Json(body)).into_response()
        }
    }
}

async fn directions_handler(
    State(state): State<AppState>,
    Json(req): Json<DirectionsRequest>
) -> Result<Json<DirectionsResponse>, AgentError> {
    let maps = require_maps(&state)?;
    Ok(Json(maps.directions(&req).await?))
}

async fn places_handler(
    State(state): State<AppState>,
    Json(req): Json<PlacesRequest>
) -> Result<Json<PlacesResponse>, AgentError> {
    let maps = require_maps(&state)?;
    Ok(Json(maps.nearby_places(&req).await?))
}

async fn traffic_handler(
    State(state): State<AppState>,
    Json(req): Json<TrafficRequest>
) -> Result<Json<TrafficResponse>, AgentError> {
    let maps = require_maps(&state)?;
    Ok(Json(maps.traffic(&req).await?))
}

async fn probe_handler(State(state): State<AppState>) -> Result<Json<ProbeResponse>, AgentError> {
    let maps = require_maps(&state)?;
    Ok(Json(maps.probe().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn state_without_credentials() -> AppState {
        let personas = crate::config::persona
            ::parse_personas(
                r#"{
                    "personas": {
                        "general": {"name": "g", "description": "d", "system_prompt": "p"},
                        "maps": {"name": "m", "description": "d", "system_prompt": "p"}
                    }
                }"#
            )
            .unwrap();
        AppState {
            args: Args::parse_from(["waypoint-agent"]),
            personas: Arc::new(personas),
            inference: None,
            maps: None,
        }
    }

    #[test]
    fn missing_maps_key_is_a_config_error() {
        let err = require_maps(&state_without_credentials()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body()["error"], "Google Maps API key not configured");
    }

    #[tokio::test]
    async fn chat_without_token_answers_500_before_any_io() {
        let request: ChatRequest = serde_json
            ::from_value(serde_json::json!({ "messages": [] }))
            .unwrap();
        let response = chat_handler(State(state_without_credentials()), Json(request)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn autocomplete_error_body_keeps_predictions_array() {
        let request = AutocompleteRequest { input: Some("coffee".to_string()) };
        let response = autocomplete_handler(
            State(state_without_credentials()),
            Json(request)
        ).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body
            ::to_bytes(response.into_body(), usize::MAX).await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["predictions"], serde_json::json!([]));
        assert!(body["error"].is_string());
    }
}
