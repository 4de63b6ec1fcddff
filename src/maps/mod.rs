pub mod directions;
pub mod places;

use log::info;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AgentError;
use crate::models::maps::{
    AutocompleteRequest,
    AutocompleteResponse,
    GeocodeRequest,
    GeocodeResponse,
    LatLng,
    Prediction,
    ProbeResponse,
};

/// Stateless gateway to the mapping provider. One instance per process,
/// injected through the server state; every operation is a single request/
/// response translation with no retries and no shared mutable state.
#[derive(Debug)]
pub struct MapsClient {
    http: HttpClient,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GeoProviderResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    geometry: GeoGeometry,
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    address_components: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GeoGeometry {
    #[serde(default)]
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct AutocompleteProviderResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    predictions: Vec<ProviderPrediction>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderPrediction {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    description: String,
    structured_formatting: Option<StructuredFormatting>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StructuredFormatting {
    main_text: Option<String>,
    secondary_text: Option<String>,
}

impl MapsClient {
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            http: HttpClient::new(),
            api_key,
            endpoint,
        }
    }

    /// One GET against the provider with the API key appended; the failure
    /// message names the operation so transport errors read like the
    /// endpoint that raised them.
    pub(crate) async fn provider_get<T: DeserializeOwned>(
        &self,
        path: &str,
        mut params: Vec<(&'static str, String)>,
        failure: &str
    ) -> Result<T, AgentError> {
        params.push(("key", self.api_key.clone()));
        let url = format!("{}{}", self.endpoint.trim_end_matches('/'), path);

        let resp = self.http
            .get(&url)
            .query(&params)
            .send().await
            .map_err(|e| AgentError::upstream(failure, e))?;

        resp.json::<T>().await.map_err(|e| AgentError::upstream(failure, e))
    }

    /// Forward, reverse, or place-id geocoding depending on which inputs
    /// are present; a miss answers 404 carrying the provider status.
    pub async fn geocode(&self, req: &GeocodeRequest) -> Result<GeocodeResponse, AgentError> {
        let (params, not_found, reverse) = if let Some(place_id) = &req.place_id {
            (vec![("place_id", place_id.clone())], "Place not found", None)
        } else if let Some(address) = &req.address {
            (vec![("address", address.clone())], "Address not found", None)
        } else if let (Some(lat), Some(lng)) = (req.lat, req.lng) {
            (
                vec![("latlng", format!("{},{}", lat, lng))],
                "Location not found",
                Some(LatLng { lat, lng }),
            )
        } else {
            return Err(
                AgentError::InvalidInput(
                    "Either address, placeId, or lat/lng coordinates are required".to_string()
                )
            );
        };

        let data: GeoProviderResponse = self.provider_get(
            "/maps/api/geocode/json",
            params,
            "Failed to geocode location"
        ).await?;

        let GeoProviderResponse { status, results } = data;
        let first = if status == "OK" { results.into_iter().next() } else { None };
        let Some(result) = first else {
            return Err(AgentError::NotFound { message: not_found.to_string(), status });
        };

        Ok(GeocodeResponse {
            formatted_address: result.formatted_address,
            // Reverse geocoding echoes the request coordinates.
            location: reverse.unwrap_or(result.geometry.location),
            place_id: result.place_id,
            types: result.types,
            address_components: result.address_components,
        })
    }

    /// Place autocomplete. Inputs shorter than two characters short-circuit
    /// to an empty prediction list without touching the provider.
    pub async fn autocomplete(
        &self,
        req: &AutocompleteRequest
    ) -> Result<AutocompleteResponse, AgentError> {
        let input = req.input.as_deref().unwrap_or("").trim().to_string();
        info!("Autocomplete request for: \"{}\"", input);

        if input.chars().count() < 2 {
            return Ok(AutocompleteResponse::default());
        }

        let params = vec![
            ("input", input),
            ("language", "en".to_string()),
            ("components", "country:us".to_string())
        ];
        let data: AutocompleteProviderResponse = self.provider_get(
            "/maps/api/place/autocomplete/json",
            params,
            "Failed to get autocomplete suggestions"
        ).await?;

        if data.status != "OK" && data.status != "ZERO_RESULTS" {
            return Err(AgentError::Upstream {
                message: "Failed to get autocomplete suggestions".to_string(),
                details: Some(data.error_message.unwrap_or(data.status)),
            });
        }

        let predictions = data.predictions
            .into_iter()
            .map(|prediction| {
                let formatting = prediction.structured_formatting.unwrap_or_default();
                Prediction {
                    main_text: formatting.main_text.unwrap_or_else(||
                        prediction.description.clone()
                    ),
                    secondary_text: formatting.secondary_text.unwrap_or_default(),
                    place_id: prediction.place_id,
                    description: prediction.description,
                    types: prediction.types,
                }
            })
            .collect();

        Ok(AutocompleteResponse { predictions })
    }

    /// Connectivity probe: geocodes a fixed address and reports whether the
    /// provider answered.
    pub async fn probe(&self) -> Result<ProbeResponse, AgentError> {
        let data: GeoProviderResponse = self.provider_get(
            "/maps/api/geocode/json",
            vec![("address", "New York, NY".to_string())],
            "Google Maps API test failed"
        ).await?;

        let first_result = data.results
            .first()
            .map(|result| result.formatted_address.clone())
            .unwrap_or_else(|| "No results".to_string());

        Ok(ProbeResponse {
            success: true,
            status: data.status,
            has_results: !data.results.is_empty(),
            first_result,
            message: "Google Maps API is working properly".to_string(),
        })
    }
}
