use log::error;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

use super::MapsClient;
use crate::error::AgentError;
use crate::models::maps::{
    PlaceGeometry,
    PlacePhoto,
    PlaceResult,
    PlacesRequest,
    PlacesResponse,
    PlacesSearchParams,
};

/// Result cap after dedupe and rating sort.
const MAX_PLACES: usize = 20;
/// Only the first photo reference is forwarded to the browser.
const MAX_PHOTOS: usize = 1;

const DEFAULT_TYPE: &str = "restaurant";
const DEFAULT_RADIUS: u32 = 5000;

#[derive(Debug, Deserialize)]
struct PlacesProviderResponse {
    #[serde(default)]
    results: Vec<ProviderPlace>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ProviderPlace {
    #[serde(default)]
    pub(crate) place_id: String,
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) rating: Option<f64>,
    pub(crate) price_level: Option<i64>,
    pub(crate) vicinity: Option<String>,
    #[serde(default)]
    pub(crate) types: Vec<String>,
    pub(crate) opening_hours: Option<Value>,
    #[serde(default)]
    pub(crate) photos: Vec<PlacePhoto>,
    pub(crate) geometry: Option<Value>,
}

impl MapsClient {
    /// Nearby search around a single location or along a set of route
    /// points. Route points are queried sequentially; a point that fails is
    /// logged and skipped so the rest of the route still yields results.
    pub async fn nearby_places(&self, req: &PlacesRequest) -> Result<PlacesResponse, AgentError> {
        if req.location.is_none() && req.route_points.is_empty() {
            return Err(
                AgentError::InvalidInput("Location or route points are required".to_string())
            );
        }

        let place_type = req.place_type.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string());
        let radius = req.radius.unwrap_or(DEFAULT_RADIUS);
        let keyword = req.keyword.clone().unwrap_or_default();

        let mut all_places = Vec::new();
        if !req.route_points.is_empty() {
            for point in &req.route_points {
                match self.nearby_search(point, &place_type, radius, &keyword).await {
                    Ok(mut results) => all_places.append(&mut results),
                    Err(e) => error!("Error searching near point {}: {}", point, e),
                }
            }
        } else if let Some(location) = &req.location {
            all_places = self.nearby_search(location, &place_type, radius, &keyword).await?;
        }

        Ok(PlacesResponse {
            places: shape_places(all_places),
            search_params: PlacesSearchParams { place_type, radius, keyword },
        })
    }

    async fn nearby_search(
        &self,
        location: &str,
        place_type: &str,
        radius: u32,
        keyword: &str
    ) -> Result<Vec<ProviderPlace>, AgentError> {
        let mut params = vec![
            ("location", location.to_string()),
            ("radius", radius.to_string()),
            ("type", place_type.to_string())
        ];
        if !keyword.is_empty() {
            params.push(("keyword", keyword.to_string()));
        }

        let data: PlacesProviderResponse = self.provider_get(
            "/maps/api/place/nearbysearch/json",
            params,
            "Failed to search for places"
        ).await?;
        Ok(data.results)
    }
}

/// Dedupes by place id (first occurrence wins), sorts descending by rating
/// with missing ratings counted as 0, caps at 20, and narrows each record
/// to the fields the browser renders.
pub(crate) fn shape_places(places: Vec<ProviderPlace>) -> Vec<PlaceResult> {
    let mut unique: Vec<ProviderPlace> = Vec::new();
    for place in places {
        if !unique.iter().any(|seen| seen.place_id == place.place_id) {
            unique.push(place);
        }
    }

    unique.sort_by(|a, b| {
        b.rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });
    unique.truncate(MAX_PLACES);

    unique
        .into_iter()
        .map(|place| {
            let location = place.geometry
                .as_ref()
                .and_then(|geometry| geometry.get("location"))
                .cloned()
                .unwrap_or(Value::Null);
            let mut photos = place.photos;
            photos.truncate(MAX_PHOTOS);

            PlaceResult {
                place_id: place.place_id,
                name: place.name,
                rating: place.rating,
                price_level: place.price_level,
                vicinity: place.vicinity,
                types: place.types,
                opening_hours: place.opening_hours,
                photos,
                geometry: PlaceGeometry { location },
            }
        })
        .collect()
}
