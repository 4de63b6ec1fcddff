use serde::{ Serialize, Deserialize };
use serde_json::Value;

/// Provider duration/distance pair: raw value plus display text.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValueText {
    pub value: i64,
    pub text: String,
}

// --- Geocode ---

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeRequest {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "placeId")]
    pub place_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub formatted_address: String,
    pub location: LatLng,
    pub place_id: String,
    pub types: Vec<String>,
    pub address_components: Value,
}

// --- Autocomplete ---

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteRequest {
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
    pub main_text: String,
    pub secondary_text: String,
    pub types: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct AutocompleteResponse {
    pub predictions: Vec<Prediction>,
}

// --- Directions ---

#[derive(Debug, Default, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    #[serde(default)]
    pub waypoints: Vec<String>,
    #[serde(rename = "travelMode")]
    pub travel_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteStep {
    pub instruction: String,
    pub duration: String,
    pub distance: String,
    pub travel_mode: String,
}

#[derive(Debug, Serialize)]
pub struct RouteDetail {
    pub id: usize,
    pub summary: String,
    pub duration: i64,
    pub distance: i64,
    pub duration_text: String,
    pub distance_text: String,
    pub steps: Vec<RouteStep>,
    pub warnings: Vec<Value>,
    pub waypoint_order: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct DirectionsResponse {
    pub status: String,
    pub routes: Vec<RouteDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
}

// --- Places ---

#[derive(Debug, Default, Deserialize)]
pub struct PlacesRequest {
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub radius: Option<u32>,
    pub keyword: Option<String>,
    #[serde(default)]
    pub route_points: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacePhoto {
    #[serde(default)]
    pub photo_reference: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaceGeometry {
    pub location: Value,
}

#[derive(Debug, Serialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Value>,
    pub photos: Vec<PlacePhoto>,
    pub geometry: PlaceGeometry,
}

#[derive(Debug, Serialize)]
pub struct PlacesSearchParams {
    #[serde(rename = "type")]
    pub place_type: String,
    pub radius: u32,
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub places: Vec<PlaceResult>,
    pub search_params: PlacesSearchParams,
}

// --- Traffic ---

#[derive(Debug, Default, Deserialize)]
pub struct TrafficRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_time: Option<Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrafficInfo {
    pub route_index: usize,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub duration_normal: ValueText,
    #[serde(default)]
    pub duration_in_traffic: ValueText,
    #[serde(default)]
    pub traffic_delay: ValueText,
    #[serde(default)]
    pub traffic_level: String,
    #[serde(default)]
    pub distance: i64,
    #[serde(default)]
    pub distance_text: String,
    #[serde(default)]
    pub warnings: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct TrafficResponse {
    pub status: String,
    pub traffic_info: Vec<TrafficInfo>,
    pub departure_time: Value,
    pub current_time: i64,
}

// --- Connectivity probe ---

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub success: bool,
    pub status: String,
    #[serde(rename = "hasResults")]
    pub has_results: bool,
    #[serde(rename = "firstResult")]
    pub first_result: String,
    pub message: String,
}
