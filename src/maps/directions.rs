use chrono::Utc;
use log::info;
use serde::Deserialize;
use serde_json::Value;

use super::MapsClient;
use crate::error::AgentError;
use crate::models::maps::{
    DirectionsRequest,
    DirectionsResponse,
    RouteDetail,
    RouteStep,
    TrafficInfo,
    TrafficRequest,
    TrafficResponse,
    ValueText,
};

/// Delay thresholds (seconds) separating light/moderate/heavy traffic.
const LIGHT_DELAY_MAX: i64 = 300;
const MODERATE_DELAY_MAX: i64 = 900;

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsProviderResponse {
    #[serde(default)]
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) routes: Vec<ProviderRoute>,
    pub(crate) error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProviderRoute {
    #[serde(default)]
    pub(crate) summary: String,
    #[serde(default)]
    pub(crate) legs: Vec<ProviderLeg>,
    #[serde(default)]
    pub(crate) warnings: Vec<Value>,
    #[serde(default)]
    pub(crate) waypoint_order: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProviderLeg {
    #[serde(default)]
    pub(crate) duration: ValueText,
    #[serde(default)]
    pub(crate) distance: ValueText,
    pub(crate) duration_in_traffic: Option<ValueText>,
    pub(crate) start_address: Option<String>,
    pub(crate) end_address: Option<String>,
    #[serde(default)]
    pub(crate) steps: Vec<ProviderStep>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProviderStep {
    #[serde(default)]
    pub(crate) html_instructions: String,
    #[serde(default)]
    pub(crate) duration: ValueText,
    #[serde(default)]
    pub(crate) distance: ValueText,
    #[serde(default)]
    pub(crate) travel_mode: String,
}

impl MapsClient {
    pub async fn directions(
        &self,
        req: &DirectionsRequest
    ) -> Result<DirectionsResponse, AgentError> {
        let (origin, destination) = require_endpoints(
            req.origin.as_deref(),
            req.destination.as_deref()
        )?;
        let mode = req.travel_mode.as_deref().unwrap_or("DRIVING").to_lowercase();

        let mut params = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", mode),
            ("alternatives", "true".to_string())
        ];
        if !req.waypoints.is_empty() {
            params.push(("waypoints", req.waypoints.join("|")));
        }

        let data: DirectionsProviderResponse = self.provider_get(
            "/maps/api/directions/json",
            params,
            "Failed to get directions"
        ).await?;

        info!("Directions API response status: {}", data.status);

        if data.status != "OK" {
            let details = data.error_message
                .clone()
                .unwrap_or_else(|| format!("Google Maps API returned status: {}", data.status));
            return Err(AgentError::Provider {
                message: "Failed to get directions".to_string(),
                status: data.status,
                details: Some(details),
            });
        }

        Ok(build_directions_response(data))
    }

    /// Directions with live traffic. Routes come back ascending by
    /// duration-in-traffic, fastest first.
    pub async fn traffic(&self, req: &TrafficRequest) -> Result<TrafficResponse, AgentError> {
        let (origin, destination) = require_endpoints(
            req.origin.as_deref(),
            req.destination.as_deref()
        )?;
        let departure_echo = req.departure_time
            .clone()
            .unwrap_or_else(|| Value::String("now".to_string()));

        let params = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", "driving".to_string()),
            ("departure_time", resolve_departure_time(&departure_echo)),
            ("traffic_model", "best_guess".to_string()),
            ("alternatives", "true".to_string())
        ];

        let data: DirectionsProviderResponse = self.provider_get(
            "/maps/api/directions/json",
            params,
            "Failed to get traffic information"
        ).await?;

        if data.status != "OK" {
            return Err(AgentError::Provider {
                message: "Failed to get traffic information".to_string(),
                status: data.status,
                details: None,
            });
        }

        let mut traffic_info = build_traffic_info(&data.routes);
        traffic_info.sort_by_key(|info| info.duration_in_traffic.value);

        Ok(TrafficResponse {
            status: "OK".to_string(),
            traffic_info,
            departure_time: departure_echo,
            current_time: Utc::now().timestamp(),
        })
    }
}

fn require_endpoints<'a>(
    origin: Option<&'a str>,
    destination: Option<&'a str>
) -> Result<(&'a str, &'a str), AgentError> {
    match (origin, destination) {
        (Some(origin), Some(destination)) if !origin.is_empty() && !destination.is_empty() => {
            Ok((origin, destination))
        }
        _ => Err(AgentError::InvalidInput("Origin and destination are required".to_string())),
    }
}

/// `"now"` (or nothing) resolves to the current unix timestamp; anything
/// else is forwarded to the provider verbatim.
fn resolve_departure_time(value: &Value) -> String {
    match value {
        Value::String(s) if s == "now" => Utc::now().timestamp().to_string(),
        Value::String(s) => s.clone(),
        Value::Null => Utc::now().timestamp().to_string(),
        other => other.to_string(),
    }
}

fn build_directions_response(data: DirectionsProviderResponse) -> DirectionsResponse {
    let origin_address = data.routes
        .first()
        .and_then(|route| route.legs.first())
        .and_then(|leg| leg.start_address.clone());
    let destination_address = data.routes
        .first()
        .and_then(|route| route.legs.last())
        .and_then(|leg| leg.end_address.clone());

    let routes = data.routes
        .iter()
        .enumerate()
        .map(|(index, route)| build_route_detail(index, route))
        .collect();

    DirectionsResponse {
        status: data.status,
        routes,
        origin_address,
        destination_address,
    }
}

fn build_route_detail(index: usize, route: &ProviderRoute) -> RouteDetail {
    RouteDetail {
        id: index,
        summary: route.summary.clone(),
        duration: route.legs.iter().map(|leg| leg.duration.value).sum(),
        distance: route.legs.iter().map(|leg| leg.distance.value).sum(),
        duration_text: join_leg_texts(route, |leg| leg.duration.text.as_str()),
        distance_text: join_leg_texts(route, |leg| leg.distance.text.as_str()),
        steps: route.legs
            .iter()
            .flat_map(|leg| leg.steps.iter())
            .map(|step| RouteStep {
                instruction: strip_html_tags(&step.html_instructions),
                duration: step.duration.text.clone(),
                distance: step.distance.text.clone(),
                travel_mode: step.travel_mode.clone(),
            })
            .collect(),
        warnings: route.warnings.clone(),
        waypoint_order: route.waypoint_order.clone(),
    }
}

pub(crate) fn build_traffic_info(routes: &[ProviderRoute]) -> Vec<TrafficInfo> {
    routes
        .iter()
        .enumerate()
        .map(|(index, route)| {
            let normal: i64 = route.legs
                .iter()
                .map(|leg| leg.duration.value)
                .sum();
            // Legs without a traffic estimate fall back to the normal
            // duration, matching the provider's own aggregation.
            let in_traffic: i64 = route.legs
                .iter()
                .map(|leg| {
                    leg.duration_in_traffic
                        .as_ref()
                        .map(|d| d.value)
                        .unwrap_or(leg.duration.value)
                })
                .sum();
            let delay = in_traffic - normal;

            TrafficInfo {
                route_index: index,
                summary: route.summary.clone(),
                duration_normal: ValueText { value: normal, text: minutes_text(normal) },
                duration_in_traffic: ValueText { value: in_traffic, text: minutes_text(in_traffic) },
                traffic_delay: ValueText { value: delay, text: minutes_text(delay) },
                traffic_level: classify_delay(delay).to_string(),
                distance: route.legs.iter().map(|leg| leg.distance.value).sum(),
                distance_text: join_leg_texts(route, |leg| leg.distance.text.as_str()),
                warnings: route.warnings.clone(),
            }
        })
        .collect()
}

pub(crate) fn classify_delay(delay_seconds: i64) -> &'static str {
    if delay_seconds <= LIGHT_DELAY_MAX {
        "light"
    } else if delay_seconds <= MODERATE_DELAY_MAX {
        "moderate"
    } else {
        "heavy"
    }
}

fn minutes_text(seconds: i64) -> String {
    format!("{} min", seconds.div_euclid(60))
}

fn join_leg_texts(route: &ProviderRoute, text: impl Fn(&ProviderLeg) -> &str) -> String {
    route.legs
        .iter()
        .map(text)
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_html_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => {
                in_tag = true;
            }
            '>' => {
                in_tag = false;
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(duration: i64, in_traffic: Option<i64>) -> ProviderLeg {
        ProviderLeg {
            duration: ValueText { value: duration, text: format!("{} s", duration) },
            distance: ValueText { value: 1000, text: "1 km".to_string() },
            duration_in_traffic: in_traffic.map(|value| ValueText {
                value,
                text: format!("{} s", value),
            }),
            ..Default::default()
        }
    }

    fn route(summary: &str, legs: Vec<ProviderLeg>) -> ProviderRoute {
        ProviderRoute {
            summary: summary.to_string(),
            legs,
            ..Default::default()
        }
    }

    #[test]
    fn delay_classification_boundaries() {
        assert_eq!(classify_delay(250), "light");
        assert_eq!(classify_delay(300), "light");
        assert_eq!(classify_delay(301), "moderate");
        assert_eq!(classify_delay(900), "moderate");
        assert_eq!(classify_delay(901), "heavy");
        assert_eq!(classify_delay(0), "light");
    }

    #[test]
    fn minutes_text_floors() {
        assert_eq!(minutes_text(1800), "30 min");
        assert_eq!(minutes_text(301), "5 min");
        assert_eq!(minutes_text(59), "0 min");
        assert_eq!(minutes_text(-30), "-1 min");
    }

    #[test]
    fn traffic_info_sums_legs_and_falls_back_without_estimate() {
        let routes = vec![route("A", vec![leg(600, Some(900)), leg(300, None)])];
        let info = build_traffic_info(&routes);
        assert_eq!(info[0].duration_normal.value, 900);
        assert_eq!(info[0].duration_in_traffic.value, 1200);
        assert_eq!(info[0].traffic_delay.value, 300);
        assert_eq!(info[0].traffic_level, "light");
    }

    #[test]
    fn traffic_routes_sort_ascending_by_duration_in_traffic() {
        let routes = vec![
            route("slow", vec![leg(600, Some(1800))]),
            route("fast", vec![leg(600, Some(700))]),
            route("medium", vec![leg(600, Some(1200))])
        ];
        let mut info = build_traffic_info(&routes);
        info.sort_by_key(|entry| entry.duration_in_traffic.value);
        let order: Vec<&str> = info
            .iter()
            .map(|entry| entry.summary.as_str())
            .collect();
        assert_eq!(order, vec!["fast", "medium", "slow"]);
        // Route indexes refer to the provider's original ordering.
        assert_eq!(info[0].route_index, 1);
    }

    #[test]
    fn directions_aggregate_legs_and_flatten_steps() {
        let mut first = leg(600, None);
        first.start_address = Some("1 Main St".to_string());
        first.steps = vec![ProviderStep {
            html_instructions: "Turn <b>left</b> onto Main".to_string(),
            duration: ValueText { value: 60, text: "1 min".to_string() },
            distance: ValueText { value: 100, text: "0.1 km".to_string() },
            travel_mode: "DRIVING".to_string(),
        }];
        let mut second = leg(300, None);
        second.end_address = Some("2 Oak Ave".to_string());
        second.steps = vec![ProviderStep {
            html_instructions: "Continue".to_string(),
            ..Default::default()
        }];

        let data = DirectionsProviderResponse {
            status: "OK".to_string(),
            routes: vec![route("I-280 S", vec![first, second])],
            error_message: None,
        };
        let response = build_directions_response(data);

        assert_eq!(response.origin_address.as_deref(), Some("1 Main St"));
        assert_eq!(response.destination_address.as_deref(), Some("2 Oak Ave"));
        let detail = &response.routes[0];
        assert_eq!(detail.duration, 900);
        assert_eq!(detail.distance, 2000);
        assert_eq!(detail.duration_text, "600 s, 300 s");
        assert_eq!(detail.steps.len(), 2);
        assert_eq!(detail.steps[0].instruction, "Turn left onto Main");
    }

    #[test]
    fn endpoints_must_be_present_and_non_empty() {
        assert!(require_endpoints(Some("a"), Some("b")).is_ok());
        assert!(require_endpoints(None, Some("b")).is_err());
        assert!(require_endpoints(Some(""), Some("b")).is_err());
    }

    #[test]
    fn explicit_departure_time_is_forwarded_verbatim() {
        assert_eq!(resolve_departure_time(&Value::String("1754500000".into())), "1754500000");
        assert_eq!(resolve_departure_time(&Value::from(1754500000_i64)), "1754500000");
        let now: i64 = resolve_departure_time(&Value::String("now".into())).parse().unwrap();
        assert!(now > 1_700_000_000);
    }
}
