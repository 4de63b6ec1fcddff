use std::fmt::Write;

use crate::models::chat::MapContext;

/// Personas that get map context appended to their system prompt.
const MAPS_AGENT: &str = "maps";

/// Maximum number of nearby places listed in the prompt.
const MAX_PROMPT_PLACES: usize = 10;

/// Builds the system message for a chat request. Pure string assembly:
/// map context is appended only for the maps persona, sections appear in a
/// fixed order, and absent sub-fields are omitted without error.
pub fn compose_system_prompt(
    base: &str,
    agent: Option<&str>,
    map_data: Option<&MapContext>
) -> String {
    let mut prompt = base.to_string();

    let context = match (agent, map_data) {
        (Some(MAPS_AGENT), Some(context)) => context,
        _ => {
            return prompt;
        }
    };

    prompt.push_str("\n\nYou have access to the following map data:");

    if let Some(origin) = &context.origin {
        let address = origin.address.as_deref().unwrap_or("Current location");
        let _ = write!(prompt, "\nOrigin: {}", address);
    }

    if let Some(destination) = &context.destination {
        if let Some(address) = &destination.address {
            let _ = write!(prompt, "\nDestination: {}", address);
        }
    }

    if !context.routes.is_empty() {
        prompt.push_str("\nAvailable routes:");
        for (index, route) in context.routes.iter().enumerate() {
            let _ = write!(
                prompt,
                "\n- Route {}: {} ({}, {})",
                index + 1,
                route.summary,
                route.duration_text,
                route.distance_text
            );
        }
    }

    if !context.places.is_empty() {
        prompt.push_str("\nNearby places along the route:");
        for place in context.places.iter().take(MAX_PROMPT_PLACES) {
            let rating = match place.rating {
                Some(rating) => format!("{}★", rating),
                None => "No rating".to_string(),
            };
            let _ = write!(prompt, "\n- {} ({}) - {}", place.name, rating, place.vicinity);
        }
    }

    if let Some(traffic) = &context.traffic {
        if !traffic.traffic_info.is_empty() {
            prompt.push_str("\nTraffic information:");
            for (index, info) in traffic.traffic_info.iter().enumerate() {
                let _ = write!(
                    prompt,
                    "\n- Route {}: {} ({} traffic, {} delay)",
                    index + 1,
                    info.duration_in_traffic.text,
                    info.traffic_level,
                    info.traffic_delay.text
                );
            }
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ MapEndpoint, PlaceOverview, RouteOverview, TrafficBlock };
    use crate::models::maps::{ TrafficInfo, ValueText };

    fn full_context() -> MapContext {
        MapContext {
            origin: Some(MapEndpoint { address: Some("1 Main St".into()) }),
            destination: Some(MapEndpoint { address: Some("2 Oak Ave".into()) }),
            routes: vec![RouteOverview {
                summary: "I-280 S".into(),
                duration_text: "25 mins".into(),
                distance_text: "18 km".into(),
            }],
            places: vec![
                PlaceOverview {
                    name: "Cafe Uno".into(),
                    rating: Some(4.5),
                    vicinity: "Main St".into(),
                },
                PlaceOverview { name: "No Star Diner".into(), rating: None, vicinity: "Oak Ave".into() }
            ],
            traffic: Some(TrafficBlock {
                traffic_info: vec![TrafficInfo {
                    duration_in_traffic: ValueText { value: 1800, text: "30 min".into() },
                    traffic_delay: ValueText { value: 300, text: "5 min".into() },
                    traffic_level: "light".into(),
                    ..Default::default()
                }],
            }),
        }
    }

    #[test]
    fn base_prompt_untouched_without_map_data() {
        let prompt = compose_system_prompt("base", Some("maps"), None);
        assert_eq!(prompt, "base");
    }

    #[test]
    fn map_data_ignored_for_other_personas() {
        let context = full_context();
        let prompt = compose_system_prompt("base", Some("coding"), Some(&context));
        assert_eq!(prompt, "base");
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let context = full_context();
        let prompt = compose_system_prompt("base", Some("maps"), Some(&context));

        let origin = prompt.find("Origin: 1 Main St").unwrap();
        let destination = prompt.find("Destination: 2 Oak Ave").unwrap();
        let routes = prompt.find("- Route 1: I-280 S (25 mins, 18 km)").unwrap();
        let places = prompt.find("- Cafe Uno (4.5★) - Main St").unwrap();
        let traffic = prompt.find("- Route 1: 30 min (light traffic, 5 min delay)").unwrap();

        assert!(origin < destination);
        assert!(destination < routes);
        assert!(routes < places);
        assert!(places < traffic);
        assert!(prompt.contains("- No Star Diner (No rating) - Oak Ave"));
    }

    #[test]
    fn missing_subfields_are_omitted() {
        let context = MapContext {
            origin: Some(MapEndpoint { address: None }),
            destination: Some(MapEndpoint { address: None }),
            ..Default::default()
        };
        let prompt = compose_system_prompt("base", Some("maps"), Some(&context));
        assert!(prompt.contains("Origin: Current location"));
        assert!(!prompt.contains("Destination:"));
        assert!(!prompt.contains("Available routes:"));
        assert!(!prompt.contains("Traffic information:"));
    }

    #[test]
    fn places_capped_at_ten() {
        let mut context = full_context();
        context.places = (0..15)
            .map(|i| PlaceOverview {
                name: format!("Place {}", i),
                rating: Some(4.0),
                vicinity: "Somewhere".into(),
            })
            .collect();
        let prompt = compose_system_prompt("base", Some("maps"), Some(&context));
        assert!(prompt.contains("Place 9"));
        assert!(!prompt.contains("Place 10"));
    }
}
