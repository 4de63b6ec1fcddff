use serde::{ Serialize, Deserialize };

use super::maps::TrafficInfo;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of POST /api/chat as sent by the browser client.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub agent: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "systemPrompt")]
    pub system_prompt: Option<String>,
    #[serde(rename = "mapData")]
    pub map_data: Option<MapContext>,
}

/// Map context assembled by the browser from earlier map endpoint responses.
/// Transient, per request; every field is optional and simply omitted from
/// the composed prompt when absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapContext {
    pub origin: Option<MapEndpoint>,
    pub destination: Option<MapEndpoint>,
    #[serde(default)]
    pub routes: Vec<RouteOverview>,
    #[serde(default)]
    pub places: Vec<PlaceOverview>,
    pub traffic: Option<TrafficBlock>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapEndpoint {
    pub address: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouteOverview {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub duration_text: String,
    #[serde(default)]
    pub distance_text: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlaceOverview {
    #[serde(default)]
    pub name: String,
    pub rating: Option<f64>,
    #[serde(default)]
    pub vicinity: String,
}

/// Echo of the traffic endpoint response carried back in by the browser.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrafficBlock {
    #[serde(default)]
    pub traffic_info: Vec<TrafficInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_accepts_browser_keys() {
        let body = r#"{
            "messages": [{"role": "user", "content": "hi"}],
            "agent": "maps",
            "model": "meta/Meta-Llama-3.1-8B-Instruct",
            "systemPrompt": "You are a maps assistant.",
            "mapData": {
                "origin": {"address": "A"},
                "destination": {"address": "B"},
                "routes": [{"summary": "I-80", "duration_text": "12 min", "distance_text": "8 km"}]
            }
        }"#;
        let req: ChatRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.agent.as_deref(), Some("maps"));
        assert_eq!(req.system_prompt.as_deref(), Some("You are a maps assistant."));
        let map_data = req.map_data.unwrap();
        assert_eq!(map_data.routes[0].summary, "I-80");
        assert!(map_data.traffic.is_none());
    }

    #[test]
    fn chat_request_minimal_body() {
        let req: ChatRequest = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert!(req.messages.is_empty());
        assert!(req.agent.is_none());
        assert!(req.map_data.is_none());
    }
}
