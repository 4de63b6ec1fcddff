use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use log::info;

/// Fallback system prompt when neither the request nor the registry
/// provides one.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Be conversational, friendly, and helpful in your responses.";

#[derive(Debug)]
pub enum PersonaError {
    PersonaNotFound(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PersonaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaError::PersonaNotFound(key) => write!(f, "Persona '{}' not found", key),
            PersonaError::IoError(e) => write!(f, "Persona file IO error: {}", e),
            PersonaError::JsonError(e) => write!(f, "Persona JSON parsing error: {}", e),
        }
    }
}

impl Error for PersonaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PersonaError::IoError(e) => Some(e),
            PersonaError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PersonaError {
    fn from(err: std::io::Error) -> Self {
        PersonaError::IoError(err)
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(err: serde_json::Error) -> Self {
        PersonaError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PersonaDefinition {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PersonaConfig {
    pub personas: HashMap<String, PersonaDefinition>,
}

impl PersonaConfig {
    fn validate(&self) -> Result<(), PersonaError> {
        if !self.personas.contains_key("general") {
            return Err(PersonaError::PersonaNotFound("general".to_string()));
        }
        if !self.personas.contains_key("maps") {
            return Err(PersonaError::PersonaNotFound("maps".to_string()));
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PersonaDefinition> {
        self.personas.get(id)
    }

    pub fn system_prompt(&self, id: &str) -> Option<&str> {
        self.personas.get(id).map(|p| p.system_prompt.as_str())
    }

    /// Resolution order: explicit request override, then the registry entry
    /// for the requested persona, then the fixed default.
    pub fn resolve_system_prompt<'a>(
        &'a self,
        agent: Option<&str>,
        request_override: Option<&'a str>
    ) -> &'a str {
        if let Some(prompt) = request_override {
            return prompt;
        }
        agent
            .and_then(|id| self.system_prompt(id))
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

pub fn parse_personas(content: &str) -> Result<PersonaConfig, PersonaError> {
    let config: PersonaConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_personas(path: &str) -> Result<Arc<PersonaConfig>, Box<dyn Error + Send + Sync>> {
    let file_content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read personas file '{}': {}", path, e))?;
    let config = parse_personas(&file_content).map_err(|e|
        format!("Failed to parse personas file '{}': {}", path, e)
    )?;
    info!("Loaded {} personas from {}", config.personas.len(), path);
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersonaConfig {
        parse_personas(
            r#"{
                "personas": {
                    "general": {
                        "name": "General Assistant",
                        "description": "Helpful AI assistant for general questions",
                        "system_prompt": "You are a helpful AI assistant."
                    },
                    "maps": {
                        "name": "Maps Assistant",
                        "description": "Navigation, routes, and location-based assistance",
                        "system_prompt": "You are a navigation assistant."
                    }
                }
            }"#
        ).unwrap()
    }

    #[test]
    fn request_override_wins() {
        let config = sample();
        let prompt = config.resolve_system_prompt(Some("maps"), Some("custom"));
        assert_eq!(prompt, "custom");
    }

    #[test]
    fn registry_prompt_used_when_no_override() {
        let config = sample();
        let prompt = config.resolve_system_prompt(Some("maps"), None);
        assert_eq!(prompt, "You are a navigation assistant.");
    }

    #[test]
    fn unknown_persona_falls_back_to_default() {
        let config = sample();
        assert_eq!(config.resolve_system_prompt(Some("nope"), None), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.resolve_system_prompt(None, None), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn missing_required_persona_is_rejected() {
        let result = parse_personas(
            r#"{"personas": {"general": {"name": "g", "description": "d", "system_prompt": "p"}}}"#
        );
        assert!(matches!(result, Err(PersonaError::PersonaNotFound(_))));
    }
}
