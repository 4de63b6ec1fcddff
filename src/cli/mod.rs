use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    // --- Inference Provider Args ---
    /// API token for the model inference endpoint. Without it /api/chat
    /// answers 500 before any outbound call.
    #[arg(long, env = "INFERENCE_TOKEN", default_value = "")]
    pub inference_token: String,

    /// Base URL of the model inference endpoint.
    #[arg(long, env = "INFERENCE_ENDPOINT", default_value = "https://models.github.ai/inference")]
    pub inference_endpoint: String,

    /// Default chat model used when a request does not name one.
    #[arg(long, env = "CHAT_MODEL", default_value = "meta/Meta-Llama-3.1-8B-Instruct")]
    pub chat_model: String,

    /// Maximum number of tokens generated per completion.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "2000")]
    pub max_tokens: u32,

    /// Sampling temperature for chat completion.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    // --- Mapping Provider Args ---
    /// API key for the mapping provider. Without it every map endpoint
    /// answers 500 before any outbound call.
    #[arg(long, env = "MAPS_API_KEY", default_value = "")]
    pub maps_api_key: String,

    /// Base URL of the mapping provider.
    #[arg(long, env = "MAPS_ENDPOINT", default_value = "https://maps.googleapis.com")]
    pub maps_endpoint: String,

    // --- General App Args ---
    /// Path to the persona definitions file.
    #[arg(long, env = "PERSONAS_PATH", default_value = "json/personas.json")]
    pub personas_path: String,

    /// Optional path to the TLS certificate file (PEM format) for HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
