pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod maps;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod server;

use cli::Args;
use config::persona::load_personas;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Inference Endpoint: {}", args.inference_endpoint);
    info!("Default Chat Model: {}", args.chat_model);
    info!("Inference Token Set: {}", !args.inference_token.trim().is_empty());
    info!("Maps Endpoint: {}", args.maps_endpoint);
    info!("Maps API Key Set: {}", !args.maps_api_key.trim().is_empty());
    info!("Personas Path: {}", args.personas_path);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let personas = load_personas(&args.personas_path)?;
    let server = Server::new(args, personas);
    server.run().await?;

    Ok(())
}
