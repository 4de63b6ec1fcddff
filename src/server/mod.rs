pub mod api;

use crate::cli::Args;
use crate::config::persona::PersonaConfig;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    args: Args,
    personas: Arc<PersonaConfig>,
}

impl Server {
    pub fn new(args: Args, personas: Arc<PersonaConfig>) -> Self {
        Self { args, personas }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(self.args.clone(), self.personas.clone()).await
    }
}
