mod app;
mod clipboard;
mod commands;
mod config;
mod error;
mod formatting;
mod logging;
mod net;
mod orchestrator;
mod pipeline;
mod provider;
mod recording;
mod transcription;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
