mod api;
mod app;
mod breathing;
mod client;
mod event;
mod session;
mod theme;

use std::sync::mpsc;

use app::SolaceApp;
use client::ChatClient;
use eframe::egui;
use session::Provider;

fn env_key(provider: Provider) -> String {
    std::env::var(provider.key_env_var()).unwrap_or_default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("solace-runtime")
        .build()?;

    let client = runtime.block_on(async { ChatClient::new(tx.clone()) })?;

    let app = SolaceApp::new(
        rx,
        client,
        env_key(Provider::OpenAi),
        env_key(Provider::OpenRouter),
    );
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Solace — Mental Health Companion")
            .with_inner_size([920.0, 680.0])
            .with_min_inner_size([700.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Solace",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
