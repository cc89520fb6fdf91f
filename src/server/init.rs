//! Server initialization and main run loop

use super::config::{AppConfig, ClassifierKind};
use super::loader::{load_config, Secrets, GOOGLE_MAPS_API_KEY};
use super::shutdown::spawn_signal_listener;
use crate::api::{AppState, PaymentSettings};
use anyhow::{Context, Result};
use rumbo_core::{
    IntentClassifier, KeywordClassifier, LlmClassifier, Orchestrator, OrchestratorConfig,
    RequestHandler, RoutingTable, Synthesizer,
};
use rumbo_llm::{LlmProvider, OpenAiConfig, OpenAiProvider};
use rumbo_tools::commerce::{CommerceProvider, PricingPolicy, StripeClient, StripeConfig};
use rumbo_tools::maps::McpPlaceSearch;
use rumbo_tools::mcp::{McpServerConfig, SharedMcpServer};
use rumbo_tools::{register_builtins, ToolRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting Rumbo v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Failed to load configuration")?;
    let secrets = Secrets::from_env(&config)?;
    info!("Configuration loaded");

    let pricing = PricingPolicy::new(&config.commerce.currency, config.commerce.discount_percent)
        .context("Invalid commerce pricing configuration")?;

    let maps = SharedMcpServer::new(maps_server_config(&config, &secrets));
    maps.connect()
        .await
        .context("Failed to start the maps MCP server")?;
    info!(command = %config.maps.command, "Maps server connected");

    let commerce: Arc<dyn CommerceProvider> = Arc::new(
        StripeClient::new(
            StripeConfig::new(&secrets.stripe_secret_key)
                .with_timeout(Duration::from_secs(config.commerce.timeout_secs)),
        )
        .context("Failed to configure Stripe")?,
    );

    let llm = build_llm(&config, &secrets);
    let state = Arc::new(build_state(&config, pricing, maps.clone(), commerce, llm));
    let app = crate::api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("HTTP server error");

    if let Err(e) = maps.disconnect().await {
        warn!(error = %e, "Failed to stop the maps server");
    }
    served?;

    info!("Rumbo shutdown complete");
    Ok(())
}

fn maps_server_config(config: &AppConfig, secrets: &Secrets) -> McpServerConfig {
    McpServerConfig::new(
        "google-maps",
        config.maps.command.clone(),
        config.maps.args.clone(),
    )
    .with_env(GOOGLE_MAPS_API_KEY, secrets.google_maps_api_key.clone())
    .with_request_timeout(Duration::from_secs(config.maps.request_timeout_secs))
}

fn build_llm(config: &AppConfig, secrets: &Secrets) -> Option<Arc<dyn LlmProvider>> {
    if !config.llm.enabled {
        return None;
    }
    let api_key = secrets.openai_api_key.clone()?;
    let provider = OpenAiProvider::new(
        OpenAiConfig::new(api_key)
            .with_model(config.llm.model.clone())
            .with_timeout(config.llm.timeout()),
    );
    info!(model = %config.llm.model, "LLM provider initialized");
    Some(Arc::new(provider))
}

/// Wire specialists, orchestrator and synthesizer into the shared state
pub(crate) fn build_state(
    config: &AppConfig,
    pricing: PricingPolicy,
    maps: SharedMcpServer,
    commerce: Arc<dyn CommerceProvider>,
    llm: Option<Arc<dyn LlmProvider>>,
) -> AppState {
    let mut places = McpPlaceSearch::new(maps.clone(), config.maps.max_places);
    if let Some(radius) = config.maps.search_radius_m {
        places = places.with_radius(radius);
    }

    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, Arc::new(places), commerce.clone(), pricing);
    info!(tools = registry.len(), "Tool registry initialized");

    let classifier: Arc<dyn IntentClassifier> = match (config.orchestrator.classifier, &llm) {
        (ClassifierKind::Llm, Some(llm)) => Arc::new(LlmClassifier::new(
            llm.clone(),
            Some(config.llm.model.clone()),
        )),
        (ClassifierKind::Llm, None) => {
            warn!("LLM classifier requested but the LLM is disabled; using keywords");
            Arc::new(KeywordClassifier::new())
        }
        (ClassifierKind::Keyword, _) => Arc::new(KeywordClassifier::new()),
    };

    let orchestrator_config = OrchestratorConfig::new()
        .with_routing(RoutingTable {
            purchase_includes_info: config.orchestrator.purchase_includes_info,
        })
        .with_tool_timeout(Duration::from_secs(config.orchestrator.tool_timeout_secs));
    let orchestrator = Orchestrator::new(Arc::new(registry), classifier, orchestrator_config);
    info!(classifier = orchestrator.classifier_name(), "Orchestrator initialized");

    let synthesizer = match llm {
        Some(llm) => Synthesizer::new()
            .with_llm(llm)
            .with_model(config.llm.model.clone()),
        None => Synthesizer::new(),
    };

    AppState {
        handler: RequestHandler::new(Arc::new(orchestrator), synthesizer),
        commerce,
        maps: Some(maps),
        payments: PaymentSettings {
            default_currency: config.commerce.payment_currency.clone(),
            return_url: Some(config.commerce.return_url.clone()).filter(|u| !u.is_empty()),
        },
    }
}
