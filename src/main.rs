use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use model_serving_glue::{
    AdapterKind, AppConfig, ArtifactSpec, InferenceSpec, LocalRegistry, SumSpec, build_router,
    load_model_from_registry, load_selector,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(adapter = ?config.adapter, "loading model");

    let router = match config.adapter {
        AdapterKind::Registry => {
            let selector = load_selector(&config.config_path, &config.config_section)?;
            let registry = LocalRegistry::new(&config.registry_root);
            let predictor = load_model_from_registry(&selector, &registry)?;
            build_router(ArtifactSpec, predictor)
        }
        AdapterKind::Artifact => load_and_route(ArtifactSpec, &config)?,
        AdapterKind::Sum => load_and_route(SumSpec, &config)?,
    };

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "model server ready");

    axum::serve(listener, router).await?;

    Ok(())
}

fn load_and_route<S>(spec: S, config: &AppConfig) -> anyhow::Result<Router>
where
    S: InferenceSpec + Send + Sync + 'static,
    S::Handle: Send + Sync + 'static,
    S::Input: Send + 'static,
    S::Output: Send + 'static,
{
    let handle = spec.load(&config.model_dir)?;
    Ok(build_router(spec, handle))
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
