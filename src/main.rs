use wortschatz_trainer::config::Config;
use wortschatz_trainer::logging::{init_tracing, LogOptions};
use wortschatz_trainer::services::llm_provider::LLMProvider;
use wortschatz_trainer::{build_trainer, create_app};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&LogOptions::from_env(&config.log_level));

    let provider = LLMProvider::from_env();
    if !provider.is_available() {
        tracing::warn!("LLM_API_KEY not set, training sessions will fail to fetch examples");
    }

    let trainer = match build_trainer(&config, provider) {
        Ok(trainer) => trainer,
        Err(err) => {
            tracing::error!(error = %err, path = %config.words_file.display(), "failed to load word list");
            std::process::exit(1);
        }
    };

    let app = create_app(trainer);
    let addr = config.bind_addr();
    tracing::info!(%addr, words_file = %config.words_file.display(), "wortschatz-trainer listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "bind listener failed");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
