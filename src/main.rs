use std::{future::IntoFuture, process, sync::Arc};

use akasite::{
    application::{
        context::{AppContext, Backend},
        error::AppError,
        realtime::{ChangeFeed, MountGuard},
    },
    cache::CacheConfig,
    config::{self, BackendKind},
    domain::types::Table,
    infra::{
        auth::{GoTrueClient, UnconfiguredAuth},
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpSettings, RouterState},
        memory::MemoryBackend,
        telemetry,
    },
};
use tokio::{sync::Notify, time::timeout};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(InfraError::from)?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn connect_database(settings: &config::Settings) -> Result<PostgresRepositories, AppError> {
    let url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::missing_setting("database.url", "postgres"))?;
    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;
    Ok(PostgresRepositories::new(pool))
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let repositories = connect_database(&settings).await?;
    PostgresRepositories::run_migrations(repositories.pool())
        .await
        .map_err(InfraError::from)?;
    info!(target = "akasite::migrate", "migrations applied");
    Ok(())
}

fn memory_backend(settings: &config::Settings) -> Backend {
    let seed = &settings.seed_admin;
    let password = match seed.password.clone() {
        Some(password) => password,
        None => {
            let generated = Uuid::new_v4().simple().to_string();
            warn!(
                target = "akasite::serve",
                email = %seed.email,
                password = %generated,
                "no seed admin password configured; generated one for this run"
            );
            generated
        }
    };
    let store = Arc::new(MemoryBackend::seeded(&seed.email, &password));
    let feed: Arc<dyn ChangeFeed> = store.clone();
    Backend::from_store(Arc::clone(&store), feed, store)
}

async fn postgres_backend(settings: &config::Settings) -> Result<Backend, AppError> {
    let repositories = connect_database(settings).await?;
    PostgresRepositories::run_migrations(repositories.pool())
        .await
        .map_err(InfraError::from)?;

    let auth: Arc<dyn akasite::application::auth::AuthProvider> =
        match (settings.auth.url.clone(), settings.auth.api_key.clone()) {
            (Some(url), Some(api_key)) => Arc::new(GoTrueClient::new(url, api_key)?),
            _ => {
                warn!(
                    target = "akasite::serve",
                    "auth.url or auth.api_key missing; admin sign-in is disabled"
                );
                Arc::new(UnconfiguredAuth)
            }
        };
    let feed: Arc<dyn ChangeFeed> = Arc::new(repositories.change_feed());
    Ok(Backend::from_store(Arc::new(repositories), feed, auth))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let backend = match settings.backend {
        BackendKind::Memory => memory_backend(&settings),
        BackendKind::Postgres => postgres_backend(&settings).await?,
    };
    let app = Arc::new(AppContext::new(
        backend,
        CacheConfig::from(&settings.cache),
        &settings.server.public_url,
    ));

    // Keep every table's change feed open for the life of the process so the
    // cache is invalidated even when no live view is connected.
    let mut mounts: Vec<MountGuard> = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        match app.realtime.mount(table).await {
            Ok(guard) => mounts.push(guard),
            Err(err) => warn!(
                target = "akasite::serve",
                table = table.as_str(),
                error = %err,
                "change feed unavailable; relying on mutation invalidation"
            ),
        }
    }

    let state = RouterState::new(Arc::clone(&app), HttpSettings::from_settings(&settings));
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "akasite::serve",
        addr = %settings.server.addr,
        backend = ?settings.backend,
        public_url = %settings.server.public_url,
        "listening"
    );

    let stop = Arc::new(Notify::new());
    let stopped = Arc::clone(&stop);
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { stopped.notified().await })
        .into_future();
    tokio::pin!(server);

    let result = tokio::select! {
        result = &mut server => result,
        () = shutdown_signal() => {
            info!(target = "akasite::serve", "shutdown requested; draining connections");
            stop.notify_one();
            match timeout(settings.server.graceful_shutdown, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        target = "akasite::serve",
                        "graceful shutdown timed out; closing remaining connections"
                    );
                    Ok(())
                }
            }
        }
    };

    drop(mounts);
    result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = "akasite::serve", error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
