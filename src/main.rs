mod api;
mod app_state;
mod env_config;
mod layers;
mod logger;
mod services;
mod storage;

use app_state::models::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use chrono::Utc;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use layers::{create_cors, create_trace};
use services::bridge::scheduler::SilenceWatcher;
use services::bridge::status::StatusAggregator;
use services::bridge::webhook::WebhookNotifier;
use std::{net::SocketAddr, sync::Arc};
use storage::blob::blob_service::BlobService;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Инициализация приложения
    let settings: Arc<AppSettings> = Arc::new(initialize_application().await);

    // Инициализация блоб-хранилища
    let blob_service = initialize_storage(&settings);

    // Настройка адреса сервера
    let server_address: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port,
    )
    .parse()
    .expect("Invalid server address configuration");

    info!("Server will listen on: {}", server_address);

    // Создание глобального состояния приложения
    let webhook = Arc::new(WebhookNotifier::new(settings.app_env.webhook_url.clone()));
    let app_state: Arc<AppState> = Arc::new(AppState::new(
        settings.clone(),
        Arc::new(blob_service),
        webhook,
    ));

    // Инициализация и запуск фоновых сервисов
    initialize_background_services(app_state.clone()).await;

    // Создание API роутера
    let app_router = create_application_router(app_state.clone());

    // Запуск HTTP сервера
    start_http_server(app_router, server_address).await;

    info!("Application started successfully!");
}

/// Инициализирует настройки и логирование приложения
async fn initialize_application() -> AppSettings {
    // Загрузка переменных окружения и конфигурации
    let environment = AppEnv::new();
    let config = AppConfig::new(&environment.env);
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    // Настройка логирования с уровнем и форматом из конфигурации
    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        !app_settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting ENTSO-E price bridge...");
    info!("Current environment: {}", app_settings.app_env.env);

    // Добавление подробного логирования в режиме разработки
    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings);
    } else {
        info!("Running in production mode");
    }

    app_settings
}

/// Готовит каталог блоб-хранилища и репозитории
fn initialize_storage(settings: &Arc<AppSettings>) -> BlobService {
    match BlobService::new(settings) {
        Ok(service) => {
            info!("Blob storage ready at {}", settings.app_env.storage_dir);
            service
        }
        Err(err) => {
            error!("Failed to initialize blob storage: {}", err);
            panic!("Cannot continue without writable storage");
        }
    }
}

/// Создает API роутер со всеми эндпоинтами и middleware
fn create_application_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(api::ingest_push).get(api::root_get))
        .route("/status.json", get(api::get_status_file))
        .route("/api-health", get(api::health_api))
        .route("/{key}", get(api::get_zone_file))
        .layer(create_cors())
        .layer(axum::Extension(app_state))
        .layer(create_trace())
}

/// Запускает HTTP сервер на указанном адресе
async fn start_http_server(app: Router, addr: SocketAddr) {
    info!("Starting HTTP server on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to address {}: {}", addr, err);
            panic!("Cannot start server: {}", err);
        }
    };

    info!("Server started successfully, now accepting connections");

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
        panic!("Server failed: {}", err);
    }
}

/// Инициализирует и запускает все фоновые сервисы
async fn initialize_background_services(app_state: Arc<AppState>) {
    // Начальная генерация status.json: маркер последнего push берём из
    // хранилища, при первом запуске считаем источник живым
    let last_push = match app_state
        .blob_service
        .repository_status
        .get_last_update()
        .await
    {
        Ok(Some(at)) => at,
        Ok(None) => Utc::now(),
        Err(err) => {
            error!("Failed to read last-update marker: {}", err);
            Utc::now()
        }
    };

    let aggregator = StatusAggregator::new(app_state.clone());
    match aggregator.rebuild(last_push).await {
        Ok(document) => info!(
            "Initial status generated: {} zones",
            document.summary.total_zones
        ),
        Err(err) => error!("Failed to generate initial status: {}", err),
    }

    // Запуск наблюдателя за тишиной источника
    let silence_watcher = SilenceWatcher::new(app_state);
    silence_watcher.start().await;

    info!("Background services initialized successfully");
}
