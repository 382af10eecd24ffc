use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use tracing::info;

use shrinkly::analytics::ClickRecorder;
use shrinkly::analytics::global::set_global_click_recorder;
use shrinkly::api::services::analytics::analytics_routes;
use shrinkly::api::services::links::links_routes;
use shrinkly::api::services::redirect::redirect_routes;
use shrinkly::config::{get_config, init_config};
use shrinkly::storage::SeaOrmStorage;
use shrinkly::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // 加载配置并初始化日志（guard 必须存活到进程结束）
    init_config();
    let config = get_config();
    let _log_guard = init_logging(config);

    // 初始化存储后端（含迁移）
    let storage = Arc::new(
        SeaOrmStorage::new(&config.database.database_url)
            .await
            .expect("Failed to initialize storage"),
    );

    // 初始化点击记录器（重定向热路径之外的异步事件写入）
    let recorder = Arc::new(ClickRecorder::new(
        storage.as_event_sink(),
        Duration::from_millis(config.analytics.record_timeout_ms),
    ));
    set_global_click_recorder(recorder);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    let storage_data = web::Data::new(storage);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(storage_data.clone())
            .service(
                web::scope("/api")
                    .service(analytics_routes())
                    .service(links_routes()),
            )
            .service(redirect_routes())
    })
    .workers(config.server.cpu_count)
    .bind(bind_address)?
    .run()
    .await
}
