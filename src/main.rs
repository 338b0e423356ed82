use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use abeni_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{LogNotifier, NotificationDispatcher},
    handlers,
    middlewares::create_cors,
    services::{RedemptionService, SubscriberService},
    stores::{PgPromotionStore, PgSubscriberStore, PromotionStore, SubscriberStore},
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml()?;

    let pool = create_pool(&config.database).await?;

    run_migrations(&pool).await?;

    let promotion_store: Arc<dyn PromotionStore> = Arc::new(PgPromotionStore::new(pool.clone()));
    let subscriber_store: Arc<dyn SubscriberStore> = Arc::new(PgSubscriberStore::new(pool.clone()));
    let notifier: Arc<dyn NotificationDispatcher> = Arc::new(LogNotifier);

    let redemption_service =
        RedemptionService::new(promotion_store.clone(), subscriber_store.clone());
    let subscriber_service = SubscriberService::new(subscriber_store.clone(), notifier);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(redemption_service.clone()))
            .app_data(web::Data::new(subscriber_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::promotion_config)
                    .configure(handlers::newsletter_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
