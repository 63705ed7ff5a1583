use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wandernext_backend::auth::middleware::JwtSecret;
use wandernext_backend::create_pool;
use wandernext_backend::handlers;
use wandernext_backend::notify::{DbNotifier, Notifier};
use wandernext_backend::payments::{PaymentGateway, RazorpayGateway};
use wandernext_backend::sweep;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let db = create_pool().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run database migrations");
    let db_data = web::Data::new(db.clone());

    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let jwt_data = web::Data::new(JwtSecret(jwt_secret));

    let key_id = std::env::var("RAZORPAY_KEY_ID").expect("RAZORPAY_KEY_ID must be set");
    let key_secret = std::env::var("RAZORPAY_KEY_SECRET").expect("RAZORPAY_KEY_SECRET must be set");
    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(key_id, key_secret));
    let gateway_data = web::Data::new(gateway);

    let notifier: Arc<dyn Notifier> = Arc::new(DbNotifier::new(db.clone()));
    let notifier_data = web::Data::new(notifier);

    // Booking expiry sweep: once now, then every interval.
    let sweep_interval = std::env::var("BOOKING_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(sweep::DEFAULT_INTERVAL);
    sweep::spawn(db, sweep_interval);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{port}");
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(jwt_data.clone())
            .app_data(gateway_data.clone())
            .app_data(notifier_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
