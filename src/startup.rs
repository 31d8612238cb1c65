use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::SessionManager;
use crate::configuration::AuthSettings;
use crate::logger::LoggerMiddleware;
use crate::middleware::AuthMiddleware;
use crate::routes::{
    create_message, delete_message, get_current_user, get_message, health_check, list_messages,
    login, premium_webhook, refresh, register, revoke, update_password,
};
use crate::storage::Stores;

pub fn run(
    listener: TcpListener,
    stores: Stores,
    auth_settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionManager::new(
        stores.credentials.clone(),
        stores.refresh_tokens.clone(),
        auth_settings.clone(),
    ));
    let stores_data = web::Data::new(stores);
    let auth_settings_data = web::Data::new(auth_settings.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())      // Standard logging
            .wrap(LoggerMiddleware)       // Custom logging

            // Shared state
            .app_data(stores_data.clone())
            .app_data(sessions.clone())
            .app_data(auth_settings_data.clone())

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/revoke", web::post().to(revoke))
            .route("/messages", web::get().to(list_messages))
            .route("/messages/{id}", web::get().to(get_message))
            .route("/webhooks/premium", web::post().to(premium_webhook))

            // Protected routes (require a valid access token)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(auth_settings.jwt_secret.clone()))
                    .route("/me", web::get().to(get_current_user))
                    .route("/password", web::put().to(update_password))
                    .route("/messages", web::post().to(create_message))
                    .route("/messages/{id}", web::delete().to(delete_message)),
            )

            // Static file serving (must be last to not override API routes)
            .service(fs::Files::new("/", "./public").index_file("index.html"))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
