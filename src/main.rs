use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use burnnote::{config::Config, handlers, store, store::NoteStore};

fn startup_error<E: std::fmt::Display>(e: E) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let pool = store::connect(&config.database_url, config.pool_size).map_err(startup_error)?;
    let store = web::Data::new(NoteStore::new(pool, config.expiry));
    log::info!(
        "serving notes from {} (opened ttl {}s, unopened ttl {}s)",
        config.database_url,
        store.policy().opened_ttl.num_seconds(),
        store.policy().unopened_ttl.num_seconds()
    );
    store.purge_expired().await.map_err(startup_error)?;

    let max_note_bytes = config.max_note_bytes;
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(handlers::form_config(max_note_bytes))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST"])
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(handlers::routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
