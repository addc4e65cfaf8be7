use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use crate::config::Config;
use crate::handler::{self, TEXT_FIELD};
use crate::parts::Parts;
use crate::store::UploadStore;

/// Any origin, method and header; answers with `Access-Control-Allow-Origin: *`
pub fn cors() -> Cors {
    Cors::default().allow_any_origin().send_wildcard().allow_any_method().allow_any_header()
}

/// Registers the upload route and the app data it needs. File parts are
/// spooled inside the upload directory so storing them is a rename.
pub fn configure(store: UploadStore) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let parts = Parts::configure(|parts| {
            parts.with_temp_dir(store.dir()).with_text_fields(vec![TEXT_FIELD.to_owned()])
        });

        cfg.app_data(web::Data::new(parts))
            .app_data(web::Data::new(store))
            .app_data(web::JsonConfig::default())
            .app_data(web::FormConfig::default())
            .service(web::resource("/upload").route(web::post().to(handler::upload)));
    }
}

/// Creates the upload directory and serves until shutdown
pub async fn run(config: Config) -> std::io::Result<()> {
    let store = UploadStore::new(config.resolve_upload_dir()?);
    store.bootstrap()?;
    log::info!("Storing uploads in {}", store.dir().display());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors())
            .configure(configure(store.clone()))
    })
    .bind((config.host.as_str(), config.port))?;

    log::info!("Server running on http://{}:{}", config.host, config.port);

    server.run().await
}
