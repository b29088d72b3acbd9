use actix_cors::Cors;
use actix_web::{http::header, web::Data, App, HttpServer};
use log::{error, info};

use stockprice_extension::{
    routes, Environment, OutputRegistry, Settings, StockPriceExtension,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings: Settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{}", err);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err));
        }
    };

    let extension = Data::new(StockPriceExtension::new(
        Environment::new(settings.temporary_directory.clone()),
        settings.source.clone(),
    ));
    let registry = Data::new(OutputRegistry::new());
    let registry_handle = registry.clone();

    info!(
        "Serving on {} with output in {}",
        settings.bind_addr,
        settings.temporary_directory.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec![
                        header::AUTHORIZATION,
                        header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(extension.clone())
            .app_data(registry.clone())
            .configure(routes::configure)
    })
    .bind(settings.bind_addr)?
    .run()
    .await?;

    // Output files the host has not taken over go away with the process.
    registry_handle.purge();
    info!("Stopped");

    Ok(())
}
