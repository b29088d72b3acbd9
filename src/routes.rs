use actix_web::{post, web, HttpResponse, Responder};
use log::{error, warn};
use serde_json::json;

use crate::{
    extension::{AcquisitionState, NoProgress, StockPriceExtension},
    output::OutputRegistry,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(acquire_data)
        .service(acquire_metadata)
        .service(enabled_workflows)
        .service(connection_description)
        .service(client_request);
}

#[post("/acquisitions/data")]
async fn acquire_data(
    extension: web::Data<StockPriceExtension>,
    registry: web::Data<OutputRegistry>,
    info: String,
) -> impl Responder {
    let context = extension.acquisition_job_context(AcquisitionState::new(info));
    let job = context.data_job();
    let result = job.execute(&NoProgress).await;
    job.cleanup();
    context.cleanup();

    match result {
        Ok(output) => {
            let path = registry.register(output);
            HttpResponse::Ok().json(json!({ "path": path.display().to_string() }))
        }
        Err(err) => {
            error!("{}", err);
            HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
        }
    }
}

#[post("/acquisitions/metadata")]
async fn acquire_metadata(extension: web::Data<StockPriceExtension>, info: String) -> impl Responder {
    let context = extension.acquisition_job_context(AcquisitionState::new(info));
    let job = context.metadata_job();
    let result = job.execute(&NoProgress).await;
    job.cleanup();

    match result {
        Ok(metadata) => HttpResponse::Ok().body(metadata),
        Err(err) => {
            error!("{}", err);
            HttpResponse::InternalServerError().json(json!({ "error": err.to_string() }))
        }
    }
}

#[post("/acquisitions/workflows")]
async fn enabled_workflows(extension: web::Data<StockPriceExtension>, info: String) -> impl Responder {
    let workflows = extension.enabled_workflows(&AcquisitionState::new(info));

    HttpResponse::Ok().json(workflows)
}

#[post("/acquisitions/description")]
async fn connection_description(
    extension: web::Data<StockPriceExtension>,
    info: String,
) -> impl Responder {
    match extension.connection_description(&AcquisitionState::new(info)) {
        Ok(description) => HttpResponse::Ok().json(description),
        Err(err) => {
            warn!("Cannot describe acquisition: {}", err);
            HttpResponse::BadRequest().json(json!({ "error": err.to_string() }))
        }
    }
}

#[post("/client-requests")]
async fn client_request(extension: web::Data<StockPriceExtension>, request: String) -> impl Responder {
    match extension.client_request_job(request).execute(&NoProgress) {
        Some(response) => HttpResponse::Ok().body(response),
        None => HttpResponse::NoContent().finish(),
    }
}
