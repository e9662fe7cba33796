use std::net::TcpListener;

use actix_web::{
    dev::Server,
    error::InternalError,
    middleware::{from_fn, Logger},
    web::{self, Data},
    App, HttpResponse, HttpServer,
};

use crate::{
    error::ErrorBody,
    middleware::rate_limit,
    routes::{default_route, search_route},
    services::{RateLimiter, SearchPipeline},
};

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::error!("Rejected request body: {}", err);
        let response = HttpResponse::BadRequest().json(ErrorBody::new("Invalid JSON body"));
        InternalError::from_response(err, response).into()
    })
}

/// Routes and extractor config shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(default_route::default)
        .service(
            web::scope("/api")
                .wrap(from_fn(rate_limit))
                .service(search_route::search)
                .service(search_route::download_csv),
        );
}

pub fn run(
    listener: TcpListener,
    pipeline: SearchPipeline,
    rate_limiter: RateLimiter,
) -> Result<Server, std::io::Error> {
    let pipeline = Data::new(pipeline);
    let rate_limiter = Data::new(rate_limiter);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure)
            .default_service(web::to(default_route::not_found))
            .app_data(pipeline.clone())
            .app_data(rate_limiter.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
