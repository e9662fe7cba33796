use actix_web::{get, HttpRequest, HttpResponse, Responder};

use crate::error::ErrorBody;

#[get("/")]
pub async fn default() -> impl Responder {
    HttpResponse::Ok().body("Lead search service is up. POST /api/search to start.")
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    log::error!("404 error: {}", req.uri());
    HttpResponse::NotFound().json(ErrorBody::new("Not found"))
}
