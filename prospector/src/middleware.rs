use std::net::{IpAddr, Ipv4Addr};

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    middleware::Next,
    web, Error, HttpResponse,
};

use crate::{error::ErrorBody, services::RateLimiter};

/// Counts every request against the caller's rate limit before any extractor
/// runs, so rejected bodies are counted too.
pub async fn rate_limit<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let Some(rate_limiter) = req.app_data::<web::Data<RateLimiter>>().cloned() else {
        log::error!("Rate limiter is not registered for {}", req.path());
        return Err(ErrorInternalServerError("rate limiter not configured"));
    };

    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !rate_limiter.check(ip) {
        log::warn!("Rate limit exceeded for IP: {}", ip);
        let response =
            HttpResponse::TooManyRequests().json(ErrorBody::new("Rate limit exceeded"));
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req)
        .await
        .map(ServiceResponse::map_into_left_body)
}
