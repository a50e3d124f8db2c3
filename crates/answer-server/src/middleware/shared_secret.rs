use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::error::AppError;

pub const SHARED_SECRET_HEADER: &str = "X-Shared-Secret";

/// Rejects requests whose `X-Shared-Secret` header does not match the
/// configured secret. `OPTIONS` preflights always pass. With no secret
/// configured every request passes.
#[derive(Clone, Default)]
pub struct SharedSecret {
    secret: Option<String>,
}

impl SharedSecret {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|secret| !secret.is_empty()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SharedSecret
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SharedSecretService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SharedSecretService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct SharedSecretService<S> {
    service: S,
    secret: Option<String>,
}

impl<S> SharedSecretService<S> {
    fn is_authorized(&self, req: &ServiceRequest) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };

        req.headers()
            .get(SHARED_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == secret)
    }
}

impl<S, B> Service<ServiceRequest> for SharedSecretService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::OPTIONS || self.is_authorized(&req) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        log::warn!(
            "Rejected {} {}: missing or invalid shared secret",
            req.method(),
            req.path()
        );
        let response = AppError::Unauthorized.error_response();
        Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
    }
}
