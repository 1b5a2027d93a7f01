//! Admin guard middleware for the FlavourHub server.
//! This middleware can be placed on any route or service.
//!
//! It reads a bearer token from the `Authorization` header and checks it with the [`AdminSessionGate`] registered as
//! app data. If the token is valid, the [`crate::auth::AdminClaims`] are stored in the request extensions and the
//! request is allowed to continue. Otherwise, a 401 Unauthorized response is returned.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    http::header::{HeaderMap, AUTHORIZATION},
    web,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::AdminSessionGate,
    errors::{AuthError, ServerError},
};

/// Extracts the token from an `Authorization: Bearer <token>` header. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[derive(Default)]
pub struct AdminGuardFactory;

impl AdminGuardFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminGuardFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminGuardService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardService { service: Rc::new(service) }))
    }
}

pub struct AdminGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let gate = req.app_data::<web::Data<AdminSessionGate>>().cloned().ok_or_else(|| {
                error!("🔐️ No AdminSessionGate has been registered. Admin routes cannot be authorized.");
                ErrorInternalServerError("Admin sessions are not configured.")
            })?;
            let claims = match bearer_token(req.headers()) {
                Some(token) => gate.authorize(token),
                None => {
                    debug!("🔐️ No bearer token on request to {}", req.path());
                    Err(AuthError::Unauthorized)
                },
            };
            match claims {
                Ok(claims) => {
                    trace!("🔐️ Admin access to {} ✅️", req.path());
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                },
                Err(e) => {
                    info!("🔐️ Denied admin access to {}", req.path());
                    Err(ServerError::AuthenticationError(e).into())
                },
            }
        })
    }
}
