use crate::{services::auth_service, state::AppState, utils::AppError};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpRequest, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

pub const TOKEN_COOKIE: &str = "token";

/// Session token from the `token` cookie, else from `Authorization: Bearer`.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    let auth_str = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Rejects requests without a live session and attaches the caller's
/// `PublicUser` to the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                let err = AppError::Internal("AppState not registered".to_string());
                return Ok(req.into_response(err.error_response()).map_into_right_body());
            };

            let token = extract_token(req.request());

            match auth_service::authenticate(&state, token.as_deref()).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                    Ok(req.into_response(e.error_response()).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, test, HttpResponse};

    #[actix_web::test]
    async fn cookie_wins_over_header() {
        let req = test::TestRequest::default()
            .cookie(Cookie::new(TOKEN_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        assert_eq!(extract_token(&req).as_deref(), Some("from-cookie"));
    }

    #[actix_web::test]
    async fn bearer_header_is_used_without_cookie() {
        let req = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(extract_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[actix_web::test]
    async fn other_schemes_and_empty_values_are_ignored() {
        let basic = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(extract_token(&basic), None);

        let empty_cookie = test::TestRequest::default()
            .cookie(Cookie::new(TOKEN_COOKIE, ""))
            .to_http_request();
        assert_eq!(extract_token(&empty_cookie), None);

        assert_eq!(extract_token(&test::TestRequest::default().to_http_request()), None);
    }

    #[actix_web::test]
    async fn guarded_route_needs_token() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(AppState::for_tests()))
                .service(
                    web::resource("/guarded")
                        .wrap(AuthMiddleware)
                        .to(|| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/guarded").to_request()).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], AppError::NO_TOKEN);
    }
}
