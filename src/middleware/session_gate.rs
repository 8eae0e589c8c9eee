use crate::{
    config::Config,
    database::UserStore,
    models::CurrentUser,
    services::session_service::{session_cookie, GateOutcome, SessionStore, SESSION_COOKIE},
    utils::AppError,
};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpResponse,
};
use chrono::Utc;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Guards a scope or resource: unauthenticated or idle-expired requests are
/// sent to `/login`, everything else gets a `CurrentUser` extension.
pub struct SessionGate;

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionGateService<S> {
    service: Rc<S>,
}

fn to_login<B>(
    req: ServiceRequest,
    sessions: &SessionStore,
    error: AppError,
    secure: bool,
) -> ServiceResponse<EitherBody<B>> {
    let mut response = HttpResponse::build(error.status_code());
    response.insert_header((header::LOCATION, "/login"));
    if let Some(message) = error.user_message() {
        let sid = sessions.push_flash(None, message, Utc::now());
        response.cookie(session_cookie(&sid, secure));
    }
    req.into_response(response.finish()).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
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
            let sessions = req.app_data::<web::Data<SessionStore>>().cloned();
            let users = req.app_data::<web::Data<dyn UserStore>>().cloned();
            let secure = req
                .app_data::<web::Data<Config>>()
                .map(|c| c.cookie_secure)
                .unwrap_or(false);

            let (Some(sessions), Some(users)) = (sessions, users) else {
                log::error!("❌ Session gate mounted without session or user store");
                return Err(actix_web::error::ErrorInternalServerError("Session gate misconfigured"));
            };

            let sid = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
            let now = Utc::now();

            let user_id = match sessions.gate(sid.as_deref(), now) {
                GateOutcome::Authenticated { user_id } => user_id,
                GateOutcome::Unauthenticated => {
                    log::debug!("🔒 {} requires login", req.path());
                    return Ok(to_login(req, &sessions, AppError::Unauthenticated, secure));
                }
                GateOutcome::Expired => {
                    return Ok(to_login(req, &sessions, AppError::SessionExpired, secure));
                }
            };

            if let Err(e) = users.touch(&user_id, now).await {
                // Session points at a user the store no longer has
                log::warn!("⚠️  Dropping session for user {}: {}", user_id, e);
                if let Some(sid) = sid.as_deref() {
                    sessions.destroy(sid);
                }
                return Ok(to_login(req, &sessions, AppError::Unauthenticated, secure));
            }

            req.extensions_mut().insert(CurrentUser {
                // gate() only authenticates a present id
                session_id: sid.unwrap_or_default(),
                user_id,
            });

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
