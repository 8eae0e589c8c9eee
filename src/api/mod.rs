pub mod auth;
pub mod dashboard;
pub mod health;
pub mod pages;

use actix_web::{
    http::header::{self, ContentType},
    web, HttpRequest, HttpResponse, HttpResponseBuilder,
};

use crate::{middleware::SessionGate, services::session_service::SESSION_COOKIE};

/// Registers every route. Expects `Data<dyn UserStore>`, `Data<SessionStore>`
/// and `Data<Config>` to be present on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_form))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/dashboard")
                .wrap(SessionGate)
                .route(web::get().to(dashboard::dashboard)),
        );
}

pub(crate) fn session_id(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

pub(crate) fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}
