use actix_web::{http::header, web, HttpRequest, HttpResponse};
use chrono::Utc;

use super::{html, redirect, session_id};
use crate::{
    config::Config,
    database::UserStore,
    models::{LoginForm, RegisterForm},
    services::{
        auth_service,
        session_service::{session_cookie, SessionStore},
    },
    utils::AppError,
    views,
};

/// A body that is not url-encoded is treated like an empty form, so the
/// failure still ends in a flash and a redirect.
fn form_or_default<T: Default>(form: Result<web::Form<T>, actix_web::Error>, path: &str) -> T {
    match form {
        Ok(form) => form.into_inner(),
        Err(e) => {
            log::warn!("⚠️  Unreadable form on POST {}: {}", path, e);
            T::default()
        }
    }
}

pub async fn login_form(req: HttpRequest, sessions: web::Data<SessionStore>) -> HttpResponse {
    let message = sessions.take_flash(session_id(&req).as_deref());
    html(views::login(message.as_deref()))
}

pub async fn register_form(req: HttpRequest, sessions: web::Data<SessionStore>) -> HttpResponse {
    let message = sessions.take_flash(session_id(&req).as_deref());
    html(views::register(message.as_deref()))
}

pub async fn login(
    req: HttpRequest,
    users: web::Data<dyn UserStore>,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
    form: Result<web::Form<LoginForm>, actix_web::Error>,
) -> HttpResponse {
    let form = form_or_default(form, "/login");
    log::info!("🔐 POST /login - email: {}", form.email);

    let sid = session_id(&req);
    let now = Utc::now();

    match auth_service::authenticate(users.get_ref(), &form.email, &form.password).await {
        Ok(user) => {
            let new_sid = sessions.login(sid.as_deref(), &user.id, now);
            log::info!("✅ Login successful: {}", user.email);
            redirect("/dashboard")
                .cookie(session_cookie(&new_sid, config.cookie_secure))
                .finish()
        }
        Err(e) => {
            match &e {
                AppError::AuthenticatorError(_) => log::error!("❌ Login error: {} - {}", form.email, e),
                _ => log::warn!("❌ Login failed: {} - {}", form.email, e),
            }

            // Every login failure reads the same, so the text never hints
            // at whether the account exists
            let message = AppError::BadPassword.user_message().unwrap_or_default();
            let flash_sid = sessions.push_flash(sid.as_deref(), message, now);

            // Keeps the framework's default redirect status, unlike /register
            redirect("/login")
                .cookie(session_cookie(&flash_sid, config.cookie_secure))
                .finish()
        }
    }
}

pub async fn register(
    req: HttpRequest,
    users: web::Data<dyn UserStore>,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
    form: Result<web::Form<RegisterForm>, actix_web::Error>,
) -> HttpResponse {
    let form = form_or_default(form, "/register");
    let email_str = form.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /register - email: {}", email_str);

    match auth_service::register(users.get_ref(), &form, config.bcrypt_cost).await {
        Ok(_) => redirect("/login").finish(),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                log::error!("❌ Registration error: {} - {}", email_str, e);
            } else {
                log::warn!("❌ Registration failed: {} - {}", email_str, e);
            }

            let message = e.user_message().unwrap_or_default();
            let flash_sid = sessions.push_flash(session_id(&req).as_deref(), message, Utc::now());

            // Error status plus a Location the browser can still follow
            HttpResponse::build(status)
                .insert_header((header::LOCATION, "/register"))
                .cookie(session_cookie(&flash_sid, config.cookie_secure))
                .content_type(header::ContentType::html())
                .body(views::redirect_notice("/register"))
        }
    }
}
