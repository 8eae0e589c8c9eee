use actix_web::{web, HttpResponse};

use super::{html, redirect};
use crate::{database::UserStore, models::CurrentUser, services::session_service::SessionStore, views};

/// Mounted behind `SessionGate`, which supplies `CurrentUser`.
pub async fn dashboard(
    current: web::ReqData<CurrentUser>,
    users: web::Data<dyn UserStore>,
    sessions: web::Data<SessionStore>,
) -> HttpResponse {
    let Some(user) = users.find_by_id(&current.user_id).await else {
        log::warn!("⚠️  Session user {} not found", current.user_id);
        return redirect("/login").finish();
    };

    log::info!("📊 GET /dashboard - user: {}", user.email);

    let message = sessions.take_flash(Some(&current.session_id));
    html(views::dashboard(&user.name, message.as_deref()))
}
