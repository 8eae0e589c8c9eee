use actix_web::HttpResponse;

use super::html;
use crate::views;

pub async fn index() -> HttpResponse {
    html(views::index())
}
