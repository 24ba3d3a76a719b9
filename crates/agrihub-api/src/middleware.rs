use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use agrihub_types::Actor;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Build the acting user from the identity headers set by the front end.
pub async fn require_actor(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let headers = req.headers();
    let id = header_text(headers, USER_ID_HEADER).ok_or(ApiError::Unauthorized)?;

    let mut actor = Actor::new(id);
    if let Some(name) = header_text(headers, USER_NAME_HEADER) {
        actor = actor.with_name(name);
    }
    if let Some(email) = header_text(headers, USER_EMAIL_HEADER) {
        actor = actor.with_email(email);
    }

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}
