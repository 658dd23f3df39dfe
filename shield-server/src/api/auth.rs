//! Login / logout
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /login | GET | no |
//! | /login | POST | no (rate limited per IP) |
//! | /logout | GET | no |

use axum::{
    Extension, Form, Router,
    extract::State,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::auth::rate_limit::login_rate_limit;
use crate::auth::{FlashLevel, Session};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::MAX_PASSWORD_LEN;
use crate::views;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit))
        .route("/logout", get(logout))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

async fn login_form(Extension(session): Extension<Session>) -> Html<String> {
    Html(views::login_page(&session.take_flashes()))
}

async fn login(
    State(state): State<ServerState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Response {
    let accepted =
        form.password.len() <= MAX_PASSWORD_LEN && state.credential.verify(&form.password);

    if accepted {
        session.login();
        session.flash(FlashLevel::Success, "Logged in successfully!");
        tracing::info!("Admin logged in");
        return Redirect::to("/admin").into_response();
    }

    security_log!("WARN", "login_failed", reason = "invalid_password");
    session.flash(FlashLevel::Danger, "Invalid password!");
    Html(views::login_page(&session.take_flashes())).into_response()
}

async fn logout(Extension(session): Extension<Session>) -> Redirect {
    session.logout();
    session.flash(FlashLevel::Info, "You have been logged out.");
    Redirect::to("/login")
}
