//! Request handlers.
//!
//! Store writes and market fetches are blocking; they run on the blocking
//! pool via `spawn_blocking`.

use crate::error::WebError;
use crate::pages;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use marketdesk_core::assemble;
use marketdesk_store::{LeadForm, Signup, SignupOutcome};
use tokio::task::spawn_blocking;

pub async fn home() -> Html<String> {
    Html(pages::home())
}

pub async fn signup_form() -> Html<String> {
    Html(pages::signup(None))
}

/// Register a user. A taken username re-renders the form with a warning;
/// success redirects to the login page with 303.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<Signup>,
) -> Result<Response, WebError> {
    let store = state.store.clone();
    let outcome = spawn_blocking(move || store.users.register(&form)).await??;

    Ok(match outcome {
        SignupOutcome::Created(_) => Redirect::to("/login").into_response(),
        SignupOutcome::UsernameTaken => {
            Html(pages::signup(Some(pages::USERNAME_TAKEN))).into_response()
        }
    })
}

/// Persist a lead and redirect to the thank-you page with 303.
pub async fn submit_lead(
    State(state): State<AppState>,
    Form(form): Form<LeadForm>,
) -> Result<Redirect, WebError> {
    let store = state.store.clone();
    spawn_blocking(move || store.leads.submit(form)).await??;
    Ok(Redirect::to("/thankyou"))
}

pub async fn thankyou() -> Html<String> {
    Html(pages::thankyou())
}

/// Fetch both sources and render the four tables. Source failures show up as
/// placeholder rows, never as an error response.
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let (nse, bse) = (state.nse.clone(), state.bse.clone());
    let dashboard = spawn_blocking(move || assemble(nse.as_ref(), bse.as_ref())).await?;
    Ok(Html(pages::dashboard(Some(&dashboard), None)))
}

pub async fn login_form() -> Html<String> {
    Html(pages::login())
}

/// Placeholder: no credential check, renders the dashboard shell with a
/// success message.
pub async fn login() -> Html<String> {
    tracing::info!("login placeholder rendered");
    Html(pages::dashboard(None, Some(pages::LOGIN_SUCCESS)))
}
