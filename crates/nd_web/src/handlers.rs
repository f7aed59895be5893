use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use nd_core::{Error, FilterForm};
use nd_dashboard::controller::PendingLoad;
use nd_dashboard::render::{render_page, render_progress_modal, render_stats};
use nd_dashboard::{TaskKind, TaskReporter};
use tracing::{info, warn};
use crate::AppState;

pub struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Busy(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

fn back_home() -> Redirect {
    Redirect::to("/")
}

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut view = state.controller.lock().await.view().clone();
    view.detail = None;
    let theme = state.theme.lock().await.theme();
    Html(render_page(&view, &state.panel.snapshot(), theme))
}

pub async fn article_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let api = state.controller.lock().await.api();
    let result = api.article_by_id(&id).await;
    let view = {
        let mut controller = state.controller.lock().await;
        // A failure becomes the page alert.
        let _ = controller.apply_article(result);
        controller.view().clone()
    };
    let theme = state.theme.lock().await.theme();
    Html(render_page(&view, &state.panel.snapshot(), theme))
}

pub async fn stats_fragment(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_stats(&state.controller.lock().await.view().stats))
}

pub async fn articles_fragment(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = state.controller.lock().await;
    let view = controller.view();
    Html(format!("{}{}", view.articles_html, view.pagination_html))
}

pub async fn progress_fragment(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_progress_modal(&state.panel.snapshot().modal))
}

// The controller lock is released while the request is in flight; the load
// sequence number decides whether the result still applies.
async fn finish_load(state: &AppState, load: PendingLoad) {
    let api = state.controller.lock().await.api();
    let result = load.fetch(api.as_ref()).await;
    state.controller.lock().await.complete_load(&load, result);
}

pub async fn apply_filters(State(state): State<Arc<AppState>>, Form(form): Form<FilterForm>) -> Redirect {
    let load = state.controller.lock().await.set_filters(form);
    finish_load(&state, load).await;
    back_home()
}

pub async fn reset_filters(State(state): State<Arc<AppState>>) -> Redirect {
    let load = state.controller.lock().await.clear_filters();
    finish_load(&state, load).await;
    back_home()
}

pub async fn go_to_page(State(state): State<Arc<AppState>>, Path(page): Path<u32>) -> Redirect {
    let load = state.controller.lock().await.set_page(page);
    if let Some(load) = load {
        finish_load(&state, load).await;
    }
    back_home()
}

// Stats and list after a task, without holding the controller across either request.
async fn refresh(state: &AppState) {
    let api = state.controller.lock().await.api();
    let stats = api.stats().await;
    let load = {
        let mut controller = state.controller.lock().await;
        let _ = controller.apply_stats(stats);
        controller.begin_load()
    };
    finish_load(state, load).await;
}

async fn run_task(state: Arc<AppState>, kind: TaskKind) {
    if state.tasks.run_started(kind, &state.cancel).await.is_ok() {
        refresh(&state).await;
    }
    state.tasks.dismiss_later(kind).await;
}

// The trigger is claimed before the task is spawned, so the redirect already
// renders it disabled and a second submit is refused.
fn start_task(state: Arc<AppState>, kind: TaskKind) -> Result<Redirect, AppError> {
    if let Err(e) = state.panel.begin(kind) {
        warn!("{}", e);
        return Err(e.into());
    }
    if kind == TaskKind::Process {
        state.cancel.reset();
    }
    info!("🚀 Starting task: {}", kind.title());
    tokio::spawn(run_task(state, kind));
    Ok(back_home())
}

pub async fn process_unprocessed(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    start_task(state, TaskKind::Process)
}

pub async fn fetch_latest(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    start_task(state, TaskKind::Fetch)
}

pub async fn cancel_task(State(state): State<Arc<AppState>>) -> Redirect {
    state.cancel.cancel();
    back_home()
}

pub async fn toggle_theme(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    state.theme.lock().await.toggle().await?;
    Ok(back_home())
}

pub async fn dismiss_alert(State(state): State<Arc<AppState>>) -> Redirect {
    state.controller.lock().await.dismiss_alert();
    back_home()
}
