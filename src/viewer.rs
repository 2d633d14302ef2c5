//! Interactive display: the figure is served on localhost until the viewer is closed with Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use crate::figure::Figure;
use crate::style::FigureStyle;

pub const DEFAULT_PORT: u16 = 3000;

/// Serve `figure` on `127.0.0.1:<port>`, blocking until Ctrl-C.
pub fn serve(figure: &Figure, style: &FigureStyle, port: u16) -> Result<()> {
    let state = ViewerState::new(figure, style)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(serve_impl(state, port))
}

/// Everything is rendered up front; handlers only hand out the cached strings.
#[derive(Debug, Clone)]
struct ViewerState {
    page: Arc<str>,
    svg: Arc<str>,
    summary: Arc<str>,
}

impl ViewerState {
    fn new(figure: &Figure, style: &FigureStyle) -> Result<Self> {
        let svg = figure.to_svg_string(Some(style))?;
        let page = render_page(figure, style, &svg)?;
        Ok(Self {
            page: page.into(),
            svg: svg.into(),
            summary: figure.summary.as_str().into(),
        })
    }
}

#[derive(serde::Serialize)]
struct HbsData<'a> {
    title: &'a str,
    background: String,
    svg: &'a str,
}

fn render_page(figure: &Figure, style: &FigureStyle, svg: &str) -> Result<String> {
    use handlebars::Handlebars;
    let mut handlebars = Handlebars::new();

    let source = include_str!("../static/index.hbs");
    handlebars
        .register_template_string("index", source)
        .context("invalid page template")?;

    let (r, g, b, _) = style.background_color.as_rgba8();
    let page = handlebars.render(
        "index",
        &HbsData {
            title: &figure.title,
            background: format!("#{r:02x}{g:02x}{b:02x}"),
            svg,
        },
    )?;
    Ok(page)
}

fn router(state: ViewerState) -> axum::Router {
    axum::Router::new()
        .route("/", get(page_handler))
        .route("/figure.svg", get(svg_handler))
        .route("/summary.txt", get(summary_handler))
        .with_state(state)
}

async fn serve_impl(state: ViewerState, port: u16) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("could not bind port {port}"))?;
    tracing::info!(
        url = %format!("http://{}", listener.local_addr()?),
        "serving figure, press Ctrl-C to close"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("viewer closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn page_handler(State(state): State<ViewerState>) -> Html<String> {
    Html(state.page.to_string())
}

async fn svg_handler(State(state): State<ViewerState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        state.svg.to_string(),
    )
}

async fn summary_handler(State(state): State<ViewerState>) -> String {
    state.summary.to_string()
}
