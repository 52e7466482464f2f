use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{
        header::{HeaderValue, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer, CompressionLevel};

use pubstats::{build_report, ChartColors, FilterOptions, FilterSelection, Page, PublicationTable};

use crate::{
    gate::AccessGate,
    html::{render_dashboard, render_login},
    session::{expire_cookie, set_cookie, token_from_headers, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<PublicationTable>,
    pub options: Arc<FilterOptions>,
    pub gate: Option<Arc<AccessGate>>,
    pub sessions: Arc<SessionStore>,
    pub colors: Arc<ChartColors>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Default, PartialEq)]
struct DashboardQuery {
    page: Page,
    years: Vec<String>,
    orgs: Vec<String>,
    filtered: bool,
}

//a request's view of its session: the token, and whether it was just minted
struct SessionHandle {
    token: String,
    fresh: bool,
}

impl AppState {
    pub fn new(table: Arc<PublicationTable>, gate: Option<AccessGate>, colors: ChartColors) -> Self {
        let options = FilterOptions::from_table(&table);
        Self {
            table,
            options: options.into(),
            gate: gate.map(Arc::new),
            sessions: SessionStore::new().into(),
            colors: colors.into(),
        }
    }

    fn authorized(&self, token: &str) -> bool {
        match &self.gate {
            None => true,
            Some(gate) => gate.is_authorized(&self.sessions.get(token)),
        }
    }
}

impl From<Vec<(String, String)>> for DashboardQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut out = Self::default();
        for (k, v) in pairs {
            match k.as_str() {
                "page" => out.page = Page::from_slug(&v).unwrap_or_default(),
                "year" => out.years.push(v),
                "org" => out.orgs.push(v),
                "filtered" => out.filtered = true,
                _ => {}
            }
        }
        out
    }
}

impl DashboardQuery {
    fn selection(&self, options: &FilterOptions) -> FilterSelection {
        if self.filtered {
            options.select(&self.years, &self.orgs)
        } else {
            options.select_all()
        }
    }
}

impl SessionHandle {
    fn from_headers(headers: &HeaderMap) -> Self {
        match token_from_headers(headers) {
            Some(token) => Self {
                token,
                fresh: false,
            },
            None => Self {
                token: SessionStore::new_token(),
                fresh: true,
            },
        }
    }

    fn attach(&self, resp: impl IntoResponse) -> Response {
        let mut resp = resp.into_response();
        if self.fresh {
            if let Ok(v) = HeaderValue::from_str(&set_cookie(&self.token)) {
                resp.headers_mut().insert(SET_COOKIE, v);
            }
        }
        resp
    }
}

pub fn app(state: AppState) -> Router {
    let compression = CompressionLayer::new()
        .gzip(true)
        .quality(CompressionLevel::Fastest);

    Router::new()
        .route("/", get(index_get))
        .route("/login", post(login_post))
        .route("/logout", post(logout_post))
        .route("/api/report", get(report_get))
        .route("/health", get(health_get))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(compression),
        )
        .with_state(state)
}

async fn index_get(
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Response {
    let session = SessionHandle::from_headers(&headers);
    if !state.authorized(&session.token) {
        let current = state.sessions.get(&session.token);
        let body = render_login(current.show_error(), current.username.as_deref());
        return session.attach(Html(body));
    }
    let query = DashboardQuery::from(pairs);
    let selection = query.selection(&state.options);
    let report = build_report(&state.table, query.page, &selection, &state.colors);
    let body = render_dashboard(
        &report,
        &state.options,
        &selection,
        &state.colors,
        state.gate.is_some(),
    );
    session.attach(Html(body))
}

async fn login_post(
    headers: HeaderMap,
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    let session = SessionHandle::from_headers(&headers);
    let Some(gate) = &state.gate else {
        return session.attach(Redirect::to("/"));
    };
    let mut current = state.sessions.get(&session.token);
    current.submit(form.username, form.password);
    if gate.password_entered(&mut current) {
        //a fresh token after login, the presented one may have been planted
        state.sessions.remove(&session.token);
        let rotated = SessionHandle {
            token: SessionStore::new_token(),
            fresh: true,
        };
        state.sessions.insert(&rotated.token, current);
        return rotated.attach(Redirect::to("/"));
    }
    //cookieless clients get no stored state for a rejection
    if !session.fresh {
        state.sessions.insert(&session.token, current);
    }
    session.attach(Redirect::to("/"))
}

async fn logout_post(headers: HeaderMap, State(state): State<AppState>) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.remove(&token);
    }
    let mut resp = Redirect::to("/").into_response();
    if let Ok(v) = HeaderValue::from_str(&expire_cookie()) {
        resp.headers_mut().insert(SET_COOKIE, v);
    }
    resp
}

async fn report_get(
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Response {
    let authorized = token_from_headers(&headers).map_or(state.gate.is_none(), |t| state.authorized(&t));
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let query = DashboardQuery::from(pairs);
    let selection = query.selection(&state.options);
    Json(build_report(&state.table, query.page, &selection, &state.colors)).into_response()
}

async fn health_get() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_repeated_params() {
        let q = DashboardQuery::from(pairs(&[
            ("page", "organization"),
            ("year", "2020"),
            ("year", "2021"),
            ("filtered", "1"),
        ]));
        assert_eq!(
            q,
            DashboardQuery {
                page: Page::Organization,
                years: vec!["2020".to_string(), "2021".to_string()],
                orgs: vec![],
                filtered: true
            }
        );
    }

    #[test]
    fn unknown_page_falls_back() {
        let q = DashboardQuery::from(pairs(&[("page", "authors"), ("x", "y")]));
        assert_eq!(q, DashboardQuery::default());
    }
}
