//! HTTP JSON API for dashboard renderers
//!
//! `evalmatrix serve` → starts server; a renderer polls the endpoints and draws
//! the KPIs, charts and tables itself.

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::Error;
use crate::report::Selection;
use colored::Colorize;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct DashboardInfo<'a> {
    name: &'a str,
    title: &'a str,
    pinned_entity: Option<&'a str>,
}

#[derive(Serialize)]
struct RefreshInfo {
    generation: u64,
}

/// Query parameters shared by the dashboard endpoints
#[derive(Debug, Default, PartialEq)]
struct ApiQuery {
    dashboard: Option<String>,
    selection: Selection,
}

/// Start the JSON API server
pub fn start(config: Config, port: Option<u16>) -> std::io::Result<()> {
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::other(e.to_string()))?;

    eprintln!("\n{}", "evalmatrix".bold().green());
    eprintln!("   API: http://{}/api/report", addr);
    eprintln!("   Press Ctrl+C to stop\n");
    info!(%addr, "server listening");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &config) {
            warn!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

fn handle_request(request: Request, config: &Config) -> std::io::Result<()> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();

    let (status, json) = route(&method, path, query, config)?;
    info!(method = %method, path, status, "request");

    let mut response = Response::from_string(json).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    request.respond(response)
}

/// Dispatch one request; returns the status code and JSON body
fn route(
    method: &Method,
    path: &str,
    query: &str,
    config: &Config,
) -> serde_json::Result<(u16, String)> {
    let query = match parse_query(query) {
        Ok(q) => q,
        Err(message) => return failure(400, message),
    };

    match (method, path) {
        (&Method::Get, "/api/dashboards") => {
            let list: Vec<DashboardInfo> = config
                .dashboards
                .iter()
                .map(|d| DashboardInfo {
                    name: &d.name,
                    title: d.display_title(),
                    pinned_entity: d.pinned_entity.as_deref(),
                })
                .collect();
            success(&list)
        }

        (&Method::Get, "/api/options") => {
            with_dashboard(config, &query, |dashboard| dashboard.filter_options())
        }

        (&Method::Get, "/api/entities") => {
            with_dashboard(config, &query, |dashboard| dashboard.entities())
        }

        (&Method::Get, "/api/report") => with_dashboard(config, &query, |dashboard| {
            dashboard.report(&query.selection)
        }),

        (&Method::Post, "/api/refresh") => success(&RefreshInfo {
            generation: crate::cache::refresh(),
        }),

        _ => failure(404, "Not found"),
    }
}

fn with_dashboard<T, F>(config: &Config, query: &ApiQuery, f: F) -> serde_json::Result<(u16, String)>
where
    T: Serialize,
    F: FnOnce(&Dashboard) -> crate::Result<T>,
{
    match Dashboard::from_config(config, query.dashboard.as_deref()).and_then(|d| f(&d)) {
        Ok(data) => success(&data),
        Err(e) => failure(error_status(&e), e.to_string()),
    }
}

fn success<T: Serialize>(data: T) -> serde_json::Result<(u16, String)> {
    Ok((200, serde_json::to_string(&ApiResponse::success(data))?))
}

fn failure(status: u16, message: impl Into<String>) -> serde_json::Result<(u16, String)> {
    Ok((status, serde_json::to_string(&ApiResponse::failure(message))?))
}

fn error_status(error: &Error) -> u16 {
    if error.is_user_error() {
        400
    } else {
        500
    }
}

/// Repeated `dimension` / `subdimension` keys accumulate into the filter sets
fn parse_query(query: &str) -> Result<ApiQuery, String> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query).map_err(|e| format!("Invalid query: {}", e))?;

    let mut parsed = ApiQuery::default();
    for (key, value) in pairs {
        match key.as_str() {
            "dashboard" => parsed.dashboard = Some(value),
            "dimension" => {
                parsed.selection.filters.dimensions.insert(value);
            }
            "subdimension" => {
                parsed.selection.filters.subdimensions.insert(value);
            }
            "entity" => parsed.selection.entity = Some(value),
            _ => {}
        }
    }
    Ok(parsed)
}
