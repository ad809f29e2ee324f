use crate::gui_bridge::model::DisplayModel;
use anyhow::Result;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter, Reply};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Read-only HTTP surface over the most recently rendered artifacts.
///
/// Rendering happens on the control thread; the bridge only ever serves
/// copies handed to [`DisplayBridge::publish`].
pub struct DisplayBridge {
    state: Arc<RwLock<DisplayModel>>,
}

impl DisplayBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DisplayModel::default())),
        }
    }

    /// Starts serving `/map`, `/plot` and `/status` on a background thread.
    pub fn serve(&self, address: SocketAddr) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let map_route = warp::path("map")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<DisplayModel>>| {
                let body = state.read().ok().and_then(|model| model.map_html.clone());
                html_reply(body)
            });

        let plot_route = warp::path("plot")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<DisplayModel>>| {
                let body = state
                    .read()
                    .ok()
                    .and_then(|model| model.time_plot_html.clone());
                html_reply(body)
            });

        let status_route = warp::path("status")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<DisplayModel>>| {
                let status = state.read().ok().map(|model| {
                    json!({
                        "samples": model.samples,
                        "map_ready": model.has_map(),
                        "time_plot_ready": model.time_plot_html.is_some(),
                        "metrics": model.metrics,
                    })
                });
                match status {
                    Some(status) => warp::reply::json(&status).into_response(),
                    None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                }
            });

        thread::spawn(move || {
            let routes = map_route.or(plot_route).or(status_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("display bridge runtime failed: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        info!("display bridge listening on http://{}", address);
    }

    pub fn publish(&self, model: &DisplayModel) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("display state poisoned"))?;
        *guard = model.clone();
        info!(
            "published {} samples (map ready: {})",
            guard.samples,
            guard.has_map()
        );
        Ok(())
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> DisplayModel {
        self.state.read().unwrap().clone()
    }
}

impl Default for DisplayBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn html_reply(body: Option<String>) -> warp::reply::Response {
    match body {
        Some(body) => warp::reply::html(body).into_response(),
        None => warp::reply::with_status("nothing rendered yet", StatusCode::NOT_FOUND)
            .into_response(),
    }
}
