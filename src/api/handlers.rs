use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use log::{info, warn};

use crate::data::models::SymbolRef;
use crate::data::{SymbolDirectory, DEFAULT_SEARCH_LIMIT};
use crate::error::WatchlistError;
use crate::panel::{panel_key, render_panel, ExchangeVolume, PanelBoard, PanelView};
use crate::watchlist::WatchlistController;

#[derive(Clone)]
pub struct ApiState {
    pub controller: Arc<Mutex<WatchlistController>>,
    pub board: Arc<PanelBoard>,
    pub symbols: Arc<SymbolDirectory>,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    #[serde(default)]
    pub ticker: String,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WatchlistResponse {
    pub success: bool,
    pub message: String,
    pub tickers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub ticker: String,
    pub expanded: bool,
}

type ApiError = (StatusCode, Json<WatchlistResponse>);

fn status_for(error: &WatchlistError) -> StatusCode {
    match error {
        WatchlistError::NoSelection => StatusCode::BAD_REQUEST,
        WatchlistError::AlreadyTracked(_) => StatusCode::CONFLICT,
        WatchlistError::NotTracked(_) => StatusCode::NOT_FOUND,
    }
}

fn reject(error: WatchlistError, controller: &WatchlistController) -> ApiError {
    warn!("Watchlist request rejected: {}", error);
    (status_for(&error), Json(WatchlistResponse {
        success: false,
        message: error.to_string(),
        tickers: controller.tickers().to_vec(),
    }))
}

fn accept(message: String, controller: &WatchlistController) -> Json<WatchlistResponse> {
    Json(WatchlistResponse {
        success: true,
        message,
        tickers: controller.tickers().to_vec(),
    })
}

// GET /api/watchlist
pub async fn get_watchlist(State(state): State<ApiState>) -> Json<WatchlistResponse> {
    let controller = state.controller.lock();
    accept(format!("{} tickers tracked", controller.tickers().len()), &controller)
}

// POST /api/watchlist - Track a new ticker
pub async fn add_ticker(
    State(state): State<ApiState>,
    Json(request): Json<AddRequest>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let mut controller = state.controller.lock();
    match controller.add(&request.ticker) {
        Ok(_fetch) => {
            info!("Ticker added via API: {}", request.ticker);
            Ok(accept(format!("{} added", request.ticker), &controller))
        }
        Err(e) => Err(reject(e, &controller)),
    }
}

// DELETE /api/watchlist/:ticker
pub async fn remove_ticker(
    State(state): State<ApiState>,
    Path(ticker): Path<String>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let mut controller = state.controller.lock();
    match controller.remove(&ticker) {
        Ok(()) => Ok(accept(format!("{} removed", ticker), &controller)),
        Err(e) => Err(reject(e, &controller)),
    }
}

// POST /api/watchlist/:ticker/refresh
pub async fn refresh_ticker(
    State(state): State<ApiState>,
    Path(ticker): Path<String>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let controller = state.controller.lock();
    match controller.refresh(&ticker) {
        Ok(_fetch) => Ok(accept(format!("{} refresh started", ticker), &controller)),
        Err(e) => Err(reject(e, &controller)),
    }
}

// POST /api/watchlist/:ticker/toggle
pub async fn toggle_ticker(
    State(state): State<ApiState>,
    Path(ticker): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let controller = state.controller.lock();
    match controller.toggle(&ticker) {
        Ok(expanded) => Ok(Json(ToggleResponse {
            success: true,
            ticker,
            expanded,
        })),
        Err(e) => Err(reject(e, &controller)),
    }
}

// GET /api/panels - Rendered panels in watchlist order
pub async fn get_panels(State(state): State<ApiState>) -> Json<Vec<PanelView>> {
    Json(state.board.panels().iter().map(render_panel).collect())
}

// GET /api/panels/:ticker
pub async fn get_panel(
    State(state): State<ApiState>,
    Path(ticker): Path<String>,
) -> Result<Json<PanelView>, StatusCode> {
    state
        .board
        .get(&panel_key(&ticker))
        .map(|panel| Json(render_panel(&panel)))
        .ok_or(StatusCode::NOT_FOUND)
}

// GET /api/market - Exchange volume snapshot
pub async fn get_market(State(state): State<ApiState>) -> Json<Vec<ExchangeVolume>> {
    Json(state.board.market())
}

// GET /api/symbols - Selector search
pub async fn search_symbols(
    State(state): State<ApiState>,
    Query(query): Query<SymbolQuery>,
) -> Json<Vec<SymbolRef>> {
    let q = query.q.unwrap_or_default();
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Json(state.symbols.search(&q, limit))
}

// GET /api/health - Health check endpoint
pub async fn health_check(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "stock_watch_api",
        "tracked": state.controller.lock().tickers().len(),
        "symbols": state.symbols.len(),
        "timestamp": chrono::Utc::now()
    }))
}

// Create the API router
pub fn create_api_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/symbols", get(search_symbols))
        .route("/watchlist", get(get_watchlist).post(add_ticker))
        .route("/watchlist/:ticker", axum::routing::delete(remove_ticker))
        .route("/watchlist/:ticker/refresh", post(refresh_ticker))
        .route("/watchlist/:ticker/toggle", post(toggle_ticker))
        .route("/panels", get(get_panels))
        .route("/panels/:ticker", get(get_panel))
        .route("/market", get(get_market))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use crate::data::models::{CompanyProfile, NewsResponse};
    use crate::data::{PubSubManager, StockDataFetcher};
    use crate::panel::StockPanelFactory;
    use crate::test_support::{FakeNewsApi, FakeStockApi};
    use crate::watchlist::store::MemoryStore;
    use crate::watchlist::PersistentList;

    fn test_router() -> (Router, ApiState) {
        let board = Arc::new(PanelBoard::new(Arc::new(PubSubManager::new(16))));
        let api = FakeStockApi::new().with_company("AAPL", CompanyProfile {
            company_name: Some("Apple Inc.".to_string()),
            ..Default::default()
        });
        let fetcher = StockDataFetcher::new(
            Arc::new(api),
            Arc::new(FakeNewsApi::new(NewsResponse::default())),
            board.clone(),
        );
        let controller = WatchlistController::new(
            PersistentList::new(Arc::new(MemoryStore::new()), "stocks"),
            StockPanelFactory::new(board.clone()),
            fetcher,
        );
        let state = ApiState {
            controller: Arc::new(Mutex::new(controller)),
            board,
            symbols: Arc::new(SymbolDirectory::new()),
        };
        (create_api_router(state.clone()), state)
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let (router, _state) = test_router();

        let (status, body) = call(&router, Method::POST, "/api/watchlist", Some(r#"{"ticker":"AAPL"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"], serde_json::json!(["AAPL"]));

        let (status, body) = call(&router, Method::GET, "/api/panels", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["key"], "stock-AAPL");
        assert_eq!(body[0]["expanded"], true);
    }

    #[tokio::test]
    async fn test_user_input_errors() {
        let (router, _state) = test_router();

        let (status, body) = call(&router, Method::POST, "/api/watchlist", Some(r#"{"ticker":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], WatchlistError::NoSelection.to_string());

        call(&router, Method::POST, "/api/watchlist", Some(r#"{"ticker":"AAPL"}"#)).await;
        let (status, body) = call(&router, Method::POST, "/api/watchlist", Some(r#"{"ticker":"AAPL"}"#)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["tickers"], serde_json::json!(["AAPL"]));
    }

    #[tokio::test]
    async fn test_remove_toggle_refresh() {
        let (router, state) = test_router();
        call(&router, Method::POST, "/api/watchlist", Some(r#"{"ticker":"AAPL"}"#)).await;

        let (status, body) = call(&router, Method::POST, "/api/watchlist/AAPL/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expanded"], false);

        let (status, _) = call(&router, Method::POST, "/api/watchlist/AAPL/refresh", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&router, Method::DELETE, "/api/watchlist/AAPL", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"], serde_json::json!([]));
        assert!(state.board.is_empty());

        let (status, _) = call(&router, Method::DELETE, "/api/watchlist/AAPL", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&router, Method::GET, "/api/panels/AAPL", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_symbol_search() {
        let (router, state) = test_router();
        state.symbols.load(Arc::new(FakeStockApi::new().with_symbols(&["AA", "AAPL", "MSFT"]))).await;

        let (status, body) = call(&router, Method::GET, "/api/symbols?q=aa", None).await;
        assert_eq!(status, StatusCode::OK);
        let symbols: Vec<&str> = body.as_array().unwrap().iter().map(|s| s["symbol"].as_str().unwrap()).collect();
        assert_eq!(symbols, vec!["AA", "AAPL"]);

        let (_, body) = call(&router, Method::GET, "/api/symbols?q=a&limit=1", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = call(&router, Method::GET, "/api/symbols", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_market_snapshot() {
        let (router, state) = test_router();
        let (status, body) = call(&router, Method::GET, "/api/market", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        state.board.update_market(ExchangeVolume {
            exchange: "NASDAQ".to_string(),
            volume: Some("1,234,567".to_string()),
            updated_at: Some("10/14/2026, 9:30:00 AM".to_string()),
        });

        let (_, body) = call(&router, Method::GET, "/api/market", None).await;
        assert_eq!(body[0]["exchange"], "NASDAQ");
        assert_eq!(body[0]["volume"], "1,234,567");
        assert_eq!(body[0]["updated_at"], "10/14/2026, 9:30:00 AM");
    }
}
