use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::db::{create_pool, Database, Table};
use crate::models::{
    ApiResponse, FilterOptions, FilterSet, GoalsShots, KeyMetrics, ModelPerformance,
    PredictionQuery, PredictionRow, ResultAnalytics, StandingsRow, TeamLocation, TeamSeasonStats,
};
use crate::services::{analytics, geo, predictions, standings, CacheCategory, QueryCache};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: Arc<QueryCache>,
    pub max_rows: usize,
}

pub async fn serve(port: u16, settings: &Settings) -> anyhow::Result<()> {
    let pool = create_pool(&settings.database.url).await?;
    let state = AppState {
        db: Database::new(pool),
        cache: Arc::new(QueryCache::new(settings.app.cache_ttl_secs)),
        max_rows: settings.app.max_rows_display,
    };

    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Pitchboard API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/predictions", get(predictions_handler))
        .route("/matches/recent", get(recent_matches_handler))
        .route("/analytics/metrics", get(key_metrics_handler))
        .route("/analytics/results", get(result_analytics_handler))
        .route("/analytics/goals-shots", get(goals_shots_handler))
        .route("/analytics/leagues", get(league_breakdown_handler))
        .route("/standings", get(standings_handler))
        .route("/standings/compare", get(compare_handler))
        .route("/standings/filters", get(standings_filters_handler))
        .route("/filters", get(filter_options_handler))
        .route("/models/performance", get(model_performance_handler))
        .route("/models/accuracy", get(accuracy_handler))
        .route("/teams/locations", get(locations_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Split a comma-separated multi-select parameter; empty means unfiltered.
fn csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Pitchboard API is running"))
}

// Shared filter parameters for the match-history analytics endpoints
#[derive(Deserialize)]
struct AnalyticsParams {
    leagues: Option<String>,
    seasons: Option<String>,
    teams: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

impl AnalyticsParams {
    fn into_filter_set(self) -> FilterSet {
        FilterSet {
            leagues: csv_list(self.leagues),
            seasons: csv_list(self.seasons),
            teams: csv_list(self.teams),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

// GET /predictions - enhanced predictions with stadium coordinates
#[derive(Deserialize)]
struct PredictionParams {
    leagues: Option<String>,
    teams: Option<String>,
    models: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    current_session: Option<bool>,
}

async fn predictions_handler(
    State(state): State<AppState>,
    Query(params): Query<PredictionParams>,
) -> Json<ApiResponse<Vec<PredictionRow>>> {
    let query = PredictionQuery {
        leagues: csv_list(params.leagues),
        teams: csv_list(params.teams),
        models: csv_list(params.models),
        date_from: params.date_from,
        date_to: params.date_to,
        current_session_only: params.current_session.unwrap_or(false),
    };

    if let Some(hit) = state.cache.get(CacheCategory::Predictions, &query) {
        return Json(ApiResponse::success(hit));
    }
    let rows = predictions::enhanced_predictions(&state.db, &query).await;
    state.cache.put(CacheCategory::Predictions, &query, &rows);
    Json(ApiResponse::success(rows))
}

// GET /matches/recent - latest predictions for the overview map
#[derive(Deserialize)]
struct RecentMatchesParams {
    limit: Option<usize>,
}

async fn recent_matches_handler(
    State(state): State<AppState>,
    Query(params): Query<RecentMatchesParams>,
) -> Json<ApiResponse<Vec<PredictionRow>>> {
    let limit = params.limit.unwrap_or(50).min(state.max_rows);

    if let Some(hit) = state.cache.get(CacheCategory::Predictions, &("recent", limit)) {
        return Json(ApiResponse::success(hit));
    }
    let rows = predictions::recent_matches(&state.db, limit).await;
    state
        .cache
        .put(CacheCategory::Predictions, &("recent", limit), &rows);
    Json(ApiResponse::success(rows))
}

// GET /analytics/metrics - KPI cards
async fn key_metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<ApiResponse<KeyMetrics>> {
    let filters = params.into_filter_set();

    if let Some(hit) = state.cache.get(CacheCategory::Analytics, &("metrics", &filters)) {
        return Json(ApiResponse::success(hit));
    }
    let metrics = analytics::key_metrics(&state.db, &filters).await;
    state
        .cache
        .put(CacheCategory::Analytics, &("metrics", &filters), &metrics);
    Json(ApiResponse::success(metrics))
}

// GET /analytics/results - home/draw/away breakdown
async fn result_analytics_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<ApiResponse<ResultAnalytics>> {
    let filters = params.into_filter_set();

    if let Some(hit) = state.cache.get(CacheCategory::Analytics, &("results", &filters)) {
        return Json(ApiResponse::success(hit));
    }
    let results = analytics::result_analytics(&state.db, &filters).await;
    state
        .cache
        .put(CacheCategory::Analytics, &("results", &filters), &results);
    Json(ApiResponse::success(results))
}

// GET /analytics/goals-shots
async fn goals_shots_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<ApiResponse<GoalsShots>> {
    let filters = params.into_filter_set();

    if let Some(hit) = state.cache.get(CacheCategory::Analytics, &("goals_shots", &filters)) {
        return Json(ApiResponse::success(hit));
    }
    let data = analytics::goals_shots(&state.db, &filters).await;
    state
        .cache
        .put(CacheCategory::Analytics, &("goals_shots", &filters), &data);
    Json(ApiResponse::success(data))
}

// GET /analytics/leagues - per-league breakdown for charting
async fn league_breakdown_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<ApiResponse<Table>> {
    let filters = params.into_filter_set();
    let table = analytics::league_breakdown(&state.db, &filters).await;
    Json(ApiResponse::success(table))
}

// GET /standings - league table
async fn standings_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<ApiResponse<Vec<StandingsRow>>> {
    let filters = params.into_filter_set();

    if let Some(hit) = state.cache.get(CacheCategory::Analytics, &("standings", &filters)) {
        return Json(ApiResponse::success(hit));
    }
    let rows = standings::league_table(&state.db, &filters).await;
    state
        .cache
        .put(CacheCategory::Analytics, &("standings", &filters), &rows);
    Json(ApiResponse::success(rows))
}

// GET /standings/compare?home=..&away=..&season=..
#[derive(Deserialize)]
struct CompareParams {
    home: String,
    away: String,
    season: Option<String>,
}

async fn compare_handler(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Json<ApiResponse<BTreeMap<String, TeamSeasonStats>>> {
    let stats = standings::team_comparison(
        &state.db,
        &params.home,
        &params.away,
        params.season.as_deref(),
    )
    .await;
    Json(ApiResponse::success(stats))
}

// GET /standings/filters - dropdown options for the standings view
async fn standings_filters_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<FilterOptions>> {
    if let Some(hit) = state.cache.get(CacheCategory::FilterOptions, &"standings") {
        return Json(ApiResponse::success(hit));
    }
    let options = standings::standings_filter_options(&state.db).await;
    state
        .cache
        .put(CacheCategory::FilterOptions, &"standings", &options);
    Json(ApiResponse::success(options))
}

// GET /filters - dropdown options for the match-history views
async fn filter_options_handler(State(state): State<AppState>) -> Json<ApiResponse<FilterOptions>> {
    if let Some(hit) = state.cache.get(CacheCategory::FilterOptions, &"history") {
        return Json(ApiResponse::success(hit));
    }
    let options = predictions::filter_options(&state.db).await;
    state
        .cache
        .put(CacheCategory::FilterOptions, &"history", &options);
    Json(ApiResponse::success(options))
}

// GET /models/performance
async fn model_performance_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ModelPerformance>>> {
    if let Some(hit) = state.cache.get(CacheCategory::Analytics, &"model_performance") {
        return Json(ApiResponse::success(hit));
    }
    let perf = predictions::model_performance(&state.db).await;
    state
        .cache
        .put(CacheCategory::Analytics, &"model_performance", &perf);
    Json(ApiResponse::success(perf))
}

// GET /models/accuracy - monthly volume and confidence per model
async fn accuracy_handler(State(state): State<AppState>) -> Json<ApiResponse<Table>> {
    let table = predictions::accuracy_over_time(&state.db).await;
    Json(ApiResponse::success(table))
}

// GET /teams/locations - stadium coordinates for the map
async fn locations_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<TeamLocation>>> {
    if let Some(hit) = state.cache.get(CacheCategory::FilterOptions, &"locations") {
        return Json(ApiResponse::success(hit));
    }
    let locations = geo::teams_with_coordinates(&state.db).await;
    state
        .cache
        .put(CacheCategory::FilterOptions, &"locations", &locations);
    Json(ApiResponse::success(locations))
}
