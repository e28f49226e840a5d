//! Queries over the upstream prediction batches.
//!
//! Predictions arrive in sessions: one batch per external model run,
//! identified by a monotonically increasing `session_id`. The latest
//! session is the "current" one.

use crate::db::filter::prediction_clauses;
use crate::db::{Database, Table};
use crate::models::{FilterOptions, ModelPerformance, PredictionQuery, PredictionRow};
use crate::utils::round2;

const PREDICTION_COLUMNS: &str = "\
    ep.session_id, \
    ep.model, \
    ep.game_date, \
    ep.game_time, \
    ep.league, \
    ep.home_team, \
    ep.away_team, \
    ep.predicted_result, \
    CASE ep.predicted_result \
        WHEN 'H' THEN ep.avg_home_odds \
        WHEN 'D' THEN ep.avg_draw_odds \
        WHEN 'A' THEN ep.avg_away_odds \
    END AS predicted_odds, \
    ep.confidence, \
    ep.draw_probability, \
    COALESCE(tl.stadium, 'Unknown') AS stadium, \
    COALESCE(tl.city, 'Unknown') AS city, \
    tl.latitude, \
    tl.longitude";

/// Latest session identifier, if any predictions exist.
pub async fn latest_session_id(db: &Database) -> Option<i64> {
    let table = db
        .fetch_table(
            "SELECT MAX(session_id) AS latest_session_id FROM predictions",
            &[],
        )
        .await;
    table.get_f64(0, "latest_session_id").map(|v| v as i64)
}

/// Predictions with stadium coordinates resolved via the home side.
///
/// When `current_session_only` is set, the scope is the latest session
/// batch and any date bounds in the query are ignored.
pub async fn enhanced_predictions(db: &Database, query: &PredictionQuery) -> Vec<PredictionRow> {
    let session_id = if query.current_session_only {
        latest_session_id(db).await
    } else {
        None
    };

    let clause = prediction_clauses(query, session_id);
    let sql = format!(
        "SELECT {PREDICTION_COLUMNS} \
         FROM predictions ep \
         LEFT JOIN team_locations tl ON ep.home_team = tl.team\
         {} \
         ORDER BY ep.game_date DESC, ep.game_time ASC",
        clause.where_prefix()
    );
    let table = db.fetch_table(&sql, &clause.params()).await;
    materialize_rows(&table)
}

/// Shorthand for the dashboard's default view.
pub async fn current_session_predictions(db: &Database) -> Vec<PredictionRow> {
    let query = PredictionQuery {
        current_session_only: true,
        ..Default::default()
    };
    enhanced_predictions(db, &query).await
}

/// Latest predictions for the overview map, newest first.
pub async fn recent_matches(db: &Database, limit: usize) -> Vec<PredictionRow> {
    let sql = format!(
        "SELECT {PREDICTION_COLUMNS} \
         FROM predictions ep \
         LEFT JOIN team_locations tl ON ep.home_team = tl.team \
         ORDER BY ep.game_date DESC, ep.game_time DESC \
         LIMIT {}",
        limit.min(500)
    );
    let table = db.fetch_table(&sql, &[]).await;
    materialize_rows(&table)
}

fn materialize_rows(table: &Table) -> Vec<PredictionRow> {
    (0..table.row_count())
        .map(|row| PredictionRow {
            session_id: table.get_i64(row, "session_id"),
            model: table.get_str(row, "model"),
            game_date: table.get_str(row, "game_date"),
            game_time: table.get_str(row, "game_time"),
            league: table.get_str(row, "league"),
            home_team: table.get_str(row, "home_team"),
            away_team: table.get_str(row, "away_team"),
            predicted_result: table.get_str(row, "predicted_result"),
            predicted_odds: table.get_f64(row, "predicted_odds"),
            confidence: table.get_f64(row, "confidence").unwrap_or(0.0),
            draw_probability: table.get_f64(row, "draw_probability").unwrap_or(0.0),
            stadium: table.get_str(row, "stadium"),
            city: table.get_str(row, "city"),
            latitude: table.get_f64(row, "latitude"),
            longitude: table.get_f64(row, "longitude"),
        })
        .collect()
}

/// Per-model prediction counts and confidence spread.
pub async fn model_performance(db: &Database) -> Vec<ModelPerformance> {
    let table = db
        .fetch_table(
            "SELECT model, \
                    COUNT(*) AS total_predictions, \
                    AVG(confidence) AS avg_confidence, \
                    MAX(confidence) AS max_confidence, \
                    MIN(confidence) AS min_confidence, \
                    COUNT(CASE WHEN predicted_result = 'H' THEN 1 END) AS home_predictions, \
                    COUNT(CASE WHEN predicted_result = 'D' THEN 1 END) AS draw_predictions, \
                    COUNT(CASE WHEN predicted_result = 'A' THEN 1 END) AS away_predictions \
             FROM predictions \
             GROUP BY model \
             ORDER BY avg_confidence DESC",
            &[],
        )
        .await;

    (0..table.row_count())
        .map(|row| ModelPerformance {
            model: table.get_str(row, "model"),
            total_predictions: table.get_i64(row, "total_predictions"),
            avg_confidence: round2(table.get_f64(row, "avg_confidence").unwrap_or(0.0)),
            max_confidence: table.get_f64(row, "max_confidence").unwrap_or(0.0),
            min_confidence: table.get_f64(row, "min_confidence").unwrap_or(0.0),
            home_predictions: table.get_i64(row, "home_predictions"),
            draw_predictions: table.get_i64(row, "draw_predictions"),
            away_predictions: table.get_i64(row, "away_predictions"),
        })
        .collect()
}

/// Prediction volume and average confidence per month per model.
pub async fn accuracy_over_time(db: &Database) -> Table {
    db.fetch_table(
        "SELECT strftime('%Y-%m', game_date) AS month, \
                model, \
                COUNT(*) AS predictions_count, \
                AVG(confidence) AS avg_confidence \
         FROM predictions \
         GROUP BY strftime('%Y-%m', game_date), model \
         ORDER BY month DESC, model",
        &[],
    )
    .await
}

/// Distinct leagues, seasons and teams for the dashboard dropdowns.
pub async fn filter_options(db: &Database) -> FilterOptions {
    let leagues = db
        .fetch_table(
            "SELECT DISTINCT league FROM match_results \
             WHERE league IS NOT NULL AND result IN ('H', 'D', 'A') \
             ORDER BY league",
            &[],
        )
        .await;

    let seasons = db
        .fetch_table(
            "SELECT DISTINCT season FROM match_results \
             WHERE season IS NOT NULL AND result IN ('H', 'D', 'A') \
             ORDER BY season DESC",
            &[],
        )
        .await;

    let teams = db
        .fetch_table(
            "SELECT team FROM ( \
                 SELECT home_team AS team FROM match_results \
                 WHERE home_team IS NOT NULL AND result IN ('H', 'D', 'A') \
                 UNION \
                 SELECT away_team AS team FROM match_results \
                 WHERE away_team IS NOT NULL AND result IN ('H', 'D', 'A') \
             ) AS all_teams \
             ORDER BY team",
            &[],
        )
        .await;

    FilterOptions {
        leagues: leagues.str_column("league"),
        seasons: seasons.str_column("season"),
        teams: teams.str_column("team"),
    }
}
