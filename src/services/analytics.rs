//! Filtered aggregation recipes over the match history table.
//!
//! Every recipe follows the same shape: derive predicate clauses from the
//! filter set, substitute them into a fixed aggregate template, execute,
//! and reshape the single result row with the numeric defaults (zero
//! percentages and averages when no rows qualify).

use crate::db::filter::match_clauses;
use crate::db::{Database, Table};
use crate::models::{FilterSet, GoalsShots, KeyMetrics, ResultAnalytics};
use crate::utils::{average_or_zero, percentage};

/// Completed matches only; rows without a settled result are ignored.
const BASE_PREDICATE: &str = "result IN ('H', 'D', 'A')";

/// Headline counts: games, leagues, seasons, teams.
pub async fn key_metrics(db: &Database, filters: &FilterSet) -> KeyMetrics {
    let clause = match_clauses(filters);
    let suffix = clause.and_suffix();

    let metrics_sql = format!(
        "SELECT COUNT(*) AS total_games, \
                COUNT(DISTINCT league) AS total_leagues, \
                COUNT(DISTINCT season) AS total_seasons \
         FROM match_results WHERE {BASE_PREDICATE}{suffix}"
    );
    let metrics = db.fetch_table(&metrics_sql, &clause.params()).await;

    // Distinct teams over both sides of the fixture. The restriction is
    // embedded twice, so the parameter list is rendered once per occurrence.
    let teams_sql = format!(
        "SELECT COUNT(*) AS total_teams FROM ( \
             SELECT home_team AS team FROM match_results WHERE {BASE_PREDICATE}{suffix} \
             UNION \
             SELECT away_team AS team FROM match_results WHERE {BASE_PREDICATE}{suffix} \
         ) AS unique_teams"
    );
    let mut teams_params = clause.params();
    teams_params.extend(clause.params());
    let teams = db.fetch_table(&teams_sql, &teams_params).await;

    KeyMetrics {
        total_games: metrics.get_i64(0, "total_games"),
        total_leagues: metrics.get_i64(0, "total_leagues"),
        total_seasons: metrics.get_i64(0, "total_seasons"),
        total_teams: teams.get_i64(0, "total_teams"),
    }
}

/// Home/draw/away split with goal, shot and odds averages.
pub async fn result_analytics(db: &Database, filters: &FilterSet) -> ResultAnalytics {
    let clause = match_clauses(filters);
    let suffix = clause.and_suffix();

    let sql = format!(
        "SELECT \
            COUNT(CASE WHEN result = 'H' THEN 1 END) AS home_wins, \
            COUNT(CASE WHEN result = 'A' THEN 1 END) AS away_wins, \
            COUNT(CASE WHEN result = 'D' THEN 1 END) AS draws, \
            COUNT(*) AS total_games, \
            AVG(home_goals + away_goals) AS avg_goals, \
            AVG(home_shots + away_shots) AS avg_shots, \
            AVG(CASE WHEN result = 'H' THEN avg_home_odds END) AS avg_winning_home_odds, \
            AVG(CASE WHEN result = 'D' THEN avg_draw_odds END) AS avg_winning_draw_odds, \
            AVG(CASE WHEN result = 'A' THEN avg_away_odds END) AS avg_winning_away_odds, \
            AVG(avg_home_odds) AS avg_overall_home_odds, \
            AVG(avg_draw_odds) AS avg_overall_draw_odds, \
            AVG(avg_away_odds) AS avg_overall_away_odds \
         FROM match_results WHERE {BASE_PREDICATE}{suffix}"
    );
    let table = db.fetch_table(&sql, &clause.params()).await;

    let home_wins = table.get_i64(0, "home_wins");
    let away_wins = table.get_i64(0, "away_wins");
    let draws = table.get_i64(0, "draws");
    let total_games = table.get_i64(0, "total_games");

    ResultAnalytics {
        home_wins,
        away_wins,
        draws,
        total_games,
        home_percentage: percentage(home_wins, total_games),
        away_percentage: percentage(away_wins, total_games),
        draw_percentage: percentage(draws, total_games),
        avg_goals: average_or_zero(table.get_f64(0, "avg_goals")),
        avg_shots: average_or_zero(table.get_f64(0, "avg_shots")),
        avg_winning_home_odds: average_or_zero(table.get_f64(0, "avg_winning_home_odds")),
        avg_winning_draw_odds: average_or_zero(table.get_f64(0, "avg_winning_draw_odds")),
        avg_winning_away_odds: average_or_zero(table.get_f64(0, "avg_winning_away_odds")),
        avg_overall_home_odds: average_or_zero(table.get_f64(0, "avg_overall_home_odds")),
        avg_overall_draw_odds: average_or_zero(table.get_f64(0, "avg_overall_draw_odds")),
        avg_overall_away_odds: average_or_zero(table.get_f64(0, "avg_overall_away_odds")),
    }
}

/// Goals and shots averages for the filtered scope.
pub async fn goals_shots(db: &Database, filters: &FilterSet) -> GoalsShots {
    let clause = match_clauses(filters);
    let suffix = clause.and_suffix();

    let sql = format!(
        "SELECT AVG(home_goals + away_goals) AS avg_goals, \
                AVG(home_shots + away_shots) AS avg_shots, \
                COUNT(*) AS total_games \
         FROM match_results WHERE {BASE_PREDICATE}{suffix}"
    );
    let table = db.fetch_table(&sql, &clause.params()).await;

    GoalsShots {
        avg_goals: average_or_zero(table.get_f64(0, "avg_goals")),
        avg_shots: average_or_zero(table.get_f64(0, "avg_shots")),
        total_games: table.get_i64(0, "total_games"),
    }
}

/// Per-league goals/shots breakdown for the league chart, ordered by
/// average goals descending. Conversion rate is 0 when no shots exist.
pub async fn league_breakdown(db: &Database, filters: &FilterSet) -> Table {
    let clause = match_clauses(filters);
    let suffix = clause.and_suffix();

    let sql = format!(
        "SELECT league, \
                COUNT(*) AS total_games, \
                AVG(home_goals + away_goals) AS avg_goals, \
                AVG(home_shots + away_shots) AS avg_shots, \
                CASE WHEN AVG(home_shots + away_shots) > 0 \
                     THEN ROUND(AVG(home_goals + away_goals) * 100.0 / AVG(home_shots + away_shots), 1) \
                     ELSE 0 \
                END AS goals_shots_percentage \
         FROM match_results \
         WHERE {BASE_PREDICATE} AND league IS NOT NULL{suffix} \
         GROUP BY league \
         ORDER BY avg_goals DESC"
    );
    db.fetch_table(&sql, &clause.params()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_database;

    async fn insert_match(
        db: &Database,
        league: &str,
        season: &str,
        date: &str,
        home: &str,
        away: &str,
        home_goals: i64,
        away_goals: i64,
        shots: i64,
    ) {
        let result = match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => "H",
            std::cmp::Ordering::Equal => "D",
            std::cmp::Ordering::Less => "A",
        };
        sqlx::query(
            "INSERT INTO match_results \
             (league, season, game_date, home_team, away_team, home_goals, away_goals, \
              home_shots, away_shots, result, avg_home_odds, avg_draw_odds, avg_away_odds) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 2.0, 3.2, 3.5)",
        )
        .bind(league)
        .bind(season)
        .bind(date)
        .bind(home)
        .bind(away)
        .bind(home_goals)
        .bind(away_goals)
        .bind(shots)
        .bind(shots)
        .bind(result)
        .execute(db.pool())
        .await
        .unwrap();
    }

    /// 10 matches: 6 home wins, 2 draws, 2 away wins.
    async fn ten_match_fixture(db: &Database) {
        for i in 0..6 {
            insert_match(db, "Premier League", "2024-25", "2025-01-10", "Arsenal", "Chelsea", 2 + i % 2, 0, 10).await;
        }
        for _ in 0..2 {
            insert_match(db, "Premier League", "2024-25", "2025-01-11", "Everton", "Liverpool", 1, 1, 8).await;
        }
        for _ in 0..2 {
            insert_match(db, "La Liga", "2024-25", "2025-01-12", "Sevilla", "Barcelona", 0, 3, 9).await;
        }
    }

    #[tokio::test]
    async fn test_result_percentages() {
        let db = memory_database().await;
        ten_match_fixture(&db).await;

        let analytics = result_analytics(&db, &FilterSet::default()).await;
        assert_eq!(analytics.total_games, 10);
        assert_eq!(analytics.home_percentage, 60.0);
        assert_eq!(analytics.draw_percentage, 20.0);
        assert_eq!(analytics.away_percentage, 20.0);
    }

    #[tokio::test]
    async fn test_empty_scope_defaults_to_zero() {
        let db = memory_database().await;

        let analytics = result_analytics(&db, &FilterSet::default()).await;
        assert_eq!(analytics.total_games, 0);
        assert_eq!(analytics.home_percentage, 0.0);
        assert_eq!(analytics.avg_goals, 0.0);
        assert_eq!(analytics.avg_winning_home_odds, 0.0);

        let gs = goals_shots(&db, &FilterSet::default()).await;
        assert_eq!(gs.avg_goals, 0.0);
        assert_eq!(gs.avg_shots, 0.0);
    }

    #[tokio::test]
    async fn test_key_metrics_counts_distinct_teams_once() {
        let db = memory_database().await;
        ten_match_fixture(&db).await;

        let metrics = key_metrics(&db, &FilterSet::default()).await;
        assert_eq!(metrics.total_games, 10);
        assert_eq!(metrics.total_leagues, 2);
        assert_eq!(metrics.total_seasons, 1);
        // Arsenal, Chelsea, Everton, Liverpool, Sevilla, Barcelona
        assert_eq!(metrics.total_teams, 6);
    }

    #[tokio::test]
    async fn test_league_filter_restricts_scope() {
        let db = memory_database().await;
        ten_match_fixture(&db).await;

        let filters = FilterSet {
            leagues: vec!["La Liga".to_string()],
            ..Default::default()
        };
        let metrics = key_metrics(&db, &filters).await;
        assert_eq!(metrics.total_games, 2);
        assert_eq!(metrics.total_teams, 2);

        let analytics = result_analytics(&db, &filters).await;
        assert_eq!(analytics.away_percentage, 100.0);
    }

    #[tokio::test]
    async fn test_team_filter_matches_either_side() {
        let db = memory_database().await;
        ten_match_fixture(&db).await;

        // Liverpool only appears as the away side
        let filters = FilterSet {
            teams: vec!["Liverpool".to_string()],
            ..Default::default()
        };
        let metrics = key_metrics(&db, &filters).await;
        assert_eq!(metrics.total_games, 2);
    }

    #[tokio::test]
    async fn test_league_breakdown_ordering_and_ratio() {
        let db = memory_database().await;
        // Premier League: 4 goals, 20 shots per match; La Liga: 1 goal, 10 shots
        insert_match(&db, "Premier League", "2024-25", "2025-02-01", "Arsenal", "Chelsea", 3, 1, 10).await;
        insert_match(&db, "La Liga", "2024-25", "2025-02-01", "Sevilla", "Valencia", 1, 0, 5).await;

        let table = league_breakdown(&db, &FilterSet::default()).await;
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_str(0, "league"), "Premier League");
        assert_eq!(table.get_f64(0, "goals_shots_percentage"), Some(20.0));
        assert_eq!(table.get_f64(1, "goals_shots_percentage"), Some(10.0));
    }
}
