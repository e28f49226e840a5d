//! League table and head-to-head comparison queries.

use std::collections::BTreeMap;

use crate::db::filter::standings_clauses;
use crate::db::Database;
use crate::models::{FilterOptions, FilterSet, StandingsRow, TeamSeasonStats};
use crate::utils::points_per_game;

/// League table with derived goal difference and points-per-game,
/// ordered by league, season, rank. Date bounds do not apply here:
/// standings are per-season snapshots.
pub async fn league_table(db: &Database, filters: &FilterSet) -> Vec<StandingsRow> {
    let clause = standings_clauses(filters);
    let sql = format!(
        "SELECT team, league, season, league_rank, total_points, total_games_played, \
                total_goals_scored, total_goals_conceded, last_5_games \
         FROM team_statistics{} \
         ORDER BY league, season, league_rank",
        clause.where_prefix()
    );
    let table = db.fetch_table(&sql, &clause.params()).await;

    (0..table.row_count())
        .map(|row| {
            let points = table.get_i64(row, "total_points");
            let played = table.get_i64(row, "total_games_played");
            let scored = table.get_i64(row, "total_goals_scored");
            let conceded = table.get_i64(row, "total_goals_conceded");
            StandingsRow {
                team: table.get_str(row, "team"),
                league: table.get_str(row, "league"),
                season: table.get_str(row, "season"),
                league_rank: table.get_i64(row, "league_rank"),
                total_points: points,
                total_games_played: played,
                total_goals_scored: scored,
                total_goals_conceded: conceded,
                goal_difference: scored - conceded,
                points_per_game: points_per_game(points, played),
                last_5_games: table.get_str(row, "last_5_games"),
            }
        })
        .collect()
}

/// Latest season present in the standings table.
pub async fn latest_season(db: &Database) -> Option<String> {
    let table = db
        .fetch_table(
            "SELECT season FROM team_statistics ORDER BY season DESC LIMIT 1",
            &[],
        )
        .await;
    if table.is_empty() {
        None
    } else {
        Some(table.get_str(0, "season"))
    }
}

/// Season stats for the two sides of a fixture.
///
/// Both teams always get an entry; a side missing from the standings
/// gets defaulted fields so the comparison view never loses a column.
pub async fn team_comparison(
    db: &Database,
    home_team: &str,
    away_team: &str,
    season: Option<&str>,
) -> BTreeMap<String, TeamSeasonStats> {
    let resolved = match season {
        Some(s) => Some(s.to_string()),
        None => latest_season(db).await,
    };

    let mut stats: BTreeMap<String, TeamSeasonStats> = BTreeMap::new();

    if let Some(season) = resolved {
        let table = db
            .fetch_table(
                "SELECT team, league_rank, total_points, total_goals_scored, \
                        total_goals_conceded, last_5_games \
                 FROM team_statistics \
                 WHERE team IN (?, ?) AND season = ?",
                &[home_team.to_string(), away_team.to_string(), season],
            )
            .await;

        for row in 0..table.row_count() {
            stats.insert(
                table.get_str(row, "team"),
                TeamSeasonStats {
                    league_rank: Some(table.get_i64(row, "league_rank")),
                    points: Some(table.get_i64(row, "total_points")),
                    goals_for: Some(table.get_i64(row, "total_goals_scored")),
                    goals_against: Some(table.get_i64(row, "total_goals_conceded")),
                    last_5_games: Some(table.get_str(row, "last_5_games")),
                },
            );
        }
    }

    for team in [home_team, away_team] {
        stats.entry(team.to_string()).or_default();
    }
    stats
}

/// Distinct leagues/seasons/teams of the standings table, for its own
/// filter dropdowns (the standings universe can differ from raw history).
pub async fn standings_filter_options(db: &Database) -> FilterOptions {
    let leagues = db
        .fetch_table(
            "SELECT DISTINCT league FROM team_statistics WHERE league IS NOT NULL ORDER BY league",
            &[],
        )
        .await;
    let seasons = db
        .fetch_table(
            "SELECT DISTINCT season FROM team_statistics WHERE season IS NOT NULL ORDER BY season DESC",
            &[],
        )
        .await;
    let teams = db
        .fetch_table(
            "SELECT DISTINCT team FROM team_statistics WHERE team IS NOT NULL ORDER BY team",
            &[],
        )
        .await;

    FilterOptions {
        leagues: leagues.str_column("league"),
        seasons: seasons.str_column("season"),
        teams: teams.str_column("team"),
    }
}
