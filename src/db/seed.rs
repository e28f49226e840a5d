//! Demo dataset generator.
//!
//! The real system is read-only: match history, predictions and standings
//! arrive from an upstream pipeline. Seeding exists so the dashboard can
//! be exercised end to end without that pipeline, and so query-level
//! tests have realistic data.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;

use crate::models::Outcome;

const SEASONS: [&str; 2] = ["2023-24", "2024-25"];
const MODELS: [&str; 2] = ["forest_v1", "logit_v2"];

// (team, stadium, city, country, latitude, longitude)
type TeamSeed = (&'static str, &'static str, &'static str, &'static str, f64, f64);

fn leagues() -> Vec<(&'static str, Vec<TeamSeed>)> {
    vec![
        (
            "Premier League",
            vec![
                ("Arsenal", "Emirates Stadium", "London", "England", 51.5549, -0.1084),
                ("Chelsea", "Stamford Bridge", "London", "England", 51.4817, -0.1910),
                ("Liverpool", "Anfield", "Liverpool", "England", 53.4308, -2.9608),
                ("Manchester City", "Etihad Stadium", "Manchester", "England", 53.4831, -2.2004),
                ("Everton", "Goodison Park", "Liverpool", "England", 53.4388, -2.9663),
                ("Newcastle United", "St James' Park", "Newcastle", "England", 54.9756, -1.6217),
                ("Aston Villa", "Villa Park", "Birmingham", "England", 52.5092, -1.8847),
                ("Tottenham Hotspur", "Tottenham Hotspur Stadium", "London", "England", 51.6043, -0.0664),
            ],
        ),
        (
            "La Liga",
            vec![
                ("Real Madrid", "Santiago Bernabeu", "Madrid", "Spain", 40.4531, -3.6883),
                ("Barcelona", "Camp Nou", "Barcelona", "Spain", 41.3809, 2.1228),
                ("Atletico Madrid", "Metropolitano", "Madrid", "Spain", 40.4362, -3.5995),
                ("Sevilla", "Ramon Sanchez-Pizjuan", "Seville", "Spain", 37.3841, -5.9705),
                ("Real Sociedad", "Reale Arena", "San Sebastian", "Spain", 43.3014, -1.9736),
                ("Athletic Bilbao", "San Mames", "Bilbao", "Spain", 43.2641, -2.9494),
                ("Valencia", "Mestalla", "Valencia", "Spain", 39.4745, -0.3582),
                ("Villarreal", "La Ceramica", "Villarreal", "Spain", 39.9441, -0.1034),
            ],
        ),
    ]
}

#[derive(Default)]
struct Tally {
    points: i64,
    played: i64,
    scored: i64,
    conceded: i64,
    recent: Vec<char>,
}

pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM match_results")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already seeded ({} matches found), skipping.", count);
        return Ok(());
    }

    tracing::info!("Seeding demo match history, standings and predictions...");

    // Fixed seed: the same demo dataset on every run
    let mut rng = StdRng::seed_from_u64(42);

    seed_locations(pool).await?;
    seed_matches_and_standings(pool, &mut rng).await?;
    seed_predictions(pool, &mut rng).await?;

    tracing::info!("Database seeded successfully.");
    Ok(())
}

pub async fn clear_all_data(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM predictions").execute(pool).await?;
    sqlx::query("DELETE FROM match_results").execute(pool).await?;
    sqlx::query("DELETE FROM team_statistics").execute(pool).await?;
    sqlx::query("DELETE FROM team_locations").execute(pool).await?;
    tracing::info!("All data cleared");
    Ok(())
}

async fn seed_locations(pool: &SqlitePool) -> Result<()> {
    for (_, teams) in leagues() {
        for (team, stadium, city, country, lat, lon) in teams {
            sqlx::query(
                r#"INSERT OR REPLACE INTO team_locations
                   (team, stadium, city, country, latitude, longitude)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(team)
            .bind(stadium)
            .bind(city)
            .bind(country)
            .bind(lat)
            .bind(lon)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}

async fn seed_matches_and_standings(pool: &SqlitePool, rng: &mut StdRng) -> Result<()> {
    for (season_idx, season) in SEASONS.iter().enumerate() {
        let season_start =
            NaiveDate::from_ymd_opt(2023 + season_idx as i32, 8, 12).expect("valid date");

        for (league, teams) in leagues() {
            let mut tallies: HashMap<&str, Tally> = HashMap::new();
            let mut round = 0i64;

            // Double round-robin
            for (home, _, _, _, _, _) in &teams {
                for (away, _, _, _, _, _) in &teams {
                    if home == away {
                        continue;
                    }
                    round += 1;
                    let game_date = season_start + Duration::days(round * 2 % 280);

                    // Mild home advantage in the generated scores
                    let home_goals = rng.gen_range(0..=4);
                    let away_goals = rng.gen_range(0..=3);
                    let home_shots = home_goals * 3 + rng.gen_range(3..=12);
                    let away_shots = away_goals * 3 + rng.gen_range(2..=10);
                    let result = match home_goals.cmp(&away_goals) {
                        std::cmp::Ordering::Greater => Outcome::Home,
                        std::cmp::Ordering::Equal => Outcome::Draw,
                        std::cmp::Ordering::Less => Outcome::Away,
                    }
                    .code();

                    let home_odds: f64 = 1.5 + rng.gen_range(0.0..2.0);
                    let draw_odds: f64 = 2.8 + rng.gen_range(0.0..1.5);
                    let away_odds: f64 = 1.8 + rng.gen_range(0.0..3.0);

                    sqlx::query(
                        r#"INSERT INTO match_results
                           (league, season, game_date, home_team, away_team,
                            home_goals, away_goals, home_shots, away_shots, result,
                            avg_home_odds, avg_draw_odds, avg_away_odds)
                           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                    )
                    .bind(league)
                    .bind(season)
                    .bind(game_date.format("%Y-%m-%d").to_string())
                    .bind(*home)
                    .bind(*away)
                    .bind(home_goals)
                    .bind(away_goals)
                    .bind(home_shots)
                    .bind(away_shots)
                    .bind(result)
                    .bind((home_odds * 100.0).round() / 100.0)
                    .bind((draw_odds * 100.0).round() / 100.0)
                    .bind((away_odds * 100.0).round() / 100.0)
                    .execute(pool)
                    .await?;

                    record(&mut tallies, home, home_goals, away_goals);
                    record(&mut tallies, away, away_goals, home_goals);
                }
            }

            insert_standings(pool, league, season, tallies).await?;
        }
    }
    Ok(())
}

fn record<'a>(tallies: &mut HashMap<&'a str, Tally>, team: &'a str, scored: i64, conceded: i64) {
    let tally = tallies.entry(team).or_default();
    tally.played += 1;
    tally.scored += scored;
    tally.conceded += conceded;
    let mark = match scored.cmp(&conceded) {
        std::cmp::Ordering::Greater => {
            tally.points += 3;
            'W'
        }
        std::cmp::Ordering::Equal => {
            tally.points += 1;
            'D'
        }
        std::cmp::Ordering::Less => 'L',
    };
    tally.recent.push(mark);
}

async fn insert_standings(
    pool: &SqlitePool,
    league: &str,
    season: &str,
    tallies: HashMap<&str, Tally>,
) -> Result<()> {
    let mut rows: Vec<(&str, Tally)> = tallies.into_iter().collect();
    rows.sort_by(|a, b| {
        (b.1.points, b.1.scored - b.1.conceded).cmp(&(a.1.points, a.1.scored - a.1.conceded))
    });

    let now = Utc::now().to_rfc3339();
    for (rank, (team, tally)) in rows.into_iter().enumerate() {
        let form: String = tally.recent.iter().rev().take(5).rev().collect();
        sqlx::query(
            r#"INSERT INTO team_statistics
               (team, league, season, league_rank, total_points, total_games_played,
                total_goals_scored, total_goals_conceded, last_5_games, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(team)
        .bind(league)
        .bind(season)
        .bind(rank as i64 + 1)
        .bind(tally.points)
        .bind(tally.played)
        .bind(tally.scored)
        .bind(tally.conceded)
        .bind(form)
        .bind(&now)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn seed_predictions(pool: &SqlitePool, rng: &mut StdRng) -> Result<()> {
    let today = Utc::now().date_naive();

    // Two batches: an older run and the current one
    for session_id in 1..=2i64 {
        for (league, teams) in leagues() {
            for pair in teams.chunks(2) {
                let [home, away] = pair else { continue };
                let game_date = today + Duration::days(rng.gen_range(1..=10));
                let game_time = format!("{:02}:{:02}", rng.gen_range(13..=20), 15 * rng.gen_range(0..4));

                let predicted_result = match rng.gen_range(0..10) {
                    0..=4 => Outcome::Home,
                    5..=6 => Outcome::Draw,
                    _ => Outcome::Away,
                }
                .code();
                let confidence: f64 = 0.50 + rng.gen_range(0.0..0.45);
                let draw_probability: f64 = 0.15 + rng.gen_range(0.0..0.20);

                sqlx::query(
                    r#"INSERT INTO predictions
                       (session_id, model, game_date, game_time, league, home_team, away_team,
                        predicted_result, confidence, draw_probability,
                        avg_home_odds, avg_draw_odds, avg_away_odds, created_at)
                       VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                )
                .bind(session_id)
                .bind(MODELS[(session_id as usize + 1) % MODELS.len()])
                .bind(game_date.format("%Y-%m-%d").to_string())
                .bind(game_time)
                .bind(league)
                .bind(home.0)
                .bind(away.0)
                .bind(predicted_result)
                .bind((confidence * 1000.0).round() / 1000.0)
                .bind((draw_probability * 1000.0).round() / 1000.0)
                .bind(1.5 + rng.gen_range(0.0..2.0))
                .bind(2.8 + rng.gen_range(0.0..1.5))
                .bind(1.8 + rng.gen_range(0.0..3.0))
                .bind(Utc::now().to_rfc3339())
                .execute(pool)
                .await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_database;
    use crate::services::predictions;

    #[tokio::test]
    async fn test_seed_populates_all_tables() {
        let db = memory_database().await;
        seed_data(db.pool()).await.unwrap();

        let matches: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM match_results")
            .fetch_one(db.pool())
            .await
            .unwrap();
        // 2 seasons x 2 leagues x 8 teams double round-robin
        assert_eq!(matches, 2 * 2 * 8 * 7);

        let standings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_statistics")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(standings, 2 * 2 * 8);

        let bad_results: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM match_results WHERE result NOT IN ('H', 'D', 'A')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(bad_results, 0);

        let odds: Vec<f64> = sqlx::query_scalar("SELECT avg_home_odds FROM match_results")
            .fetch_all(db.pool())
            .await
            .unwrap();
        assert!(odds.iter().all(|o| (1.5..=3.5).contains(o)));
    }

    #[tokio::test]
    async fn test_seed_skips_when_data_exists() {
        let db = memory_database().await;
        seed_data(db.pool()).await.unwrap();
        let before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM match_results")
            .fetch_one(db.pool())
            .await
            .unwrap();

        seed_data(db.pool()).await.unwrap();
        let after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM match_results")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_seeded_current_session_is_latest_batch() {
        let db = memory_database().await;
        seed_data(db.pool()).await.unwrap();

        // The session restriction binds as text; SQLite affinity must
        // still match it against the INTEGER session_id column.
        let rows = predictions::current_session_predictions(&db).await;
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.session_id == 2));
    }
}
