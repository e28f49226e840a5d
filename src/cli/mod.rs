use anyhow::Result;

use crate::db::{create_pool_from_env, seed::clear_all_data, seed_data, Database};
use crate::models::{FilterSet, Outcome};
use crate::services::{analytics, predictions, standings};

async fn open_database() -> Result<Database> {
    let pool = create_pool_from_env().await?;
    Ok(Database::new(pool))
}

pub async fn check_db() -> Result<()> {
    let db = open_database().await?;
    if db.ping().await {
        println!("✅ Database connection OK");
    } else {
        println!("❌ Database connection failed");
    }
    Ok(())
}

pub async fn seed(fresh: bool) -> Result<()> {
    let db = open_database().await?;
    if fresh {
        clear_all_data(db.pool()).await?;
    }
    seed_data(db.pool()).await?;
    println!("✅ Demo data ready");
    Ok(())
}

pub async fn show_metrics(leagues: Vec<String>, seasons: Vec<String>) -> Result<()> {
    let db = open_database().await?;
    let filters = FilterSet {
        leagues,
        seasons,
        ..Default::default()
    };

    let metrics = analytics::key_metrics(&db, &filters).await;
    let results = analytics::result_analytics(&db, &filters).await;

    println!("💎 Key Metrics\n");
    println!("   Matches:  {}", metrics.total_games);
    println!("   Leagues:  {}", metrics.total_leagues);
    println!("   Seasons:  {}", metrics.total_seasons);
    println!("   Teams:    {}", metrics.total_teams);

    println!("\n📊 Result Split");
    println!(
        "   Home {:.1}% | Draw {:.1}% | Away {:.1}%",
        results.home_percentage, results.draw_percentage, results.away_percentage
    );
    println!(
        "   Avg goals {:.2} | Avg shots {:.2}",
        results.avg_goals, results.avg_shots
    );

    Ok(())
}

pub async fn show_predictions() -> Result<()> {
    let db = open_database().await?;

    let rows = predictions::current_session_predictions(&db).await;
    if rows.is_empty() {
        println!("📭 No predictions found. Seed demo data with: pitchboard seed");
        return Ok(());
    }

    println!("🔮 Current session predictions ({} fixtures):\n", rows.len());
    for row in rows.iter().take(20) {
        let label = Outcome::parse(&row.predicted_result)
            .map(|o| o.label())
            .unwrap_or("Unknown");
        println!(
            "   {} {} | {} vs {} ({})",
            row.game_date, row.game_time, row.home_team, row.away_team, row.league
        );
        println!(
            "      {} | confidence {:.0}%{}",
            label,
            row.confidence * 100.0,
            row.predicted_odds
                .map_or(String::new(), |o| format!(" | odds {:.2}", o))
        );
    }
    Ok(())
}

pub async fn show_standings(leagues: Vec<String>, seasons: Vec<String>) -> Result<()> {
    let db = open_database().await?;
    let filters = FilterSet {
        leagues,
        seasons,
        ..Default::default()
    };

    let rows = standings::league_table(&db, &filters).await;
    if rows.is_empty() {
        println!("📭 No standings found for the selected filters.");
        return Ok(());
    }

    let mut current = String::new();
    for row in rows {
        let header = format!("{} ({})", row.league, row.season);
        if header != current {
            println!("\n🏆 {}:", header);
            current = header;
        }
        println!(
            "   {:>2}. {:<24} {:>3} pts  GD {:>+3}  ppg {:.2}  [{}]",
            row.league_rank,
            row.team,
            row.total_points,
            row.goal_difference,
            row.points_per_game,
            row.last_5_games
        );
    }
    Ok(())
}
