//! Stadium location queries for the map view.

use crate::db::Database;
use crate::models::TeamLocation;

/// Teams with usable coordinates. Rows with missing or zeroed
/// coordinates are excluded at the query so the map never plots (0, 0).
pub async fn teams_with_coordinates(db: &Database) -> Vec<TeamLocation> {
    let table = db
        .fetch_table(
            "SELECT DISTINCT team, stadium, city, country, latitude, longitude \
             FROM team_locations \
             WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
               AND latitude != 0 AND longitude != 0 \
             ORDER BY team",
            &[],
        )
        .await;

    (0..table.row_count())
        .filter_map(|row| {
            let latitude = table.get_f64(row, "latitude")?;
            let longitude = table.get_f64(row, "longitude")?;
            Some(TeamLocation {
                team: table.get_str(row, "team"),
                stadium: table.get_str(row, "stadium"),
                city: table.get_str(row, "city"),
                country: table.get_str(row, "country"),
                latitude,
                longitude,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_database;

    #[tokio::test]
    async fn test_zero_and_null_coordinates_excluded() {
        let db = memory_database().await;
        for (team, lat, lon) in [
            ("Arsenal", Some(51.555), Some(-0.1086)),
            ("Nowhere FC", Some(0.0), Some(0.0)),
            ("Lost FC", None, None),
        ] {
            sqlx::query(
                "INSERT INTO team_locations (team, stadium, city, country, latitude, longitude) \
                 VALUES (?, 'S', 'C', 'X', ?, ?)",
            )
            .bind(team)
            .bind(lat)
            .bind(lon)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let locations = teams_with_coordinates(&db).await;
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].team, "Arsenal");
        assert_eq!(locations[0].latitude, 51.555);
    }
}
