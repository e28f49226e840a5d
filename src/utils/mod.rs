/// Percentage of `part` in `total`, rounded to one decimal place.
///
/// A zero total yields 0.0 so empty aggregates never surface NaN
/// to the display layer.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Null-safe average: a missing aggregate (no qualifying rows) becomes 0.0.
pub fn average_or_zero(value: Option<f64>) -> f64 {
    round2(value.unwrap_or(0.0))
}

/// Points per game, 0 when no games were played.
pub fn points_per_game(points: i64, games: i64) -> f64 {
    if games <= 0 {
        return 0.0;
    }
    round2(points as f64 / games as f64)
}

/// Validate a recent-form string such as "WLDWW".
pub fn is_valid_form(form: &str) -> bool {
    !form.is_empty() && form.len() <= 5 && form.chars().all(|c| matches!(c, 'W' | 'D' | 'L'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_basic_split() {
        // 10 matches: 6 home wins, 2 draws, 2 away wins
        assert_eq!(percentage(6, 10), 60.0);
        assert_eq!(percentage(2, 10), 20.0);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
    }

    #[test]
    fn test_average_or_zero() {
        assert_eq!(average_or_zero(None), 0.0);
        assert_eq!(average_or_zero(Some(2.456)), 2.46);
    }

    #[test]
    fn test_points_per_game() {
        assert_eq!(points_per_game(30, 12), 2.5);
        assert_eq!(points_per_game(10, 0), 0.0);
    }

    #[test]
    fn test_form_validation() {
        assert!(is_valid_form("WLDWW"));
        assert!(!is_valid_form(""));
        assert!(!is_valid_form("WXDWW"));
        assert!(!is_valid_form("WWWWWW"));
    }
}
