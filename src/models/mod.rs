use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Full-time outcome class produced by the upstream model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// Single-letter code as stored in the database ('H', 'D', 'A').
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "Home Win",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away Win",
        }
    }

    pub fn parse(code: &str) -> Option<Outcome> {
        match code {
            "H" => Some(Outcome::Home),
            "D" => Some(Outcome::Draw),
            "A" => Some(Outcome::Away),
            _ => None,
        }
    }
}

/// Optional, possibly multi-valued restrictions supplied by the display layer.
///
/// An empty list or `None` means "no restriction", never "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub leagues: Vec<String>,
    pub seasons: Vec<String>,
    pub teams: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
            && self.seasons.is_empty()
            && self.teams.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

/// Headline KPI counts for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_games: i64,
    pub total_leagues: i64,
    pub total_seasons: i64,
    pub total_teams: i64,
}

/// Home/draw/away breakdown plus goal, shot and odds averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultAnalytics {
    pub home_wins: i64,
    pub away_wins: i64,
    pub draws: i64,
    pub total_games: i64,
    pub home_percentage: f64,
    pub away_percentage: f64,
    pub draw_percentage: f64,
    pub avg_goals: f64,
    pub avg_shots: f64,
    pub avg_winning_home_odds: f64,
    pub avg_winning_draw_odds: f64,
    pub avg_winning_away_odds: f64,
    pub avg_overall_home_odds: f64,
    pub avg_overall_draw_odds: f64,
    pub avg_overall_away_odds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalsShots {
    pub avg_goals: f64,
    pub avg_shots: f64,
    pub total_games: i64,
}

/// One upstream prediction joined with the home side's stadium location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRow {
    pub session_id: i64,
    pub model: String,
    pub game_date: String,
    pub game_time: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub predicted_result: String,
    /// Market odds for the predicted outcome class, when known.
    pub predicted_odds: Option<f64>,
    pub confidence: f64,
    pub draw_probability: f64,
    pub stadium: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Restrictions accepted by the predictions endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionQuery {
    pub leagues: Vec<String>,
    pub teams: Vec<String>,
    pub models: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Restrict to the latest session batch; clears the date bounds.
    pub current_session_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub model: String,
    pub total_predictions: i64,
    pub avg_confidence: f64,
    pub max_confidence: f64,
    pub min_confidence: f64,
    pub home_predictions: i64,
    pub draw_predictions: i64,
    pub away_predictions: i64,
}

/// Distinct values backing the display layer's filter dropdowns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub leagues: Vec<String>,
    pub seasons: Vec<String>,
    pub teams: Vec<String>,
}

/// One row of the league table, with derived columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    pub league: String,
    pub season: String,
    pub league_rank: i64,
    pub total_points: i64,
    pub total_games_played: i64,
    pub total_goals_scored: i64,
    pub total_goals_conceded: i64,
    pub goal_difference: i64,
    pub points_per_game: f64,
    pub last_5_games: String,
}

/// Season stats for one side of a head-to-head comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub league_rank: Option<i64>,
    pub points: Option<i64>,
    pub goals_for: Option<i64>,
    pub goals_against: Option<i64>,
    pub last_5_games: Option<String>,
}

/// Static stadium reference data for the map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamLocation {
    pub team: String,
    pub stadium: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

// API Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
