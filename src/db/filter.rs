//! Typed predicate builder for the optional dashboard filters.
//!
//! Filters are conjunctive across categories; the team filter matches
//! either side of the fixture. An absent or empty filter contributes
//! nothing, so "no selection" always means "no restriction".

use crate::models::{FilterSet, PredictionQuery};

/// One SQL-safe predicate fragment plus its bound values.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Equals {
        column: &'static str,
        value: String,
    },
    InSet {
        column: &'static str,
        values: Vec<String>,
    },
    AtLeast {
        column: &'static str,
        value: String,
    },
    AtMost {
        column: &'static str,
        value: String,
    },
    /// Team disjunction: matches when the value appears on either side
    /// of the fixture. Binds every value once per side.
    EitherSide {
        home_column: &'static str,
        away_column: &'static str,
        teams: Vec<String>,
    },
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl Clause {
    pub fn sql(&self) -> String {
        match self {
            Clause::Equals { column, .. } => format!("{} = ?", column),
            Clause::InSet { column, values } => {
                format!("{} IN ({})", column, placeholders(values.len()))
            }
            Clause::AtLeast { column, .. } => format!("{} >= ?", column),
            Clause::AtMost { column, .. } => format!("{} <= ?", column),
            Clause::EitherSide {
                home_column,
                away_column,
                teams,
            } => {
                if teams.len() == 1 {
                    format!("({} = ? OR {} = ?)", home_column, away_column)
                } else {
                    format!(
                        "({} IN ({ph}) OR {} IN ({ph}))",
                        home_column,
                        away_column,
                        ph = placeholders(teams.len())
                    )
                }
            }
        }
    }

    fn push_params(&self, params: &mut Vec<String>) {
        match self {
            Clause::Equals { value, .. }
            | Clause::AtLeast { value, .. }
            | Clause::AtMost { value, .. } => params.push(value.clone()),
            Clause::InSet { values, .. } => params.extend(values.iter().cloned()),
            Clause::EitherSide { teams, .. } => {
                // Once for the home side, once for the away side.
                params.extend(teams.iter().cloned());
                params.extend(teams.iter().cloned());
            }
        }
    }
}

/// Ordered clause list rendered into a query restriction.
///
/// Parameters are produced per render, so a query embedding the same
/// clause set twice (e.g. a UNION subquery) calls `params()` once per
/// occurrence and gets the correctly duplicated list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    clauses: Vec<Clause>,
}

impl WhereClause {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    fn fragments(&self) -> Vec<String> {
        self.clauses.iter().map(Clause::sql).collect()
    }

    /// Leading ` WHERE …` restriction, empty when there are no clauses.
    pub fn where_prefix(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.fragments().join(" AND "))
        }
    }

    /// ` AND …` suffix for queries that carry a fixed base predicate.
    pub fn and_suffix(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" AND {}", self.fragments().join(" AND "))
        }
    }

    /// Bound values in fragment order, for one occurrence of the clause set.
    pub fn params(&self) -> Vec<String> {
        let mut params = Vec::new();
        for clause in &self.clauses {
            clause.push_params(&mut params);
        }
        params
    }
}

/// Equals for a single value, IN for several, nothing when empty.
fn list_clause(column: &'static str, values: &[String]) -> Option<Clause> {
    match values {
        [] => None,
        [only] => Some(Clause::Equals {
            column,
            value: only.clone(),
        }),
        many => Some(Clause::InSet {
            column,
            values: many.to_vec(),
        }),
    }
}

/// Clauses against the match history table.
pub fn match_clauses(filters: &FilterSet) -> WhereClause {
    let mut clauses = Vec::new();
    if let Some(clause) = list_clause("league", &filters.leagues) {
        clauses.push(clause);
    }
    if let Some(clause) = list_clause("season", &filters.seasons) {
        clauses.push(clause);
    }
    if !filters.teams.is_empty() {
        clauses.push(Clause::EitherSide {
            home_column: "home_team",
            away_column: "away_team",
            teams: filters.teams.clone(),
        });
    }
    if let Some(from) = filters.date_from {
        clauses.push(Clause::AtLeast {
            column: "game_date",
            value: from.format("%Y-%m-%d").to_string(),
        });
    }
    if let Some(to) = filters.date_to {
        clauses.push(Clause::AtMost {
            column: "game_date",
            value: to.format("%Y-%m-%d").to_string(),
        });
    }
    WhereClause::new(clauses)
}

/// Clauses against the predictions table (no season column there).
///
/// A session restriction, when active, replaces the date bounds: the
/// latest batch is "current" regardless of fixture dates.
pub fn prediction_clauses(query: &PredictionQuery, session_id: Option<i64>) -> WhereClause {
    let mut clauses = Vec::new();
    if let Some(session) = session_id {
        clauses.push(Clause::Equals {
            column: "ep.session_id",
            value: session.to_string(),
        });
    }
    if let Some(clause) = list_clause("ep.league", &query.leagues) {
        clauses.push(clause);
    }
    if let Some(clause) = list_clause("ep.model", &query.models) {
        clauses.push(clause);
    }
    if !query.teams.is_empty() {
        clauses.push(Clause::EitherSide {
            home_column: "ep.home_team",
            away_column: "ep.away_team",
            teams: query.teams.clone(),
        });
    }
    if session_id.is_none() {
        if let Some(from) = query.date_from {
            clauses.push(Clause::AtLeast {
                column: "ep.game_date",
                value: from.format("%Y-%m-%d").to_string(),
            });
        }
        if let Some(to) = query.date_to {
            clauses.push(Clause::AtMost {
                column: "ep.game_date",
                value: to.format("%Y-%m-%d").to_string(),
            });
        }
    }
    WhereClause::new(clauses)
}

/// Clauses against the standings table (plain team column, no dates).
pub fn standings_clauses(filters: &FilterSet) -> WhereClause {
    let mut clauses = Vec::new();
    if let Some(clause) = list_clause("league", &filters.leagues) {
        clauses.push(clause);
    }
    if let Some(clause) = list_clause("season", &filters.seasons) {
        clauses.push(clause);
    }
    if let Some(clause) = list_clause("team", &filters.teams) {
        clauses.push(clause);
    }
    WhereClause::new(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_filters_produce_nothing() {
        let clause = match_clauses(&FilterSet::default());
        assert!(clause.is_empty());
        assert_eq!(clause.where_prefix(), "");
        assert_eq!(clause.and_suffix(), "");
        assert!(clause.params().is_empty());
    }

    #[test]
    fn test_empty_multi_select_equals_not_provided() {
        let filters = FilterSet {
            leagues: vec![],
            seasons: vec![],
            teams: vec![],
            ..Default::default()
        };
        assert_eq!(match_clauses(&filters), match_clauses(&FilterSet::default()));
    }

    #[test]
    fn test_single_value_uses_equals() {
        let filters = FilterSet {
            leagues: vec!["Premier League".to_string()],
            ..Default::default()
        };
        let clause = match_clauses(&filters);
        assert_eq!(clause.and_suffix(), " AND league = ?");
        assert_eq!(clause.params(), vec!["Premier League"]);
    }

    #[test]
    fn test_team_pair_binds_each_side() {
        let filters = FilterSet {
            teams: vec!["Arsenal".to_string(), "Chelsea".to_string()],
            ..Default::default()
        };
        let clause = match_clauses(&filters);
        assert_eq!(
            clause.and_suffix(),
            " AND (home_team IN (?, ?) OR away_team IN (?, ?))"
        );
        // Each team exactly twice: once per side of the OR
        assert_eq!(
            clause.params(),
            vec!["Arsenal", "Chelsea", "Arsenal", "Chelsea"]
        );
    }

    #[test]
    fn test_single_team_disjunction() {
        let filters = FilterSet {
            teams: vec!["Arsenal".to_string()],
            ..Default::default()
        };
        let clause = match_clauses(&filters);
        assert_eq!(clause.and_suffix(), " AND (home_team = ? OR away_team = ?)");
        assert_eq!(clause.params(), vec!["Arsenal", "Arsenal"]);
    }

    #[test]
    fn test_date_bounds_and_ordering() {
        let filters = FilterSet {
            leagues: vec!["Serie A".to_string(), "La Liga".to_string()],
            seasons: vec!["2024-25".to_string()],
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 6, 30),
            ..Default::default()
        };
        let clause = match_clauses(&filters);
        assert_eq!(
            clause.where_prefix(),
            " WHERE league IN (?, ?) AND season = ? AND game_date >= ? AND game_date <= ?"
        );
        assert_eq!(
            clause.params(),
            vec!["Serie A", "La Liga", "2024-25", "2025-01-01", "2025-06-30"]
        );
    }

    #[test]
    fn test_double_render_duplicates_params() {
        // A UNION subquery embeds the clause set twice; rendering params
        // per occurrence yields the doubled list without bookkeeping.
        let filters = FilterSet {
            teams: vec!["Arsenal".to_string(), "Chelsea".to_string()],
            ..Default::default()
        };
        let clause = match_clauses(&filters);
        let mut params = clause.params();
        params.extend(clause.params());
        assert_eq!(params.len(), 8);
    }

    #[test]
    fn test_session_restriction_clears_date_bounds() {
        let query = PredictionQuery {
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 6, 30),
            ..Default::default()
        };

        let without_session = prediction_clauses(&query, None);
        assert_eq!(
            without_session.where_prefix(),
            " WHERE ep.game_date >= ? AND ep.game_date <= ?"
        );

        let with_session = prediction_clauses(&query, Some(7));
        assert_eq!(with_session.where_prefix(), " WHERE ep.session_id = ?");
        assert_eq!(with_session.params(), vec!["7"]);
    }

    #[test]
    fn test_standings_team_is_single_column() {
        let filters = FilterSet {
            teams: vec!["Arsenal".to_string(), "Chelsea".to_string()],
            ..Default::default()
        };
        let clause = standings_clauses(&filters);
        assert_eq!(clause.where_prefix(), " WHERE team IN (?, ?)");
        assert_eq!(clause.params(), vec!["Arsenal", "Chelsea"]);
    }
}
