//! Query filters over the `pubs` table

use crate::record::{StoredPub, UNRELATED};

/// Selection of stored papers. Without a mission, papers marked
/// `unrelated` are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub mission: Option<String>,
    pub science: Option<String>,
    pub years: Option<Vec<i32>>,
    /// Case-insensitive match against the stored instrument list
    pub instrument: Option<String>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    pub fn science(mut self, science: impl Into<String>) -> Self {
        self.science = Some(science.into());
        self
    }

    pub fn year(self, year: i32) -> Self {
        self.years(vec![year])
    }

    pub fn years(mut self, years: Vec<i32>) -> Self {
        self.years = Some(years);
        self
    }

    pub fn instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = Some(instrument.into());
        self
    }

    /// WHERE clause and its bound parameters.
    pub(crate) fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        match &self.mission {
            Some(m) => {
                clauses.push("mission = ?".to_string());
                params.push(m.clone());
            }
            None => {
                clauses.push("mission != ?".to_string());
                params.push(UNRELATED.to_string());
            }
        }
        if let Some(s) = &self.science {
            clauses.push("science = ?".to_string());
            params.push(s.clone());
        }
        if let Some(years) = &self.years {
            if years.is_empty() {
                clauses.push("0".to_string());
            } else {
                let marks = vec!["?"; years.len()].join(", ");
                clauses.push(format!("CAST(year AS TEXT) IN ({marks})"));
                params.extend(years.iter().map(i32::to_string));
            }
        }
        (clauses.join(" AND "), params)
    }

    /// Row-level part of the filter that SQL does not cover.
    pub(crate) fn keeps(&self, pub_: &StoredPub) -> bool {
        self.instrument
            .as_deref()
            .is_none_or(|i| pub_.has_instrument(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_unrelated() {
        let (sql, params) = Filter::all().to_sql();
        assert_eq!(sql, "mission != ?");
        assert_eq!(params, vec!["unrelated"]);
    }

    #[test]
    fn combined_filter() {
        let (sql, params) = Filter::all()
            .mission("keck")
            .science("planets")
            .years(vec![2019, 2020])
            .to_sql();
        assert_eq!(
            sql,
            "mission = ? AND science = ? AND CAST(year AS TEXT) IN (?, ?)"
        );
        assert_eq!(params, vec!["keck", "planets", "2019", "2020"]);
    }

    #[test]
    fn empty_year_list_matches_nothing() {
        let (sql, params) = Filter::all().years(vec![]).to_sql();
        assert!(sql.ends_with("AND 0"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn values_are_never_inlined() {
        let (sql, _) = Filter::all().mission("x' OR '1'='1").to_sql();
        assert!(!sql.contains("x'"));
    }
}
