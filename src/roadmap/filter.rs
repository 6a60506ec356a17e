use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{Chantier, TimeMode};
use crate::roadmap::axis::DateRange;

/// Page-level filter state: which chantiers and which window are shown.
///
/// Survives a refresh; only the data underneath is reloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapFilter {
    pub mode: TimeMode,
    pub range: DateRange,
    pub search: String,
    pub show_archived: bool,
    /// Empty means every responsible.
    pub responsibles: BTreeSet<String>,
    /// Empty means every perimeter.
    pub perimeters: BTreeSet<String>,
}

impl RoadmapFilter {
    /// A window starting two weeks before `today` and running `weeks` weeks ahead.
    pub fn around(today: NaiveDate, mode: TimeMode, weeks: i64) -> Self {
        Self {
            mode,
            range: DateRange::new(
                today - chrono::Duration::weeks(2),
                today + chrono::Duration::weeks(weeks.max(1)),
            ),
            search: String::new(),
            show_archived: false,
            responsibles: BTreeSet::new(),
            perimeters: BTreeSet::new(),
        }
    }

    pub fn matches(&self, chantier: &Chantier) -> bool {
        if chantier.archived && !self.show_archived {
            return false;
        }
        if !self.responsibles.is_empty()
            && !chantier
                .responsible
                .as_ref()
                .is_some_and(|r| self.responsibles.contains(r))
        {
            return false;
        }
        if !self.perimeters.is_empty()
            && !chantier
                .perimeter
                .as_ref()
                .is_some_and(|p| self.perimeters.contains(p))
        {
            return false;
        }
        let query = self.search.trim().to_lowercase();
        query.is_empty() || chantier.name.to_lowercase().contains(&query)
    }

    /// Matching chantiers, in sheet order.
    pub fn apply<'a>(&self, chantiers: &'a [Chantier]) -> Vec<&'a Chantier> {
        chantiers.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Distinct non-empty values of a chantier field, for filter pickers.
pub fn distinct_values<'a>(
    chantiers: &'a [Chantier],
    field: impl Fn(&'a Chantier) -> Option<&'a String>,
) -> Vec<&'a str> {
    let set: BTreeSet<&str> = chantiers
        .iter()
        .filter_map(field)
        .map(String::as_str)
        .collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chantier(name: &str, archived: bool, responsible: Option<&str>) -> Chantier {
        let mut c = Chantier::new(name);
        c.archived = archived;
        c.responsible = responsible.map(str::to_string);
        c
    }

    fn filter() -> RoadmapFilter {
        RoadmapFilter::around(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            TimeMode::Sprint,
            12,
        )
    }

    #[test]
    fn archived_chantiers_are_hidden_by_default() {
        let all = vec![chantier("Alpha", false, None), chantier("Old", true, None)];
        let mut f = filter();
        assert_eq!(f.apply(&all).len(), 1);
        f.show_archived = true;
        assert_eq!(f.apply(&all).len(), 2);
    }

    #[test]
    fn search_and_responsible_combine() {
        let all = vec![
            chantier("Alpha", false, Some("Ana")),
            chantier("Alphabet", false, Some("Bo")),
            chantier("Beta", false, Some("Ana")),
        ];
        let mut f = filter();
        f.search = "alpha".into();
        f.responsibles.insert("Ana".into());
        let names: Vec<_> = f.apply(&all).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha"]);
    }

    #[test]
    fn distinct_values_are_sorted() {
        let all = vec![
            chantier("A", false, Some("Zoe")),
            chantier("B", false, Some("Ana")),
            chantier("C", false, Some("Zoe")),
            chantier("D", false, None),
        ];
        assert_eq!(distinct_values(&all, |c| c.responsible.as_ref()), vec!["Ana", "Zoe"]);
    }
}
