//! Time-axis resolution: turns a date range into an ordered list of buckets
//! (sprints or ISO weeks) and maps phase anchors onto bucket indices.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::Rejection;
use crate::model::{BucketAnchor, Sprint, TimeMode};

/// Inclusive date range chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.min(end),
            end: end.max(start),
        }
    }
}

/// One column of the time axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Sprint name or week code; what phases reference.
    pub key: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub mode: TimeMode,
}

impl Bucket {
    pub fn from_sprint(sprint: &Sprint) -> Self {
        Self {
            key: sprint.name.clone(),
            label: sprint.name.clone(),
            start: sprint.start,
            end: sprint.end,
            mode: TimeMode::Sprint,
        }
    }

    /// The Monday..Sunday week starting at `monday`.
    pub fn week(monday: NaiveDate) -> Self {
        let key = week_code_of(monday);
        Self {
            label: format!("S{:02}", monday.iso_week().week()),
            key,
            start: monday,
            end: monday + chrono::Duration::days(6),
            mode: TimeMode::Week,
        }
    }
}

// ── Bucket sequences ─────────────────────────────────────────────────────────

/// Sprints overlapping `range`, ordered by start date.
pub fn visible_buckets(range: DateRange, sprints: &[Sprint]) -> Vec<Bucket> {
    let mut visible: Vec<&Sprint> = sprints
        .iter()
        .filter(|s| s.end >= range.start && s.start <= range.end)
        .collect();
    visible.sort_by_key(|s| (s.start, s.end));
    visible.into_iter().map(Bucket::from_sprint).collect()
}

/// Every ISO week touching `range`, in order.
pub fn visible_weeks(range: DateRange) -> Vec<Bucket> {
    let mut monday = monday_of(range.start);
    let mut weeks = Vec::new();
    while monday <= range.end {
        weeks.push(Bucket::week(monday));
        monday += chrono::Duration::days(7);
    }
    weeks
}

/// Linear lookup of a sprint name or week code.
pub fn bucket_index(key: &str, buckets: &[Bucket]) -> Option<usize> {
    buckets.iter().position(|b| b.key == key)
}

pub fn is_current_bucket(bucket: &Bucket, today: NaiveDate) -> bool {
    match bucket.mode {
        TimeMode::Sprint => bucket.start <= today && today < bucket.end,
        TimeMode::Week => bucket.key == week_code_of(today),
    }
}

// ── ISO weeks ────────────────────────────────────────────────────────────────

/// ISO-8601 week code, e.g. `2025S01` for 2024-12-30.
pub fn week_code_of(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}S{:02}", week.year(), week.week())
}

/// Monday of the week named by `code`; `None` unless it matches `^\d{4}S\d{2}$`
/// and the week exists in that ISO year.
pub fn date_of_week_code(code: &str) -> Option<NaiveDate> {
    let bytes = code.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'S'
        && bytes[5..].iter().all(u8::is_ascii_digit);
    if !well_formed {
        return None;
    }
    let year: i32 = code[..4].parse().ok()?;
    let week: u32 = code[5..].parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn at_midday(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default()) + chrono::Duration::hours(12)
}

/// Week codes of the weeks a sprint covers, `[start, end)` compared at midday.
/// A sprint always covers at least the week it starts in.
pub fn weeks_in_sprint(sprint: &Sprint) -> Vec<String> {
    let end = at_midday(sprint.end);
    let mut monday = monday_of(sprint.start);
    let mut codes = Vec::new();
    while at_midday(monday) < end {
        codes.push(week_code_of(monday));
        monday += chrono::Duration::days(7);
    }
    if codes.is_empty() {
        codes.push(week_code_of(sprint.start));
    }
    codes
}

// ── Axis ─────────────────────────────────────────────────────────────────────

/// A phase anchor resolved to visible bucket indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub start: usize,
    pub end: usize,
    /// An endpoint fell back to a window edge.
    pub clamped: bool,
}

impl ResolvedSpan {
    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }
}

/// The visible, chronologically ordered bucket sequence of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    pub mode: TimeMode,
    pub buckets: Vec<Bucket>,
}

impl TimeAxis {
    pub fn build(mode: TimeMode, range: DateRange, sprints: &[Sprint]) -> Self {
        let buckets = match mode {
            TimeMode::Sprint => visible_buckets(range, sprints),
            TimeMode::Week => visible_weeks(range),
        };
        Self { mode, buckets }
    }

    pub fn from_buckets(mode: TimeMode, buckets: Vec<Bucket>) -> Self {
        Self { mode, buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.buckets.len().checked_sub(1)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        bucket_index(key, &self.buckets)
    }

    pub fn current_index(&self, today: NaiveDate) -> Option<usize> {
        self.buckets.iter().position(|b| is_current_bucket(b, today))
    }

    /// Index for a start reference, falling back to the first bucket.
    pub fn clamp_start(&self, key: &str) -> Option<usize> {
        self.last_index()?;
        Some(self.index_of(key).unwrap_or(0))
    }

    /// Index for an end reference, falling back to the last bucket.
    pub fn clamp_end(&self, key: &str) -> Option<usize> {
        let last = self.last_index()?;
        Some(self.index_of(key).unwrap_or(last))
    }

    /// The anchor naming buckets `start..=end` of this axis.
    pub fn anchor_for(&self, start: usize, end: usize) -> Option<BucketAnchor> {
        let s = self.buckets.get(start)?;
        let e = self.buckets.get(end)?;
        Some(BucketAnchor::new(self.mode, s.key.clone(), e.key.clone()))
    }

    /// Resolve an anchor to visible indices.
    ///
    /// Returns `None` when the anchor's known dates lie entirely outside the
    /// window (or the axis is empty). References that cannot be found at all
    /// clamp to the first/last bucket and never fail.
    pub fn resolve_span(&self, anchor: &BucketAnchor, sprints: &[Sprint]) -> Option<ResolvedSpan> {
        let first = self.buckets.first()?;
        let last_bucket = self.buckets.last()?;
        let last = self.buckets.len() - 1;

        let (start_date, end_date) = anchor_dates(anchor, sprints);
        if start_date.is_some_and(|d| d > last_bucket.end)
            || end_date.is_some_and(|d| d < first.start)
        {
            return None;
        }

        let same_mode = anchor.mode() == self.mode;
        let direct = |key: &str| if same_mode { self.index_of(key) } else { None };
        let mut clamped = false;

        let start = direct(anchor.start())
            .or_else(|| {
                let date = start_date?;
                self.buckets.iter().position(|b| b.end >= date)
            })
            .unwrap_or_else(|| {
                clamped = true;
                0
            });
        let end = direct(anchor.end())
            .or_else(|| {
                let date = end_date?;
                self.buckets.iter().rposition(|b| b.start <= date)
            })
            .unwrap_or_else(|| {
                clamped = true;
                last
            });

        let (start, end) = if end < start {
            clamped = true;
            (start, start)
        } else {
            (start, end)
        };

        if clamped {
            tracing::debug!(
                start_ref = anchor.start(),
                end_ref = anchor.end(),
                start,
                end,
                "clamped unresolved bucket reference"
            );
        }
        Some(ResolvedSpan {
            start,
            end,
            clamped,
        })
    }
}

/// Which end of a span a reference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEdge {
    Start,
    End,
}

impl TimeAxis {
    /// Reference to bucket `index` expressed in `mode`.
    ///
    /// A sprint bucket names the week it starts in (start edge) or the week of
    /// its last day (end edge). A week bucket names the one sprint covering it.
    pub fn reference_in(
        &self,
        index: usize,
        mode: TimeMode,
        edge: SpanEdge,
        sprints: &[Sprint],
    ) -> Result<String, Rejection> {
        let bucket = self.buckets.get(index).ok_or(Rejection::NoBucket)?;
        match (self.mode, mode) {
            (TimeMode::Sprint, TimeMode::Sprint) | (TimeMode::Week, TimeMode::Week) => {
                Ok(bucket.key.clone())
            }
            (TimeMode::Sprint, TimeMode::Week) => {
                let day = match edge {
                    SpanEdge::Start => bucket.start,
                    SpanEdge::End => last_day(bucket),
                };
                Ok(week_code_of(day))
            }
            (TimeMode::Week, TimeMode::Sprint) => Ok(sprint_of_week(&bucket.key, sprints)?.name.clone()),
        }
    }

    /// `anchor` with the edges whose visible index changed from `was` to `now`
    /// rewritten. Unchanged edges keep their stored reference, even when it
    /// lies outside the window; the anchor keeps its own mode.
    pub fn resize_anchor(
        &self,
        anchor: &BucketAnchor,
        was: (usize, usize),
        now: (usize, usize),
        sprints: &[Sprint],
    ) -> Result<BucketAnchor, Rejection> {
        let mode = anchor.mode();
        let start = if now.0 != was.0 {
            self.reference_in(now.0, mode, SpanEdge::Start, sprints)?
        } else {
            anchor.start().to_string()
        };
        let end = if now.1 != was.1 {
            self.reference_in(now.1, mode, SpanEdge::End, sprints)?
        } else {
            anchor.end().to_string()
        };
        let resized = BucketAnchor::new(mode, start, end);
        if let (Some(start), Some(end)) = anchor_dates(&resized, sprints) {
            if start > end {
                return Err(Rejection::InvertedSpan);
            }
        }
        Ok(resized)
    }

    /// Shift both stored references of `anchor` by the distance between
    /// visible buckets `from` and `to`, measured along the anchor's own
    /// sequence (all sprints in date order, or calendar weeks).
    pub fn shift_anchor(
        &self,
        anchor: &BucketAnchor,
        from: usize,
        to: usize,
        sprints: &[Sprint],
    ) -> Result<BucketAnchor, Rejection> {
        let mode = anchor.mode();
        let from_ref = self.reference_in(from, mode, SpanEdge::Start, sprints)?;
        let to_ref = self.reference_in(to, mode, SpanEdge::Start, sprints)?;
        match mode {
            TimeMode::Sprint => {
                let ordered = sprints_in_order(sprints);
                let position = |name: &str| {
                    ordered
                        .iter()
                        .position(|s| s.name == name)
                        .ok_or_else(|| Rejection::UnknownReference {
                            reference: name.to_string(),
                        })
                };
                let delta = position(&to_ref)? as i64 - position(&from_ref)? as i64;
                let shift = |name: &str| -> Result<String, Rejection> {
                    let moved = position(name)? as i64 + delta;
                    usize::try_from(moved)
                        .ok()
                        .and_then(|i| ordered.get(i))
                        .map(|s| s.name.clone())
                        .ok_or_else(|| Rejection::OutsideSprints {
                            reference: name.to_string(),
                        })
                };
                Ok(BucketAnchor::new(mode, shift(anchor.start())?, shift(anchor.end())?))
            }
            TimeMode::Week => {
                let monday = |code: &str| {
                    date_of_week_code(code).ok_or_else(|| Rejection::UnknownReference {
                        reference: code.to_string(),
                    })
                };
                let offset = monday(&to_ref)? - monday(&from_ref)?;
                let shift = |code: &str| monday(code).map(|d| week_code_of(d + offset));
                Ok(BucketAnchor::new(mode, shift(anchor.start())?, shift(anchor.end())?))
            }
        }
    }
}

/// The single sprint whose weeks include `week`.
pub fn sprint_of_week<'a>(week: &str, sprints: &'a [Sprint]) -> Result<&'a Sprint, Rejection> {
    let mut covering = sprints
        .iter()
        .filter(|s| weeks_in_sprint(s).iter().any(|code| code == week));
    match (covering.next(), covering.next()) {
        (Some(sprint), None) => Ok(sprint),
        _ => Err(Rejection::AmbiguousWeek {
            week: week.to_string(),
        }),
    }
}

fn sprints_in_order(sprints: &[Sprint]) -> Vec<&Sprint> {
    let mut ordered: Vec<&Sprint> = sprints.iter().collect();
    ordered.sort_by_key(|s| (s.start, s.end));
    ordered
}

fn last_day(bucket: &Bucket) -> NaiveDate {
    match bucket.mode {
        TimeMode::Sprint if bucket.end > bucket.start => bucket.end - chrono::Duration::days(1),
        TimeMode::Sprint => bucket.start,
        TimeMode::Week => bucket.end,
    }
}

/// Last day a sprint actually runs; sprints hand over on their end date.
pub fn sprint_last_day(sprint: &Sprint) -> NaiveDate {
    if sprint.end > sprint.start {
        sprint.end - chrono::Duration::days(1)
    } else {
        sprint.start
    }
}

/// Calendar dates an anchor covers, where they can be determined.
pub fn anchor_dates(
    anchor: &BucketAnchor,
    sprints: &[Sprint],
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match anchor {
        BucketAnchor::Sprint { start, end } => (
            sprints.iter().find(|s| &s.name == start).map(|s| s.start),
            sprints.iter().find(|s| &s.name == end).map(sprint_last_day),
        ),
        BucketAnchor::Week { start, end } => (
            date_of_week_code(start),
            date_of_week_code(end).map(|d| d + chrono::Duration::days(6)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sprints() -> Vec<Sprint> {
        vec![
            Sprint::new("Sprint3", date(2025, 2, 3), date(2025, 2, 17)),
            Sprint::new("Sprint1", date(2025, 1, 6), date(2025, 1, 20)),
            Sprint::new("Sprint2", date(2025, 1, 20), date(2025, 2, 3)),
        ]
    }

    #[test]
    fn visible_buckets_filters_and_sorts() {
        let range = DateRange::new(date(2025, 1, 25), date(2025, 2, 5));
        let keys: Vec<_> = visible_buckets(range, &sprints())
            .into_iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(keys, vec!["Sprint2", "Sprint3"]);
    }

    #[test]
    fn no_overlap_gives_empty_axis() {
        let range = DateRange::new(date(2030, 1, 1), date(2030, 2, 1));
        assert!(visible_buckets(range, &sprints()).is_empty());
        assert!(visible_buckets(range, &[]).is_empty());
    }

    #[test]
    fn week_code_handles_year_boundaries() {
        assert_eq!(week_code_of(date(2024, 12, 30)), "2025S01");
        assert_eq!(week_code_of(date(2021, 1, 3)), "2020S53");
        assert_eq!(week_code_of(date(2025, 6, 18)), "2025S25");
    }

    #[test]
    fn malformed_week_codes_are_rejected() {
        assert_eq!(date_of_week_code("2025S01"), Some(date(2024, 12, 30)));
        assert_eq!(date_of_week_code("2025-01"), None);
        assert_eq!(date_of_week_code("25S01"), None);
        assert_eq!(date_of_week_code("2025S1"), None);
        assert_eq!(date_of_week_code("2025S00"), None);
        assert_eq!(date_of_week_code("2025S53"), None);
        assert_eq!(date_of_week_code("2020S53"), Some(date(2020, 12, 28)));
    }

    #[test]
    fn weeks_in_sprint_is_end_exclusive() {
        let sprint = Sprint::new("S", date(2025, 1, 6), date(2025, 1, 20));
        assert_eq!(weeks_in_sprint(&sprint), vec!["2025S02", "2025S03"]);

        let midweek = Sprint::new("S", date(2025, 1, 8), date(2025, 1, 17));
        assert_eq!(weeks_in_sprint(&midweek), vec!["2025S02", "2025S03"]);

        let single_day = Sprint::new("S", date(2025, 1, 6), date(2025, 1, 6));
        assert_eq!(weeks_in_sprint(&single_day), vec!["2025S02"]);
    }

    #[test]
    fn current_bucket_rules() {
        let sprint = Bucket::from_sprint(&Sprint::new("S", date(2025, 1, 6), date(2025, 1, 20)));
        assert!(is_current_bucket(&sprint, date(2025, 1, 6)));
        assert!(is_current_bucket(&sprint, date(2025, 1, 19)));
        assert!(!is_current_bucket(&sprint, date(2025, 1, 20)));

        let week = Bucket::week(date(2025, 1, 6));
        assert!(is_current_bucket(&week, date(2025, 1, 12)));
        assert!(!is_current_bucket(&week, date(2025, 1, 13)));
    }

    #[test]
    fn orphaned_end_reference_clamps_to_last_bucket() {
        let all = sprints();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 1), date(2025, 3, 1)),
            &all,
        );
        assert_eq!(bucket_index("SprintXX", &axis.buckets), None);
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint2", "SprintXX");
        let span = axis.resolve_span(&anchor, &all).unwrap();
        assert_eq!((span.start, span.end), (1, 2));
        assert!(span.clamped);
    }

    #[test]
    fn phase_outside_window_is_hidden() {
        let all = sprints();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 2, 4), date(2025, 2, 10)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint1", "Sprint1");
        assert_eq!(axis.resolve_span(&anchor, &all), None);
    }

    #[test]
    fn partially_visible_phase_clamps_to_window_start() {
        let all = sprints();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 25), date(2025, 2, 10)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint1", "Sprint2");
        let span = axis.resolve_span(&anchor, &all).unwrap();
        assert_eq!((span.start, span.end), (0, 0));
    }

    #[test]
    fn week_anchor_on_sprint_axis_uses_dates() {
        let all = sprints();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 1), date(2025, 3, 1)),
            &all,
        );
        // 2025S05 starts Jan 27 (inside Sprint2), 2025S07 ends Feb 16 (inside Sprint3)
        let anchor = BucketAnchor::new(TimeMode::Week, "2025S05", "2025S07");
        let span = axis.resolve_span(&anchor, &all).unwrap();
        assert_eq!((span.start, span.end), (1, 2));
        assert!(!span.clamped);
    }

    #[test]
    fn week_axis_covers_range() {
        let axis = TimeAxis::build(
            TimeMode::Week,
            DateRange::new(date(2025, 1, 8), date(2025, 1, 20)),
            &[],
        );
        let keys: Vec<_> = axis.buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2025S02", "2025S03", "2025S04"]);
        assert_eq!(axis.buckets[0].label, "S02");
        assert_eq!(axis.anchor_for(0, 2), Some(BucketAnchor::new(TimeMode::Week, "2025S02", "2025S04")));
    }

    #[test]
    fn clamp_helpers_on_empty_axis() {
        let axis = TimeAxis::from_buckets(TimeMode::Sprint, Vec::new());
        assert_eq!(axis.clamp_start("x"), None);
        assert_eq!(axis.clamp_end("x"), None);
    }

    fn six_sprints() -> Vec<Sprint> {
        (0..6)
            .map(|i| {
                let start = date(2025, 1, 6) + chrono::Duration::weeks(2 * i);
                Sprint::new(format!("Sprint{}", i + 1), start, start + chrono::Duration::weeks(2))
            })
            .collect()
    }

    #[test]
    fn resize_keeps_the_edge_that_did_not_move() {
        let all = six_sprints();
        // Sprint6 starts on 2025-03-17, past the window.
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 6), date(2025, 3, 16)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint3", "Sprint6");
        let span = axis.resolve_span(&anchor, &all).unwrap();
        assert_eq!((span.start, span.end), (2, 4));

        let resized = axis.resize_anchor(&anchor, (2, 4), (1, 4), &all).unwrap();
        assert_eq!(resized, BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint6"));
    }

    #[test]
    fn sprint_anchor_resized_on_week_axis_stays_in_sprints() {
        let all = six_sprints();
        let axis = TimeAxis::build(
            TimeMode::Week,
            DateRange::new(date(2025, 1, 6), date(2025, 3, 16)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint3");
        let span = axis.resolve_span(&anchor, &all).unwrap();
        assert_eq!((span.start, span.end), (2, 5));

        let resized = axis
            .resize_anchor(&anchor, (span.start, span.end), (span.start, span.end + 1), &all)
            .unwrap();
        assert_eq!(resized, BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint4"));
    }

    #[test]
    fn week_anchor_resized_on_sprint_axis_names_weeks() {
        let all = six_sprints();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 6), date(2025, 3, 16)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Week, "2025S02", "2025S03");
        let resized = axis.resize_anchor(&anchor, (0, 0), (0, 1), &all).unwrap();
        assert_eq!(resized, BucketAnchor::new(TimeMode::Week, "2025S02", "2025S05"));
    }

    #[test]
    fn shift_moves_off_window_references_too() {
        let all = six_sprints();
        let axis = TimeAxis::build(
            TimeMode::Sprint,
            DateRange::new(date(2025, 1, 6), date(2025, 3, 16)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint3", "Sprint6");
        let shifted = axis.shift_anchor(&anchor, 2, 1, &all).unwrap();
        assert_eq!(shifted, BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint5"));
        assert_eq!(
            axis.shift_anchor(&anchor, 2, 3, &all),
            Err(Rejection::OutsideSprints {
                reference: "Sprint6".into()
            })
        );
    }

    #[test]
    fn shift_of_sprint_anchor_on_week_axis_counts_sprints() {
        let all = six_sprints();
        let axis = TimeAxis::build(
            TimeMode::Week,
            DateRange::new(date(2025, 1, 6), date(2025, 3, 16)),
            &all,
        );
        let anchor = BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint3");
        // Week 4 of the axis (2025S06) lies in Sprint3.
        let shifted = axis.shift_anchor(&anchor, 2, 4, &all).unwrap();
        assert_eq!(shifted, BucketAnchor::new(TimeMode::Sprint, "Sprint3", "Sprint4"));
    }

    #[test]
    fn week_shared_by_two_sprints_is_ambiguous() {
        let all = vec![
            Sprint::new("A", date(2025, 1, 6), date(2025, 1, 15)),
            Sprint::new("B", date(2025, 1, 15), date(2025, 1, 27)),
        ];
        assert_eq!(sprint_of_week("2025S02", &all).map(|s| s.name.as_str()), Ok("A"));
        assert_eq!(
            sprint_of_week("2025S03", &all),
            Err(Rejection::AmbiguousWeek {
                week: "2025S03".into()
            })
        );
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..20_000).prop_map(|offset| date(1990, 1, 1) + chrono::Duration::days(offset))
    }

    proptest! {
        #[test]
        fn week_code_round_trips_to_monday(d in any_date()) {
            let monday = date_of_week_code(&week_code_of(d)).unwrap();
            prop_assert_eq!(monday.weekday(), Weekday::Mon);
            prop_assert!(monday <= d);
            prop_assert!((d - monday).num_days() < 7);
        }

        #[test]
        fn unknown_references_clamp_in_range(n in 1usize..12, key in "[A-Z]{3}[0-9]{2}") {
            let buckets: Vec<Bucket> = (0..n)
                .map(|i| Bucket::week(date(2025, 1, 6) + chrono::Duration::weeks(i as i64)))
                .collect();
            let axis = TimeAxis::from_buckets(TimeMode::Week, buckets);
            let start = axis.clamp_start(&key).unwrap();
            let end = axis.clamp_end(&key).unwrap();
            prop_assert_eq!(start, 0);
            prop_assert_eq!(end, n - 1);
            let span = axis
                .resolve_span(&BucketAnchor::new(TimeMode::Week, key.clone(), key), &[])
                .unwrap();
            prop_assert!(span.start <= span.end && span.end < n);
        }
    }
}
