//! The roadmap page session: owns the store handle, the current snapshot and
//! the filter, and turns edits and gestures into store writes.
//!
//! Every write follows the same cycle: re-read the collection, find the row by
//! its logical key, write through the handle just obtained, invalidate the
//! cache, reload. Handles are never kept across writes.

use chrono::NaiveDate;

use crate::error::{Operation, Rejection, RoadmapError};
use crate::model::{columns, BucketAnchor, PhaseCategory, Phase, PhaseKey, PhaseLink, RoadmapSnapshot};
use crate::roadmap::axis::{anchor_dates, TimeAxis};
use crate::roadmap::feedback::{Feedback, NoticeLevel};
use crate::roadmap::filter::RoadmapFilter;
use crate::roadmap::gesture::{plan_move, BlockGrip, DropCell, GestureOutcome};
use crate::roadmap::grid::{build_grid, GridModel};
use crate::store::{collections, fields, RoadmapStore, Row, RowHandle};

/// Everything the phase editor collects; used for both add and update.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDraft {
    pub chantier: String,
    pub name: String,
    pub category: PhaseCategory,
    pub description: Option<String>,
    pub anchor: BucketAnchor,
    pub links: Vec<PhaseLink>,
}

impl PhaseDraft {
    pub fn new(chantier: impl Into<String>, anchor: BucketAnchor) -> Self {
        Self {
            chantier: chantier.into(),
            name: String::new(),
            category: PhaseCategory::Dev,
            description: None,
            anchor,
            links: Vec::new(),
        }
    }

    /// Draft pre-filled from an existing phase; `None` if it has no anchor.
    pub fn from_phase(phase: &Phase, links: impl IntoIterator<Item = PhaseLink>) -> Option<Self> {
        Some(Self {
            chantier: phase.chantier.clone(),
            name: phase.name.clone(),
            category: phase.category.clone(),
            description: phase.description.clone(),
            anchor: phase.anchor.clone()?,
            links: links.into_iter().collect(),
        })
    }

    fn to_phase(&self) -> Phase {
        let mut phase = Phase::new(
            self.chantier.clone(),
            self.name.trim(),
            self.category.clone(),
            self.anchor.clone(),
        );
        phase.description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        phase
    }
}

pub struct RoadmapSession<S> {
    store: S,
    snapshot: RoadmapSnapshot,
    filter: RoadmapFilter,
    /// Rewrite link rows when a phase is renamed.
    pub migrate_links_on_rename: bool,
}

impl<S: RoadmapStore> RoadmapSession<S> {
    /// A session with an empty snapshot; call [`Self::refresh`] to load.
    pub fn new(store: S, filter: RoadmapFilter) -> Self {
        Self {
            store,
            snapshot: RoadmapSnapshot::default(),
            filter,
            migrate_links_on_rename: true,
        }
    }

    pub fn snapshot(&self) -> &RoadmapSnapshot {
        &self.snapshot
    }

    pub fn filter(&self) -> &RoadmapFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut RoadmapFilter {
        &mut self.filter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reload every collection. On failure the previous snapshot stays.
    pub fn refresh(&mut self) -> Result<(), RoadmapError> {
        for name in collections::ALL {
            self.store.invalidate_cache(name);
        }
        let snapshot =
            RoadmapSnapshot::load(&mut self.store).map_err(RoadmapError::persistence(Operation::Reload))?;
        tracing::info!(
            chantiers = snapshot.chantiers.len(),
            phases = snapshot.phases.len(),
            sprints = snapshot.sprints.len(),
            "roadmap loaded"
        );
        self.snapshot = snapshot;
        Ok(())
    }

    /// Time axis for the current filter.
    pub fn axis(&self) -> TimeAxis {
        TimeAxis::build(self.filter.mode, self.filter.range, &self.snapshot.sprints)
    }

    /// Grid model for the current snapshot and filter.
    pub fn view(&self, today: NaiveDate) -> GridModel {
        build_grid(&self.snapshot, &self.filter, today)
    }

    /// Current bucket span of a phase on the visible axis.
    pub fn grip(&self, key: &PhaseKey) -> Result<BlockGrip, RoadmapError> {
        let anchor = self.stored_anchor(key)?;
        let span = self
            .axis()
            .resolve_span(&anchor, &self.snapshot.sprints)
            .ok_or(Rejection::NoBucket)?;
        Ok(BlockGrip::new(key.clone(), span.start, span.end))
    }

    /// A blank draft anchored on one cell, for "add phase here".
    pub fn draft_at(&self, cell: &DropCell) -> Option<PhaseDraft> {
        let anchor = self.axis().anchor_for(cell.bucket, cell.bucket)?;
        Some(PhaseDraft::new(cell.chantier.clone(), anchor))
    }

    // ── Edits ───────────────────────────────────────────────────────────────

    /// Rename a phase. The snapshot is patched in place; no reload.
    pub fn rename_phase(&mut self, key: &PhaseKey, new_name: &str) -> Result<bool, RoadmapError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Rejection::EmptyName.into());
        }
        if new_name == key.phase {
            return Ok(false);
        }
        self.ensure_unique(&key.chantier, new_name)?;

        let handle = self.locate_phase(key, Operation::RenamePhase)?;
        self.store
            .update_row(
                collections::PHASES,
                handle,
                fields([(columns::PHASE, new_name.to_string())]),
            )
            .map_err(RoadmapError::persistence(Operation::RenamePhase))?;
        self.store.invalidate_cache(collections::PHASES);
        tracing::info!(phase = %key, new_name, "phase renamed");

        if self.migrate_links_on_rename {
            if self.name_shared(key) {
                // The other chantier keeps its links; the renamed phase gets copies.
                let copies: Vec<PhaseLink> = self
                    .snapshot
                    .links_of(&key.phase)
                    .map(|l| PhaseLink::new(new_name, l.name.clone(), l.url.clone()))
                    .collect();
                self.snapshot.rename_phase(key, new_name, false);
                self.write_links(None, new_name, &copies)?;
                self.snapshot.links.extend(copies);
                return Ok(true);
            }
            if let Err(err) = self.rekey_links(&key.phase, new_name) {
                self.snapshot.rename_phase(key, new_name, false);
                return Err(err);
            }
        }
        self.snapshot
            .rename_phase(key, new_name, self.migrate_links_on_rename);
        Ok(true)
    }

    /// Shift a phase so it starts on `target`, keeping its duration.
    ///
    /// Both stored references move by the same number of sprints (or weeks)
    /// in the phase's own mode, including a reference past the window.
    /// Returns `Ok(false)` when the phase is dropped where it already starts.
    pub fn move_phase(&mut self, key: &PhaseKey, target: &DropCell) -> Result<bool, RoadmapError> {
        if target.chantier != key.chantier {
            return Err(Rejection::CrossChantierDrop {
                from: key.chantier.clone(),
                to: target.chantier.clone(),
            }
            .into());
        }
        let grip = self.grip(key)?;
        let axis = self.axis();
        let last = axis.last_index().ok_or(Rejection::NoBucket)?;
        let (start, _) = plan_move(&grip, target, last)?;
        if start == grip.start {
            return Ok(false);
        }
        let current = self.stored_anchor(key)?;
        let anchor = axis.shift_anchor(&current, grip.start, start, &self.snapshot.sprints)?;
        if anchor == current {
            return Ok(false);
        }
        self.write_anchor(key, &anchor, Operation::MovePhase)?;
        Ok(true)
    }

    /// Set a phase's span to buckets `start..=end` of the visible axis.
    ///
    /// Only an edge whose index differs from the current one is rewritten;
    /// the anchor keeps its sprint or week mode whatever the axis shows.
    pub fn resize_phase(&mut self, key: &PhaseKey, start: usize, end: usize) -> Result<bool, RoadmapError> {
        if end < start {
            return Err(Rejection::InvertedSpan.into());
        }
        let grip = self.grip(key)?;
        let axis = self.axis();
        let last = axis.last_index().ok_or(Rejection::NoBucket)?;
        if end > last {
            return Err(Rejection::BeyondWindow {
                phase: key.phase.clone(),
            }
            .into());
        }
        if (start, end) == (grip.start, grip.end) {
            return Ok(false);
        }
        let current = self.stored_anchor(key)?;
        let anchor = axis.resize_anchor(
            &current,
            (grip.start, grip.end),
            (start, end),
            &self.snapshot.sprints,
        )?;
        if anchor == current {
            return Ok(false);
        }
        self.write_anchor(key, &anchor, Operation::ResizePhase)?;
        Ok(true)
    }

    pub fn add_phase(&mut self, draft: &PhaseDraft) -> Result<PhaseKey, RoadmapError> {
        self.validate(draft)?;
        if self.snapshot.chantier(&draft.chantier).is_none() {
            return Err(RoadmapError::ChantierNotFound(draft.chantier.clone()));
        }
        let name = draft.name.trim();
        self.ensure_unique(&draft.chantier, name)?;

        let phase = draft.to_phase();
        self.store
            .insert_row(collections::PHASES, phase.to_fields())
            .map_err(RoadmapError::persistence(Operation::AddPhase))?;
        self.store.invalidate_cache(collections::PHASES);
        self.write_links(None, name, &draft.links)?;
        tracing::info!(phase = %phase.key(), "phase added");
        self.reload()?;
        Ok(phase.key())
    }

    /// Overwrite every field of a phase, including its links.
    ///
    /// On a rename, links under the old name stay when a phase of another
    /// chantier still carries that name.
    pub fn update_phase(&mut self, key: &PhaseKey, draft: &PhaseDraft) -> Result<PhaseKey, RoadmapError> {
        self.validate(draft)?;
        let name = draft.name.trim();
        if name != key.phase {
            self.ensure_unique(&key.chantier, name)?;
        }

        let keep_old_links = name != key.phase && self.name_shared(key);
        let handle = self.locate_phase(key, Operation::UpdatePhase)?;
        let mut phase = draft.to_phase();
        phase.chantier = key.chantier.clone();
        self.store
            .update_row(collections::PHASES, handle, phase.to_fields())
            .map_err(RoadmapError::persistence(Operation::UpdatePhase))?;
        self.store.invalidate_cache(collections::PHASES);
        let old = (!keep_old_links).then_some(key.phase.as_str());
        self.write_links(old, name, &draft.links)?;
        tracing::info!(phase = %key, "phase updated");
        self.reload()?;
        Ok(phase.key())
    }

    /// Delete a phase and, unless another chantier has a phase of the same
    /// name, its links.
    pub fn delete_phase(&mut self, key: &PhaseKey) -> Result<(), RoadmapError> {
        let handle = self.locate_phase(key, Operation::DeletePhase)?;
        self.store
            .delete_row(collections::PHASES, handle)
            .map_err(RoadmapError::persistence(Operation::DeletePhase))?;
        self.store.invalidate_cache(collections::PHASES);

        if !self.name_shared(key) {
            self.delete_links_of(&key.phase)?;
        }
        tracing::info!(phase = %key, "phase deleted");
        self.reload()
    }

    /// Ask for confirmation, then delete. `Ok(false)` when the user declines.
    pub fn delete_with_confirmation(
        &mut self,
        key: &PhaseKey,
        feedback: &mut dyn Feedback,
    ) -> Result<bool, RoadmapError> {
        let question = format!("Delete phase '{}' of '{}'?", key.phase, key.chantier);
        if !feedback.confirm("Delete phase", &question) {
            return Ok(false);
        }
        self.delete_phase(key)?;
        Ok(true)
    }

    /// Replace every link of `phase` with `links`.
    pub fn replace_links(&mut self, phase: &str, links: &[PhaseLink]) -> Result<(), RoadmapError> {
        self.write_links(Some(phase), phase, links)?;
        self.reload()
    }

    // ── Gestures ────────────────────────────────────────────────────────────

    /// Commit a drop or resize and report the result. Other outcomes are UI
    /// intents and are left to the caller; returns whether it was handled.
    pub fn apply_gesture(&mut self, outcome: &GestureOutcome, feedback: &mut dyn Feedback) -> bool {
        match outcome {
            GestureOutcome::Drop { grip, target } => {
                let result = self.move_phase(&grip.key, target);
                let label = self.bucket_label(target.bucket);
                self.report(result, feedback, |moved| {
                    moved.then(|| format!("'{}' now starts at {}", grip.key.phase, label))
                });
                true
            }
            GestureOutcome::Resize {
                grip, start, end, ..
            } => {
                let result = self.resize_phase(&grip.key, *start, *end);
                let (from, to) = (self.bucket_label(*start), self.bucket_label(*end));
                self.report(result, feedback, |changed| {
                    changed.then(|| format!("'{}' now runs {} → {}", grip.key.phase, from, to))
                });
                true
            }
            _ => false,
        }
    }

    /// Turn a result into a notification; rejections warn, failures error.
    pub fn report<T>(
        &self,
        result: Result<T, RoadmapError>,
        feedback: &mut dyn Feedback,
        success: impl FnOnce(T) -> Option<String>,
    ) -> bool {
        match result {
            Ok(value) => {
                if let Some(message) = success(value) {
                    feedback.notify(NoticeLevel::Success, message);
                }
                true
            }
            Err(err) => {
                let level = NoticeLevel::for_error(&err);
                match level {
                    NoticeLevel::Warning => tracing::warn!(%err, "edit rejected"),
                    _ => tracing::error!(%err, "edit failed"),
                }
                feedback.notify(level, err.to_string());
                false
            }
        }
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn bucket_label(&self, index: usize) -> String {
        self.axis()
            .buckets
            .get(index)
            .map(|b| b.label.clone())
            .unwrap_or_default()
    }

    fn reload(&mut self) -> Result<(), RoadmapError> {
        self.refresh()
    }

    fn stored_anchor(&self, key: &PhaseKey) -> Result<BucketAnchor, RoadmapError> {
        let phase = self
            .snapshot
            .phase(key)
            .ok_or_else(|| RoadmapError::PhaseNotFound(key.clone()))?;
        Ok(phase.anchor.clone().ok_or(Rejection::NoBucket)?)
    }

    /// Another chantier has a phase with the same name, so they share links.
    fn name_shared(&self, key: &PhaseKey) -> bool {
        self.snapshot
            .phases
            .iter()
            .any(|p| p.name == key.phase && p.chantier != key.chantier)
    }

    fn validate(&self, draft: &PhaseDraft) -> Result<(), RoadmapError> {
        if draft.name.trim().is_empty() {
            return Err(Rejection::EmptyName.into());
        }
        if let (Some(start), Some(end)) = anchor_dates(&draft.anchor, &self.snapshot.sprints) {
            if start > end {
                return Err(Rejection::InvertedSpan.into());
            }
        }
        Ok(())
    }

    fn ensure_unique(&self, chantier: &str, name: &str) -> Result<(), RoadmapError> {
        let taken = self
            .snapshot
            .phases_of(chantier)
            .any(|p| p.name == name);
        if taken {
            return Err(Rejection::DuplicatePhase {
                chantier: chantier.to_string(),
                phase: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Fresh handle of a phase row, matched on chantier and phase name.
    fn locate_phase(&mut self, key: &PhaseKey, operation: Operation) -> Result<RowHandle, RoadmapError> {
        let rows = self
            .store
            .read_collection(collections::PHASES)
            .map_err(RoadmapError::persistence(operation))?;
        rows.iter()
            .find(|row| {
                row.text(columns::CHANTIER).as_deref() == Some(key.chantier.as_str())
                    && row.text(columns::PHASE).as_deref() == Some(key.phase.as_str())
            })
            .map(|row| row.handle)
            .ok_or_else(|| RoadmapError::MissingRowHandle {
                entity: format!("phase {}", key),
            })
    }

    /// Fresh handles of the link rows of `phase`, highest first.
    fn link_handles(&mut self, phase: &str, operation: Operation) -> Result<Vec<RowHandle>, RoadmapError> {
        let rows = self
            .store
            .read_collection(collections::PHASE_LINKS)
            .map_err(RoadmapError::persistence(operation))?;
        let mut handles: Vec<RowHandle> = rows
            .iter()
            .filter(|row: &&Row| row.text(columns::PHASE).as_deref() == Some(phase))
            .map(|row| row.handle)
            .collect();
        handles.sort_unstable_by(|a, b| b.cmp(a));
        Ok(handles)
    }

    fn write_anchor(&mut self, key: &PhaseKey, anchor: &BucketAnchor, operation: Operation) -> Result<(), RoadmapError> {
        let handle = self.locate_phase(key, operation)?;
        self.store
            .update_row(collections::PHASES, handle, anchor.to_fields())
            .map_err(RoadmapError::persistence(operation))?;
        self.store.invalidate_cache(collections::PHASES);
        tracing::info!(
            phase = %key,
            start = anchor.start(),
            end = anchor.end(),
            "{}",
            operation
        );
        self.reload()
    }

    fn rekey_links(&mut self, old: &str, new: &str) -> Result<(), RoadmapError> {
        let handles = self.link_handles(old, Operation::SaveLinks)?;
        for handle in &handles {
            self.store
                .update_row(
                    collections::PHASE_LINKS,
                    *handle,
                    fields([(columns::PHASE, new.to_string())]),
                )
                .map_err(RoadmapError::persistence(Operation::SaveLinks))?;
        }
        self.store.invalidate_cache(collections::PHASE_LINKS);
        tracing::debug!(old, new, links = handles.len(), "links re-keyed");
        Ok(())
    }

    fn delete_links_of(&mut self, phase: &str) -> Result<(), RoadmapError> {
        // Deleting shifts later rows, so go from the highest handle down.
        for handle in self.link_handles(phase, Operation::SaveLinks)? {
            self.store
                .delete_row(collections::PHASE_LINKS, handle)
                .map_err(RoadmapError::persistence(Operation::SaveLinks))?;
        }
        self.store.invalidate_cache(collections::PHASE_LINKS);
        Ok(())
    }

    /// Delete the links stored under `old` (if any) and insert `links` under `name`.
    fn write_links(&mut self, old: Option<&str>, name: &str, links: &[PhaseLink]) -> Result<(), RoadmapError> {
        if let Some(old) = old {
            self.delete_links_of(old)?;
        }
        for link in links.iter().filter(|l| !l.url.trim().is_empty()) {
            let row = PhaseLink::new(name, link.name.trim(), link.url.trim());
            self.store
                .insert_row(collections::PHASE_LINKS, row.to_fields())
                .map_err(RoadmapError::persistence(Operation::SaveLinks))?;
        }
        self.store.invalidate_cache(collections::PHASE_LINKS);
        Ok(())
    }
}
