use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};

use crate::model::{BucketAnchor, PhaseCategory, PhaseKey, PhaseLink, Sprint};
use crate::roadmap::axis::{date_of_week_code, monday_of, week_code_of};
use crate::roadmap::controller::PhaseDraft;
use crate::ui::theme;

#[derive(Debug, Clone, PartialEq)]
pub enum DialogMode {
    Add,
    Edit(PhaseKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Pending,
    Cancel,
    Save,
}

/// Editor state for adding or editing one phase.
#[derive(Debug, Clone)]
pub struct PhaseDialog {
    pub mode: DialogMode,
    draft: PhaseDraft,
    description: String,
    week_start: NaiveDate,
    week_end: NaiveDate,
    link_name: String,
    link_url: String,
}

impl PhaseDialog {
    pub fn add(draft: PhaseDraft, today: NaiveDate) -> Self {
        Self::with_mode(DialogMode::Add, draft, today)
    }

    pub fn edit(key: PhaseKey, draft: PhaseDraft, today: NaiveDate) -> Self {
        Self::with_mode(DialogMode::Edit(key), draft, today)
    }

    fn with_mode(mode: DialogMode, draft: PhaseDraft, today: NaiveDate) -> Self {
        let week_start = date_of_week_code(draft.anchor.start()).unwrap_or_else(|| monday_of(today));
        let week_end = date_of_week_code(draft.anchor.end()).unwrap_or(week_start);
        Self {
            mode,
            description: draft.description.clone().unwrap_or_default(),
            draft,
            week_start,
            week_end,
            link_name: String::new(),
            link_url: String::new(),
        }
    }

    pub fn title(&self) -> String {
        match &self.mode {
            DialogMode::Add => format!("New phase · {}", self.draft.chantier),
            DialogMode::Edit(key) => format!("Edit phase · {key}"),
        }
    }

    /// The draft as it would be saved, with week pickers folded into the anchor.
    pub fn draft(&self) -> PhaseDraft {
        let mut draft = self.draft.clone();
        draft.description = Some(self.description.clone()).filter(|d| !d.trim().is_empty());
        if let BucketAnchor::Week { .. } = draft.anchor {
            draft.anchor = BucketAnchor::Week {
                start: week_code_of(self.week_start),
                end: week_code_of(self.week_end),
            };
        }
        draft
    }

    /// Append the pending link; `false` if its URL is blank.
    pub fn push_link(&mut self) -> bool {
        let url = self.link_url.trim();
        if url.is_empty() {
            return false;
        }
        let name = match self.link_name.trim() {
            "" => url,
            name => name,
        };
        self.draft
            .links
            .push(PhaseLink::new(self.draft.name.trim(), name, url));
        self.link_name.clear();
        self.link_url.clear();
        true
    }

    pub fn remove_link(&mut self, index: usize) {
        if index < self.draft.links.len() {
            self.draft.links.remove(index);
        }
    }

    pub fn links(&self) -> &[PhaseLink] {
        &self.draft.links
    }
}

/// Render the phase editor. `sprints` feeds the sprint pickers.
pub fn show_phase_dialog(ctx: &Context, dialog: &mut PhaseDialog, sprints: &[Sprint]) -> DialogOutcome {
    let mut outcome = DialogOutcome::Pending;
    let title = dialog.title();

    Window::new(RichText::new(title).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([420.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("phase_dialog_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [260.0, 24.0],
                        egui::TextEdit::singleline(&mut dialog.draft.name).hint_text("Phase name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Type").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("phase_dialog_type")
                        .selected_text(
                            RichText::new(dialog.draft.category.label()).color(dialog.draft.category.color()),
                        )
                        .show_ui(ui, |ui| {
                            for category in PhaseCategory::all() {
                                ui.selectable_value(
                                    &mut dialog.draft.category,
                                    category.clone(),
                                    RichText::new(category.label()).color(category.color()),
                                );
                            }
                        });
                    ui.end_row();

                    match &mut dialog.draft.anchor {
                        BucketAnchor::Sprint { start, end } => {
                            ui.label(RichText::new("From sprint").color(theme::TEXT_SECONDARY));
                            sprint_combo(ui, "phase_dialog_sprint_start", start, sprints);
                            ui.end_row();
                            ui.label(RichText::new("To sprint").color(theme::TEXT_SECONDARY));
                            sprint_combo(ui, "phase_dialog_sprint_end", end, sprints);
                            ui.end_row();
                        }
                        BucketAnchor::Week { .. } => {
                            ui.label(RichText::new("From week").color(theme::TEXT_SECONDARY));
                            ui.horizontal(|ui| {
                                ui.add(
                                    egui_extras::DatePickerButton::new(&mut dialog.week_start)
                                        .id_salt("phase_dialog_week_start"),
                                );
                                ui.label(RichText::new(week_code_of(dialog.week_start)).color(theme::TEXT_DIM));
                            });
                            ui.end_row();
                            ui.label(RichText::new("To week").color(theme::TEXT_SECONDARY));
                            ui.horizontal(|ui| {
                                ui.add(
                                    egui_extras::DatePickerButton::new(&mut dialog.week_end)
                                        .id_salt("phase_dialog_week_end"),
                                );
                                ui.label(RichText::new(week_code_of(dialog.week_end)).color(theme::TEXT_DIM));
                            });
                            ui.end_row();
                        }
                    }

                    ui.label(RichText::new("Description").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [260.0, 60.0],
                        egui::TextEdit::multiline(&mut dialog.description).hint_text("Optional"),
                    );
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.label(RichText::new("Links").strong());
            let mut removed = None;
            for (i, link) in dialog.draft.links.iter().enumerate() {
                ui.horizontal(|ui| {
                    if ui
                        .small_button(egui_phosphor::regular::ARROW_SQUARE_OUT)
                        .on_hover_text(&link.url)
                        .clicked()
                    {
                        if let Err(err) = open::that(&link.url) {
                            tracing::warn!(url = %link.url, %err, "could not open link");
                        }
                    }
                    ui.label(&link.name);
                    if ui.small_button(egui_phosphor::regular::X).on_hover_text("Remove").clicked() {
                        removed = Some(i);
                    }
                });
            }
            if let Some(i) = removed {
                dialog.remove_link(i);
            }
            ui.horizontal(|ui| {
                ui.add_sized(
                    [110.0, 22.0],
                    egui::TextEdit::singleline(&mut dialog.link_name).hint_text("Label"),
                );
                ui.add_sized(
                    [200.0, 22.0],
                    egui::TextEdit::singleline(&mut dialog.link_url).hint_text("https://..."),
                );
                if ui.button(egui_phosphor::regular::PLUS).on_hover_text("Add link").clicked() {
                    dialog.push_link();
                }
            });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save).clicked() {
                    outcome = DialogOutcome::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    outcome = DialogOutcome::Cancel;
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        outcome = DialogOutcome::Cancel;
    }
    outcome
}

fn sprint_combo(ui: &mut egui::Ui, id: &str, selected: &mut String, sprints: &[Sprint]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.as_str())
        .width(180.0)
        .show_ui(ui, |ui| {
            for sprint in sprints {
                let label = format!("{}  ({} → {})", sprint.name, sprint.start.format("%d/%m"), sprint.end.format("%d/%m"));
                ui.selectable_value(selected, sprint.name.clone(), label);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeMode;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_pickers_fold_into_codes() {
        let draft = PhaseDraft::new("Alpha", BucketAnchor::new(TimeMode::Week, "2025S02", "2025S03"));
        let mut dialog = PhaseDialog::add(draft, date(2025, 1, 1));
        assert_eq!(dialog.week_start, date(2025, 1, 6));
        dialog.week_end = date(2025, 1, 23);
        let saved = dialog.draft();
        assert_eq!(saved.anchor, BucketAnchor::new(TimeMode::Week, "2025S02", "2025S04"));
    }

    #[test]
    fn sprint_anchor_is_untouched_and_blank_description_dropped() {
        let draft = PhaseDraft::new("Alpha", BucketAnchor::new(TimeMode::Sprint, "S1", "S2"));
        let mut dialog = PhaseDialog::add(draft.clone(), date(2025, 1, 1));
        dialog.description = "   ".into();
        assert_eq!(dialog.draft(), draft);
    }

    #[test]
    fn links_need_a_url_and_default_their_label() {
        let mut draft = PhaseDraft::new("Alpha", BucketAnchor::new(TimeMode::Sprint, "S1", "S1"));
        draft.name = "Dev".into();
        let mut dialog = PhaseDialog::add(draft, date(2025, 1, 1));
        assert!(!dialog.push_link());
        dialog.link_url = " https://wiki/dev ".into();
        assert!(dialog.push_link());
        assert_eq!(dialog.links()[0].name, "https://wiki/dev");
        assert_eq!(dialog.links()[0].phase, "Dev");
        dialog.remove_link(5);
        dialog.remove_link(0);
        assert!(dialog.links().is_empty());
    }

    #[test]
    fn edit_title_names_the_phase() {
        let draft = PhaseDraft::new("Alpha", BucketAnchor::new(TimeMode::Sprint, "S1", "S1"));
        let dialog = PhaseDialog::edit(PhaseKey::new("Alpha", "Dev"), draft, date(2025, 1, 1));
        assert!(dialog.title().contains("Dev"));
    }
}
