use std::collections::BTreeSet;

use crate::app::{DataSource, RoadmapApp};
use crate::model::TimeMode;
use crate::roadmap::axis::DateRange;
use crate::roadmap::filter::distinct_values;
use crate::ui::theme;
use egui::{menu, RichText, Ui};

/// Render the top menu bar.
pub fn show_toolbar(app: &mut RoadmapApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_label()), |ui| {
            if ui.button("  Open workbook folder...").clicked() {
                app.open_workbook();
                ui.close_menu();
            }
            if ui.button("  Demo data").clicked() {
                app.load_demo();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Reload          F5").clicked() {
                app.refresh();
                ui.close_menu();
            }
            ui.separator();
            let has_workbook = matches!(app.source, DataSource::Workbook(_));
            if ui
                .add_enabled(has_workbook, egui::Button::new("  Show workbook files"))
                .clicked()
            {
                app.open_workbook_folder();
                ui.close_menu();
            }
            if ui.button("  Open settings folder").clicked() {
                app.open_settings_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_label()), |ui| {
            ui.label(RichText::new("Time axis").small().weak());
            let current = app.session.filter().mode;
            for mode in [TimeMode::Sprint, TimeMode::Week] {
                if ui.radio(current == mode, mode.label()).clicked() {
                    app.set_mode(mode);
                    ui.close_menu();
                }
            }
            ui.separator();
            let mut archived = app.session.filter().show_archived;
            if ui.checkbox(&mut archived, "Show archived chantiers").changed() {
                app.session.filter_mut().show_archived = archived;
            }
            let mut migrate = app.session.migrate_links_on_rename;
            if ui
                .checkbox(&mut migrate, "Move links when renaming a phase")
                .changed()
            {
                app.set_migrate_links(migrate);
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let source = match &app.source {
                DataSource::Demo => "Demo data".to_string(),
                DataSource::Workbook(dir) => dir.display().to_string(),
            };
            ui.label(RichText::new(source).size(11.0).weak());
        });
    });
}

/// Render the filter row: search, period, responsibles, perimeters.
pub fn show_filter_bar(app: &mut RoadmapApp, ui: &mut Ui) {
    let chantiers = &app.session.snapshot().chantiers;
    let responsibles: Vec<String> = distinct_values(chantiers, |c| c.responsible.as_ref())
        .into_iter()
        .map(str::to_string)
        .collect();
    let perimeters: Vec<String> = distinct_values(chantiers, |c| c.perimeter.as_ref())
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut reload = false;
    ui.horizontal(|ui| {
        let filter = app.session.filter_mut();

        ui.label(RichText::new(egui_phosphor::regular::MAGNIFYING_GLASS).color(theme::TEXT_DIM));
        ui.add_sized(
            [180.0, 22.0],
            egui::TextEdit::singleline(&mut filter.search).hint_text("Search chantier..."),
        );
        ui.separator();

        let DateRange { mut start, mut end } = filter.range;
        ui.label(RichText::new("From").color(theme::TEXT_SECONDARY));
        ui.add(egui_extras::DatePickerButton::new(&mut start).id_salt("filter_range_start"));
        ui.label(RichText::new("to").color(theme::TEXT_SECONDARY));
        ui.add(egui_extras::DatePickerButton::new(&mut end).id_salt("filter_range_end"));
        if (start, end) != (filter.range.start, filter.range.end) {
            filter.range = DateRange::new(start, end);
        }
        ui.separator();

        multi_select(ui, "Responsible", &responsibles, &mut filter.responsibles);
        multi_select(ui, "Perimeter", &perimeters, &mut filter.perimeters);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(egui_phosphor::regular::ARROWS_CLOCKWISE)
                .on_hover_text("Reload from storage")
                .clicked()
            {
                reload = true;
            }
        });
    });
    if reload {
        app.refresh();
    }
}

/// Dropdown of checkboxes; an empty selection means "all".
fn multi_select(ui: &mut Ui, label: &str, values: &[String], selected: &mut BTreeSet<String>) {
    let title = if selected.is_empty() {
        format!("{label}: all")
    } else {
        format!("{label}: {}", selected.len())
    };
    ui.menu_button(title, |ui| {
        if values.is_empty() {
            ui.label(RichText::new("Nothing to filter on").weak());
            return;
        }
        for value in values {
            let mut checked = selected.contains(value);
            if ui.checkbox(&mut checked, value).changed() {
                if checked {
                    selected.insert(value.clone());
                } else {
                    selected.remove(value);
                }
            }
        }
        ui.separator();
        if ui.button("Clear").clicked() {
            selected.clear();
            ui.close_menu();
        }
    });
}
