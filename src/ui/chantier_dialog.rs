use egui::{Context, RichText, Window};

use crate::model::Chantier;
use crate::roadmap::mini::MiniRoadmap;
use crate::ui::mini_roadmap::show_mini_roadmap;
use crate::ui::theme;

/// Chantier detail window with its mini roadmap. Returns `false` once closed.
pub fn show_chantier_window(ctx: &Context, chantier: &Chantier, mini: &MiniRoadmap, margin: f32) -> bool {
    let mut open = true;
    let mut close = false;

    Window::new(RichText::new(&chantier.name).strong().size(14.0))
        .id(egui::Id::new(("chantier-window", &chantier.name)))
        .open(&mut open)
        .resizable(true)
        .collapsible(false)
        .default_width(520.0)
        .show(ctx, |ui| {
            egui::Grid::new("chantier_details")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    detail(ui, "Responsible", chantier.responsible.as_deref());
                    detail(ui, "Perimeter", chantier.perimeter.as_deref());
                    let target = chantier.target_date.map(|d| d.format("%d/%m/%Y").to_string());
                    detail(ui, "Desired date", target.as_deref());
                    if chantier.archived {
                        ui.label("");
                        ui.label(RichText::new("Archived").italics().color(theme::TEXT_DIM));
                        ui.end_row();
                    }
                });

            if let Some(description) = chantier.description.as_deref() {
                ui.add_space(4.0);
                ui.label(RichText::new(description).color(theme::TEXT_SECONDARY));
            }

            ui.add_space(8.0);
            ui.label(RichText::new("Roadmap").strong());
            show_mini_roadmap(ui, mini, margin);

            ui.add_space(6.0);
            if ui.add_sized([80.0, 26.0], egui::Button::new("Close")).clicked() {
                close = true;
            }
        });

    open && !close
}

fn detail(ui: &mut egui::Ui, label: &str, value: Option<&str>) {
    ui.label(RichText::new(label).color(theme::TEXT_SECONDARY));
    match value {
        Some(v) => ui.label(v),
        None => ui.label(RichText::new("-").color(theme::TEXT_DIM)),
    };
    ui.end_row();
}
