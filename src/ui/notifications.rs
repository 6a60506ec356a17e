use std::time::{Duration, Instant};

use egui::{Align2, Context, RichText};

use crate::roadmap::feedback::{Feedback, NoticeLevel};
use crate::ui::theme;

const TOAST_LIFETIME: Duration = Duration::from_secs(5);
const MAX_TOASTS: usize = 5;

struct Toast {
    level: NoticeLevel,
    message: String,
    shown_at: Instant,
}

/// Toast queue in the bottom-right corner plus native confirmation dialogs.
#[derive(Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn show(&mut self, ctx: &Context) {
        self.toasts.retain(|t| t.shown_at.elapsed() < TOAST_LIFETIME);
        if self.toasts.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("roadmap-toasts"))
            .anchor(Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                for (i, toast) in self.toasts.iter().enumerate() {
                    let (icon, color) = match toast.level {
                        NoticeLevel::Success => (egui_phosphor::regular::CHECK_CIRCLE, theme::NOTICE_SUCCESS),
                        NoticeLevel::Warning => (egui_phosphor::regular::WARNING, theme::NOTICE_WARNING),
                        NoticeLevel::Error => (egui_phosphor::regular::X_CIRCLE, theme::NOTICE_ERROR),
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, color))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(icon).color(color).size(16.0));
                                ui.label(RichText::new(&toast.message).color(theme::TEXT_PRIMARY));
                                if ui
                                    .small_button(egui_phosphor::regular::X)
                                    .on_hover_text("Dismiss")
                                    .clicked()
                                {
                                    dismissed = Some(i);
                                }
                            });
                        });
                    ui.add_space(4.0);
                }
            });
        if let Some(i) = dismissed {
            self.toasts.remove(i);
        }
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

impl Feedback for Notifications {
    fn notify(&mut self, level: NoticeLevel, message: String) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.remove(0);
        }
        self.toasts.push(Toast {
            level,
            message,
            shown_at: Instant::now(),
        });
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let answer = rfd::MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_level(rfd::MessageLevel::Warning)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        answer == rfd::MessageDialogResult::Yes
    }
}
