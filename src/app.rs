use chrono::NaiveDate;
use std::path::PathBuf;

use crate::config::RoadmapSettings;
use crate::model::{columns, BucketAnchor, PhaseKey, TimeMode};
use crate::roadmap::axis::{monday_of, week_code_of};
use crate::roadmap::gesture::DropCell;
use crate::roadmap::mini::project_mini;
use crate::roadmap::{Feedback, GridModel, NoticeLevel, RoadmapFilter, RoadmapSession};
use crate::store::{collections, fields, CsvWorkbook, MemoryStore, RoadmapStore};
use crate::ui;
use crate::ui::notifications::Notifications;
use crate::ui::phase_dialog::{DialogMode, DialogOutcome, PhaseDialog};
use crate::ui::roadmap_grid::{GridAction, GridInteraction};

/// Where the roadmap rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Demo,
    Workbook(PathBuf),
}

/// Main application state.
pub struct RoadmapApp {
    pub session: RoadmapSession<Box<dyn RoadmapStore>>,
    pub settings: RoadmapSettings,
    pub source: DataSource,
    settings_path: PathBuf,
    grid: GridInteraction,
    notifications: Notifications,
    phase_dialog: Option<PhaseDialog>,
    open_chantier: Option<String>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl RoadmapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Phosphor icons render inline with text as a fallback font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings_path = RoadmapSettings::default_path();
        let settings = RoadmapSettings::load(&settings_path);
        Self::with_settings(settings, settings_path)
    }

    /// Build the app without a window; used by `new` and by tests.
    pub fn with_settings(settings: RoadmapSettings, settings_path: PathBuf) -> Self {
        let mut notifications = Notifications::default();
        let (store, source) = match &settings.workbook_dir {
            Some(dir) => match CsvWorkbook::open(dir.clone()) {
                Ok(workbook) => (Box::new(workbook) as Box<dyn RoadmapStore>, DataSource::Workbook(dir.clone())),
                Err(err) => {
                    tracing::error!(dir = %dir.display(), %err, "cannot open workbook, showing demo data");
                    notifications.notify(NoticeLevel::Error, format!("Cannot open {}: {err}", dir.display()));
                    (Box::new(sample_store(today())) as Box<dyn RoadmapStore>, DataSource::Demo)
                }
            },
            None => (Box::new(sample_store(today())) as Box<dyn RoadmapStore>, DataSource::Demo),
        };

        let filter = RoadmapFilter::around(today(), settings.mode, settings.visible_weeks);
        let mut session = RoadmapSession::new(store, filter);
        session.migrate_links_on_rename = settings.migrate_links_on_rename;
        if let Err(err) = session.refresh() {
            tracing::error!(%err, "initial load failed");
            notifications.notify(NoticeLevel::Error, err.to_string());
        }

        Self {
            session,
            grid: GridInteraction::new(settings.gesture(), settings.min_column_width, settings.phase_margin_px),
            settings,
            source,
            settings_path,
            notifications,
            phase_dialog: None,
            open_chantier: None,
        }
    }

    // ── Data source ─────────────────────────────────────────────────────────

    fn replace_store(&mut self, store: Box<dyn RoadmapStore>, source: DataSource) {
        let filter = self.session.filter().clone();
        self.session = RoadmapSession::new(store, filter);
        self.session.migrate_links_on_rename = self.settings.migrate_links_on_rename;
        self.source = source;
        self.grid.reset();
        self.phase_dialog = None;
        self.open_chantier = None;
        self.refresh();
    }

    pub fn open_workbook(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_title("Open workbook folder")
            .pick_folder()
        else {
            return;
        };
        match CsvWorkbook::open(dir.clone()) {
            Ok(workbook) => {
                tracing::info!(dir = %dir.display(), "workbook opened");
                self.replace_store(Box::new(workbook), DataSource::Workbook(dir.clone()));
                self.settings.workbook_dir = Some(dir);
                self.save_settings();
            }
            Err(err) => {
                tracing::error!(dir = %dir.display(), %err, "cannot open workbook");
                self.notifications
                    .notify(NoticeLevel::Error, format!("Cannot open {}: {err}", dir.display()));
            }
        }
    }

    pub fn load_demo(&mut self) {
        self.replace_store(Box::new(sample_store(today())), DataSource::Demo);
        self.settings.workbook_dir = None;
        self.save_settings();
    }

    pub fn refresh(&mut self) {
        self.grid.reset();
        if let Err(err) = self.session.refresh() {
            tracing::error!(%err, "reload failed");
            self.notifications.notify(NoticeLevel::Error, err.to_string());
        }
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: TimeMode) {
        if self.session.filter().mode == mode {
            return;
        }
        self.session.filter_mut().mode = mode;
        self.grid.reset();
        self.settings.mode = mode;
        self.save_settings();
    }

    pub fn set_migrate_links(&mut self, migrate: bool) {
        self.session.migrate_links_on_rename = migrate;
        self.settings.migrate_links_on_rename = migrate;
        self.save_settings();
    }

    pub fn save_settings(&mut self) {
        if let Err(err) = self.settings.save(&self.settings_path) {
            tracing::warn!(%err, "settings not saved");
            self.notifications.notify(NoticeLevel::Warning, err.to_string());
        }
    }

    pub fn open_settings_folder(&self) {
        if let Some(dir) = self.settings_path.parent() {
            if let Err(err) = std::fs::create_dir_all(dir).and_then(|_| open::that(dir)) {
                tracing::warn!(dir = %dir.display(), %err, "cannot open settings folder");
            }
        }
    }

    pub fn open_workbook_folder(&self) {
        if let DataSource::Workbook(dir) = &self.source {
            if let Err(err) = open::that(dir) {
                tracing::warn!(dir = %dir.display(), %err, "cannot open workbook folder");
            }
        }
    }

    // ── Grid actions ────────────────────────────────────────────────────────

    fn open_editor(&mut self, key: &PhaseKey) {
        let Some(phase) = self.session.snapshot().phase(key) else {
            self.notifications
                .notify(NoticeLevel::Warning, format!("Phase '{}' no longer exists", key.phase));
            return;
        };
        let links = self.session.snapshot().links_of(&key.phase).cloned().collect::<Vec<_>>();
        match crate::roadmap::PhaseDraft::from_phase(phase, links) {
            Some(draft) => self.phase_dialog = Some(PhaseDialog::edit(key.clone(), draft, today())),
            None => self
                .notifications
                .notify(NoticeLevel::Warning, format!("Phase '{}' has no sprint or week", key.phase)),
        }
    }

    fn open_add_dialog(&mut self, cell: &DropCell) {
        match self.session.draft_at(cell) {
            Some(draft) => self.phase_dialog = Some(PhaseDialog::add(draft, today())),
            None => tracing::debug!(bucket = cell.bucket, "no bucket under add request"),
        }
    }

    pub fn handle_grid_action(&mut self, action: GridAction) {
        tracing::debug!(?action, "grid action");
        match action {
            GridAction::Rename { key, name } => {
                let result = self.session.rename_phase(&key, &name);
                self.session.report(result, &mut self.notifications, |renamed| {
                    renamed.then(|| format!("'{}' renamed to '{}'", key.phase, name.trim()))
                });
            }
            GridAction::Edit(key) => self.open_editor(&key),
            GridAction::AddAt(cell) => self.open_add_dialog(&cell),
            GridAction::Delete(key) => {
                let result = self.session.delete_with_confirmation(&key, &mut self.notifications);
                self.session.report(result, &mut self.notifications, |deleted| {
                    deleted.then(|| format!("'{}' deleted", key.phase))
                });
            }
            GridAction::Commit(outcome) => {
                self.session.apply_gesture(&outcome, &mut self.notifications);
            }
            GridAction::OpenChantier(name) => self.open_chantier = Some(name),
        }
    }

    fn save_dialog(&mut self, dialog: &PhaseDialog) -> bool {
        let draft = dialog.draft();
        match &dialog.mode {
            DialogMode::Add => {
                let result = self.session.add_phase(&draft);
                self.session.report(result, &mut self.notifications, |key| {
                    Some(format!("'{}' added to {}", key.phase, key.chantier))
                })
            }
            DialogMode::Edit(key) => {
                let result = self.session.update_phase(key, &draft);
                self.session.report(result, &mut self.notifications, |key| {
                    Some(format!("'{}' saved", key.phase))
                })
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────────

    /// Central roadmap area; the chrome around it lives in `update`.
    pub fn render(&mut self, ui: &mut egui::Ui) {
        match self.session.view(today()) {
            GridModel::Empty(empty) => ui::roadmap_grid::show_empty_state(ui, empty),
            GridModel::Grid(grid) => {
                let actions = ui::roadmap_grid::show_roadmap_grid(ui, &grid, &mut self.grid);
                for action in actions {
                    self.handle_grid_action(action);
                }
            }
        }
    }

    fn show_windows(&mut self, ctx: &egui::Context) {
        if let Some(mut dialog) = self.phase_dialog.take() {
            let sprints = self.session.snapshot().sprints.clone();
            match ui::phase_dialog::show_phase_dialog(ctx, &mut dialog, &sprints) {
                DialogOutcome::Pending => self.phase_dialog = Some(dialog),
                DialogOutcome::Cancel => {}
                DialogOutcome::Save => {
                    if !self.save_dialog(&dialog) {
                        self.phase_dialog = Some(dialog);
                    }
                }
            }
        }

        if let Some(name) = self.open_chantier.clone() {
            let still_open = match self.session.snapshot().chantier(&name) {
                Some(chantier) => {
                    let mini = project_mini(
                        self.session.snapshot(),
                        &name,
                        today(),
                        self.settings.mini_fallback_weeks,
                    );
                    ui::chantier_dialog::show_chantier_window(ctx, chantier, &mini, self.settings.phase_margin_px)
                }
                None => false,
            };
            if !still_open {
                self.open_chantier = None;
            }
        }
    }
}

/// Demo workbook seeded around `today`.
pub fn sample_store(today: NaiveDate) -> MemoryStore {
    let first_monday = monday_of(today) - chrono::Duration::weeks(4);
    let sprint_start = |i: i64| first_monday + chrono::Duration::weeks(2 * i);
    let sprint_name = |i: i64| format!("Sprint {:02}", i + 1);
    let sprints = (0..12).map(|i| {
        fields([
            (columns::SPRINT, sprint_name(i)),
            (columns::START, sprint_start(i).to_string()),
            (columns::END, (sprint_start(i) + chrono::Duration::days(13)).to_string()),
        ])
    });

    let chantier = |name: &str, responsible: &str, perimeter: &str, target: Option<NaiveDate>| {
        fields([
            (columns::CHANTIER, name.to_string()),
            (columns::RESPONSIBLE, responsible.to_string()),
            (columns::PERIMETER, perimeter.to_string()),
            (columns::TARGET_DATE, target.map(|d| d.to_string()).unwrap_or_default()),
        ])
    };
    let phase = |chantier: &str, name: &str, kind: &str, anchor: BucketAnchor| {
        let mut row = fields([
            (columns::CHANTIER, chantier.to_string()),
            (columns::PHASE, name.to_string()),
            (columns::TYPE, kind.to_string()),
        ]);
        row.extend(anchor.to_fields());
        row
    };
    let sprint = |s: i64, e: i64| BucketAnchor::new(TimeMode::Sprint, sprint_name(s), sprint_name(e));
    let week = |s: i64, e: i64| {
        BucketAnchor::new(
            TimeMode::Week,
            week_code_of(first_monday + chrono::Duration::weeks(s)),
            week_code_of(first_monday + chrono::Duration::weeks(e)),
        )
    };
    let link = |phase: &str, name: &str, url: &str| {
        fields([
            (columns::PHASE, phase.to_string()),
            (columns::LINK_NAME, name.to_string()),
            (columns::LINK_URL, url.to_string()),
        ])
    };

    MemoryStore::new()
        .with_rows(collections::SPRINTS, sprints)
        .with_rows(
            collections::CHANTIERS,
            [
                chantier("Portail client", "Camille", "Front", Some(sprint_start(6))),
                chantier("Migration ERP", "Sam", "Back-office", Some(sprint_start(9))),
                chantier("Refonte facturation", "Camille", "Back-office", None),
                chantier("Application mobile", "Noa", "Front", Some(sprint_start(10))),
            ],
        )
        .with_rows(
            collections::PHASES,
            [
                phase("Portail client", "Expression de besoin", "EB", sprint(0, 0)),
                phase("Portail client", "Cadrage", "Cadrage", sprint(1, 2)),
                phase("Portail client", "Développement", "Dev", sprint(2, 4)),
                phase("Portail client", "Recette", "Recette", sprint(5, 5)),
                phase("Portail client", "Mise en production", "MEP", sprint(6, 6)),
                phase("Migration ERP", "Cadrage ERP", "Cadrage", sprint(1, 3)),
                phase("Migration ERP", "Reprise données", "Dev", sprint(3, 6)),
                phase("Migration ERP", "Interfaces", "Dev", sprint(4, 7)),
                phase("Migration ERP", "Recette ERP", "Recette", sprint(8, 8)),
                phase("Refonte facturation", "Étude", "EB", week(2, 4)),
                phase("Refonte facturation", "Maquettes", "Cadrage", week(5, 7)),
                phase("Application mobile", "Prototype", "Dev", sprint(3, 5)),
                phase("Application mobile", "Beta", "Recette", sprint(6, 7)),
            ],
        )
        .with_rows(
            collections::PHASE_LINKS,
            [
                link("Cadrage", "Note de cadrage", "https://example.org/portail/cadrage"),
                link("Développement", "Tableau Kanban", "https://example.org/portail/board"),
                link("Reprise données", "Mapping", "https://example.org/erp/mapping"),
            ],
        )
}

impl eframe::App for RoadmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::F5)) {
            self.refresh();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });
        egui::TopBottomPanel::top("filter_bar").show(ctx, |ui| {
            ui::toolbar::show_filter_bar(self, ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(ui::theme::BG_DARK))
            .show(ctx, |ui| self.render(ui));

        self.show_windows(ctx);
        self.notifications.show(ctx);
    }
}
