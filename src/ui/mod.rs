pub mod chantier_dialog;
pub mod mini_roadmap;
pub mod notifications;
pub mod phase_dialog;
pub mod roadmap_grid;
pub mod theme;
pub mod toolbar;
