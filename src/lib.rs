//! Sprint/week roadmap of chantiers and their phases.
//!
//! [`roadmap`] holds the engine (time axis, lanes, layout, gestures and the
//! editing session), [`store`] the spreadsheet-backed persistence and [`ui`]
//! the egui front end.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod roadmap;
pub mod store;
pub mod ui;
