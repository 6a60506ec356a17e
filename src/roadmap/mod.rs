//! The roadmap engine, independent of any drawing code.

pub mod axis;
pub mod controller;
pub mod feedback;
pub mod filter;
pub mod gesture;
pub mod grid;
pub mod lanes;
pub mod layout;
pub mod mini;

pub use axis::{Bucket, DateRange, TimeAxis};
pub use controller::{PhaseDraft, RoadmapSession};
pub use feedback::{Feedback, NoticeLevel, RecordingFeedback};
pub use filter::RoadmapFilter;
pub use gesture::{
    BlockGrip, DropCell, GestureConfig, GestureMachine, GestureOutcome, GridGeometry, HitPart,
    PointerButton, PointerEvent, PressTarget, ResizeEdge,
};
pub use grid::{build_grid, EmptyState, GridModel, RoadmapGrid};
pub use layout::{ColumnMetrics, LogicalLayout, PixelLayout};
pub use mini::{project_mini, MiniRoadmap};
