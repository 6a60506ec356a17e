//! Pointer gestures fed through the recognizer and committed against an
//! in-memory workbook.

use std::time::Duration;

use chantier_roadmap::model::{columns, BucketAnchor, PhaseKey, TimeMode};
use chantier_roadmap::roadmap::gesture::{
    BlockGrip, DropCell, GestureMachine, GestureOutcome, GridGeometry, HitPart, PointerButton,
    PointerEvent, PressTarget,
};
use chantier_roadmap::roadmap::{
    build_grid, DateRange, GestureConfig, NoticeLevel, RecordingFeedback, RoadmapFilter,
    RoadmapSession,
};
use chantier_roadmap::store::{collections, fields, Fields, MemoryStore, StoreCall};
use chrono::NaiveDate;
use egui::pos2;
use pretty_assertions::assert_eq;

const COLUMN: f32 = 100.0;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn phase(chantier: &str, name: &str, start: &str, end: &str) -> Fields {
    fields([
        (columns::CHANTIER, chantier.to_string()),
        (columns::PHASE, name.to_string()),
        (columns::TYPE, "Dev".to_string()),
        (columns::SPRINT_START, start.to_string()),
        (columns::SPRINT_END, end.to_string()),
    ])
}

/// Five visible sprints (`Sprint1`..`Sprint5`); `Sprint6` lies past the window.
fn session(phases: Vec<Fields>) -> RoadmapSession<MemoryStore> {
    let sprints = (0..6).map(|i| {
        let start = date(2025, 1, 6) + chrono::Duration::weeks(2 * i);
        fields([
            (columns::SPRINT, format!("Sprint{}", i + 1)),
            (columns::START, start.to_string()),
            (columns::END, (start + chrono::Duration::weeks(2)).to_string()),
        ])
    });
    let store = MemoryStore::new()
        .with_rows(
            collections::CHANTIERS,
            ["Alpha", "Beta"].map(|c| fields([(columns::CHANTIER, c.to_string())])),
        )
        .with_rows(collections::SPRINTS, sprints)
        .with_rows(collections::PHASES, phases)
        .with_rows(collections::PHASE_LINKS, Vec::<Fields>::new());
    let mut filter = RoadmapFilter::around(date(2025, 1, 10), TimeMode::Sprint, 12);
    filter.range = DateRange::new(date(2025, 1, 6), date(2025, 3, 16));
    let mut session = RoadmapSession::new(store, filter);
    session.refresh().unwrap();
    session.store_mut().clear_journal();
    session
}

fn machine(last_index: usize) -> GestureMachine {
    let mut machine = GestureMachine::new(GestureConfig::default());
    machine.set_geometry(GridGeometry {
        column_width: COLUMN,
        last_index,
    });
    machine
}

fn at(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

fn press(grip: &BlockGrip, part: HitPart, x: f32) -> PointerEvent {
    PointerEvent::Press {
        target: PressTarget::Phase {
            grip: grip.clone(),
            part,
        },
        button: PointerButton::Primary,
        pos: pos2(x, 10.0),
        at: at(0),
    }
}

fn anchor(session: &RoadmapSession<MemoryStore>, chantier: &str, name: &str) -> BucketAnchor {
    session
        .snapshot()
        .phase(&PhaseKey::new(chantier, name))
        .and_then(|p| p.anchor.clone())
        .unwrap()
}

#[test]
fn lanes_stack_overlapping_sprint_phases() {
    let s = session(vec![
        phase("Alpha", "P1", "Sprint1", "Sprint2"),
        phase("Alpha", "P2", "Sprint1", "Sprint3"),
        phase("Alpha", "P3", "Sprint3", "Sprint3"),
    ]);
    let model = build_grid(s.snapshot(), s.filter(), date(2025, 1, 10));
    let row = model.grid().unwrap().row("Alpha").unwrap();
    assert_eq!(row.total_lanes, 2);
    let lane = |name: &str| {
        row.blocks()
            .find(|b| b.name == name)
            .map(|b| b.layout.lane)
            .unwrap()
    };
    assert_eq!((lane("P1"), lane("P2"), lane("P3")), (0, 1, 0));
}

#[test]
fn unknown_end_sprint_clamps_to_last_column() {
    let s = session(vec![phase("Alpha", "Orphan", "Sprint2", "SprintXX")]);
    let model = build_grid(s.snapshot(), s.filter(), date(2025, 1, 10));
    let grid = model.grid().unwrap();
    let block = grid.block(&PhaseKey::new("Alpha", "Orphan")).unwrap();
    assert_eq!(block.layout.start, 1);
    assert_eq!(block.layout.end, grid.last_index());
    assert!(block.layout.clamped);
}

#[test]
fn drag_across_rows_writes_nothing() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint2", "Sprint3")]);
    let before = s.snapshot().clone();
    let grip = s.grip(&PhaseKey::new("Alpha", "Dev")).unwrap();
    let mut m = machine(4);

    m.handle(press(&grip, HitPart::Body, 150.0));
    m.handle(PointerEvent::Move {
        pos: pos2(160.0, 60.0),
        over: Some(DropCell::new("Beta", 1)),
        at: at(40),
    });
    let outcome = m.handle(PointerEvent::Release {
        pos: pos2(160.0, 60.0),
        over: Some(DropCell::new("Beta", 1)),
        at: at(80),
    });
    assert!(matches!(outcome, GestureOutcome::Drop { .. }));

    let mut feedback = RecordingFeedback::default();
    assert!(s.apply_gesture(&outcome, &mut feedback));
    assert!(s.store().journal().iter().all(|call| !call.is_write()));
    assert_eq!(s.snapshot(), &before);
    assert_eq!(feedback.count(NoticeLevel::Warning), 1);
    assert!(m.is_idle());
}

#[test]
fn drag_within_row_keeps_duration() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint1", "Sprint2")]);
    let grip = s.grip(&PhaseKey::new("Alpha", "Dev")).unwrap();
    let mut m = machine(4);

    m.handle(press(&grip, HitPart::Body, 50.0));
    m.handle(PointerEvent::Move {
        pos: pos2(260.0, 12.0),
        over: Some(DropCell::new("Alpha", 2)),
        at: at(60),
    });
    let outcome = m.handle(PointerEvent::Release {
        pos: pos2(260.0, 12.0),
        over: None,
        at: at(90),
    });

    let mut feedback = RecordingFeedback::default();
    s.apply_gesture(&outcome, &mut feedback);
    assert_eq!(
        anchor(&s, "Alpha", "Dev"),
        BucketAnchor::new(TimeMode::Sprint, "Sprint3", "Sprint4")
    );
    assert_eq!(feedback.count(NoticeLevel::Success), 1);

    let journal = s.store().journal();
    let update = journal
        .iter()
        .position(|c| matches!(c, StoreCall::Update(name, ..) if name == collections::PHASES))
        .unwrap();
    assert!(matches!(&journal[update - 1], StoreCall::Read(name) if name == collections::PHASES));
    assert!(matches!(&journal[update + 1], StoreCall::Invalidate(name) if name == collections::PHASES));
}

#[test]
fn right_handle_dragged_past_start_leaves_one_bucket() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint2", "Sprint4")]);
    let grip = s.grip(&PhaseKey::new("Alpha", "Dev")).unwrap();
    assert_eq!((grip.start, grip.end), (1, 3));
    let mut m = machine(4);

    m.handle(press(&grip, HitPart::RightHandle, 400.0));
    let preview = m.handle(PointerEvent::Move {
        pos: pos2(-200.0, 10.0),
        over: None,
        at: at(30),
    });
    assert!(matches!(preview, GestureOutcome::ResizePreview { start: 1, end: 1, .. }));
    let outcome = m.handle(PointerEvent::Release {
        pos: pos2(-200.0, 10.0),
        over: None,
        at: at(60),
    });

    let mut feedback = RecordingFeedback::default();
    s.apply_gesture(&outcome, &mut feedback);
    assert_eq!(
        anchor(&s, "Alpha", "Dev"),
        BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint2")
    );
}

#[test]
fn escape_during_drag_commits_nothing() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint1", "Sprint2")]);
    let grip = s.grip(&PhaseKey::new("Alpha", "Dev")).unwrap();
    let mut m = machine(4);

    m.handle(press(&grip, HitPart::Body, 50.0));
    m.handle(PointerEvent::Move {
        pos: pos2(250.0, 10.0),
        over: Some(DropCell::new("Alpha", 2)),
        at: at(20),
    });
    let outcome = m.handle(PointerEvent::Cancel);
    assert_eq!(outcome, GestureOutcome::Cancelled);

    let mut feedback = RecordingFeedback::default();
    assert!(!s.apply_gesture(&outcome, &mut feedback));
    assert_eq!(s.store().write_count(), 0);
    assert!(feedback.notices.is_empty());
}

#[test]
fn click_then_wait_begins_rename() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint1", "Sprint2")]);
    let key = PhaseKey::new("Alpha", "Dev");
    let grip = s.grip(&key).unwrap();
    let mut m = machine(4);

    m.handle(press(&grip, HitPart::Body, 50.0));
    m.handle(PointerEvent::Release {
        pos: pos2(51.0, 10.0),
        over: Some(DropCell::new("Alpha", 0)),
        at: at(80),
    });
    assert_eq!(m.handle(PointerEvent::Tick { at: at(200) }), GestureOutcome::None);
    let outcome = m.handle(PointerEvent::Tick { at: at(340) });
    assert_eq!(outcome, GestureOutcome::BeginRename(key.clone()));

    assert!(s.rename_phase(&key, "Build").unwrap());
    assert!(s.snapshot().phase(&PhaseKey::new("Alpha", "Build")).is_some());
}

#[test]
fn left_handle_resize_keeps_end_past_the_window() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint3", "Sprint6")]);
    let key = PhaseKey::new("Alpha", "Dev");
    let grip = s.grip(&key).unwrap();
    assert_eq!((grip.start, grip.end), (2, 4));
    let mut m = machine(4);

    m.handle(press(&grip, HitPart::LeftHandle, 200.0));
    m.handle(PointerEvent::Move {
        pos: pos2(100.0, 10.0),
        over: None,
        at: at(30),
    });
    let outcome = m.handle(PointerEvent::Release {
        pos: pos2(100.0, 10.0),
        over: None,
        at: at(60),
    });
    assert!(matches!(outcome, GestureOutcome::Resize { start: 1, end: 4, .. }));

    let mut feedback = RecordingFeedback::default();
    s.apply_gesture(&outcome, &mut feedback);
    assert_eq!(
        anchor(&s, "Alpha", "Dev"),
        BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint6")
    );
    assert_eq!(feedback.count(NoticeLevel::Success), 1);
}

#[test]
fn dragging_a_phase_that_runs_past_the_window_keeps_its_length() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint3", "Sprint6")]);
    let key = PhaseKey::new("Alpha", "Dev");

    assert!(s.move_phase(&key, &DropCell::new("Alpha", 1)).unwrap());
    assert_eq!(
        anchor(&s, "Alpha", "Dev"),
        BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint5")
    );
}

#[test]
fn week_view_edits_keep_the_sprint_anchor() {
    let mut s = session(vec![phase("Alpha", "Dev", "Sprint2", "Sprint3")]);
    s.filter_mut().mode = TimeMode::Week;
    let key = PhaseKey::new("Alpha", "Dev");
    let grip = s.grip(&key).unwrap();
    assert_eq!((grip.start, grip.end), (2, 5));

    assert!(s.resize_phase(&key, grip.start, grip.end + 1).unwrap());
    assert_eq!(
        anchor(&s, "Alpha", "Dev"),
        BucketAnchor::new(TimeMode::Sprint, "Sprint2", "Sprint4")
    );
    let row = &s.store().rows(collections::PHASES)[0];
    assert_eq!(row[columns::SPRINT_END].as_str(), Some("Sprint4"));
    assert_eq!(
        row.get(columns::WEEK_START).and_then(|v| v.as_str()).unwrap_or_default(),
        ""
    );

    // 2025S06 falls in Sprint3: the phase moves by one sprint.
    assert!(s.move_phase(&key, &DropCell::new("Alpha", 4)).unwrap());
    assert_eq!(
        anchor(&s, "Alpha", "Dev"),
        BucketAnchor::new(TimeMode::Sprint, "Sprint3", "Sprint5")
    );
}
