use egui::{Event, Modifiers, PointerButton, Pos2, Rect, Vec2, pos2, vec2};

use crate::drag::{DragOptions, DragSession, DropZone, HitTest, ManualClock};
use crate::model::{ExpandedIds, FolderId, FolderNode, MoveRequest};

use super::{FolderTreeUi, TreeEvent, TreeViewOptions, toggle, visible_rows};

fn node(id: i64, parent: Option<i64>, depth: u32, order_index: i64) -> FolderNode {
    let mut node = FolderNode::new(FolderId(id), format!("folder {id}"), parent.map(FolderId));
    node.depth = depth;
    node.order_index = order_index;
    node
}

/// `A(1) { B(2) }`, `C(3) { D(4) }`.
fn sample_tree() -> Vec<FolderNode> {
    let mut a = node(1, None, 0, 0);
    a.children.push(node(2, Some(1), 1, 0));
    let mut c = node(3, None, 0, 1);
    c.children.push(node(4, Some(3), 1, 0));
    vec![a, c]
}

fn ids(rows: &[super::VisibleRow<'_>]) -> Vec<i64> {
    rows.iter().map(|r| r.node.id.0).collect()
}

#[test]
fn collapsed_folders_hide_their_children() {
    let tree = sample_tree();
    let expanded = ExpandedIds::default();
    assert_eq!(ids(&visible_rows(&tree, &expanded, None)), vec![1, 3]);

    let mut expanded = ExpandedIds::default();
    expanded.insert(FolderId(1));
    let rows = visible_rows(&tree, &expanded, None);
    assert_eq!(ids(&rows), vec![1, 2, 3]);
    assert_eq!(rows[1].depth(), 1);
    assert!(rows[0].expanded);
    assert!(!rows[2].expanded);
}

#[test]
fn toggling_one_folder_leaves_siblings_alone() {
    let mut expanded = ExpandedIds::default();
    expanded.insert(FolderId(3));

    assert!(toggle(&mut expanded, FolderId(1)));
    assert!(expanded.contains(&FolderId(3)));
    assert!(!toggle(&mut expanded, FolderId(1)));
    assert!(expanded.contains(&FolderId(3)));
    assert_eq!(expanded.len(), 1);
}

#[test]
fn caret_is_interactive_only_with_children_and_indicator_only_on_target() {
    let tree = sample_tree();
    let mut expanded = ExpandedIds::default();
    expanded.insert(FolderId(1));

    let rows = visible_rows(&tree, &expanded, Some((FolderId(2), DropZone::After)));
    assert!(rows[0].caret_interactive());
    assert!(!rows[1].caret_interactive());
    assert_eq!(rows[1].indicator, Some(DropZone::After));
    assert!(rows.iter().filter(|r| r.indicator.is_some()).count() == 1);
}

fn run_pass(
    ctx: &egui::Context,
    tree_ui: &mut FolderTreeUi<ManualClock>,
    roots: &[FolderNode],
    expanded: &mut ExpandedIds,
    events: Vec<Event>,
) -> Vec<TreeEvent> {
    let raw = egui::RawInput {
        screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))),
        events,
        ..Default::default()
    };
    ctx.begin_pass(raw);
    let mut out = Vec::new();
    egui::CentralPanel::default().show(ctx, |ui| {
        out = tree_ui.show(ui, roots, expanded);
    });
    let _ = ctx.end_pass();
    out
}

fn button(pos: Pos2, pressed: bool) -> Event {
    Event::PointerButton {
        pos,
        button: PointerButton::Primary,
        pressed,
        modifiers: Modifiers::default(),
    }
}

fn test_ui(clock: &ManualClock) -> FolderTreeUi<ManualClock> {
    FolderTreeUi::with_session(
        "view_test",
        TreeViewOptions::default(),
        DragSession::new(DragOptions::default(), clock.clone()),
    )
}

#[test]
fn painted_rows_are_recorded_for_hit_testing() {
    let ctx = egui::Context::default();
    let clock = ManualClock::new();
    let mut tree_ui = test_ui(&clock);
    let tree = sample_tree();
    let mut expanded = ExpandedIds::default();
    expanded.insert(FolderId(1));

    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![]);

    let hits = tree_ui.row_hits();
    assert_eq!(hits.len(), 3);
    let b = hits.rect_of(FolderId(2)).expect("B is visible");
    assert!(hits.rect_of(FolderId(4)).is_none(), "D is inside a collapsed folder");
    assert_eq!(hits.hit(b.center()).map(|h| h.target.id), Some(FolderId(2)));
    assert!(hits.hit(pos2(b.center().x, 590.0)).is_none());
}

#[test]
fn dragging_a_child_after_a_root_emits_a_move() {
    let ctx = egui::Context::default();
    let clock = ManualClock::new();
    let mut tree_ui = test_ui(&clock);
    let tree = sample_tree();
    let mut expanded = ExpandedIds::default();
    expanded.insert(FolderId(1));

    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![]);
    let b = tree_ui.row_hits().rect_of(FolderId(2)).expect("B is visible");
    let c = tree_ui.row_hits().rect_of(FolderId(3)).expect("C is visible");

    let press = b.center();
    run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![Event::PointerMoved(press), button(press, true)],
    );
    assert!(tree_ui.session().listeners_attached());

    let over_c_bottom = pos2(c.center().x, c.bottom() - 2.0);
    run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![Event::PointerMoved(over_c_bottom)],
    );
    assert!(tree_ui.session().is_dragging());
    assert_eq!(
        tree_ui.session().drop_indicator(),
        Some((FolderId(3), DropZone::After))
    );

    let events = run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![button(over_c_bottom, false)],
    );
    assert!(
        events.contains(&TreeEvent::Moved(MoveRequest::new(FolderId(2), None, 2))),
        "unexpected events: {events:?}"
    );
    assert!(!tree_ui.session().listeners_attached());
    assert!(tree_ui.selected().is_none());
}

#[test]
fn escape_cancels_an_active_drag() {
    let ctx = egui::Context::default();
    let clock = ManualClock::new();
    let mut tree_ui = test_ui(&clock);
    let tree = sample_tree();
    let mut expanded = ExpandedIds::default();

    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![]);
    let a = tree_ui.row_hits().rect_of(FolderId(1)).expect("A is visible");

    run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![Event::PointerMoved(a.center()), button(a.center(), true)],
    );
    clock.advance_ms(250);
    run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![Event::PointerMoved(a.center() + vec2(0.0, 60.0))],
    );
    assert!(tree_ui.session().is_dragging());

    run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::default(),
        }],
    );
    assert!(!tree_ui.session().listeners_attached());
    assert!(!tree_ui.session().is_dragging());
}

#[test]
fn click_after_a_hold_drag_selects_instead_of_renaming() {
    let ctx = egui::Context::default();
    let clock = ManualClock::new();
    let mut tree_ui = test_ui(&clock);
    let tree = sample_tree();
    let mut expanded = ExpandedIds::default();

    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![]);
    let a = tree_ui.row_hits().rect_of(FolderId(1)).expect("A is visible");
    let on_a = a.center();

    run_pass(
        &ctx,
        &mut tree_ui,
        &tree,
        &mut expanded,
        vec![Event::PointerMoved(on_a), button(on_a, true)],
    );
    clock.advance_ms(250);
    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![]);
    assert!(tree_ui.session().is_dragging(), "held long enough to activate");

    let released = run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![button(on_a, false)]);
    assert!(released.is_empty(), "the release click is swallowed: {released:?}");
    assert!(tree_ui.selected().is_none());

    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![button(on_a, true)]);
    let clicked = run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![button(on_a, false)]);

    assert_eq!(clicked, vec![TreeEvent::Selected(FolderId(1))]);
    assert_eq!(tree_ui.selected(), Some(FolderId(1)));
    assert!(!tree_ui.is_renaming());
}

#[test]
fn plain_double_click_still_starts_a_rename() {
    let ctx = egui::Context::default();
    let clock = ManualClock::new();
    let mut tree_ui = test_ui(&clock);
    let tree = sample_tree();
    let mut expanded = ExpandedIds::default();

    run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![]);
    let on_c = tree_ui.row_hits().rect_of(FolderId(3)).expect("C is visible").center();

    for _ in 0..2 {
        run_pass(
            &ctx,
            &mut tree_ui,
            &tree,
            &mut expanded,
            vec![Event::PointerMoved(on_c), button(on_c, true)],
        );
        run_pass(&ctx, &mut tree_ui, &tree, &mut expanded, vec![button(on_c, false)]);
    }

    assert!(tree_ui.is_renaming());
}
