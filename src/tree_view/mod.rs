//! Immediate-mode folder tree widget.

use egui::{
    Align2, Color32, FontId, Id, Key, PointerButton, Pos2, Rect, Sense, Shape, Stroke, Ui, pos2,
    vec2,
};

use crate::drag::{Clock, DragEvent, DragSession, DropZone, SystemClock};
use crate::model::{ExpandedIds, FolderId, FolderNode, MoveRequest};

mod rename;
mod rows;

#[cfg(test)]
mod view_tests;

pub use rows::{RowHitMap, VisibleRow, visible_rows};

use rename::RenameState;

/// Layout options for [`FolderTreeUi`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeViewOptions {
    pub row_height: f32,

    /// Horizontal indent per depth level, in points.
    pub indent_width: f32,

    pub caret_size: f32,
    pub insert_line_thickness: f32,
    pub show_test_case_counts: bool,
}

impl Default for TreeViewOptions {
    fn default() -> Self {
        Self {
            row_height: 22.0,
            indent_width: 16.0,
            caret_size: 8.0,
            insert_line_thickness: 2.0,
            show_test_case_counts: true,
        }
    }
}

/// What happened in the tree during one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    Selected(FolderId),
    Toggled { folder: FolderId, expanded: bool },

    /// A drag hovered a collapsed folder long enough to open it.
    AutoExpanded(FolderId),

    Renamed { folder: FolderId, name: String },
    Moved(MoveRequest),
}

/// Folder tree widget with pointer drag-and-drop.
///
/// The expanded set is passed in on every [`Self::show`] call; the widget owns only the drag
/// session, the selection, the inline rename editor and last frame's row rectangles.
pub struct FolderTreeUi<C: Clock = SystemClock> {
    id: Id,
    options: TreeViewOptions,
    session: DragSession<C>,
    rows: RowHitMap,
    selected: Option<FolderId>,
    rename: Option<RenameState>,

    /// Set when a click was swallowed after a drag. egui pairs the next click with that one
    /// into a double-click, which must not open the rename editor.
    click_swallowed: bool,
}

impl FolderTreeUi<SystemClock> {
    pub fn new(id_salt: impl std::hash::Hash) -> Self {
        Self::with_session(id_salt, TreeViewOptions::default(), DragSession::default())
    }
}

impl<C: Clock> FolderTreeUi<C> {
    pub fn with_session(
        id_salt: impl std::hash::Hash,
        options: TreeViewOptions,
        session: DragSession<C>,
    ) -> Self {
        Self {
            id: Id::new(("egui_folder_tree", id_salt)),
            options,
            session,
            rows: RowHitMap::default(),
            selected: None,
            rename: None,
            click_swallowed: false,
        }
    }

    pub fn options(&self) -> &TreeViewOptions {
        &self.options
    }

    pub fn session(&self) -> &DragSession<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DragSession<C> {
        &mut self.session
    }

    pub fn row_hits(&self) -> &RowHitMap {
        &self.rows
    }

    pub fn selected(&self) -> Option<FolderId> {
        self.selected
    }

    pub fn set_selected(&mut self, folder: Option<FolderId>) {
        self.selected = folder;
    }

    /// Open the inline name editor on `folder`, as a double-click would.
    pub fn begin_rename(&mut self, folder: FolderId, current_name: &str) {
        self.rename = Some(RenameState::new(folder, current_name));
    }

    pub fn is_renaming(&self) -> bool {
        self.rename.is_some()
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        roots: &[FolderNode],
        expanded: &mut ExpandedIds,
    ) -> Vec<TreeEvent> {
        let mut events = Vec::new();

        self.process_global_pointer(ui, expanded, &mut events);
        if let Some(event) = self.session.tick() {
            apply_drag_event(event, expanded, &mut events);
        }

        let rows = visible_rows(roots, expanded, self.session.drop_indicator());
        self.rows.clear();
        ui.scope(|ui| {
            // Rows must tile without gaps so every pointer position over the tree hits a row.
            ui.spacing_mut().item_spacing.y = 0.0;
            for row in &rows {
                self.row_ui(ui, row, expanded, &mut events);
            }
        });

        self.ghost_ui(ui);

        if self.session.listeners_attached() {
            ui.ctx().request_repaint();
        } else if let Some(remaining) = self.session.next_deadline() {
            ui.ctx().request_repaint_after(remaining);
        }

        events
    }

    /// Pointer input outside any particular row: only read while the session has its listeners
    /// attached.
    fn process_global_pointer(
        &mut self,
        ui: &Ui,
        expanded: &mut ExpandedIds,
        events: &mut Vec<TreeEvent>,
    ) {
        if !self.session.listeners_attached() {
            return;
        }

        // A press and release delivered in one frame only leave `primary_down() == false` behind.
        let (escape, latest, released) = ui.input(|i| {
            (
                i.key_pressed(Key::Escape),
                i.pointer.latest_pos(),
                i.pointer.button_released(PointerButton::Primary) || !i.pointer.primary_down(),
            )
        });

        if escape {
            self.session.cancel();
            return;
        }

        let Some(pointer) = latest else {
            return;
        };

        if let Some(event) = self.session.pointer_move(pointer, &self.rows) {
            apply_drag_event(event, expanded, events);
        }
        if released {
            if let Some(event) = self.session.pointer_up(pointer, &self.rows) {
                apply_drag_event(event, expanded, events);
            }
        }
    }

    fn row_ui(
        &mut self,
        ui: &mut Ui,
        row: &VisibleRow<'_>,
        expanded: &mut ExpandedIds,
        events: &mut Vec<TreeEvent>,
    ) {
        let node = row.node;
        let (rect, response) = ui.allocate_exact_size(
            vec2(ui.available_width(), self.options.row_height),
            Sense::click_and_drag(),
        );
        self.rows.push(row, rect);

        let indent = self.options.indent_width * row.depth() as f32;
        let caret_rect = Rect::from_center_size(
            pos2(
                rect.left() + indent + self.options.indent_width * 0.5,
                rect.center().y,
            ),
            vec2(self.options.indent_width, self.options.row_height),
        );
        let name_rect = Rect::from_min_max(
            pos2(caret_rect.right() + 4.0, rect.top()),
            rect.right_bottom(),
        );

        let caret_response = row.caret_interactive().then(|| {
            ui.interact(caret_rect, self.id.with(("caret", node.id)), Sense::click())
        });

        if response.hovered() && ui.input(|i| i.pointer.button_pressed(PointerButton::Primary)) {
            if let Some(pointer) = ui.input(|i| i.pointer.interact_pos()) {
                self.session
                    .pointer_down(node.id, node.name.clone(), pointer, PointerButton::Primary);
            }
        }

        let clicked = caret_response.as_ref().is_some_and(|r| r.clicked()) || response.clicked();
        let paired_with_swallowed = clicked && std::mem::take(&mut self.click_swallowed);

        if caret_response.as_ref().is_some_and(|r| r.clicked()) {
            if self.filter_click(node.id) {
                let now_expanded = toggle(expanded, node.id);
                events.push(TreeEvent::Toggled {
                    folder: node.id,
                    expanded: now_expanded,
                });
            }
        } else if response.double_clicked()
            && !paired_with_swallowed
            && !self.session.state().has_dragged
        {
            self.begin_rename(node.id, &node.name);
        } else if response.clicked() && self.filter_click(node.id) {
            self.selected = Some(node.id);
            events.push(TreeEvent::Selected(node.id));
        }

        self.paint_row(ui, row, rect, caret_rect, name_rect);

        if self.rename.as_ref().is_some_and(|r| r.folder == node.id) {
            self.rename_ui(ui, name_rect, events);
        }
    }

    fn paint_row(&self, ui: &Ui, row: &VisibleRow<'_>, rect: Rect, caret_rect: Rect, name_rect: Rect) {
        let visuals = ui.visuals();
        let painter = ui.painter();
        let node = row.node;

        let dragged = self.session.is_dragging() && self.session.state().dragged_id == Some(node.id);
        if self.selected == Some(node.id) {
            painter.rect_filled(rect, 2.0, visuals.selection.bg_fill);
        } else if row.indicator == Some(DropZone::Into) {
            painter.rect_filled(rect, 2.0, visuals.selection.bg_fill.gamma_multiply(0.5));
        }

        let line = Stroke::new(
            self.options.insert_line_thickness,
            visuals.selection.stroke.color,
        );
        let line_x = (rect.left() + self.options.indent_width * row.depth() as f32)..=rect.right();
        match row.indicator {
            Some(DropZone::Before) => {
                painter.hline(line_x, rect.top(), line);
            }
            Some(DropZone::After) => {
                painter.hline(line_x, rect.bottom(), line);
            }
            Some(DropZone::Into) | None => {}
        }

        let text_color = if dragged {
            visuals.weak_text_color()
        } else {
            visuals.text_color()
        };

        if row.caret_interactive() {
            painter.add(caret_shape(
                caret_rect.center(),
                self.options.caret_size,
                row.expanded,
                text_color,
            ));
        }

        let renaming = self.rename.as_ref().is_some_and(|r| r.folder == node.id);
        if !renaming {
            painter.text(
                name_rect.left_center(),
                Align2::LEFT_CENTER,
                &node.name,
                FontId::proportional(14.0),
                text_color,
            );
        }

        if self.options.show_test_case_counts {
            painter.text(
                pos2(rect.right() - 8.0, rect.center().y),
                Align2::RIGHT_CENTER,
                node.test_case_count.to_string(),
                FontId::proportional(12.0),
                visuals.weak_text_color(),
            );
        }
    }

    fn filter_click(&mut self, folder: FolderId) -> bool {
        let accepted = self.session.filter_click(folder);
        if !accepted {
            self.click_swallowed = true;
        }
        accepted
    }

    fn rename_ui(&mut self, ui: &mut Ui, name_rect: Rect, events: &mut Vec<TreeEvent>) {
        let Some(state) = self.rename.as_mut() else {
            return;
        };

        let edit_id = self.id.with(("rename", state.folder));
        let response = ui.put(
            name_rect.shrink2(vec2(0.0, 1.0)),
            egui::TextEdit::singleline(&mut state.buffer).id(edit_id),
        );
        if !state.focus_requested {
            response.request_focus();
            state.focus_requested = true;
            return;
        }

        if response.lost_focus() {
            let cancelled = ui.input(|i| i.key_pressed(Key::Escape));
            if let Some(state) = self.rename.take() {
                if !cancelled {
                    if let Some((folder, name)) = state.commit() {
                        events.push(TreeEvent::Renamed { folder, name });
                    }
                }
            }
        }
    }

    fn ghost_ui(&self, ui: &Ui) {
        let Some((pos, label)) = self.session.ghost() else {
            return;
        };
        let label = label.to_owned();
        egui::Area::new(self.id.with("ghost"))
            .order(egui::Order::Tooltip)
            .fixed_pos(pos)
            .interactable(false)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(label);
                });
            });
    }
}

impl<C: Clock> Drop for FolderTreeUi<C> {
    fn drop(&mut self) {
        self.session.cancel();
    }
}

fn apply_drag_event(event: DragEvent, expanded: &mut ExpandedIds, events: &mut Vec<TreeEvent>) {
    match event {
        DragEvent::AutoExpand { folder } => {
            if expanded.insert(folder) {
                events.push(TreeEvent::AutoExpanded(folder));
            }
        }
        DragEvent::Dropped(request) => events.push(TreeEvent::Moved(request)),
        DragEvent::Activated { .. } | DragEvent::Settled => {}
    }
}

/// Flip one entry of the expanded set; returns the new state. Other entries are untouched.
pub fn toggle(expanded: &mut ExpandedIds, folder: FolderId) -> bool {
    if expanded.remove(&folder) {
        false
    } else {
        expanded.insert(folder);
        true
    }
}

fn caret_shape(center: Pos2, size: f32, expanded: bool, color: Color32) -> Shape {
    let h = size * 0.5;
    let points = if expanded {
        vec![
            pos2(center.x - h, center.y - h * 0.5),
            pos2(center.x + h, center.y - h * 0.5),
            pos2(center.x, center.y + h * 0.5),
        ]
    } else {
        vec![
            pos2(center.x - h * 0.5, center.y - h),
            pos2(center.x + h * 0.5, center.y),
            pos2(center.x - h * 0.5, center.y + h),
        ]
    };
    Shape::convex_polygon(points, color, Stroke::NONE)
}
