use egui::{Pos2, Rect};

use crate::drag::{DropTarget, DropZone, HitTest, NodeHit};
use crate::model::{ExpandedIds, FolderId, FolderNode};

/// One row of the flattened, currently visible tree.
#[derive(Clone, Copy, Debug)]
pub struct VisibleRow<'a> {
    pub node: &'a FolderNode,
    pub expanded: bool,

    /// Set only on the hovered row of an active drag.
    pub indicator: Option<DropZone>,
}

impl VisibleRow<'_> {
    #[inline]
    pub fn depth(&self) -> u32 {
        self.node.depth
    }

    /// The caret only reacts when there is something to expand.
    #[inline]
    pub fn caret_interactive(&self) -> bool {
        self.node.has_children()
    }
}

/// Pre-order flattening of `roots`, descending only into folders listed in `expanded`.
pub fn visible_rows<'a>(
    roots: &'a [FolderNode],
    expanded: &ExpandedIds,
    indicator: Option<(FolderId, DropZone)>,
) -> Vec<VisibleRow<'a>> {
    let mut rows = Vec::new();
    for root in roots {
        push_rows(root, expanded, indicator, &mut rows);
    }
    rows
}

fn push_rows<'a>(
    node: &'a FolderNode,
    expanded: &ExpandedIds,
    indicator: Option<(FolderId, DropZone)>,
    rows: &mut Vec<VisibleRow<'a>>,
) {
    let is_expanded = expanded.contains(&node.id);
    rows.push(VisibleRow {
        node,
        expanded: is_expanded,
        indicator: indicator
            .filter(|(id, _)| *id == node.id)
            .map(|(_, zone)| zone),
    });

    if is_expanded {
        for child in &node.children {
            push_rows(child, expanded, indicator, rows);
        }
    }
}

/// Screen rectangles of the rows painted in the last frame.
#[derive(Clone, Debug, Default)]
pub struct RowHitMap {
    rows: Vec<NodeHit>,
}

impl RowHitMap {
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn push(&mut self, row: &VisibleRow<'_>, rect: Rect) {
        self.rows.push(NodeHit {
            target: DropTarget::from(row.node),
            rect,
            has_children: row.node.has_children(),
            expanded: row.expanded,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rect_of(&self, id: FolderId) -> Option<Rect> {
        self.rows
            .iter()
            .find(|row| row.target.id == id)
            .map(|row| row.rect)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeHit> {
        self.rows.iter()
    }
}

impl HitTest for RowHitMap {
    fn hit(&self, pointer: Pos2) -> Option<NodeHit> {
        self.rows.iter().find(|row| row.rect.contains(pointer)).copied()
    }
}
