use crate::model::{FolderId, FolderNode, MoveRequest};

use super::zone::DropZone;

/// The part of a hovered folder a move is computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropTarget {
    pub id: FolderId,
    pub parent_id: Option<FolderId>,
    pub order_index: i64,
}

impl From<&FolderNode> for DropTarget {
    fn from(node: &FolderNode) -> Self {
        Self {
            id: node.id,
            parent_id: node.parent_id,
            order_index: node.order_index,
        }
    }
}

/// Turn a finalized drop into a move request.
///
/// Returns `None` when the folder is dropped onto itself.
///
/// Siblings after the insertion point are not renumbered: dropping after a folder with
/// `order_index = n` asks for `n + 1` even if another sibling already holds it.
pub fn build_move_request(
    dragged: FolderId,
    target: DropTarget,
    zone: DropZone,
) -> Option<MoveRequest> {
    if target.id == dragged {
        return None;
    }

    let request = match zone {
        DropZone::Before => MoveRequest::new(dragged, target.parent_id, target.order_index),
        DropZone::After => {
            MoveRequest::new(dragged, target.parent_id, target.order_index.saturating_add(1))
        }
        DropZone::Into => MoveRequest::new(dragged, Some(target.id), 0),
    };
    Some(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: i64, parent: Option<i64>, order_index: i64) -> DropTarget {
        DropTarget {
            id: FolderId(id),
            parent_id: parent.map(FolderId),
            order_index,
        }
    }

    #[test]
    fn before_takes_the_target_slot() {
        let request = build_move_request(FolderId(9), target(3, Some(1), 4), DropZone::Before);
        assert_eq!(request, Some(MoveRequest::new(FolderId(9), Some(FolderId(1)), 4)));
    }

    #[test]
    fn after_takes_the_next_slot_without_renumbering() {
        let request = build_move_request(FolderId(9), target(3, None, 4), DropZone::After);
        assert_eq!(request, Some(MoveRequest::new(FolderId(9), None, 5)));
    }

    #[test]
    fn into_becomes_first_child() {
        let request = build_move_request(FolderId(9), target(3, Some(1), 4), DropZone::Into);
        assert_eq!(request, Some(MoveRequest::new(FolderId(9), Some(FolderId(3)), 0)));
    }

    #[test]
    fn dropping_onto_self_is_not_a_move() {
        for zone in [DropZone::Before, DropZone::After, DropZone::Into] {
            assert!(build_move_request(FolderId(3), target(3, None, 0), zone).is_none());
        }
    }
}
