use ahash::HashSet;

use crate::model::{FolderId, FolderNode};

/// Structural problems in an assembled forest. Empty means well-formed.
pub fn forest_integrity_issues(roots: &[FolderNode]) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();
    let mut seen: HashSet<FolderId> = HashSet::default();

    check_siblings(roots, None, 0, &mut seen, &mut issues);
    issues
}

fn check_siblings(
    siblings: &[FolderNode],
    parent: Option<FolderId>,
    depth: u32,
    seen: &mut HashSet<FolderId>,
    issues: &mut Vec<String>,
) {
    for pair in siblings.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if (a.order_index, a.id) > (b.order_index, b.id) {
            issues.push(format!(
                "integrity: siblings {} (order {}) and {} (order {}) out of order",
                a.id, a.order_index, b.id, b.order_index
            ));
        }
    }

    for node in siblings {
        if !seen.insert(node.id) {
            issues.push(format!("integrity: folder {} appears more than once", node.id));
            continue;
        }
        if node.parent_id != parent {
            issues.push(format!(
                "integrity: folder {} has parent_id {:?} but sits under {:?}",
                node.id, node.parent_id, parent
            ));
        }
        if node.depth != depth {
            issues.push(format!(
                "integrity: folder {} has depth {} at level {depth}",
                node.id, node.depth
            ));
        }
        check_siblings(&node.children, Some(node.id), depth + 1, seen, issues);
    }
}
