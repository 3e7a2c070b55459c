use ahash::HashMap;
use itertools::Itertools as _;

use crate::model::{FolderId, FolderNode, ProjectId};

use super::error::StoreResult;
use super::integrity::forest_integrity_issues;
use super::schema::MAX_TREE_DEPTH;
use super::source::{FolderSource, SourceKind, SourceRow};

/// Builds one nested folder forest out of two folder tables.
///
/// Rows from the authoritative source win whenever both sources report the same id. A folder may
/// sit under a folder of the other table; it is attached by `parent_id` like any other row.
/// Siblings are ordered by `(order_index, id)`, and depths are recomputed from the nesting, so
/// the depth limit applies to the merged tree.
pub struct FolderTreeAssembler<'s> {
    authoritative: &'s dyn FolderSource,
    legacy: &'s dyn FolderSource,
}

impl<'s> FolderTreeAssembler<'s> {
    pub fn new(authoritative: &'s dyn FolderSource, legacy: &'s dyn FolderSource) -> Self {
        Self {
            authoritative,
            legacy,
        }
    }

    /// The merged forest, or an empty one if anything failed. Failures are logged, not returned.
    pub fn assemble(&self, project: ProjectId) -> Vec<FolderNode> {
        match self.try_assemble(project) {
            Ok(roots) => roots,
            Err(err) => {
                log::error!("failed to assemble folder tree of project {project}: {err}");
                Vec::new()
            }
        }
    }

    pub fn try_assemble(&self, project: ProjectId) -> StoreResult<Vec<FolderNode>> {
        let rows = self.merged_rows(project)?;
        let counts = rows
            .iter()
            .map(|row| self.source(row.source).test_case_count(row.id))
            .collect::<StoreResult<Vec<u64>>>()?;

        let roots = nest(rows, counts);

        if log::log_enabled!(log::Level::Warn) {
            for issue in forest_integrity_issues(&roots) {
                log::warn!("{issue}");
            }
        }

        Ok(roots)
    }

    /// Both sources' rows, deduplicated by id and sorted by path.
    pub fn merged_rows(&self, project: ProjectId) -> StoreResult<Vec<SourceRow>> {
        let authoritative = self.authoritative.list_rows(project)?;
        let legacy = self.legacy.list_rows(project)?;
        log::trace!(
            "project {project}: {} {:?} rows, {} {:?} rows",
            authoritative.len(),
            self.authoritative.kind(),
            legacy.len(),
            self.legacy.kind()
        );
        Ok(merge_rows(authoritative, legacy))
    }

    fn source(&self, kind: SourceKind) -> &'s dyn FolderSource {
        if kind == self.legacy.kind() {
            self.legacy
        } else {
            self.authoritative
        }
    }
}

/// Concatenate, keep the first row per id (authoritative rows come first), then sort by path.
pub fn merge_rows(authoritative: Vec<SourceRow>, legacy: Vec<SourceRow>) -> Vec<SourceRow> {
    let mut merged: Vec<SourceRow> = authoritative
        .into_iter()
        .chain(legacy)
        .unique_by(|row| row.id)
        .collect();
    merged.sort_by(|a, b| a.path.cmp(&b.path));
    merged
}

/// Attach every row to its parent. Rows whose parent is not among `rows` are dropped.
fn nest(rows: Vec<SourceRow>, counts: Vec<u64>) -> Vec<FolderNode> {
    let index_of: HashMap<FolderId, usize> =
        rows.iter().enumerate().map(|(ix, row)| (row.id, ix)).collect();

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    for (ix, row) in rows.iter().enumerate() {
        match row.parent_id {
            None => roots.push(ix),
            Some(parent) => match index_of.get(&parent) {
                Some(&parent_ix) => children[parent_ix].push(ix),
                None => log::warn!(
                    "dropping folder {} from {:?}: parent {parent} is not in the tree",
                    row.id,
                    row.source
                ),
            },
        }
    }

    let key = |ix: &usize| (rows[*ix].order_index, rows[*ix].id);
    roots.sort_by_key(key);
    for list in &mut children {
        list.sort_by_key(key);
    }

    let mut slots: Vec<Option<FolderNode>> = rows
        .into_iter()
        .zip(counts)
        .map(|(row, test_case_count)| {
            let mut node = FolderNode::new(row.id, row.name, row.parent_id);
            node.order_index = row.order_index;
            node.test_case_count = test_case_count;
            Some(node)
        })
        .collect();

    roots
        .into_iter()
        .filter_map(|ix| build(ix, 0, &mut slots, &children))
        .collect()
}

fn build(
    ix: usize,
    depth: u32,
    slots: &mut [Option<FolderNode>],
    children: &[Vec<usize>],
) -> Option<FolderNode> {
    if depth > MAX_TREE_DEPTH {
        log::warn!("dropping folder subtree below depth {MAX_TREE_DEPTH}");
        return None;
    }
    let mut node = slots[ix].take()?;
    node.depth = depth;
    node.children = children[ix]
        .iter()
        .filter_map(|&child| build(child, depth + 1, slots, children))
        .collect();
    Some(node)
}
