use rusqlite::{Connection, params};

use crate::model::{FolderId, ProjectId};

use super::error::{StoreError, StoreResult};
use super::schema::MAX_TREE_DEPTH;

/// Which physical table a row came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SourceKind {
    /// `folders`: dedicated folder table with a description column. Authoritative.
    Folders,

    /// `test_nodes`: legacy mixed table, folders are rows with `type = 'folder'`.
    TestNodes,
}

/// One step of a root-to-node path. Paths compare in pre-order, siblings by order index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSegment {
    pub order_index: i64,
    pub id: FolderId,
}

/// A folder row produced by a source's recursive traversal.
///
/// `depth` and `path` are relative to the row the traversal started from: a root, or a row whose
/// parent lives in the other table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceRow {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub order_index: i64,
    pub depth: u32,
    pub path: Vec<PathSegment>,
    pub source: SourceKind,
}

/// A folder-like table, seen through the columns every source has in common.
pub trait FolderSource {
    fn kind(&self) -> SourceKind;

    /// Every folder of `project`, walked from the rows whose parent is not a folder of this
    /// source (roots and children of the other source's folders), sorted by path.
    fn list_rows(&self, project: ProjectId) -> StoreResult<Vec<SourceRow>>;

    /// Test cases directly inside `folder`. Sub-folders are not counted.
    fn test_case_count(&self, folder: FolderId) -> StoreResult<u64>;
}

const FOLDERS_TRAVERSAL: &str = r#"
    WITH RECURSIVE tree(id, name, parent_id, order_index, depth, path) AS (
        SELECT f.id, f.name, f.parent_id, f.order_index, 0,
               printf('/%d.%d', f.order_index, f.id)
        FROM folders f
        WHERE f.project_id = ?1
          AND NOT EXISTS (
              SELECT 1 FROM folders p WHERE p.id = f.parent_id AND p.project_id = ?1
          )

        UNION ALL

        SELECT f.id, f.name, f.parent_id, f.order_index, t.depth + 1,
               t.path || printf('/%d.%d', f.order_index, f.id)
        FROM folders f
        INNER JOIN tree t ON f.parent_id = t.id
        WHERE f.project_id = ?1 AND t.depth < ?2
    )
    SELECT id, name, parent_id, order_index, depth, path FROM tree
"#;

const TEST_NODES_TRAVERSAL: &str = r#"
    WITH RECURSIVE tree(id, name, parent_id, order_index, depth, path) AS (
        SELECT n.id, n.name, n.parent_id, n.order_index, 0,
               printf('/%d.%d', n.order_index, n.id)
        FROM test_nodes n
        WHERE n.project_id = ?1 AND n.type = 'folder'
          AND NOT EXISTS (
              SELECT 1 FROM test_nodes p
              WHERE p.id = n.parent_id AND p.project_id = ?1 AND p.type = 'folder'
          )

        UNION ALL

        SELECT n.id, n.name, n.parent_id, n.order_index, t.depth + 1,
               t.path || printf('/%d.%d', n.order_index, n.id)
        FROM test_nodes n
        INNER JOIN tree t ON n.parent_id = t.id
        WHERE n.project_id = ?1 AND n.type = 'folder' AND t.depth < ?2
    )
    SELECT id, name, parent_id, order_index, depth, path FROM tree
"#;

/// Adapter over the `folders` table.
#[derive(Clone, Copy)]
pub struct FolderTableSource<'c> {
    conn: &'c Connection,
}

impl<'c> FolderTableSource<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl FolderSource for FolderTableSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Folders
    }

    fn list_rows(&self, project: ProjectId) -> StoreResult<Vec<SourceRow>> {
        traverse(self.conn, FOLDERS_TRAVERSAL, project, self.kind())
    }

    fn test_case_count(&self, folder: FolderId) -> StoreResult<u64> {
        count(
            self.conn,
            "SELECT COUNT(*) FROM test_cases WHERE folder_id = ?1",
            folder,
        )
    }
}

/// Adapter over the legacy `test_nodes` table.
#[derive(Clone, Copy)]
pub struct TestNodeSource<'c> {
    conn: &'c Connection,
}

impl<'c> TestNodeSource<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl FolderSource for TestNodeSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::TestNodes
    }

    fn list_rows(&self, project: ProjectId) -> StoreResult<Vec<SourceRow>> {
        traverse(self.conn, TEST_NODES_TRAVERSAL, project, self.kind())
    }

    fn test_case_count(&self, folder: FolderId) -> StoreResult<u64> {
        count(
            self.conn,
            "SELECT COUNT(*) FROM test_nodes WHERE parent_id = ?1 AND type = 'test_case'",
            folder,
        )
    }
}

fn traverse(
    conn: &Connection,
    sql: &str,
    project: ProjectId,
    origin: SourceKind,
) -> StoreResult<Vec<SourceRow>> {
    let mut stmt = conn.prepare(sql)?;
    let raw = stmt
        .query_map(params![project.0, MAX_TREE_DEPTH], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = raw
        .into_iter()
        .map(|(id, name, parent_id, order_index, depth, path)| {
            Ok(SourceRow {
                id: FolderId(id),
                name,
                parent_id: parent_id.map(FolderId),
                order_index,
                depth,
                path: parse_path(&path, origin)?,
                source: origin,
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    rows.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(rows)
}

fn count(conn: &Connection, sql: &str, folder: FolderId) -> StoreResult<u64> {
    let n: i64 = conn.query_row(sql, params![folder.0], |row| row.get(0))?;
    Ok(u64::try_from(n).unwrap_or(0))
}

/// Parse `/order.id/order.id/...` as written by the traversal queries.
pub(crate) fn parse_path(text: &str, origin: SourceKind) -> StoreResult<Vec<PathSegment>> {
    let malformed = || StoreError::MalformedPath {
        path: text.to_owned(),
        origin,
    };

    let Some(rest) = text.strip_prefix('/') else {
        return Err(malformed());
    };
    rest.split('/')
        .map(|segment| {
            let (order_index, id) = segment.split_once('.').ok_or_else(malformed)?;
            Ok(PathSegment {
                order_index: order_index.parse().map_err(|_err| malformed())?,
                id: FolderId(id.parse().map_err(|_err| malformed())?),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_with_negative_order_indices() {
        let path = parse_path("/0.1/-2.14/3.7", SourceKind::Folders).unwrap();
        assert_eq!(
            path,
            vec![
                PathSegment { order_index: 0, id: FolderId(1) },
                PathSegment { order_index: -2, id: FolderId(14) },
                PathSegment { order_index: 3, id: FolderId(7) },
            ]
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for text in ["", "0.1", "/0.1/", "/x.1", "/0.y", "/01"] {
            assert!(
                matches!(
                    parse_path(text, SourceKind::TestNodes),
                    Err(StoreError::MalformedPath { .. })
                ),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn path_order_is_pre_order_with_siblings_by_order_index() {
        let seg = |order_index, id| PathSegment { order_index, id: FolderId(id) };
        let parent = vec![seg(1, 9)];
        let child = vec![seg(1, 9), seg(0, 4)];
        let later_root = vec![seg(2, 3)];
        let earlier_root = vec![seg(0, 50)];

        assert!(parent < child);
        assert!(child < later_root);
        assert!(earlier_root < parent);
    }
}
