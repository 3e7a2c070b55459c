use rusqlite::{Connection, OptionalExtension as _, params};

use crate::model::{CreateFolderRequest, FolderId, FolderPosition, MoveRequest};

use super::error::{StoreError, StoreResult};
use super::schema::MAX_TREE_DEPTH;
use super::source::SourceKind;

const FOLDERS_SUBTREE: &str = r#"
    WITH RECURSIVE subtree(id) AS (
        SELECT ?1
        UNION
        SELECT f.id FROM folders f INNER JOIN subtree s ON f.parent_id = s.id
    )
"#;

const TEST_NODES_SUBTREE: &str = r#"
    WITH RECURSIVE subtree(id) AS (
        SELECT ?1
        UNION
        SELECT n.id FROM test_nodes n INNER JOIN subtree s ON n.parent_id = s.id
    )
"#;

/// Structural edits of the folder forest.
///
/// A folder is owned by whichever table holds it, `folders` first. Edits go to the owning table
/// only. Moves never renumber siblings: the target `order_index` is written as-is, so equal
/// indices are possible and fall back to id order when assembled.
#[derive(Clone, Copy)]
pub struct ReparentService<'c> {
    conn: &'c Connection,
}

impl<'c> ReparentService<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn move_folder(&self, request: &MoveRequest) -> StoreResult<FolderPosition> {
        let folder = request.folder_id();
        let owner = self.owner_of(folder)?.ok_or(StoreError::NotFound(folder))?;

        if let Some(parent) = request.target_parent_id() {
            if self.owner_of(parent)?.is_none() {
                return Err(StoreError::ParentNotFound(parent));
            }
            if self.is_self_or_descendant(folder, parent)? {
                return Err(StoreError::CircularReference { folder, parent });
            }
        }

        let sql = match owner {
            SourceKind::Folders => {
                "UPDATE folders SET parent_id = ?2, order_index = ?3 WHERE id = ?1"
            }
            SourceKind::TestNodes => {
                "UPDATE test_nodes SET parent_id = ?2, order_index = ?3
                 WHERE id = ?1 AND type = 'folder'"
            }
        };
        self.conn.execute(
            sql,
            params![
                folder.0,
                request.target_parent_id().map(|p| p.0),
                request.order_index()
            ],
        )?;

        log::debug!(
            "moved folder {folder} ({owner:?}) under {:?} at {}",
            request.target_parent_id(),
            request.order_index()
        );
        Ok(FolderPosition {
            id: folder,
            parent_id: request.target_parent_id(),
            order_index: request.order_index(),
        })
    }

    pub fn rename_folder(&self, folder: FolderId, name: &str) -> StoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankName);
        }
        let owner = self.owner_of(folder)?.ok_or(StoreError::NotFound(folder))?;
        let sql = match owner {
            SourceKind::Folders => "UPDATE folders SET name = ?2 WHERE id = ?1",
            SourceKind::TestNodes => "UPDATE test_nodes SET name = ?2 WHERE id = ?1",
        };
        self.conn.execute(sql, params![folder.0, name])?;
        log::debug!("renamed folder {folder} to {name:?}");
        Ok(())
    }

    /// Delete `folder`, its descendants in the owning table, and their test cases.
    ///
    /// Returns the number of folders removed.
    pub fn delete_folder(&self, folder: FolderId) -> StoreResult<usize> {
        let owner = self.owner_of(folder)?.ok_or(StoreError::NotFound(folder))?;

        let tx = self.conn.unchecked_transaction()?;
        let removed = match owner {
            SourceKind::Folders => {
                tx.execute(
                    &format!(
                        "{FOLDERS_SUBTREE} DELETE FROM test_cases WHERE folder_id IN (SELECT id FROM subtree)"
                    ),
                    params![folder.0],
                )?;
                tx.execute(
                    &format!("{FOLDERS_SUBTREE} DELETE FROM folders WHERE id IN (SELECT id FROM subtree)"),
                    params![folder.0],
                )?
            }
            SourceKind::TestNodes => {
                let folders: i64 = tx.query_row(
                    &format!(
                        "{TEST_NODES_SUBTREE} SELECT COUNT(*) FROM test_nodes
                         WHERE type = 'folder' AND id IN (SELECT id FROM subtree)"
                    ),
                    params![folder.0],
                    |row| row.get(0),
                )?;
                tx.execute(
                    &format!(
                        "{TEST_NODES_SUBTREE} DELETE FROM test_nodes WHERE id IN (SELECT id FROM subtree)"
                    ),
                    params![folder.0],
                )?;
                usize::try_from(folders).unwrap_or(0)
            }
        };
        tx.commit()?;

        log::debug!("deleted folder {folder} ({owner:?}), {removed} folder(s) removed");
        Ok(removed)
    }

    /// Insert a new folder into `folders`, after its last sibling.
    pub fn create_folder(&self, request: &CreateFolderRequest) -> StoreResult<FolderId> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankName);
        }
        let parent = request.parent_id.map(|p| p.0);
        if let Some(parent_id) = request.parent_id {
            if self.owner_of(parent_id)?.is_none() {
                return Err(StoreError::ParentNotFound(parent_id));
            }
        }

        let tx = self.conn.unchecked_transaction()?;

        let taken = tx
            .query_row(
                "SELECT 1 FROM folders WHERE project_id = ?1 AND parent_id IS ?2 AND name = ?3
                 UNION ALL
                 SELECT 1 FROM test_nodes
                 WHERE project_id = ?1 AND parent_id IS ?2 AND name = ?3 AND type = 'folder'
                 LIMIT 1",
                params![request.project_id.0, parent, name],
                |_row| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(StoreError::AlreadyExists {
                name: name.to_owned(),
            });
        }

        let order_index: i64 = tx.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM (
                 SELECT order_index FROM folders WHERE project_id = ?1 AND parent_id IS ?2
                 UNION ALL
                 SELECT order_index FROM test_nodes
                 WHERE project_id = ?1 AND parent_id IS ?2 AND type = 'folder'
             )",
            params![request.project_id.0, parent],
            |row| row.get(0),
        )?;

        // Ids are shared between both tables, so allocate past the largest of either.
        let id: i64 = tx.query_row(
            "SELECT MAX(
                 (SELECT COALESCE(MAX(id), 0) FROM folders),
                 (SELECT COALESCE(MAX(id), 0) FROM test_nodes)
             ) + 1",
            [],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO folders (id, project_id, parent_id, name, description, order_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                request.project_id.0,
                parent,
                name,
                request.description,
                order_index
            ],
        )?;
        tx.commit()?;

        log::debug!("created folder {id} {name:?} under {parent:?} at {order_index}");
        Ok(FolderId(id))
    }

    /// Which table owns `folder`, `folders` taking precedence.
    pub fn owner_of(&self, folder: FolderId) -> StoreResult<Option<SourceKind>> {
        Ok(self.parent_of(folder)?.map(|(owner, _)| owner))
    }

    fn parent_of(&self, folder: FolderId) -> StoreResult<Option<(SourceKind, Option<FolderId>)>> {
        let in_folders = self
            .conn
            .query_row(
                "SELECT parent_id FROM folders WHERE id = ?1",
                params![folder.0],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        if let Some(parent) = in_folders {
            return Ok(Some((SourceKind::Folders, parent.map(FolderId))));
        }

        let in_nodes = self
            .conn
            .query_row(
                "SELECT parent_id FROM test_nodes WHERE id = ?1 AND type = 'folder'",
                params![folder.0],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(in_nodes.map(|parent| (SourceKind::TestNodes, parent.map(FolderId))))
    }

    /// Walk up from `candidate` through the merged parent links looking for `folder`.
    ///
    /// A chain longer than any assembled tree could be is treated as a cycle.
    fn is_self_or_descendant(&self, folder: FolderId, candidate: FolderId) -> StoreResult<bool> {
        let mut current = candidate;
        for _ in 0..=MAX_TREE_DEPTH + 1 {
            if current == folder {
                return Ok(true);
            }
            match self.parent_of(current)? {
                Some((_, Some(parent))) => current = parent,
                Some((_, None)) | None => return Ok(false),
            }
        }
        Ok(true)
    }
}
