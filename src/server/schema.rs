use std::path::Path;

use rusqlite::{Connection, params};

use crate::model::{FolderId, ProjectId};

use super::assembler::FolderTreeAssembler;
use super::error::StoreResult;
use super::reparent::ReparentService;
use super::source::{FolderTableSource, TestNodeSource};

/// Recursive traversals stop this many levels below the roots.
pub const MAX_TREE_DEPTH: u32 = 64;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS folders (
        id          INTEGER PRIMARY KEY,
        project_id  INTEGER NOT NULL,
        parent_id   INTEGER,
        name        TEXT    NOT NULL,
        description TEXT,
        order_index INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(project_id, parent_id);

    CREATE TABLE IF NOT EXISTS test_nodes (
        id          INTEGER PRIMARY KEY,
        project_id  INTEGER NOT NULL,
        parent_id   INTEGER,
        name        TEXT    NOT NULL,
        type        TEXT    NOT NULL CHECK (type IN ('folder', 'test_case')),
        order_index INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_test_nodes_parent ON test_nodes(project_id, parent_id);

    CREATE TABLE IF NOT EXISTS test_cases (
        id        INTEGER PRIMARY KEY,
        folder_id INTEGER NOT NULL,
        title     TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_test_cases_folder ON test_cases(folder_id);
"#;

/// Row kind of the legacy `test_nodes` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    TestCase,
}

impl NodeKind {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::TestCase => "test_case",
        }
    }
}

/// A row to write into either folder table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderRecord {
    pub id: FolderId,
    pub project_id: ProjectId,
    pub parent_id: Option<FolderId>,
    pub name: String,
    pub order_index: i64,
}

impl FolderRecord {
    pub fn new(
        id: i64,
        project_id: ProjectId,
        parent_id: Option<i64>,
        name: impl Into<String>,
        order_index: i64,
    ) -> Self {
        Self {
            id: FolderId(id),
            project_id,
            parent_id: parent_id.map(FolderId),
            name: name.into(),
            order_index,
        }
    }
}

/// SQLite database holding both folder tables and the test cases they contain.
pub struct FolderDatabase {
    conn: Connection,
}

impl FolderDatabase {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Create any missing tables on `conn`.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn folder_source(&self) -> FolderTableSource<'_> {
        FolderTableSource::new(&self.conn)
    }

    pub fn test_node_source(&self) -> TestNodeSource<'_> {
        TestNodeSource::new(&self.conn)
    }

    pub fn reparent_service(&self) -> ReparentService<'_> {
        ReparentService::new(&self.conn)
    }

    /// Assemble the merged tree of `project`; empty on any failure.
    pub fn folder_tree(&self, project: ProjectId) -> Vec<crate::model::FolderNode> {
        let folders = self.folder_source();
        let nodes = self.test_node_source();
        FolderTreeAssembler::new(&folders, &nodes).assemble(project)
    }

    pub fn insert_folder(&self, record: &FolderRecord, description: Option<&str>) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO folders (id, project_id, parent_id, name, description, order_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id.0,
                record.project_id.0,
                record.parent_id.map(|p| p.0),
                record.name,
                description,
                record.order_index,
            ],
        )?;
        Ok(())
    }

    pub fn insert_test_node(&self, record: &FolderRecord, kind: NodeKind) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO test_nodes (id, project_id, parent_id, name, type, order_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id.0,
                record.project_id.0,
                record.parent_id.map(|p| p.0),
                record.name,
                kind.as_sql(),
                record.order_index,
            ],
        )?;
        Ok(())
    }

    pub fn insert_test_case(&self, folder: FolderId, title: &str) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO test_cases (folder_id, title) VALUES (?1, ?2)",
            params![folder.0, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_is_idempotent() {
        let db = FolderDatabase::open_in_memory().unwrap();
        db.connection().execute_batch(SCHEMA).unwrap();

        let tables: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('folders', 'test_nodes', 'test_cases')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_node_kind_is_constrained() {
        let db = FolderDatabase::open_in_memory().unwrap();
        let bad = db.connection().execute(
            "INSERT INTO test_nodes (id, project_id, parent_id, name, type, order_index)
             VALUES (1, 1, NULL, 'x', 'suite', 0)",
            [],
        );
        assert!(bad.is_err());
    }
}
