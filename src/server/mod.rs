//! SQLite side of the folder tree: assembling the merged forest and editing it.
//!
//! Two tables can hold folders. `folders` is the dedicated, authoritative table; `test_nodes` is a
//! legacy table mixing folders and test cases. Both are read through [`FolderSource`] and merged
//! by [`FolderTreeAssembler`]; [`ReparentService`] writes to whichever table owns a folder.

mod assembler;
mod error;
mod integrity;
mod reparent;
mod schema;
mod source;


pub use assembler::{FolderTreeAssembler, merge_rows};
pub use error::{StoreError, StoreResult};
pub use integrity::forest_integrity_issues;
pub use reparent::ReparentService;
pub use schema::{FolderDatabase, FolderRecord, MAX_TREE_DEPTH, NodeKind};
pub use source::{FolderSource, FolderTableSource, PathSegment, SourceKind, SourceRow, TestNodeSource};
