//! Drag-and-drop folder tree for [`egui`].
//!
//! * [`tree_view::FolderTreeUi`] draws a collapsible folder tree and runs a pointer drag session
//!   ([`drag::DragSession`]) over it, emitting [`MoveRequest`]s on drop.
//! * [`server`] assembles one forest out of two SQLite folder tables and applies moves.
//! * [`client::FolderTreeController`] connects the two through the [`client::FolderApi`] seam.

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod debug;
pub mod drag;
pub mod model;
pub mod server;
pub mod tree_view;

pub use client::{ApiError, FolderApi, FolderTreeController, LocalFolderApi};
pub use config::{ConfigError, FolderTreeConfig};
pub use debug::DebugEventLog;
pub use drag::{DragOptions, DragSession, DropZone, classify};
pub use model::{
    CreateFolderRequest, ExpandedIds, FolderId, FolderNode, FolderPosition, MoveBody,
    MoveRequest, ProjectId, RenameBody,
};
pub use server::{FolderDatabase, FolderTreeAssembler, ReparentService, StoreError};
pub use tree_view::{FolderTreeUi, TreeEvent, TreeViewOptions};
