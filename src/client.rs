//! Client side of the folder tree: the API seam and the controller gluing it to the widget.

use crate::debug::DebugEventLog;
use crate::model::{
    CreateFolderRequest, ExpandedIds, FolderId, FolderNode, FolderPosition, MoveRequest,
    ProjectId, RenameBody,
};
use crate::server::{FolderDatabase, StoreError};
use crate::tree_view::TreeEvent;

/// How many suffixed names [`FolderTreeController::create_folder`] tries before giving up.
pub const MAX_CREATE_ATTEMPTS: u32 = 20;

const DEBUG_LOG_CAPACITY: usize = 200;

/// Errors reported by a [`FolderApi`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("folder {0} not found")]
    NotFound(FolderId),

    #[error("a folder named {0:?} already exists")]
    AlreadyExists(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(folder) => Self::NotFound(folder),
            StoreError::AlreadyExists { name } => Self::AlreadyExists(name),
            StoreError::ParentNotFound(_)
            | StoreError::CircularReference { .. }
            | StoreError::BlankName => Self::Rejected(err.to_string()),
            StoreError::MalformedPath { .. } | StoreError::Database(_) => {
                Self::Backend(err.to_string())
            }
        }
    }
}

/// The folder endpoints, one method per request.
pub trait FolderApi {
    /// `GET /folders/tree?projectId=<id>`
    fn fetch_tree(&mut self, project: ProjectId) -> Result<Vec<FolderNode>, ApiError>;

    /// `PATCH /folders/{id}/move`
    fn move_folder(&mut self, request: &MoveRequest) -> Result<FolderPosition, ApiError>;

    /// `PATCH /folders/{id}`
    fn rename_folder(&mut self, folder: FolderId, body: &RenameBody) -> Result<(), ApiError>;

    /// `DELETE /folders/{id}`
    fn delete_folder(&mut self, folder: FolderId) -> Result<(), ApiError>;

    /// `POST /folders`
    fn create_folder(&mut self, request: &CreateFolderRequest) -> Result<FolderId, ApiError>;
}

/// [`FolderApi`] served in-process from a [`FolderDatabase`].
pub struct LocalFolderApi {
    db: FolderDatabase,
}

impl LocalFolderApi {
    pub fn new(db: FolderDatabase) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &FolderDatabase {
        &self.db
    }
}

impl FolderApi for LocalFolderApi {
    fn fetch_tree(&mut self, project: ProjectId) -> Result<Vec<FolderNode>, ApiError> {
        Ok(self.db.folder_tree(project))
    }

    fn move_folder(&mut self, request: &MoveRequest) -> Result<FolderPosition, ApiError> {
        Ok(self.db.reparent_service().move_folder(request)?)
    }

    fn rename_folder(&mut self, folder: FolderId, body: &RenameBody) -> Result<(), ApiError> {
        Ok(self.db.reparent_service().rename_folder(folder, &body.name)?)
    }

    fn delete_folder(&mut self, folder: FolderId) -> Result<(), ApiError> {
        self.db.reparent_service().delete_folder(folder)?;
        Ok(())
    }

    fn create_folder(&mut self, request: &CreateFolderRequest) -> Result<FolderId, ApiError> {
        Ok(self.db.reparent_service().create_folder(request)?)
    }
}

/// `base`, then `base (2)`, `base (3)`, ...
pub fn numbered_name(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_owned()
    } else {
        format!("{base} ({attempt})")
    }
}

/// Owns the fetched tree and the expanded set, and turns widget events into API calls.
///
/// Every mutation is followed by a full refetch, whether it succeeded or not. Failures are not
/// rolled back or retried; they are logged and kept in [`Self::debug_log`].
pub struct FolderTreeController<A> {
    api: A,
    project: ProjectId,
    nodes: Vec<FolderNode>,
    expanded: ExpandedIds,
    debug_log: DebugEventLog,
    last_error: Option<ApiError>,
}

impl<A: FolderApi> FolderTreeController<A> {
    /// Does not fetch; call [`Self::refresh`] first.
    pub fn new(api: A, project: ProjectId) -> Self {
        Self {
            api,
            project,
            nodes: Vec::new(),
            expanded: ExpandedIds::default(),
            debug_log: DebugEventLog::new("egui_folder_tree::client", DEBUG_LOG_CAPACITY),
            last_error: None,
        }
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn nodes(&self) -> &[FolderNode] {
        &self.nodes
    }

    pub fn expanded(&self) -> &ExpandedIds {
        &self.expanded
    }

    pub fn expanded_mut(&mut self) -> &mut ExpandedIds {
        &mut self.expanded
    }

    /// The tree and the expanded set, borrowed together for `FolderTreeUi::show`.
    pub fn view_parts(&mut self) -> (&[FolderNode], &mut ExpandedIds) {
        (&self.nodes, &mut self.expanded)
    }

    pub fn debug_log(&self) -> &DebugEventLog {
        &self.debug_log
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Replace the tree with a fresh fetch. On failure the previous tree is kept.
    pub fn refresh(&mut self) {
        match self.api.fetch_tree(self.project) {
            Ok(nodes) => self.nodes = nodes,
            Err(err) => self.record_failure("fetch tree", err),
        }
    }

    pub fn handle(&mut self, event: &TreeEvent) {
        match event {
            TreeEvent::Selected(folder) => {
                self.debug_log.push(format!("selected {folder}"));
            }
            TreeEvent::Toggled { folder, expanded } => {
                self.debug_log.push(format!("toggled {folder} expanded={expanded}"));
            }
            TreeEvent::AutoExpanded(folder) => {
                self.debug_log.push(format!("auto-expanded {folder}"));
            }
            TreeEvent::Renamed { folder, name } => {
                let body = RenameBody { name: name.clone() };
                if let Err(err) = self.api.rename_folder(*folder, &body) {
                    self.record_failure("rename", err);
                }
                self.refresh();
            }
            TreeEvent::Moved(request) => {
                self.debug_log.push(format!(
                    "PATCH {} {:?}",
                    request.path(),
                    request.body()
                ));
                if let Err(err) = self.api.move_folder(request) {
                    self.record_failure("move", err);
                }
                self.refresh();
            }
        }
    }

    pub fn handle_all(&mut self, events: impl IntoIterator<Item = TreeEvent>) {
        for event in events {
            self.handle(&event);
        }
    }

    pub fn delete_folder(&mut self, folder: FolderId) -> Result<(), ApiError> {
        let result = self.api.delete_folder(folder);
        if let Err(err) = &result {
            self.record_failure("delete", err.clone());
        } else {
            self.expanded.remove(&folder);
        }
        self.refresh();
        result
    }

    /// Create a folder named `name`, or `name (2)`, `name (3)`, ... if that name is taken.
    ///
    /// The parent is expanded on success so the new folder is visible.
    pub fn create_folder(
        &mut self,
        parent: Option<FolderId>,
        name: &str,
        description: Option<String>,
    ) -> Result<FolderId, ApiError> {
        let base = name.trim();
        let mut request = CreateFolderRequest {
            project_id: self.project,
            parent_id: parent,
            name: base.to_owned(),
            description,
        };

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            request.name = numbered_name(base, attempt);
            match self.api.create_folder(&request) {
                Ok(id) => {
                    self.debug_log
                        .push(format!("created {id} {:?} under {parent:?}", request.name));
                    if let Some(parent) = parent {
                        self.expanded.insert(parent);
                    }
                    self.refresh();
                    return Ok(id);
                }
                Err(ApiError::AlreadyExists(_)) => {}
                Err(err) => {
                    self.record_failure("create", err.clone());
                    self.refresh();
                    return Err(err);
                }
            }
        }

        let err = ApiError::AlreadyExists(base.to_owned());
        self.record_failure("create", err.clone());
        Err(err)
    }

    fn record_failure(&mut self, what: &str, err: ApiError) {
        log::warn!("folder {what} failed: {err}");
        self.debug_log.push(format!("{what} failed: {err}"));
        self.last_error = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::FolderRecord;

    const PROJECT: ProjectId = ProjectId(3);

    #[derive(Default)]
    struct RecordingApi {
        fetches: usize,
        moves: Vec<MoveRequest>,
        taken: Vec<String>,
        fail_moves: bool,
    }

    impl FolderApi for RecordingApi {
        fn fetch_tree(&mut self, _project: ProjectId) -> Result<Vec<FolderNode>, ApiError> {
            self.fetches += 1;
            Ok(vec![FolderNode::new(FolderId(1), "root", None)])
        }

        fn move_folder(&mut self, request: &MoveRequest) -> Result<FolderPosition, ApiError> {
            self.moves.push(*request);
            if self.fail_moves {
                return Err(ApiError::Backend("offline".to_owned()));
            }
            Ok(FolderPosition {
                id: request.folder_id(),
                parent_id: request.target_parent_id(),
                order_index: request.order_index(),
            })
        }

        fn rename_folder(&mut self, _folder: FolderId, _body: &RenameBody) -> Result<(), ApiError> {
            Ok(())
        }

        fn delete_folder(&mut self, folder: FolderId) -> Result<(), ApiError> {
            Err(ApiError::NotFound(folder))
        }

        fn create_folder(&mut self, request: &CreateFolderRequest) -> Result<FolderId, ApiError> {
            if self.taken.contains(&request.name) {
                return Err(ApiError::AlreadyExists(request.name.clone()));
            }
            self.taken.push(request.name.clone());
            Ok(FolderId(100 + self.taken.len() as i64))
        }
    }

    #[test]
    fn numbered_names() {
        assert_eq!(numbered_name("Smoke", 1), "Smoke");
        assert_eq!(numbered_name("Smoke", 2), "Smoke (2)");
        assert_eq!(numbered_name("Smoke", 11), "Smoke (11)");
    }

    #[test]
    fn failed_move_is_logged_and_still_refetches() {
        let api = RecordingApi {
            fail_moves: true,
            ..Default::default()
        };
        let mut controller = FolderTreeController::new(api, PROJECT);
        controller.refresh();

        let request = MoveRequest::new(FolderId(2), None, 4);
        controller.handle(&TreeEvent::Moved(request));

        assert_eq!(controller.api().moves, vec![request]);
        assert_eq!(controller.api().fetches, 2);
        assert_eq!(
            controller.last_error(),
            Some(&ApiError::Backend("offline".to_owned()))
        );
        assert!(controller.debug_log().last().unwrap().contains("move failed"));
        assert_eq!(controller.nodes().len(), 1);
    }

    #[test]
    fn view_only_events_do_not_touch_the_api() {
        let mut controller = FolderTreeController::new(RecordingApi::default(), PROJECT);
        controller.handle_all([
            TreeEvent::Selected(FolderId(1)),
            TreeEvent::Toggled {
                folder: FolderId(1),
                expanded: true,
            },
            TreeEvent::AutoExpanded(FolderId(2)),
        ]);
        assert_eq!(controller.api().fetches, 0);
        assert!(controller.api().moves.is_empty());
        assert_eq!(controller.debug_log().len(), 3);
    }

    #[test]
    fn create_retries_with_numbered_names() {
        let api = RecordingApi {
            taken: vec!["New folder".to_owned(), "New folder (2)".to_owned()],
            ..Default::default()
        };
        let mut controller = FolderTreeController::new(api, PROJECT);

        let id = controller
            .create_folder(Some(FolderId(1)), " New folder ", None)
            .unwrap();
        assert_eq!(id, FolderId(103));
        assert_eq!(controller.api().taken.last().unwrap(), "New folder (3)");
        assert!(controller.expanded().contains(&FolderId(1)));
        assert_eq!(controller.api().fetches, 1);
    }

    #[test]
    fn create_gives_up_after_the_attempt_limit() {
        let taken = (1..=MAX_CREATE_ATTEMPTS).map(|n| numbered_name("X", n)).collect();
        let api = RecordingApi {
            taken,
            ..Default::default()
        };
        let mut controller = FolderTreeController::new(api, PROJECT);

        let result = controller.create_folder(None, "X", None);
        assert_eq!(result, Err(ApiError::AlreadyExists("X".to_owned())));
        assert_eq!(controller.last_error(), Some(&ApiError::AlreadyExists("X".to_owned())));
    }

    #[test]
    fn failed_delete_is_returned_and_refetched() {
        let mut controller = FolderTreeController::new(RecordingApi::default(), PROJECT);
        assert_eq!(
            controller.delete_folder(FolderId(9)),
            Err(ApiError::NotFound(FolderId(9)))
        );
        assert_eq!(controller.api().fetches, 1);
    }

    fn local_api() -> LocalFolderApi {
        let db = FolderDatabase::open_in_memory().unwrap();
        for (id, parent, name, order) in [
            (1, None, "A", 0),
            (2, Some(1), "B", 0),
            (3, None, "C", 1),
        ] {
            db.insert_folder(&FolderRecord::new(id, PROJECT, parent, name, order), None)
                .unwrap();
        }
        LocalFolderApi::new(db)
    }

    #[test]
    fn drop_after_sibling_round_trips_through_sqlite() {
        let mut controller = FolderTreeController::new(local_api(), PROJECT);
        controller.refresh();
        assert_eq!(controller.nodes().len(), 2);

        controller.handle(&TreeEvent::Moved(MoveRequest::new(FolderId(2), None, 2)));

        let roots: Vec<_> = controller.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["A", "C", "B"]);
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn store_errors_map_to_api_errors() {
        let mut controller = FolderTreeController::new(local_api(), PROJECT);
        controller.handle(&TreeEvent::Moved(MoveRequest::new(FolderId(1), Some(FolderId(2)), 0)));
        assert!(matches!(controller.last_error(), Some(ApiError::Rejected(_))));
        assert_eq!(controller.nodes().len(), 2, "the tree is refetched after a failure");

        let created = controller.create_folder(None, "A", None).unwrap();
        let names: Vec<_> = controller.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "A (2)"]);
        assert_eq!(controller.nodes()[2].id, created);

        controller.handle(&TreeEvent::Renamed {
            folder: created,
            name: "D".to_owned(),
        });
        assert_eq!(controller.nodes()[2].name, "D");

        controller.delete_folder(FolderId(1)).unwrap();
        assert_eq!(controller.nodes().len(), 2);
    }
}
