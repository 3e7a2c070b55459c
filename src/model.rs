/// Identifier of a folder row, unique across both folder tables of a deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FolderId(pub i64);

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the project owning a folder tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ProjectId(pub i64);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-owned set of expanded folder ids.
///
/// The tree view only reads and toggles individual entries; it never owns this set.
pub type ExpandedIds = ahash::HashSet<FolderId>;

/// One node of an assembled folder tree.
///
/// The client treats these as a disposable projection: every refetch rebuilds the whole tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FolderNode {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub order_index: i64,
    pub depth: u32,
    pub test_case_count: u64,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    pub fn new(id: FolderId, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            order_index: 0,
            depth: 0,
            test_case_count: 0,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first search for `id` in this subtree.
    pub fn find(&self, id: FolderId) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// Search a forest for `id`.
pub fn find_node(roots: &[FolderNode], id: FolderId) -> Option<&FolderNode> {
    roots.iter().find_map(|root| root.find(id))
}

/// A finalized drop, ready to be sent to the move endpoint.
///
/// `Copy` and field-private: a request is never edited after it has been built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    folder_id: FolderId,
    target_parent_id: Option<FolderId>,
    order_index: i64,
}

impl MoveRequest {
    pub fn new(folder_id: FolderId, target_parent_id: Option<FolderId>, order_index: i64) -> Self {
        Self {
            folder_id,
            target_parent_id,
            order_index,
        }
    }

    #[inline]
    pub fn folder_id(&self) -> FolderId {
        self.folder_id
    }

    #[inline]
    pub fn target_parent_id(&self) -> Option<FolderId> {
        self.target_parent_id
    }

    #[inline]
    pub fn order_index(&self) -> i64 {
        self.order_index
    }

    /// Request path of the move endpoint, `PATCH /folders/{id}/move`.
    pub fn path(&self) -> String {
        format!("/folders/{}/move", self.folder_id)
    }

    /// JSON body of the move endpoint.
    pub fn body(&self) -> MoveBody {
        MoveBody {
            target_parent_id: self.target_parent_id,
            order_index: self.order_index,
        }
    }
}

/// Body of `PATCH /folders/{id}/move`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MoveBody {
    pub target_parent_id: Option<FolderId>,
    pub order_index: i64,
}

/// Body of `PATCH /folders/{id}`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RenameBody {
    pub name: String,
}

/// Body of `POST /folders`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CreateFolderRequest {
    pub project_id: ProjectId,
    pub parent_id: Option<FolderId>,
    pub name: String,
    pub description: Option<String>,
}

/// Position of a folder after a successful move, as reported by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FolderPosition {
    pub id: FolderId,
    pub parent_id: Option<FolderId>,
    pub order_index: i64,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn move_body_uses_camel_case_wire_names() {
        let request = MoveRequest::new(FolderId(2), None, 4);
        assert_eq!(request.path(), "/folders/2/move");

        let json = serde_json::to_value(request.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "targetParentId": null, "orderIndex": 4 })
        );
    }

    #[test]
    fn create_request_round_trips_through_json() {
        let text = r#"{"projectId":7,"parentId":3,"name":"Smoke","description":null}"#;
        let request: CreateFolderRequest = serde_json::from_str(text).unwrap();
        assert_eq!(request.project_id, ProjectId(7));
        assert_eq!(request.parent_id, Some(FolderId(3)));
        assert_eq!(request.name, "Smoke");
        assert!(request.description.is_none());
    }

    #[test]
    fn folder_node_serializes_nested_children() {
        let mut root = FolderNode::new(FolderId(1), "Root", None);
        let mut child = FolderNode::new(FolderId(2), "Child", Some(FolderId(1)));
        child.depth = 1;
        child.test_case_count = 3;
        root.children.push(child);

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["children"][0]["parentId"], 1);
        assert_eq!(json["children"][0]["testCaseCount"], 3);
        assert_eq!(root.subtree_len(), 2);
        assert_eq!(root.find(FolderId(2)).map(|n| n.name.as_str()), Some("Child"));
    }
}
