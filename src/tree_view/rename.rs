use crate::model::FolderId;

/// Inline rename in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct RenameState {
    pub(super) folder: FolderId,
    pub(super) buffer: String,
    original: String,
    pub(super) focus_requested: bool,
}

impl RenameState {
    pub(super) fn new(folder: FolderId, current_name: &str) -> Self {
        Self {
            folder,
            buffer: current_name.to_owned(),
            original: current_name.to_owned(),
            focus_requested: false,
        }
    }

    /// The new name, if the edit produced a different, non-blank one.
    pub(super) fn commit(self) -> Option<(FolderId, String)> {
        let name = self.buffer.trim();
        (!name.is_empty() && name != self.original).then(|| (self.folder, name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_trims_and_skips_noop_edits() {
        let mut edit = RenameState::new(FolderId(4), "Smoke");
        edit.buffer = "  Smoke tests ".to_owned();
        assert_eq!(edit.commit(), Some((FolderId(4), "Smoke tests".to_owned())));

        let unchanged = RenameState::new(FolderId(4), "Smoke");
        assert_eq!(unchanged.commit(), None);

        let mut blank = RenameState::new(FolderId(4), "Smoke");
        blank.buffer = "   ".to_owned();
        assert_eq!(blank.commit(), None);
    }
}
