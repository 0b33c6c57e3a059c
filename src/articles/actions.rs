use serde::Serialize;

use crate::backend::dto::ArticleStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    RequestRevision,
    Reject,
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableActions {
    pub request_revision: bool,
    pub reject: bool,
    pub accept: bool,
}

impl AvailableActions {
    pub fn allows(&self, action: EditorAction) -> bool {
        match action {
            EditorAction::RequestRevision => self.request_revision,
            EditorAction::Reject => self.reject,
            EditorAction::Accept => self.accept,
        }
    }
}

/// Accept needs the final version attached; nothing is allowed once the article is closed.
pub fn available_actions(status: ArticleStatus, final_file_attached: bool) -> AvailableActions {
    let open = !status.is_closed();
    AvailableActions {
        request_revision: open,
        reject: open,
        accept: open && final_file_attached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_needs_final_file() {
        let actions = available_actions(ArticleStatus::Reviewing, false);
        assert!(!actions.allows(EditorAction::Accept));
        assert!(actions.allows(EditorAction::RequestRevision));
        assert!(actions.allows(EditorAction::Reject));
        assert!(available_actions(ArticleStatus::Reviewing, true).accept);
    }

    #[test]
    fn closed_articles_allow_nothing() {
        for status in [ArticleStatus::Accepted, ArticleStatus::Rejected, ArticleStatus::Published] {
            let actions = available_actions(status, true);
            assert_eq!(
                actions,
                AvailableActions { request_revision: false, reject: false, accept: false }
            );
        }
    }
}
