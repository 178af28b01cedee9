//! Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six resource handlers; authorization lists name them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
    OnGet,
    OnGetDoc,
    OnPost,
    OnPutDoc,
    OnPatchDoc,
    OnDeleteDoc,
}

impl Handler {
    pub const ALL: [Handler; 6] = [
        Handler::OnGet,
        Handler::OnGetDoc,
        Handler::OnPost,
        Handler::OnPutDoc,
        Handler::OnPatchDoc,
        Handler::OnDeleteDoc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handler::OnGet => "on_get",
            Handler::OnGetDoc => "on_get_doc",
            Handler::OnPost => "on_post",
            Handler::OnPutDoc => "on_put_doc",
            Handler::OnPatchDoc => "on_patch_doc",
            Handler::OnDeleteDoc => "on_delete_doc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_serde() {
        for handler in Handler::ALL {
            let encoded = serde_json::to_value(handler).unwrap();
            assert_eq!(encoded, handler.as_str());
            assert_eq!(Handler::from_name(handler.as_str()), Some(handler));
        }
        assert_eq!(Handler::from_name("on_head"), None);
    }
}
