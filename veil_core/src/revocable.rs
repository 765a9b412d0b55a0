//! Revocable views.
//!
//! [`create_revocable`] pairs a fresh view with a [`RevocationToken`]. The two
//! share a single flag owned by the pair, not by the record: revoking cuts
//! off that one view and leaves the record and any other view untouched.

use std::sync::Arc;

use crate::id::ViewId;
use crate::policy::AccessPolicy;
use crate::record::Record;
use crate::view::{AccessControlledView, RevocationFlag, ViewBuilder, ViewState};

/// A capability that permanently disables one paired view.
#[derive(Debug)]
pub struct RevocationToken {
    view_id: ViewId,
    flag: Arc<RevocationFlag>,
}

impl RevocationToken {
    pub(crate) fn new(view_id: ViewId, flag: Arc<RevocationFlag>) -> Self {
        Self { view_id, flag }
    }

    /// Revoke the paired view. Revoking twice is a no-op.
    pub fn revoke(&self) {
        self.flag.revoke(self.view_id);
    }

    pub fn is_revoked(&self) -> bool {
        self.flag.is_revoked()
    }

    /// The state of the paired view.
    pub fn state(&self) -> ViewState {
        if self.is_revoked() {
            ViewState::Revoked
        } else {
            ViewState::Active
        }
    }

    /// The id of the paired view.
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }
}

/// Create a view over `record` together with the token able to revoke it.
pub fn create_revocable(
    record: Record,
    policy: AccessPolicy,
) -> (AccessControlledView, RevocationToken) {
    ViewBuilder::new(record).policy(policy).build_revocable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::operation::Operation;
    use serde_json::json;

    #[test]
    fn test_revoke_blocks_every_operation() {
        let record = Record::new().with("isUsable", true);
        let (view, token) = create_revocable(record.clone(), AccessPolicy::default());

        assert_eq!(view.read("isUsable").unwrap(), Some(json!(true)));
        assert_eq!(token.view_id(), view.id());
        token.revoke();

        assert_eq!(
            view.read("isUsable"),
            Err(ViewError::ViewRevoked {
                operation: Operation::Get
            })
        );
        assert!(view.write("isUsable", false).unwrap_err().is_revoked());
        assert!(view.contains("isUsable").unwrap_err().is_revoked());
        assert!(view.contains("_private").unwrap_err().is_revoked());
        assert!(view.remove("isUsable").unwrap_err().is_revoked());
        assert!(view
            .define("x", &crate::descriptor::PropertyDescriptor::new())
            .unwrap_err()
            .is_revoked());
        assert!(view.list_keys().unwrap_err().is_revoked());
        assert!(view.keys().unwrap_err().is_revoked());
        assert!(view.has_own("isUsable").unwrap_err().is_revoked());

        // The record itself is untouched
        assert_eq!(record.get("isUsable"), Some(json!(true)));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let (view, token) = create_revocable(Record::new(), AccessPolicy::default());
        assert_eq!(token.state(), ViewState::Active);
        assert!(view.is_revocable());

        token.revoke();
        token.revoke();

        assert_eq!(token.state(), ViewState::Revoked);
        assert_eq!(view.state(), ViewState::Revoked);
    }

    #[test]
    fn test_revoking_one_view_leaves_others() {
        let record = Record::new().with("name", "ok");
        let (first, first_token) = create_revocable(record.clone(), AccessPolicy::default());
        let (second, _second_token) = create_revocable(record, AccessPolicy::default());

        first_token.revoke();

        assert!(first.read("name").unwrap_err().is_revoked());
        assert_eq!(second.read("name").unwrap(), Some(json!("ok")));
    }
}
