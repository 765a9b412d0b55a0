//! View registry.
//!
//! Hands out revocable views over one shared record while keeping their
//! tokens, so that access can later be withdrawn by view id alone.
//!
//! An entry lives as long as its view is alive and unrevoked. Dropping an
//! issued view releases its token and its audit entries; tokens of views
//! revoked some other way (the tripwire, a cloned token) are swept on the
//! next `issue` or `len`.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::debug;

use crate::audit::AuditLog;
use crate::config::ViewConfig;
use crate::id::ViewId;
use crate::policy::AccessPolicy;
use crate::record::Record;
use crate::revocable::RevocationToken;
use crate::view::{AccessControlledView, ViewBuilder};

type Tokens = DashMap<ViewId, RevocationToken>;

/// Releases a view's registry entry when the view is dropped.
#[derive(Debug)]
pub(crate) struct Lease {
    view_id: ViewId,
    tokens: Weak<Tokens>,
    audit: Option<AuditLog>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(tokens) = self.tokens.upgrade() {
            if tokens.remove(&self.view_id).is_some() {
                debug!(view_id = %self.view_id, "issued view dropped");
            }
        }
        if let Some(log) = &self.audit {
            log.clear_entries(&self.view_id);
        }
    }
}

/// Issues revocable views and retains their tokens.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    record: Record,
    policy: AccessPolicy,
    audit: Option<AuditLog>,
    revoke_after: Option<u32>,
    tokens: Arc<Tokens>,
}

impl ViewRegistry {
    pub fn new(record: Record, policy: AccessPolicy) -> Self {
        Self {
            record,
            policy,
            audit: None,
            revoke_after: None,
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Issued views share one audit log sized by the config.
    pub fn from_config(record: Record, config: &ViewConfig) -> Self {
        Self {
            record,
            policy: config.policy(),
            audit: Some(AuditLog::new(config.audit_capacity)),
            revoke_after: config.revoke_after,
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Issue a new view over the shared record.
    pub fn issue(&self) -> AccessControlledView {
        let mut builder = ViewBuilder::new(self.record.clone()).policy(self.policy.clone());
        if let Some(log) = &self.audit {
            builder = builder.audit(log.clone());
        }
        if let Some(limit) = self.revoke_after {
            builder = builder.revoke_after(limit);
        }

        self.sweep();

        let (mut view, token) = builder.build_revocable();
        view.attach_lease(Lease {
            view_id: view.id(),
            tokens: Arc::downgrade(&self.tokens),
            audit: self.audit.clone(),
        });
        debug!(view_id = %view.id(), "view issued");
        self.tokens.insert(view.id(), token);
        view
    }

    /// Revoke and forget a view, dropping its audit entries. Returns `false`
    /// for unknown or already released ids.
    pub fn revoke(&self, view_id: &ViewId) -> bool {
        match self.tokens.remove(view_id) {
            Some((_, token)) => {
                token.revoke();
                if let Some(log) = &self.audit {
                    log.clear_entries(view_id);
                }
                true
            }
            None => false,
        }
    }

    /// Revoke and forget every issued view. Returns how many were revoked.
    pub fn revoke_all(&self) -> usize {
        let ids: Vec<ViewId> = self.tokens.iter().map(|entry| *entry.key()).collect();
        ids.iter().filter(|id| self.revoke(id)).count()
    }

    /// Check if a view is issued, alive and not revoked.
    pub fn is_issued(&self, view_id: &ViewId) -> bool {
        self.tokens
            .get(view_id)
            .is_some_and(|token| !token.is_revoked())
    }

    pub fn audit(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    /// Number of live, unrevoked views.
    pub fn len(&self) -> usize {
        self.sweep();
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Audit entries of swept views stay until the view itself drops.
    fn sweep(&self) {
        self.tokens.retain(|_, token| !token.is_revoked());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AccessOutcome;
    use serde_json::json;

    #[test]
    fn test_issue_and_revoke() {
        let storage = Record::new();
        let registry = ViewRegistry::new(storage.clone(), AccessPolicy::default());

        let view = registry.issue();
        assert!(registry.is_issued(&view.id()));
        assert_eq!(registry.len(), 1);

        view.write("item", 1).unwrap();
        assert_eq!(storage.get("item"), Some(json!(1)));

        assert!(registry.revoke(&view.id()));
        assert!(!registry.revoke(&view.id()));
        assert!(!registry.is_issued(&view.id()));
        assert!(registry.is_empty());
        assert!(view.read("item").unwrap_err().is_revoked());
    }

    #[test]
    fn test_revoke_all() {
        let registry = ViewRegistry::new(Record::new(), AccessPolicy::default());
        let views: Vec<_> = (0..3).map(|_| registry.issue()).collect();

        assert_eq!(registry.revoke_all(), 3);
        assert!(registry.is_empty());
        assert!(views.iter().all(|view| view.is_revoked()));
    }

    #[test]
    fn test_shared_audit_and_tripwire_from_config() {
        let config = ViewConfig {
            revoke_after: Some(1),
            ..ViewConfig::default()
        };
        let registry = ViewRegistry::from_config(Record::new().with("_key", 1), &config);

        let probing = registry.issue();
        let quiet = registry.issue();

        assert!(probing.read("_key").unwrap_err().is_inaccessible());
        assert!(probing.is_revoked());
        assert!(!quiet.is_revoked());

        let log = registry.audit().unwrap();
        assert_eq!(log.count(&probing.id(), AccessOutcome::Denied), 1);
        assert!(log.get_entries(&quiet.id()).is_empty());
    }

    #[test]
    fn test_dropped_and_tripped_views_are_released() {
        let config = ViewConfig {
            revoke_after: Some(1),
            ..ViewConfig::default()
        };
        let registry = ViewRegistry::from_config(Record::new().with("_key", 1), &config);

        for _ in 0..100 {
            let view = registry.issue();
            view.read("visible").unwrap();
        }
        assert!(registry.is_empty());

        let tripped = registry.issue();
        let kept = registry.issue();
        assert_eq!(registry.len(), 2);

        assert!(!tripped.contains("_key").unwrap());
        assert!(tripped.is_revoked());
        assert!(!registry.is_issued(&tripped.id()));
        assert!(registry.is_issued(&kept.id()));
        assert_eq!(registry.len(), 1);
        assert!(!registry.revoke(&tripped.id()));

        drop(kept);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_audit_entries_released_with_view() {
        let config = ViewConfig::default();
        let registry = ViewRegistry::from_config(Record::new().with("item", 1), &config);
        let log = registry.audit().unwrap().clone();

        let dropped = registry.issue();
        let dropped_id = dropped.id();
        dropped.read("item").unwrap();
        assert_eq!(log.get_entries(&dropped_id).len(), 1);
        drop(dropped);
        assert!(log.get_entries(&dropped_id).is_empty());

        let revoked = registry.issue();
        revoked.read("item").unwrap();
        assert!(registry.revoke(&revoked.id()));
        assert!(log.get_entries(&revoked.id()).is_empty());
    }

    #[test]
    fn test_view_outlives_registry() {
        let registry = ViewRegistry::new(Record::new(), AccessPolicy::default());
        let view = registry.issue();
        drop(registry);

        view.write("item", 1).unwrap();
        assert_eq!(view.read("item").unwrap(), Some(json!(1)));
        drop(view);
    }
}
