//! Access-controlled views.
//!
//! An [`AccessControlledView`] mediates every structural operation on a
//! [`Record`]. Keys the [`AccessPolicy`] marks private cannot be read,
//! written, deleted or defined through the view, are reported absent by
//! [`contains`](AccessControlledView::contains) and are left out of
//! enumeration. Everything else is forwarded live to the record.
//!
//! Revocable views additionally share a flag with a
//! [`RevocationToken`](crate::revocable::RevocationToken); once it is set
//! every operation fails with [`ViewError::ViewRevoked`].

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::audit::{AccessOutcome, AuditLog};
use crate::config::ViewConfig;
use crate::descriptor::PropertyDescriptor;
use crate::error::{Result, ViewError};
use crate::id::ViewId;
use crate::key::PropertyKey;
use crate::operation::Operation;
use crate::policy::AccessPolicy;
use crate::record::Record;
use crate::registry::Lease;
use crate::revocable::RevocationToken;

/// Lifecycle of a view. `Revoked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewState {
    Active,
    Revoked,
}

/// The revoked flag shared by a view and its token.
#[derive(Debug, Default)]
pub(crate) struct RevocationFlag {
    revoked: AtomicBool,
}

impl RevocationFlag {
    /// Set the flag. Returns `true` only for the call that flipped it.
    pub(crate) fn revoke(&self, view_id: ViewId) -> bool {
        let flipped = !self.revoked.swap(true, Ordering::SeqCst);
        if flipped {
            info!(view_id = %view_id, "view revoked");
        }
        flipped
    }

    pub(crate) fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Tripwire {
    limit: u32,
    denials: AtomicU32,
}

/// A view over a record that hides private keys.
#[derive(Debug)]
pub struct AccessControlledView {
    id: ViewId,
    record: Record,
    policy: AccessPolicy,
    revocation: Option<Arc<RevocationFlag>>,
    audit: Option<AuditLog>,
    tripwire: Option<Tripwire>,
    _lease: Option<Lease>,
}

impl AccessControlledView {
    /// Create a non-revocable view.
    pub fn new(record: Record, policy: AccessPolicy) -> Self {
        ViewBuilder::new(record).policy(policy).build()
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Whether this view has a paired revocation token.
    pub fn is_revocable(&self) -> bool {
        self.revocation.is_some()
    }

    pub fn state(&self) -> ViewState {
        if self.is_revoked() {
            ViewState::Revoked
        } else {
            ViewState::Active
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revocation
            .as_ref()
            .is_some_and(|flag| flag.is_revoked())
    }

    /// Bind this view to a registry entry released when the view drops.
    pub(crate) fn attach_lease(&mut self, lease: Lease) {
        self._lease = Some(lease);
    }

    /// Read `key`. An absent public key yields `Ok(None)`.
    pub fn read(&self, key: impl Into<PropertyKey>) -> Result<Option<Value>> {
        let key = key.into();
        self.admit(Operation::Get, &key)?;
        Ok(self.record.get(key))
    }

    /// Assign `value` to `key` on the record.
    pub fn write(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        self.admit(Operation::Set, &key)?;
        self.record.set(key, value)
    }

    /// Check if `key` is present. Private keys are always reported absent;
    /// this never fails on privacy grounds.
    pub fn contains(&self, key: impl Into<PropertyKey>) -> Result<bool> {
        let key = key.into();
        self.check_revoked(Operation::Has, Some(&key))?;

        if self.policy.is_private(&key) {
            self.note_denial(Operation::Has, &key);
            return Ok(false);
        }

        self.audit(Operation::Has, Some(&key), AccessOutcome::Permitted);
        Ok(self.record.has(key))
    }

    /// Delete `key` from the record. Returns whether a property was removed.
    pub fn remove(&self, key: impl Into<PropertyKey>) -> Result<bool> {
        let key = key.into();
        self.admit(Operation::DeleteProperty, &key)?;
        self.record.delete(key)
    }

    /// Define `key` on the record from a descriptor.
    pub fn define(
        &self,
        key: impl Into<PropertyKey>,
        descriptor: &PropertyDescriptor,
    ) -> Result<()> {
        let key = key.into();
        self.admit(Operation::DefineProperty, &key)?;
        self.record.define_property(key, descriptor)
    }

    /// Every public key in the record's natural order, symbols included.
    pub fn list_keys(&self) -> Result<Vec<PropertyKey>> {
        self.check_revoked(Operation::OwnKeys, None)?;
        self.audit(Operation::OwnKeys, None, AccessOutcome::Permitted);

        Ok(self
            .record
            .own_keys()
            .into_iter()
            .filter(|key| !self.policy.is_private(key))
            .collect())
    }

    /// Enumerable public name keys in natural order.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.check_revoked(Operation::OwnKeys, None)?;
        self.audit(Operation::OwnKeys, None, AccessOutcome::Permitted);

        Ok(self
            .record
            .keys()
            .into_iter()
            .filter(|name| !self.policy.is_private_name(name))
            .collect())
    }

    /// Own-property check that is not filtered by the policy.
    ///
    /// Unlike [`contains`](Self::contains), this reports private keys that
    /// exist as present. Values are still only reachable through `read`.
    pub fn has_own(&self, key: impl Into<PropertyKey>) -> Result<bool> {
        let key = key.into();
        self.check_revoked(Operation::GetOwnPropertyDescriptor, Some(&key))?;
        self.audit(
            Operation::GetOwnPropertyDescriptor,
            Some(&key),
            AccessOutcome::Permitted,
        );
        Ok(self.record.has_own_property(key))
    }

    /// Revocation and privacy checks shared by the failing operations.
    fn admit(&self, operation: Operation, key: &PropertyKey) -> Result<()> {
        self.check_revoked(operation, Some(key))?;

        if self.policy.is_private(key) {
            self.note_denial(operation, key);
            return Err(ViewError::PropertyInaccessible {
                key: key.clone(),
                operation,
            });
        }

        debug!(view_id = %self.id, %operation, %key, "forwarding to record");
        self.audit(operation, Some(key), AccessOutcome::Permitted);
        Ok(())
    }

    fn check_revoked(&self, operation: Operation, key: Option<&PropertyKey>) -> Result<()> {
        if self.is_revoked() {
            debug!(view_id = %self.id, %operation, "rejected by revoked view");
            self.audit(operation, key, AccessOutcome::Revoked);
            return Err(ViewError::ViewRevoked { operation });
        }
        Ok(())
    }

    fn note_denial(&self, operation: Operation, key: &PropertyKey) {
        warn!(view_id = %self.id, %operation, %key, "private property access denied");
        self.audit(operation, Some(key), AccessOutcome::Denied);

        let (Some(tripwire), Some(flag)) = (&self.tripwire, &self.revocation) else {
            return;
        };
        let denials = tripwire.denials.fetch_add(1, Ordering::SeqCst) + 1;
        if denials >= tripwire.limit && flag.revoke(self.id) {
            warn!(view_id = %self.id, denials, "tripwire revoked view");
        }
    }

    fn audit(&self, operation: Operation, key: Option<&PropertyKey>, outcome: AccessOutcome) {
        if let Some(log) = &self.audit {
            log.log_access(self.id, operation, key, outcome);
        }
    }
}

/// Builder for views with optional auditing and tripwire.
#[derive(Debug)]
pub struct ViewBuilder {
    record: Record,
    policy: AccessPolicy,
    audit: Option<AuditLog>,
    revoke_after: Option<u32>,
}

impl ViewBuilder {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            policy: AccessPolicy::default(),
            audit: None,
            revoke_after: None,
        }
    }

    /// Start from a config: its marker policy, a fresh audit log sized by
    /// `audit_capacity` and its tripwire threshold.
    pub fn from_config(record: Record, config: &ViewConfig) -> Self {
        Self {
            record,
            policy: config.policy(),
            audit: Some(AuditLog::new(config.audit_capacity)),
            revoke_after: config.revoke_after,
        }
    }

    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Record access attempts in `log`. A log may be shared by many views.
    pub fn audit(mut self, log: AuditLog) -> Self {
        self.audit = Some(log);
        self
    }

    /// Revoke the view after `limit` denied private-key accesses. Only
    /// takes effect for revocable views.
    pub fn revoke_after(mut self, limit: u32) -> Self {
        self.revoke_after = Some(limit);
        self
    }

    /// Build a view that can never be revoked.
    pub fn build(self) -> AccessControlledView {
        self.assemble(None)
    }

    /// Build a view paired with its revocation token.
    pub fn build_revocable(self) -> (AccessControlledView, RevocationToken) {
        let flag = Arc::new(RevocationFlag::default());
        let view = self.assemble(Some(Arc::clone(&flag)));
        let token = RevocationToken::new(view.id, flag);
        (view, token)
    }

    fn assemble(self, revocation: Option<Arc<RevocationFlag>>) -> AccessControlledView {
        let tripwire = match (&revocation, self.revoke_after) {
            (Some(_), Some(limit)) => Some(Tripwire {
                limit,
                denials: AtomicU32::new(0),
            }),
            _ => None,
        };

        let view = AccessControlledView {
            id: ViewId::new(),
            record: self.record,
            policy: self.policy,
            revocation,
            audit: self.audit,
            tripwire,
            _lease: None,
        };
        debug!(view_id = %view.id, policy = view.policy.description(), "view created");
        view
    }
}
