//! Audit record construction.

use hookwork_audit::{AuditError, AuditOperation, AuditRecord};
use hookwork_core::{Action, TenantId};

/// Build the audit record for a committed mutation.
///
/// `subject` is the action as committed, or for deletes the action that
/// was removed. `before` is the prior state for updates.
pub(crate) fn build_audit_record(
    operation: AuditOperation,
    tenant: &TenantId,
    subject: &Action,
    before: Option<&Action>,
) -> Result<AuditRecord, AuditError> {
    if operation == AuditOperation::Delete {
        return AuditRecord::deleted(tenant, subject);
    }
    let record = AuditRecord::new(operation, tenant, subject)?;
    match before {
        Some(before) => record.with_before(before),
        None => Ok(record),
    }
}
