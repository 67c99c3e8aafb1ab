//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod account;
mod catalog;
mod change;
mod entitlement;
mod filter;
mod label;
mod reconciler;
mod records;

pub use account::Account;
pub use catalog::{SafeCatalog, SafeRightDefinition, SafeRoleDefinition, same_rights_set};
pub use change::{AccountAttribute, AttributeChange, ChangeOp, GroupMembershipPatch};
pub use entitlement::{Entitlement, EntitlementType, Group, SafeEntitlement};
pub use filter::{AccountFilter, SafePermissionFilter, directory_user_query};
pub use label::{SAFE_LABEL_SEPARATOR, SafeLabel};
pub use reconciler::{PermissionReconciler, SafeLabels};
pub use records::{
    AccountRecord, GrantMutation, GrantPayload, GroupRecord, SafePermissionGrant, SafeRecord,
};
