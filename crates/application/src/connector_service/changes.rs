use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SafeChange {
    AddRole,
    AddRight,
    RemoveRole,
    RemoveRight,
}

impl ConnectorService {
    /// Routes one attribute change to the matching PAM calls.
    pub async fn apply_change(&self, account_id: &str, change: &AttributeChange) -> AppResult<()> {
        let safe_change = match (change.op, &change.attribute) {
            (ChangeOp::Set, _) => {
                return Err(AppError::UnsupportedOperation(change.op.to_string()));
            }
            (op, AccountAttribute::Groups) => {
                return self
                    .change_group_membership(op, account_id, change.value.as_str())
                    .await;
            }
            (_, AccountAttribute::Other(name)) => {
                warn!(
                    account_id = %account_id,
                    attribute = %name,
                    "ignoring change to unmanaged attribute"
                );
                return Ok(());
            }
            (ChangeOp::Add, AccountAttribute::SafeRoles) => SafeChange::AddRole,
            (ChangeOp::Add, AccountAttribute::SafeRights) => SafeChange::AddRight,
            (ChangeOp::Remove, AccountAttribute::SafeRoles) => SafeChange::RemoveRole,
            (ChangeOp::Remove, AccountAttribute::SafeRights) => SafeChange::RemoveRight,
        };

        self.change_safe_permission(safe_change, account_id, change.value.as_str())
            .await
    }

    async fn change_group_membership(
        &self,
        op: ChangeOp,
        account_id: &str,
        group_id: &str,
    ) -> AppResult<()> {
        let patch = match op {
            ChangeOp::Add => GroupMembershipPatch::AddMember {
                user_id: account_id.to_owned(),
            },
            ChangeOp::Remove => GroupMembershipPatch::RemoveMember {
                user_id: account_id.to_owned(),
            },
            ChangeOp::Set => return Err(AppError::UnsupportedOperation(op.to_string())),
        };

        debug!(
            account_id = %account_id,
            group_id = %group_id,
            op = patch.op(),
            "patching group membership"
        );
        self.gateway.update_group_membership(group_id, &patch).await
    }

    async fn change_safe_permission(
        &self,
        safe_change: SafeChange,
        account_id: &str,
        value: &str,
    ) -> AppResult<()> {
        let label = SafeLabel::parse(value)?;
        let grants = self
            .gateway
            .find_safe_permissions(&SafePermissionFilter::UserOnSafe {
                user_id: account_id.to_owned(),
                safe_id: label.safe_id().to_owned(),
            })
            .await?;
        let existing = grants.first();
        let reconciler = self.reconciler();

        let mutation = match safe_change {
            SafeChange::AddRole => Some(reconciler.plan_add_role(account_id, &label, existing)?),
            SafeChange::AddRight => Some(reconciler.plan_add_right(account_id, &label, existing)),
            SafeChange::RemoveRole => reconciler.plan_remove_role(account_id, &label, existing)?,
            SafeChange::RemoveRight => {
                Some(reconciler.plan_remove_right(account_id, &label, existing)?)
            }
        };

        let Some(mutation) = mutation else {
            warn!(
                account_id = %account_id,
                safe_id = %label.safe_id(),
                "no safe roles configured; leaving grant unchanged"
            );
            return Ok(());
        };

        debug!(
            account_id = %account_id,
            safe_id = %label.safe_id(),
            mutation = mutation.verb(),
            "applying safe permission change"
        );
        self.gateway.apply_grant_mutation(&mutation).await
    }
}
