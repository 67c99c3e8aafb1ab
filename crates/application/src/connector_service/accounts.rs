use super::*;

impl ConnectorService {
    /// Streams every account with its groups and reconciled safe labels.
    ///
    /// Grants are fetched once for the whole tenant and joined in memory.
    pub async fn list_accounts(&self, sink: &mut dyn OutputSink<Account>) -> AppResult<()> {
        let records = self.gateway.list_accounts(None).await?;
        let grants = self.gateway.list_safe_permissions().await?;
        let reconciler = self.reconciler();

        info!(
            account_count = records.len(),
            grant_count = grants.len(),
            "aggregating accounts"
        );

        for record in records {
            let labels = reconciler.labels_for(
                grants
                    .iter()
                    .filter(|grant| grant.belongs_to(record.id.as_str())),
            );
            sink.send(Account::from_record(record, labels)).await?;
        }

        Ok(())
    }

    /// Reads one account by identity.
    pub async fn read_account(&self, account_id: &str) -> AppResult<Account> {
        let record = self.gateway.get_account(account_id).await?;
        let grants = self
            .gateway
            .find_safe_permissions(&SafePermissionFilter::UserDisplay(
                record.user_name.clone(),
            ))
            .await?;
        // The display filter is a name match; keep only grants bound to this id.
        let labels = self.reconciler().labels_for(
            grants
                .iter()
                .filter(|grant| grant.belongs_to(record.id.as_str())),
        );

        Ok(Account::from_record(record, labels))
    }

    /// Provisions an account, then grants the requested entitlements.
    ///
    /// An account that already exists under the same user name is reused
    /// and no invite is sent.
    pub async fn create_account(&self, input: CreateAccountInput) -> AppResult<Account> {
        let user_name = input.user_name.as_str();
        let existing = self
            .gateway
            .list_accounts(Some(&AccountFilter::UserName(user_name.to_owned())))
            .await?;

        let account_id = match existing.into_iter().next() {
            Some(record) => {
                info!(
                    user_name = %user_name,
                    account_id = %record.id,
                    "account already exists; skipping invite"
                );
                record.id
            }
            None => {
                let directory_user_id = self
                    .gateway
                    .resolve_directory_user(user_name)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "directory user '{user_name}' was not found"
                        ))
                    })?;
                self.gateway
                    .invite_user(directory_user_id.as_str(), user_name)
                    .await?;
                info!(
                    user_name = %user_name,
                    account_id = %directory_user_id,
                    "invited directory user"
                );
                directory_user_id
            }
        };

        let changes = input
            .groups
            .into_iter()
            .map(|group| AttributeChange::add(AccountAttribute::Groups, group))
            .chain(
                input
                    .safe_roles
                    .into_iter()
                    .map(|role| AttributeChange::add(AccountAttribute::SafeRoles, role)),
            )
            .chain(
                input
                    .safe_rights
                    .into_iter()
                    .map(|right| AttributeChange::add(AccountAttribute::SafeRights, right)),
            );

        for change in changes {
            self.apply_change(account_id.as_str(), &change).await?;
        }

        self.read_account(account_id.as_str()).await
    }

    /// Applies attribute changes in order and returns the refreshed account.
    ///
    /// The first failure aborts the remaining changes; earlier calls are not
    /// rolled back.
    pub async fn update_account(
        &self,
        account_id: &str,
        changes: &[AttributeChange],
    ) -> AppResult<Account> {
        for change in changes {
            self.apply_change(account_id, change).await?;
        }

        self.read_account(account_id).await
    }
}
