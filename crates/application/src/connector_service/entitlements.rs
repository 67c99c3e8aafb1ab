use super::*;

impl ConnectorService {
    /// Streams all entitlements of one type.
    ///
    /// Safe roles and safe rights are synthesized for every safe and every
    /// catalog entry; they are not stored upstream.
    pub async fn list_entitlements(
        &self,
        entitlement_type: EntitlementType,
        sink: &mut dyn OutputSink<Entitlement>,
    ) -> AppResult<()> {
        info!(
            entitlement_type = entitlement_type.as_str(),
            "aggregating entitlements"
        );

        match entitlement_type {
            EntitlementType::Group => {
                for record in self.gateway.list_groups().await? {
                    let description = self
                        .gateway
                        .find_role_description(record.id.as_str())
                        .await?;
                    sink.send(Entitlement::Group(Group::from_record(record, description)))
                        .await?;
                }
            }
            EntitlementType::SafeRole => {
                for safe in self.gateway.list_safes().await? {
                    for role in self.catalog.roles() {
                        sink.send(Entitlement::SafeRole(SafeEntitlement::for_role(
                            safe.id.as_str(),
                            role,
                        )))
                        .await?;
                    }
                }
            }
            EntitlementType::SafeRight => {
                for safe in self.gateway.list_safes().await? {
                    for right in self.catalog.rights() {
                        sink.send(Entitlement::SafeRight(SafeEntitlement::for_right(
                            safe.id.as_str(),
                            right,
                        )))
                        .await?;
                    }
                }
            }
        }

        Ok(())
    }
}
