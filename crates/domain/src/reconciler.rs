//! Reconciliation between raw per-safe rights and configured safe roles.
//!
//! Forward: grants become `safeRoles` / `safeRights` labels. Reverse: a label
//! change plus the current grant on that safe becomes one [`GrantMutation`].

use pamsync_core::{AppError, AppResult};

use crate::catalog::SafeCatalog;
use crate::label::SafeLabel;
use crate::records::{GrantMutation, GrantPayload, SafePermissionGrant};

/// Labels derived from a user's grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeLabels {
    /// `"{safeId} - {roleName}"` for every grant matching a role exactly.
    pub safe_roles: Vec<String>,
    /// `"{safeId} - {right}"` for every right of every grant.
    pub safe_rights: Vec<String>,
}

/// Maps between grants and labels using a role catalog.
#[derive(Debug, Clone, Copy)]
pub struct PermissionReconciler<'a> {
    catalog: &'a SafeCatalog,
}

impl<'a> PermissionReconciler<'a> {
    /// Creates a reconciler over a catalog.
    #[must_use]
    pub fn new(catalog: &'a SafeCatalog) -> Self {
        Self { catalog }
    }

    /// Projects grants into role and right labels, in grant order.
    ///
    /// A grant contributes every right individually whether or not it also
    /// matches a role.
    #[must_use]
    pub fn labels_for<'g>(
        &self,
        grants: impl IntoIterator<Item = &'g SafePermissionGrant>,
    ) -> SafeLabels {
        let mut labels = SafeLabels::default();
        for grant in grants {
            for role in self.catalog.roles() {
                if role.matches_rights(&grant.rights) {
                    labels
                        .safe_roles
                        .push(SafeLabel::new(&grant.safe_id, role.name()).to_string());
                }
            }

            labels.safe_rights.extend(
                grant
                    .rights
                    .iter()
                    .map(|right| SafeLabel::new(&grant.safe_id, right).to_string()),
            );
        }

        labels
    }

    /// Plans granting a safe role.
    ///
    /// The role's full rights overwrite whatever the existing grant held.
    pub fn plan_add_role(
        &self,
        user_id: &str,
        label: &SafeLabel,
        existing: Option<&SafePermissionGrant>,
    ) -> AppResult<GrantMutation> {
        let role = self.catalog.find_role(label.name()).ok_or_else(|| {
            AppError::Validation(format!(
                "safe role '{}' is not defined in the connector configuration",
                label.name()
            ))
        })?;

        Ok(write_grant(
            existing,
            GrantPayload {
                user_id: user_id.to_owned(),
                safe_id: label.safe_id().to_owned(),
                rights: role.rights().to_vec(),
            },
        ))
    }

    /// Plans granting a single safe right on top of the existing rights.
    ///
    /// The right is appended without checking for duplicates.
    #[must_use]
    pub fn plan_add_right(
        &self,
        user_id: &str,
        label: &SafeLabel,
        existing: Option<&SafePermissionGrant>,
    ) -> GrantMutation {
        let mut rights = existing
            .map(|grant| grant.rights.clone())
            .unwrap_or_default();
        rights.push(label.name().to_owned());

        write_grant(
            existing,
            GrantPayload {
                user_id: user_id.to_owned(),
                safe_id: label.safe_id().to_owned(),
                rights,
            },
        )
    }

    /// Plans revoking a safe role.
    ///
    /// Every configured role is examined in order and the last one decides:
    /// an exact match deletes the grant, anything else replaces it with the
    /// grant's rights minus that role's rights. The role named by the label
    /// does not take part in the decision. Returns `None` when no roles are
    /// configured.
    pub fn plan_remove_role(
        &self,
        user_id: &str,
        label: &SafeLabel,
        existing: Option<&SafePermissionGrant>,
    ) -> AppResult<Option<GrantMutation>> {
        let grant = require_grant(user_id, label, existing)?;

        let mut planned = None;
        for role in self.catalog.roles() {
            planned = Some(if role.matches_rights(&grant.rights) {
                GrantMutation::Delete {
                    grant_id: grant.id.clone(),
                }
            } else {
                GrantMutation::Replace {
                    grant_id: grant.id.clone(),
                    payload: GrantPayload {
                        user_id: user_id.to_owned(),
                        safe_id: label.safe_id().to_owned(),
                        rights: grant
                            .rights
                            .iter()
                            .filter(|right| !role.contains_right(right))
                            .cloned()
                            .collect(),
                    },
                }
            });
        }

        Ok(planned)
    }

    /// Plans revoking a single safe right.
    ///
    /// Always replaces, even when no rights remain.
    pub fn plan_remove_right(
        &self,
        user_id: &str,
        label: &SafeLabel,
        existing: Option<&SafePermissionGrant>,
    ) -> AppResult<GrantMutation> {
        let grant = require_grant(user_id, label, existing)?;

        Ok(GrantMutation::Replace {
            grant_id: grant.id.clone(),
            payload: GrantPayload {
                user_id: user_id.to_owned(),
                safe_id: label.safe_id().to_owned(),
                rights: grant
                    .rights
                    .iter()
                    .filter(|right| right.as_str() != label.name())
                    .cloned()
                    .collect(),
            },
        })
    }
}

fn write_grant(existing: Option<&SafePermissionGrant>, payload: GrantPayload) -> GrantMutation {
    match existing {
        Some(grant) => GrantMutation::Replace {
            grant_id: grant.id.clone(),
            payload,
        },
        None => GrantMutation::Create(payload),
    }
}

fn require_grant<'g>(
    user_id: &str,
    label: &SafeLabel,
    existing: Option<&'g SafePermissionGrant>,
) -> AppResult<&'g SafePermissionGrant> {
    existing.ok_or_else(|| {
        AppError::NotFound(format!(
            "user '{user_id}' has no permission grant on safe '{}'",
            label.safe_id()
        ))
    })
}

#[cfg(test)]
mod tests {
    use pamsync_core::AppError;
    use proptest::prelude::*;

    use super::{PermissionReconciler, SafeLabels};
    use crate::catalog::{SafeCatalog, SafeRoleDefinition};
    use crate::label::SafeLabel;
    use crate::records::{GrantMutation, GrantPayload, SafePermissionGrant};

    fn rights(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    fn role(name: &str, values: &[&str]) -> SafeRoleDefinition {
        SafeRoleDefinition::new(name, None, rights(values))
            .unwrap_or_else(|error| panic!("role should be valid: {error}"))
    }

    fn grant(id: &str, safe_id: &str, values: &[&str]) -> SafePermissionGrant {
        SafePermissionGrant {
            id: id.to_owned(),
            user_id: "u-1".to_owned(),
            safe_id: safe_id.to_owned(),
            rights: rights(values),
        }
    }

    fn catalog(roles: Vec<SafeRoleDefinition>) -> SafeCatalog {
        SafeCatalog::new(roles, Vec::new())
    }

    #[test]
    fn labels_include_matching_role_and_every_right() {
        let catalog = catalog(vec![
            role("Admin", &["list", "use"]),
            role("Viewer", &["list"]),
        ]);
        let grants = vec![grant("g-1", "S1", &["use", "list"]), grant("g-2", "S2", &["list", "retrieve"])];

        let labels = PermissionReconciler::new(&catalog).labels_for(&grants);

        assert_eq!(
            labels,
            SafeLabels {
                safe_roles: vec!["S1 - Admin".to_owned()],
                safe_rights: vec![
                    "S1 - use".to_owned(),
                    "S1 - list".to_owned(),
                    "S2 - list".to_owned(),
                    "S2 - retrieve".to_owned(),
                ],
            }
        );
    }

    #[test]
    fn add_role_without_grant_creates_full_bundle() {
        let catalog = catalog(vec![role("Admin", &["list", "use"])]);
        let label = SafeLabel::new("S1", "Admin");

        let planned = PermissionReconciler::new(&catalog).plan_add_role("u-1", &label, None);

        assert_eq!(
            planned.ok(),
            Some(GrantMutation::Create(GrantPayload {
                user_id: "u-1".to_owned(),
                safe_id: "S1".to_owned(),
                rights: rights(&["list", "use"]),
            }))
        );
    }

    #[test]
    fn add_role_over_existing_grant_discards_prior_rights() {
        let catalog = catalog(vec![role("Admin", &["list", "use"])]);
        let label = SafeLabel::new("S1", "Admin");
        let existing = grant("g-1", "S1", &["retrieve"]);

        let planned =
            PermissionReconciler::new(&catalog).plan_add_role("u-1", &label, Some(&existing));

        assert_eq!(
            planned.ok(),
            Some(GrantMutation::Replace {
                grant_id: "g-1".to_owned(),
                payload: GrantPayload {
                    user_id: "u-1".to_owned(),
                    safe_id: "S1".to_owned(),
                    rights: rights(&["list", "use"]),
                },
            })
        );
    }

    #[test]
    fn add_unknown_role_is_rejected() {
        let catalog = catalog(vec![role("Admin", &["list", "use"])]);
        let label = SafeLabel::new("S1", "Auditor");

        let planned = PermissionReconciler::new(&catalog).plan_add_role("u-1", &label, None);

        assert!(matches!(planned, Err(AppError::Validation(_))));
    }

    #[test]
    fn add_right_appends_without_dedup() {
        let catalog = SafeCatalog::default();
        let label = SafeLabel::new("S1", "list");
        let existing = grant("g-1", "S1", &["list"]);

        let planned =
            PermissionReconciler::new(&catalog).plan_add_right("u-1", &label, Some(&existing));

        assert_eq!(
            planned,
            GrantMutation::Replace {
                grant_id: "g-1".to_owned(),
                payload: GrantPayload {
                    user_id: "u-1".to_owned(),
                    safe_id: "S1".to_owned(),
                    rights: rights(&["list", "list"]),
                },
            }
        );
    }

    #[test]
    fn remove_role_with_exact_match_deletes_grant() {
        let catalog = catalog(vec![role("Admin", &["list", "use"])]);
        let label = SafeLabel::new("S1", "Admin");
        let existing = grant("g-1", "S1", &["list", "use"]);

        let planned =
            PermissionReconciler::new(&catalog).plan_remove_role("u-1", &label, Some(&existing));

        assert_eq!(
            planned.ok().flatten(),
            Some(GrantMutation::Delete {
                grant_id: "g-1".to_owned()
            })
        );
    }

    #[test]
    fn remove_role_is_decided_by_last_configured_role() {
        let catalog = catalog(vec![
            role("Admin", &["list", "use"]),
            role("Auditor", &["audit"]),
        ]);
        let label = SafeLabel::new("S1", "Admin");
        let existing = grant("g-1", "S1", &["list", "use"]);

        let planned =
            PermissionReconciler::new(&catalog).plan_remove_role("u-1", &label, Some(&existing));

        assert_eq!(
            planned.ok().flatten(),
            Some(GrantMutation::Replace {
                grant_id: "g-1".to_owned(),
                payload: GrantPayload {
                    user_id: "u-1".to_owned(),
                    safe_id: "S1".to_owned(),
                    rights: rights(&["list", "use"]),
                },
            })
        );
    }

    #[test]
    fn remove_role_keeps_rights_outside_the_bundle() {
        let catalog = catalog(vec![role("Admin", &["list", "use"])]);
        let label = SafeLabel::new("S1", "Admin");
        let existing = grant("g-1", "S1", &["list", "use", "retrieve"]);

        let planned =
            PermissionReconciler::new(&catalog).plan_remove_role("u-1", &label, Some(&existing));

        assert!(matches!(
            planned,
            Ok(Some(GrantMutation::Replace { payload, .. })) if payload.rights == rights(&["retrieve"])
        ));
    }

    #[test]
    fn remove_role_without_grant_is_not_found() {
        let catalog = catalog(vec![role("Admin", &["list", "use"])]);
        let label = SafeLabel::new("S1", "Admin");

        let planned = PermissionReconciler::new(&catalog).plan_remove_role("u-1", &label, None);

        assert!(matches!(planned, Err(AppError::NotFound(_))));
    }

    #[test]
    fn remove_role_with_empty_catalog_plans_nothing() {
        let catalog = SafeCatalog::default();
        let label = SafeLabel::new("S1", "Admin");
        let existing = grant("g-1", "S1", &["list"]);

        let planned =
            PermissionReconciler::new(&catalog).plan_remove_role("u-1", &label, Some(&existing));

        assert!(matches!(planned, Ok(None)));
    }

    #[test]
    fn remove_last_right_replaces_with_empty_rights() {
        let catalog = SafeCatalog::default();
        let reconciler = PermissionReconciler::new(&catalog);
        let label = SafeLabel::new("X", "read");

        let added = reconciler.plan_add_right("u-1", &label, None);
        let created = match added {
            GrantMutation::Create(payload) => SafePermissionGrant {
                id: "g-9".to_owned(),
                user_id: payload.user_id,
                safe_id: payload.safe_id,
                rights: payload.rights,
            },
            other => panic!("expected create, got {other:?}"),
        };
        let removed = reconciler.plan_remove_right("u-1", &label, Some(&created));

        assert_eq!(
            removed.ok(),
            Some(GrantMutation::Replace {
                grant_id: "g-9".to_owned(),
                payload: GrantPayload {
                    user_id: "u-1".to_owned(),
                    safe_id: "X".to_owned(),
                    rights: Vec::new(),
                },
            })
        );
    }

    fn right_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z]{1,6}", 1..6)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn role_label_emitted_iff_sets_are_equal(
            role_rights in right_names(),
            grant_rights in right_names(),
            reverse in any::<bool>(),
        ) {
            let mut grant_rights = grant_rights;
            if reverse {
                grant_rights.reverse();
            }
            let role = SafeRoleDefinition::new("Role", None, role_rights.clone())
                .unwrap_or_else(|error| panic!("role should be valid: {error}"));
            let catalog = SafeCatalog::new(vec![role], Vec::new());
            let grant = SafePermissionGrant {
                id: "g".to_owned(),
                user_id: "u".to_owned(),
                safe_id: "S".to_owned(),
                rights: grant_rights.clone(),
            };

            let labels = PermissionReconciler::new(&catalog).labels_for([&grant]);

            let mut sorted_role = role_rights;
            sorted_role.sort();
            let mut sorted_grant = grant_rights;
            sorted_grant.sort();
            prop_assert_eq!(
                labels.safe_roles.contains(&"S - Role".to_owned()),
                sorted_role == sorted_grant
            );
        }

        #[test]
        fn one_right_label_per_granted_right(grant_rights in right_names()) {
            let catalog = SafeCatalog::default();
            let grant = SafePermissionGrant {
                id: "g".to_owned(),
                user_id: "u".to_owned(),
                safe_id: "S".to_owned(),
                rights: grant_rights.clone(),
            };

            let labels = PermissionReconciler::new(&catalog).labels_for([&grant]);

            prop_assert_eq!(labels.safe_rights.len(), grant_rights.len());
            for (label, right) in labels.safe_rights.iter().zip(&grant_rights) {
                prop_assert_eq!(label, &format!("S - {right}"));
            }
        }
    }
}
