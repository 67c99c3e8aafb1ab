use pamsync_application::CreateAccountInput;
use pamsync_core::{AppError, NonEmptyString};
use pamsync_domain::{
    Account, AccountAttribute, AttributeChange, ChangeOp, Entitlement, EntitlementType,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Envelope posted by the host for every command.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub input: Value,
}

/// Parsed connector command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TestConnection,
    ListAccounts,
    ReadAccount {
        identity: String,
    },
    CreateAccount(CreateAccountInput),
    UpdateAccount {
        identity: String,
        changes: Vec<AttributeChange>,
    },
    ListEntitlements(EntitlementType),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TestConnection => "std:test-connection",
            Self::ListAccounts => "std:account:list",
            Self::ReadAccount { .. } => "std:account:read",
            Self::CreateAccount(_) => "std:account:create",
            Self::UpdateAccount { .. } => "std:account:update",
            Self::ListEntitlements(_) => "std:entitlement:list",
        }
    }
}

/// A single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdentityInput {
    identity: String,
}

#[derive(Debug, Deserialize)]
struct CreateAccountRequest {
    attributes: CreateAccountAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountAttributes {
    user_name: String,
    #[serde(default)]
    groups: Option<OneOrMany>,
    #[serde(default)]
    safe_roles: Option<OneOrMany>,
    #[serde(default)]
    safe_rights: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
struct UpdateAccountRequest {
    identity: String,
    #[serde(default)]
    changes: Vec<AttributeChangeRequest>,
}

#[derive(Debug, Deserialize)]
struct AttributeChangeRequest {
    op: String,
    attribute: String,
    value: OneOrMany,
}

#[derive(Debug, Deserialize)]
struct EntitlementListInput {
    #[serde(rename = "type")]
    entitlement_type: String,
}

fn parse_input<T>(command_type: &str, input: Value) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(input).map_err(|error| {
        AppError::Validation(format!("invalid input for '{command_type}': {error}"))
    })
}

impl TryFrom<CommandRequest> for Command {
    type Error = AppError;

    fn try_from(request: CommandRequest) -> Result<Self, Self::Error> {
        let CommandRequest {
            command_type,
            input,
        } = request;

        match command_type.as_str() {
            "std:test-connection" => Ok(Self::TestConnection),
            "std:account:list" => Ok(Self::ListAccounts),
            "std:account:read" => {
                let input: IdentityInput = parse_input(&command_type, input)?;
                Ok(Self::ReadAccount {
                    identity: input.identity,
                })
            }
            "std:account:create" => {
                let request: CreateAccountRequest = parse_input(&command_type, input)?;
                let attributes = request.attributes;
                Ok(Self::CreateAccount(CreateAccountInput {
                    user_name: NonEmptyString::new(attributes.user_name)?,
                    groups: attributes
                        .groups
                        .map(OneOrMany::into_vec)
                        .unwrap_or_default(),
                    safe_roles: attributes
                        .safe_roles
                        .map(OneOrMany::into_vec)
                        .unwrap_or_default(),
                    safe_rights: attributes
                        .safe_rights
                        .map(OneOrMany::into_vec)
                        .unwrap_or_default(),
                }))
            }
            "std:account:update" => {
                let request: UpdateAccountRequest = parse_input(&command_type, input)?;
                let mut changes = Vec::new();
                for change in request.changes {
                    let op = change.op.parse::<ChangeOp>()?;
                    let attribute = AccountAttribute::parse(change.attribute.as_str());
                    changes.extend(change.value.into_vec().into_iter().map(|value| {
                        AttributeChange {
                            op,
                            attribute: attribute.clone(),
                            value,
                        }
                    }));
                }

                Ok(Self::UpdateAccount {
                    identity: request.identity,
                    changes,
                })
            }
            "std:entitlement:list" => {
                let input: EntitlementListInput = parse_input(&command_type, input)?;
                Ok(Self::ListEntitlements(input.entitlement_type.parse()?))
            }
            other => Err(AppError::UnsupportedOperation(format!(
                "unknown command '{other}'"
            ))),
        }
    }
}

/// Account attributes as reported to the host.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributesResponse {
    pub id: String,
    pub user_name: String,
    pub active: bool,
    pub groups: Vec<String>,
    pub safe_roles: Vec<String>,
    pub safe_rights: Vec<String>,
}

/// Account entity emitted by account commands.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub identity: String,
    pub uuid: String,
    pub disabled: bool,
    pub attributes: AccountAttributesResponse,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            identity: account.identity().to_owned(),
            uuid: account.uuid().to_owned(),
            disabled: account.disabled(),
            attributes: AccountAttributesResponse {
                id: account.identity().to_owned(),
                user_name: account.user_name().to_owned(),
                active: account.active(),
                groups: account.groups().to_vec(),
                safe_roles: account.safe_roles().to_vec(),
                safe_rights: account.safe_rights().to_vec(),
            },
        }
    }
}

/// Entitlement attributes as reported to the host.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementAttributesResponse {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
}

/// Entitlement entity emitted by entitlement aggregation.
#[derive(Debug, Serialize)]
pub struct EntitlementResponse {
    pub identity: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub entitlement_type: &'static str,
    pub attributes: EntitlementAttributesResponse,
}

impl From<Entitlement> for EntitlementResponse {
    fn from(entitlement: Entitlement) -> Self {
        Self {
            identity: entitlement.identity().to_owned(),
            uuid: entitlement.display_name().to_owned(),
            entitlement_type: entitlement.entitlement_type().as_str(),
            attributes: EntitlementAttributesResponse {
                id: entitlement.identity().to_owned(),
                display_name: entitlement.display_name().to_owned(),
                description: entitlement.description().map(str::to_owned),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pamsync_core::AppError;
    use pamsync_domain::{AccountAttribute, ChangeOp, EntitlementType};
    use serde_json::json;

    use super::{Command, CommandRequest};

    fn parse(value: serde_json::Value) -> Result<Command, AppError> {
        let request: CommandRequest = serde_json::from_value(value)
            .unwrap_or_else(|error| panic!("envelope should decode: {error}"));
        Command::try_from(request)
    }

    #[test]
    fn test_connection_ignores_input() {
        let command = parse(json!({"type": "std:test-connection", "input": {}}))
            .unwrap_or_else(|error| panic!("command should parse: {error}"));

        assert_eq!(command, Command::TestConnection);
    }

    #[test]
    fn create_accepts_single_values_and_lists() {
        let command = parse(json!({
            "type": "std:account:create",
            "input": {"attributes": {
                "userName": "ana@example.com",
                "groups": "g1",
                "safeRoles": ["Finance - Viewer", "HR - Viewer"]
            }}
        }))
        .unwrap_or_else(|error| panic!("command should parse: {error}"));

        let Command::CreateAccount(input) = command else {
            panic!("expected create command");
        };
        assert_eq!(input.user_name.as_str(), "ana@example.com");
        assert_eq!(input.groups, vec!["g1".to_owned()]);
        assert_eq!(input.safe_roles.len(), 2);
        assert!(input.safe_rights.is_empty());
    }

    #[test]
    fn create_requires_user_name() {
        let result = parse(json!({
            "type": "std:account:create",
            "input": {"attributes": {"userName": "  "}}
        }));

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn update_expands_list_values_into_separate_changes() {
        let command = parse(json!({
            "type": "std:account:update",
            "input": {
                "identity": "u1",
                "changes": [
                    {"op": "Add", "attribute": "safeRights", "value": ["Finance - UseContent", "Finance - ListContent"]},
                    {"op": "Remove", "attribute": "groups", "value": "g1"}
                ]
            }
        }))
        .unwrap_or_else(|error| panic!("command should parse: {error}"));

        let Command::UpdateAccount { identity, changes } = command else {
            panic!("expected update command");
        };
        assert_eq!(identity, "u1");
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].attribute, AccountAttribute::SafeRights);
        assert_eq!(changes[2].op, ChangeOp::Remove);
        assert_eq!(changes[2].value, "g1");
    }

    #[test]
    fn update_with_unknown_op_is_unsupported() {
        let result = parse(json!({
            "type": "std:account:update",
            "input": {"identity": "u1", "changes": [{"op": "Merge", "attribute": "groups", "value": "g1"}]}
        }));

        assert!(matches!(result, Err(AppError::UnsupportedOperation(_))));
    }

    #[test]
    fn entitlement_list_parses_type() {
        let command = parse(json!({"type": "std:entitlement:list", "input": {"type": "safeRole"}}))
            .unwrap_or_else(|error| panic!("command should parse: {error}"));

        assert_eq!(command, Command::ListEntitlements(EntitlementType::SafeRole));
    }

    #[test]
    fn unknown_command_is_unsupported() {
        let result = parse(json!({"type": "std:account:delete", "input": {}}));

        assert!(matches!(result, Err(AppError::UnsupportedOperation(_))));
    }
}
