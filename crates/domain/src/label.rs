use std::fmt::{Display, Formatter};

use pamsync_core::{AppError, AppResult};

/// Separator between the safe id and the role or right name in a label.
pub const SAFE_LABEL_SEPARATOR: &str = " - ";

/// A `"{safeId} - {name}"` label naming a safe role or safe right on one safe.
///
/// The label is split at the first separator, so safe ids containing
/// `" - "` cannot be addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeLabel {
    safe_id: String,
    name: String,
}

impl SafeLabel {
    /// Creates a label from its parts.
    #[must_use]
    pub fn new(safe_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            safe_id: safe_id.into(),
            name: name.into(),
        }
    }

    /// Parses a label received from the governance platform.
    pub fn parse(value: &str) -> AppResult<Self> {
        let (safe_id, name) = value.split_once(SAFE_LABEL_SEPARATOR).ok_or_else(|| {
            AppError::Validation(format!(
                "safe label '{value}' must have the form '<safe id>{SAFE_LABEL_SEPARATOR}<name>'"
            ))
        })?;

        if safe_id.is_empty() || name.is_empty() {
            return Err(AppError::Validation(format!(
                "safe label '{value}' has an empty safe id or name"
            )));
        }

        Ok(Self::new(safe_id, name))
    }

    /// Returns the safe (container) identifier.
    #[must_use]
    pub fn safe_id(&self) -> &str {
        self.safe_id.as_str()
    }

    /// Returns the role or right name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl Display for SafeLabel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}{SAFE_LABEL_SEPARATOR}{}",
            self.safe_id, self.name
        )
    }
}
