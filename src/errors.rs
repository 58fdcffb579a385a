// Copyright 2025 Cowboy AI, LLC.

//! Error types for asset lifecycle operations

use thiserror::Error;

/// Errors that can occur in lifecycle operations
///
/// Every failure surfaced by a command falls in one of four domain classes
/// (not found, conflict, invalid state, invalid value). `Persistence` is only
/// produced by the store when a commit cannot be applied, in which case no
/// staged write reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Id unresolved within the tenant scope, including cross-tenant ids
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity that wasn't found
        entity_type: String,
        /// ID that was searched for
        id: String,
    },

    /// A second active workflow of the same kind exists, or a uniqueness rule was hit
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transition requested from a state that does not permit it
    #[error("Invalid state: cannot {action} {entity_type} in state {state}")]
    InvalidState {
        /// Type of entity the transition was requested on
        entity_type: String,
        /// Current state of the entity
        state: String,
        /// Requested action
        action: String,
    },

    /// Value outside its permitted range, or an empty required field
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The store could not commit; all staged writes were discarded
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type for lifecycle operations
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Create a not found error for an entity type and id
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(
        entity_type: impl Into<String>,
        state: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        DomainError::InvalidState {
            entity_type: entity_type.into(),
            state: state.into(),
            action: action.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        DomainError::InvalidValue(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }

    /// Check if this is an invalid state error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, DomainError::InvalidState { .. })
    }

    /// Check if this is an invalid value error
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, DomainError::InvalidValue(_))
    }

    /// Check if this is a persistence error
    pub fn is_persistence(&self) -> bool {
        matches!(self, DomainError::Persistence(_))
    }
}

/// Reject an empty (or whitespace only) required text field
pub(crate) fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_value(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject a negative monetary amount
pub(crate) fn require_non_negative(
    field: &str,
    value: rust_decimal::Decimal,
) -> DomainResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::invalid_value(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Largest monetary amount accepted anywhere (10^15)
pub const MAX_AMOUNT: rust_decimal::Decimal =
    rust_decimal::Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Reject a monetary amount outside `0..=MAX_AMOUNT`
pub(crate) fn require_amount(field: &str, value: rust_decimal::Decimal) -> DomainResult<()> {
    require_non_negative(field, value)?;
    if value > MAX_AMOUNT {
        return Err(DomainError::invalid_value(format!(
            "{field} must not exceed {MAX_AMOUNT}, got {value}"
        )));
    }
    Ok(())
}
