// Copyright 2025 Cowboy AI, LLC.

//! Value objects shared by the asset aggregate and its workflows

use crate::entity::{DepartmentId, UserId};
use crate::errors::{require_amount, DomainError, DomainResult};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Who is currently responsible for an asset
///
/// "Moved to a department without a user" is its own case, so completing a
/// department-only transfer never has to fall back to clearing custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Custody {
    /// Nobody holds the asset
    Unassigned,
    /// Held by a user, optionally on behalf of a department
    AssignedToUser {
        /// Responsible user
        user_id: UserId,
        /// Department the user holds the asset for
        department_id: Option<DepartmentId>,
    },
    /// Stored by a department with no individual holder
    StoredInDepartment {
        /// Holding department
        department_id: DepartmentId,
    },
}

impl Custody {
    /// User currently holding the asset
    pub fn current_user_id(&self) -> Option<UserId> {
        match self {
            Custody::AssignedToUser { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }

    /// Department currently responsible for the asset
    pub fn current_department_id(&self) -> Option<DepartmentId> {
        match self {
            Custody::Unassigned => None,
            Custody::AssignedToUser { department_id, .. } => *department_id,
            Custody::StoredInDepartment { department_id } => Some(*department_id),
        }
    }

    /// The (department, user) pair for this custody
    pub fn endpoint(&self) -> CustodyEndpoint {
        CustodyEndpoint {
            department_id: self.current_department_id(),
            user_id: self.current_user_id(),
        }
    }

    /// Custody described by a (department, user) pair
    pub fn from_endpoint(endpoint: &CustodyEndpoint) -> Self {
        match (endpoint.user_id, endpoint.department_id) {
            (Some(user_id), department_id) => Custody::AssignedToUser {
                user_id,
                department_id,
            },
            (None, Some(department_id)) => Custody::StoredInDepartment { department_id },
            (None, None) => Custody::Unassigned,
        }
    }
}

impl Default for Custody {
    fn default() -> Self {
        Custody::Unassigned
    }
}

/// One side of a custody change: the (department, user) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CustodyEndpoint {
    /// Department side of the pair
    pub department_id: Option<DepartmentId>,
    /// User side of the pair
    pub user_id: Option<UserId>,
}

impl CustodyEndpoint {
    /// Endpoint naming a user (and optionally their department)
    pub fn user(user_id: UserId, department_id: Option<DepartmentId>) -> Self {
        Self {
            department_id,
            user_id: Some(user_id),
        }
    }

    /// Endpoint naming only a department
    pub fn department(department_id: DepartmentId) -> Self {
        Self {
            department_id: Some(department_id),
            user_id: None,
        }
    }

    /// Neither a department nor a user
    pub fn is_empty(&self) -> bool {
        self.department_id.is_none() && self.user_id.is_none()
    }
}

/// Financial fields of an asset
///
/// Invariant: `0 <= current_value <= original_cost` and `purchase_price >= 0`.
/// The only way to obtain a value is through [`Financials::new`] or
/// [`Financials::with_current_value`], both of which check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Financials {
    original_cost: Decimal,
    purchase_price: Decimal,
    current_value: Decimal,
}

impl Financials {
    /// Validate and build a set of financial values
    pub fn new(
        purchase_price: Decimal,
        original_cost: Decimal,
        current_value: Decimal,
    ) -> DomainResult<Self> {
        require_amount("purchase price", purchase_price)?;
        require_amount("original cost", original_cost)?;
        require_amount("current value", current_value)?;
        if current_value > original_cost {
            return Err(DomainError::invalid_value(format!(
                "current value {current_value} exceeds original cost {original_cost}"
            )));
        }
        Ok(Self {
            original_cost,
            purchase_price,
            current_value,
        })
    }

    /// Values for a newly acquired asset: book value equals cost
    pub fn acquired(purchase_price: Decimal, original_cost: Decimal) -> DomainResult<Self> {
        Self::new(purchase_price, original_cost, original_cost)
    }

    /// Copy with a new current value, re-checking the range
    pub fn with_current_value(&self, current_value: Decimal) -> DomainResult<Self> {
        Self::new(self.purchase_price, self.original_cost, current_value)
    }

    /// Cost basis for depreciation
    pub fn original_cost(&self) -> Decimal {
        self.original_cost
    }

    /// Price actually paid
    pub fn purchase_price(&self) -> Decimal {
        self.purchase_price
    }

    /// Book value
    pub fn current_value(&self) -> Decimal {
        self.current_value
    }

    /// Total value reduction since acquisition
    pub fn accumulated_depreciation(&self) -> Decimal {
        self.original_cost - self.current_value
    }
}

/// Physical condition of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCondition {
    /// Unused
    New,
    /// Working, normal wear
    Good,
    /// Working, visible wear
    Fair,
    /// Barely serviceable
    Poor,
    /// Not serviceable
    Damaged,
}

impl Default for AssetCondition {
    fn default() -> Self {
        AssetCondition::New
    }
}
