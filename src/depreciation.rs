// Copyright 2025 Cowboy AI, LLC.

//! Depreciation ledger
//!
//! An append-only list of value reductions per asset. Recording a charge
//! produces a ledger row AND lowers the asset's book value; the two writes
//! are handed to the store together and committed as one unit.
//!
//! For a row `r` of asset `a`:
//!
//! ```text
//! r.remaining_value          = a.current_value - r.depreciation_value   >= 0
//! r.accumulated_depreciation = a.original_cost - r.remaining_value
//! r.accumulated_depreciation >= previous row's accumulated_depreciation
//! ```

use crate::asset::Asset;
use crate::entity::{AggregateRoot, AssetId, DepreciationId, OrganizationId, RecordMeta};
use crate::errors::{DomainError, DomainResult};
use crate::tenant::TenantScoped;
use crate::value_objects::Financials;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a charge was (or should be) computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepreciationMethod {
    /// Equal charge every period
    StraightLine,
    /// Fixed rate applied to the current book value
    DecliningBalance,
    /// Charge weighted by remaining life
    SumOfYearsDigits,
    /// Charge proportional to usage
    UnitsOfProduction,
    /// Amount chosen by the caller
    Manual,
}

/// Inputs for computing a suggested periodic charge
///
/// The ledger itself only records charges; a scheduler outside the engine
/// decides the cadence and may use [`DepreciationMethod::suggest_charge`] to
/// size each one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationParams {
    /// Value the asset is not depreciated below
    pub salvage_value: Decimal,
    /// Useful life in periods
    pub useful_life_periods: u32,
    /// Periods already depreciated (sum-of-years-digits)
    #[serde(default)]
    pub periods_elapsed: u32,
    /// Rate per period (declining balance); defaults to `2 / useful_life_periods`
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Units consumed this period (units of production)
    #[serde(default)]
    pub units_this_period: Option<Decimal>,
    /// Total expected units over the asset's life (units of production)
    #[serde(default)]
    pub total_units: Option<Decimal>,
}

impl DepreciationParams {
    /// Parameters for a plain useful-life schedule
    pub fn over(useful_life_periods: u32, salvage_value: Decimal) -> Self {
        Self {
            salvage_value,
            useful_life_periods,
            periods_elapsed: 0,
            rate: None,
            units_this_period: None,
            total_units: None,
        }
    }
}

impl DepreciationMethod {
    /// Suggested charge for the next period, rounded to cents
    ///
    /// Never exceeds `current_value - salvage_value`; returns zero once the
    /// asset has reached its salvage value.
    pub fn suggest_charge(
        &self,
        params: &DepreciationParams,
        financials: &Financials,
    ) -> DomainResult<Decimal> {
        if params.salvage_value < Decimal::ZERO || params.salvage_value > financials.original_cost() {
            return Err(DomainError::invalid_value(
                "salvage value must be within [0, original cost]",
            ));
        }
        if params.useful_life_periods == 0 && *self != DepreciationMethod::UnitsOfProduction {
            return Err(DomainError::invalid_value("useful life must be at least one period"));
        }

        let life = Decimal::from(params.useful_life_periods);
        let depreciable = financials.original_cost() - params.salvage_value;
        let headroom = (financials.current_value() - params.salvage_value).max(Decimal::ZERO);

        let raw = match self {
            DepreciationMethod::StraightLine => depreciable / life,
            DepreciationMethod::DecliningBalance => {
                let rate = params.rate.unwrap_or(Decimal::TWO / life);
                if rate <= Decimal::ZERO || rate > Decimal::ONE {
                    return Err(DomainError::invalid_value("declining rate must be in (0, 1]"));
                }
                financials.current_value() * rate
            }
            DepreciationMethod::SumOfYearsDigits => {
                let remaining = params.useful_life_periods.saturating_sub(params.periods_elapsed);
                let digits = life * (life + Decimal::ONE) / Decimal::TWO;
                depreciable * Decimal::from(remaining) / digits
            }
            DepreciationMethod::UnitsOfProduction => {
                let (Some(used), Some(total)) = (params.units_this_period, params.total_units) else {
                    return Err(DomainError::invalid_value(
                        "units of production needs units_this_period and total_units",
                    ));
                };
                if total <= Decimal::ZERO || used < Decimal::ZERO {
                    return Err(DomainError::invalid_value("unit counts must be positive"));
                }
                depreciable * used / total
            }
            DepreciationMethod::Manual => {
                return Err(DomainError::invalid_value(
                    "manual depreciation has no suggested charge",
                ))
            }
        };

        Ok(raw.min(headroom).round_dp(2))
    }
}

/// Input for recording a charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DepreciationCharge {
    /// How the amount was computed
    pub method: DepreciationMethod,
    /// Effective date
    pub depreciation_date: NaiveDate,
    /// Amount to deduct from the book value
    pub depreciation_value: Decimal,
}

/// One row of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDepreciation {
    id: DepreciationId,
    asset_id: AssetId,
    organization_id: OrganizationId,
    depreciation_date: NaiveDate,
    depreciation_value: Decimal,
    accumulated_depreciation: Decimal,
    remaining_value: Decimal,
    method: DepreciationMethod,
    version: u64,
    /// Timestamps; rows are never soft-deleted
    pub meta: RecordMeta,
}

impl AssetDepreciation {
    /// Validate a charge against the asset and the last ledger row, then
    /// lower the asset's book value and return the new row
    ///
    /// Nothing is mutated when validation fails.
    pub fn record(
        asset: &mut Asset,
        last: Option<&AssetDepreciation>,
        charge: DepreciationCharge,
    ) -> DomainResult<Self> {
        asset.ensure_active("depreciate")?;
        if let Some(last) = last {
            if last.asset_id != asset.id() {
                return Err(DomainError::invalid_value(format!(
                    "ledger row {} does not belong to asset {}",
                    last.id,
                    asset.id()
                )));
            }
        }
        if charge.depreciation_value <= Decimal::ZERO {
            return Err(DomainError::invalid_value("depreciation value must be positive"));
        }

        let financials = asset.financials();
        let remaining_value = financials.current_value() - charge.depreciation_value;
        if remaining_value < Decimal::ZERO {
            return Err(DomainError::invalid_value(format!(
                "depreciation of {} exceeds current value {} (remaining would be {})",
                charge.depreciation_value,
                financials.current_value(),
                remaining_value
            )));
        }
        let accumulated_depreciation = financials.original_cost() - remaining_value;
        if let Some(last) = last {
            if accumulated_depreciation < last.accumulated_depreciation {
                return Err(DomainError::invalid_value(format!(
                    "accumulated depreciation would fall from {} to {}",
                    last.accumulated_depreciation, accumulated_depreciation
                )));
            }
        }

        asset.set_current_value(remaining_value)?;

        Ok(Self {
            id: DepreciationId::new(),
            asset_id: asset.id(),
            organization_id: asset.organization_id(),
            depreciation_date: charge.depreciation_date,
            depreciation_value: charge.depreciation_value,
            accumulated_depreciation,
            remaining_value,
            method: charge.method,
            version: 0,
            meta: RecordMeta::new(),
        })
    }

    /// Depreciated asset
    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    /// Effective date
    pub fn depreciation_date(&self) -> NaiveDate {
        self.depreciation_date
    }

    /// Amount of this charge
    pub fn depreciation_value(&self) -> Decimal {
        self.depreciation_value
    }

    /// Total charged since acquisition, including this row
    pub fn accumulated_depreciation(&self) -> Decimal {
        self.accumulated_depreciation
    }

    /// Book value after this row
    pub fn remaining_value(&self) -> Decimal {
        self.remaining_value
    }

    /// How the amount was computed
    pub fn method(&self) -> DepreciationMethod {
        self.method
    }
}

impl AggregateRoot for AssetDepreciation {
    type Id = DepreciationId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }
}

impl TenantScoped for AssetDepreciation {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn entity_type() -> &'static str {
        "AssetDepreciation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NewAsset;
    use crate::entity::CategoryId;
    use crate::value_objects::{AssetCondition, Custody};

    fn asset(original: i64, current: i64) -> Asset {
        let mut asset = Asset::register(
            OrganizationId::new(),
            NewAsset {
                code: "PRN-9".to_string(),
                name: "Printer".to_string(),
                category_id: CategoryId::new(),
                purchase_price: Decimal::from(original),
                original_cost: Decimal::from(original),
                purchase_date: None,
                condition: AssetCondition::Good,
                custody: Custody::Unassigned,
            },
        )
        .unwrap();
        asset
            .update_financials(
                Decimal::from(original),
                Decimal::from(original),
                Decimal::from(current),
            )
            .unwrap();
        asset
    }

    fn charge(value: i64) -> DepreciationCharge {
        DepreciationCharge {
            method: DepreciationMethod::Manual,
            depreciation_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            depreciation_value: Decimal::from(value),
        }
    }

    #[test]
    fn test_charge_exceeding_book_value_is_rejected() {
        let mut asset = asset(1000, 800);
        let err = AssetDepreciation::record(&mut asset, None, charge(900)).unwrap_err();
        assert!(err.is_invalid_value());
        assert_eq!(asset.current_value(), Decimal::from(800));
    }

    #[test]
    fn test_rows_accumulate() {
        let mut asset = asset(1000, 1000);
        let first = AssetDepreciation::record(&mut asset, None, charge(100)).unwrap();
        assert_eq!(first.remaining_value(), Decimal::from(900));
        assert_eq!(first.accumulated_depreciation(), Decimal::from(100));

        let second = AssetDepreciation::record(&mut asset, Some(&first), charge(150)).unwrap();
        assert_eq!(second.remaining_value(), Decimal::from(750));
        assert_eq!(second.accumulated_depreciation(), Decimal::from(250));
        assert_eq!(asset.current_value(), Decimal::from(750));

        // charging exactly the book value lands on zero
        let last = AssetDepreciation::record(&mut asset, Some(&second), charge(750)).unwrap();
        assert_eq!(last.remaining_value(), Decimal::ZERO);
        assert_eq!(last.accumulated_depreciation(), Decimal::from(1000));
    }

    #[test]
    fn test_non_positive_charge_rejected() {
        let mut asset = asset(1000, 1000);
        assert!(AssetDepreciation::record(&mut asset, None, charge(0))
            .unwrap_err()
            .is_invalid_value());
        assert!(AssetDepreciation::record(&mut asset, None, charge(-5))
            .unwrap_err()
            .is_invalid_value());
    }

    #[test]
    fn test_accumulated_never_decreases() {
        let mut asset = asset(1000, 1000);
        let first = AssetDepreciation::record(&mut asset, None, charge(400)).unwrap();

        // a correction raises the book value back above the last row
        asset
            .update_financials(Decimal::from(1000), Decimal::from(1000), Decimal::from(900))
            .unwrap();
        let err = AssetDepreciation::record(&mut asset, Some(&first), charge(50)).unwrap_err();
        assert!(err.is_invalid_value());
        assert_eq!(asset.current_value(), Decimal::from(900));
    }

    #[test]
    fn test_disposed_asset_cannot_depreciate() {
        let mut asset = asset(1000, 500);
        asset.mark_disposed();
        assert!(AssetDepreciation::record(&mut asset, None, charge(10))
            .unwrap_err()
            .is_invalid_state());
    }

    #[test]
    fn test_suggest_charge() {
        let financials = Financials::new(
            Decimal::from(1000),
            Decimal::from(1000),
            Decimal::from(1000),
        )
        .unwrap();
        let params = DepreciationParams::over(5, Decimal::from(100));

        assert_eq!(
            DepreciationMethod::StraightLine.suggest_charge(&params, &financials).unwrap(),
            Decimal::from(180)
        );
        assert_eq!(
            DepreciationMethod::DecliningBalance.suggest_charge(&params, &financials).unwrap(),
            Decimal::from(400)
        );
        // 900 * 5 / 15
        assert_eq!(
            DepreciationMethod::SumOfYearsDigits.suggest_charge(&params, &financials).unwrap(),
            Decimal::from(300)
        );
        assert!(DepreciationMethod::Manual
            .suggest_charge(&params, &financials)
            .unwrap_err()
            .is_invalid_value());
    }

    #[test]
    fn test_suggest_charge_capped_at_salvage() {
        let financials =
            Financials::new(Decimal::from(1000), Decimal::from(1000), Decimal::from(150)).unwrap();
        let params = DepreciationParams::over(5, Decimal::from(100));
        assert_eq!(
            DepreciationMethod::StraightLine.suggest_charge(&params, &financials).unwrap(),
            Decimal::from(50)
        );

        let units = DepreciationParams {
            units_this_period: Some(Decimal::from(10)),
            total_units: Some(Decimal::from(100)),
            ..DepreciationParams::over(0, Decimal::ZERO)
        };
        let fresh =
            Financials::new(Decimal::from(1000), Decimal::from(1000), Decimal::from(1000)).unwrap();
        assert_eq!(
            DepreciationMethod::UnitsOfProduction.suggest_charge(&units, &fresh).unwrap(),
            Decimal::from(100)
        );
    }
}
