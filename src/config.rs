// Copyright 2025 Cowboy AI, LLC.

//! Engine configuration
//!
//! Loaded from JSON or from `ASSET_LIFECYCLE_*` environment variables. Every
//! field has a default, so an empty document is a valid configuration.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const ENV_PREFIX: &str = "ASSET_LIFECYCLE_";

/// When an approval pipeline applies its effect to the asset
///
/// Applied to both the transfer and the disposal workflow alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModel {
    /// `approve` only authorizes; a separate `complete` applies the effect
    #[default]
    TwoPhase,
    /// `approve` applies the effect and closes the workflow as completed
    ImmediateOnApproval,
}

impl ExecutionModel {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "two_phase" | "two-phase" => Ok(ExecutionModel::TwoPhase),
            "immediate_on_approval" | "immediate" => Ok(ExecutionModel::ImmediateOnApproval),
            other => bail!("unknown execution model `{other}`"),
        }
    }
}

/// Account codes used for the accounting entries sent downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountCodes {
    /// Debited for every depreciation charge
    pub depreciation_expense: String,
    /// Credited for every depreciation charge
    pub accumulated_depreciation: String,
    /// Clearing account for disposal proceeds
    pub disposal_clearing: String,
    /// Credited with a gain on disposal
    pub gain_on_disposal: String,
    /// Debited with a loss on disposal
    pub loss_on_disposal: String,
}

impl Default for AccountCodes {
    fn default() -> Self {
        Self {
            depreciation_expense: "6400".to_string(),
            accumulated_depreciation: "1590".to_string(),
            disposal_clearing: "1595".to_string(),
            gain_on_disposal: "7100".to_string(),
            loss_on_disposal: "8100".to_string(),
        }
    }
}

/// Lifecycle engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Execution model for transfer and disposal approvals
    pub execution_model: ExecutionModel,
    /// First month (1-12) of the fiscal year used to key budget events
    pub fiscal_year_start_month: u32,
    /// Accounting codes
    pub accounts: AccountCodes,
}

impl Default for LifecycleConfig {
    /// Two-phase execution, calendar fiscal year, standard account codes
    ///
    /// Under the default model `ApproveDisposal` leaves the asset in service;
    /// only `CompleteDisposal` moves it to `Disposed`. Choose
    /// `ExecutionModel::ImmediateOnApproval` to retire the asset on approval.
    fn default() -> Self {
        Self {
            execution_model: ExecutionModel::TwoPhase,
            fiscal_year_start_month: 1,
            accounts: AccountCodes::default(),
        }
    }
}

impl LifecycleConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("parsing lifecycle config")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading lifecycle config {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Defaults overridden by `ASSET_LIFECYCLE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(raw) = var("EXECUTION_MODEL") {
            config.execution_model = ExecutionModel::parse(&raw)?;
        }
        if let Some(raw) = var("FISCAL_YEAR_START_MONTH") {
            config.fiscal_year_start_month = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PREFIX}FISCAL_YEAR_START_MONTH=`{raw}`"))?;
        }

        let accounts = &mut config.accounts;
        for (name, slot) in [
            ("DEPRECIATION_EXPENSE_ACCOUNT", &mut accounts.depreciation_expense),
            ("ACCUMULATED_DEPRECIATION_ACCOUNT", &mut accounts.accumulated_depreciation),
            ("DISPOSAL_CLEARING_ACCOUNT", &mut accounts.disposal_clearing),
            ("GAIN_ON_DISPOSAL_ACCOUNT", &mut accounts.gain_on_disposal),
            ("LOSS_ON_DISPOSAL_ACCOUNT", &mut accounts.loss_on_disposal),
        ] {
            if let Some(raw) = var(name) {
                *slot = raw.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range months and empty account codes
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            bail!(
                "fiscal_year_start_month must be 1-12, got {}",
                self.fiscal_year_start_month
            );
        }
        let a = &self.accounts;
        for (name, code) in [
            ("depreciation_expense", &a.depreciation_expense),
            ("accumulated_depreciation", &a.accumulated_depreciation),
            ("disposal_clearing", &a.disposal_clearing),
            ("gain_on_disposal", &a.gain_on_disposal),
            ("loss_on_disposal", &a.loss_on_disposal),
        ] {
            if code.trim().is_empty() {
                bail!("account code `{name}` must not be empty");
            }
        }
        Ok(())
    }

    /// Fiscal year a date falls in, named by the calendar year it starts in
    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        if date.month() >= self.fiscal_year_start_month {
            date.year()
        } else {
            date.year() - 1
        }
    }
}
