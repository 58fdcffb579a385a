// Copyright 2025 Cowboy AI, LLC.

//! Unit-of-work lifecycle as a Mealy state machine
//!
//! The next state depends on the current state AND the input: the same
//! `Commit` input is legal after the work was validated and illegal before.
//!
//! ```text
//! Idle --Begin--> Started --Validated--> Applied --Commit--------> Committed
//!                    |                      |
//!                  Abort               CommitFailed
//!                    v                      v
//!               RolledBack               Failed
//! ```
//!
//! `RolledBack` means the command itself refused (a domain error); `Failed`
//! means the command was valid but the store could not apply it. In both
//! cases nothing staged reaches storage.

use crate::errors::{DomainError, DomainResult};
use crate::state_machine::{MealyStateTransitions, State, TransitionInput};
use serde::{Deserialize, Serialize};

/// States of a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    /// No transaction open
    Idle,
    /// Command running against the snapshot; writes are staged
    Started,
    /// Command returned successfully; staged writes await commit checks
    Applied,
    /// Staged writes applied to storage (terminal)
    Committed,
    /// Command refused; staged writes discarded (terminal)
    RolledBack,
    /// Commit checks or the write itself failed; staged writes discarded (terminal)
    Failed,
}

impl State for TransactionState {
    fn name(&self) -> &'static str {
        match self {
            TransactionState::Idle => "Idle",
            TransactionState::Started => "Started",
            TransactionState::Applied => "Applied",
            TransactionState::Committed => "Committed",
            TransactionState::RolledBack => "RolledBack",
            TransactionState::Failed => "Failed",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::RolledBack | TransactionState::Failed
        )
    }
}

/// Inputs that drive a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionInput {
    /// Open the transaction
    Begin,
    /// The command finished without error
    Validated,
    /// The command returned a domain error
    Abort,
    /// Commit checks passed and the writes were applied
    Commit,
    /// Commit checks or the write failed
    CommitFailed,
}

impl TransitionInput for TransactionInput {
    fn description(&self) -> String {
        format!("{self:?}")
    }
}

impl MealyStateTransitions for TransactionState {
    type Input = TransactionInput;

    fn can_transition_to(&self, target: &Self, input: &Self::Input) -> bool {
        self.valid_transitions(input).contains(target)
    }

    fn valid_transitions(&self, input: &Self::Input) -> Vec<Self> {
        use TransactionInput as I;
        use TransactionState as S;
        match (*self, input) {
            (S::Idle, I::Begin) => vec![S::Started],
            (S::Started, I::Validated) => vec![S::Applied],
            (S::Started, I::Abort) => vec![S::RolledBack],
            (S::Applied, I::Commit) => vec![S::Committed],
            (S::Applied, I::CommitFailed) => vec![S::Failed],
            _ => Vec::new(),
        }
    }
}

impl TransactionState {
    /// Follow the single edge `input` selects from the current state
    pub fn advance(&mut self, input: TransactionInput) -> DomainResult<TransactionState> {
        let Some(next) = self.valid_transitions(&input).into_iter().next() else {
            return Err(DomainError::Persistence(format!(
                "transaction cannot take {} in state {}",
                input.description(),
                self.name()
            )));
        };
        *self = next;
        Ok(next)
    }
}
