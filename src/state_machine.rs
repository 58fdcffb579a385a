// Copyright 2025 Cowboy AI, LLC.

//! State machines for lifecycle workflows
//!
//! Every workflow status (transfer, disposal, maintenance) is an enum that
//! implements [`State`] and [`MooreStateTransitions`]: the enum restricts the
//! possible states and the transition table restricts the moves between them.
//! [`transition`] is the single guard every workflow passes through before it
//! mutates its status; an illegal move becomes [`DomainError::InvalidState`].
//!
//! The store's unit of work uses the input-driven [`MealyStateTransitions`]
//! variant (see `transaction_state`).

use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Input to a Mealy transition
pub trait TransitionInput: Debug + Clone + Send + Sync {
    /// Get a description of this input for logging
    fn description(&self) -> String;
}

/// Trait for types that can be used as states in a state machine
pub trait State: Debug + Clone + PartialEq + Eq + Send + Sync {
    /// Get the name of this state for logging/debugging
    fn name(&self) -> &'static str;

    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Moore-style transitions: legality depends only on the current and target state
///
/// # Examples
///
/// ```rust
/// use cim_domain_asset::{MaintenanceStatus, MooreStateTransitions};
///
/// let status = MaintenanceStatus::Scheduled;
/// assert!(status.can_transition_to(&MaintenanceStatus::InProgress));
/// assert!(!status.can_transition_to(&MaintenanceStatus::Completed));
/// ```
pub trait MooreStateTransitions: State {
    /// Check if a transition to the target state is valid
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Get all valid target states from this state
    fn valid_transitions(&self) -> Vec<Self>;
}

/// Mealy-style transitions: legality depends on the current state AND input
pub trait MealyStateTransitions: State {
    /// The input type for transitions
    type Input: TransitionInput;

    /// Check if a transition is valid given the input
    fn can_transition_to(&self, target: &Self, input: &Self::Input) -> bool;

    /// Get valid transitions for a given input
    fn valid_transitions(&self, input: &Self::Input) -> Vec<Self>;
}

/// Record of an applied state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition<S> {
    /// The state before the transition
    pub from: S,
    /// The state after the transition
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Move `current` to `target` if the transition table allows it
///
/// Terminal states refuse every move. On failure the error names the entity
/// type, the current state and the requested action, and `current` is left
/// untouched.
pub fn transition<S: MooreStateTransitions>(
    entity_type: &str,
    current: &mut S,
    target: S,
    action: &str,
) -> DomainResult<StateTransition<S>> {
    if current.is_terminal() || !current.can_transition_to(&target) {
        return Err(DomainError::invalid_state(entity_type, current.name(), action));
    }

    let record = StateTransition {
        from: current.clone(),
        to: target.clone(),
        timestamp: Utc::now(),
    };
    *current = target;
    Ok(record)
}

/// Macro to define Moore state transitions concisely
///
/// Each arm lists the states reachable from a source state; states with an
/// empty list are dead ends.
#[macro_export]
macro_rules! define_moore_transitions {
    ($state_type:ty, $($from:pat => [$($to:expr),*]),* $(,)?) => {
        impl $crate::state_machine::MooreStateTransitions for $state_type {
            fn can_transition_to(&self, target: &Self) -> bool {
                match self {
                    $($from => {
                        let valid: Vec<$state_type> = vec![$($to),*];
                        valid.contains(target)
                    })*
                }
            }

            fn valid_transitions(&self) -> Vec<Self> {
                match self {
                    $($from => vec![$($to),*],)*
                }
            }
        }
    };
}
