//! Trigger contract of a workflow
//!
//! Triggers describe the repository events a workflow reacts to. The
//! local runner does not listen for events itself; the trigger set is
//! part of the workflow contract and is validated, linted and exported.

use crate::workflow::errors::ValidationError;
use crate::workflow::types::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events that start a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Trigger {
    /// Manual dispatch from the CI user interface
    Dispatch,

    /// Push to one of the named branches
    Push {
        /// Branch names the push filter matches
        branches: Vec<String>,
    },

    /// Pull request targeting one of the named branches
    PullRequest {
        /// Target branch names the filter matches
        branches: Vec<String>,
    },
}

impl Trigger {
    /// Creates a push trigger for a single branch
    pub fn push(branch: impl Into<String>) -> Self {
        Self::Push {
            branches: vec![branch.into()],
        }
    }

    /// Creates a pull request trigger for a single target branch
    pub fn pull_request(branch: impl Into<String>) -> Self {
        Self::PullRequest {
            branches: vec![branch.into()],
        }
    }

    /// Returns the branch filter of this trigger, if it has one
    #[must_use]
    pub fn branches(&self) -> Option<&[String]> {
        match self {
            Self::Dispatch => None,
            Self::Push { branches } | Self::PullRequest { branches } => Some(branches),
        }
    }
}

impl Validate for Trigger {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if let Some(branches) = self.branches()
            && branches.iter().any(|b| b.trim().is_empty())
        {
            return Err(ValidationError::EmptyBranchFilter);
        }
        Ok(())
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch => write!(f, "workflow_dispatch"),
            Self::Push { branches } => write!(f, "push({})", branches.join(", ")),
            Self::PullRequest { branches } => write!(f, "pull_request({})", branches.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_trigger_single_branch() {
        let trigger = Trigger::push("master");
        assert_eq!(trigger.branches(), Some(&["master".to_string()][..]));
        assert_eq!(trigger.to_string(), "push(master)");
    }

    #[test]
    fn test_dispatch_has_no_branches() {
        assert_eq!(Trigger::Dispatch.branches(), None);
        assert_eq!(Trigger::Dispatch.to_string(), "workflow_dispatch");
    }

    #[test]
    fn test_empty_branch_filter_is_invalid() {
        let trigger = Trigger::Push {
            branches: vec!["master".to_string(), "  ".to_string()],
        };
        assert_eq!(trigger.validate(), Err(ValidationError::EmptyBranchFilter));
    }

    #[test]
    fn test_pull_request_trigger_validates() {
        assert!(Trigger::pull_request("master").validate().is_ok());
    }
}
