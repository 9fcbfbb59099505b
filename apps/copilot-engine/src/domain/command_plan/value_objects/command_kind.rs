//! Command kinds, one per downstream domain capability.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Downstream domain service that owns a set of command kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandDomain {
    /// Order management (OMS).
    Orders,
    /// Execution management (EMS).
    Executions,
    /// Portfolio management (PMS).
    Portfolios,
    /// Compliance rules.
    Compliance,
}

impl CommandDomain {
    /// Every domain, in routing-table order.
    pub const ALL: [Self; 4] = [
        Self::Orders,
        Self::Executions,
        Self::Portfolios,
        Self::Compliance,
    ];

    /// Short service name used in configuration and metrics.
    #[must_use]
    pub const fn service_key(&self) -> &'static str {
        match self {
            Self::Orders => "oms",
            Self::Executions => "ems",
            Self::Portfolios => "pms",
            Self::Compliance => "compliance",
        }
    }
}

impl fmt::Display for CommandDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_key())
    }
}

/// The kind of a command. Each kind maps to exactly one downstream capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    /// Create a new order.
    CreateOrder,
    /// Modify quantity or pricing of an existing order.
    AmendOrder,
    /// Approve a pending order.
    ApproveOrder,
    /// Cancel an order.
    CancelOrder,
    /// Send an approved order to the execution management system.
    SendToEms,
    /// Request an execution simulation for an order.
    RequestExecution,
    /// Approve an optimization proposal.
    ApproveProposal,
    /// Convert an approved proposal into orders.
    SendProposalToOms,
    /// Enable a compliance rule.
    EnableRule,
    /// Disable a compliance rule.
    DisableRule,
    /// Delete a compliance rule.
    DeleteRule,
    /// Publish a compliance rule set.
    PublishRuleSet,
}

impl CommandKind {
    /// Every supported kind.
    pub const ALL: [Self; 12] = [
        Self::CreateOrder,
        Self::AmendOrder,
        Self::ApproveOrder,
        Self::CancelOrder,
        Self::SendToEms,
        Self::RequestExecution,
        Self::ApproveProposal,
        Self::SendProposalToOms,
        Self::EnableRule,
        Self::DisableRule,
        Self::DeleteRule,
        Self::PublishRuleSet,
    ];

    /// Canonical kebab-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateOrder => "create-order",
            Self::AmendOrder => "amend-order",
            Self::ApproveOrder => "approve-order",
            Self::CancelOrder => "cancel-order",
            Self::SendToEms => "send-to-ems",
            Self::RequestExecution => "request-execution",
            Self::ApproveProposal => "approve-proposal",
            Self::SendProposalToOms => "send-proposal-to-oms",
            Self::EnableRule => "enable-rule",
            Self::DisableRule => "disable-rule",
            Self::DeleteRule => "delete-rule",
            Self::PublishRuleSet => "publish-rule-set",
        }
    }

    /// Domain service that performs this kind.
    #[must_use]
    pub const fn domain(&self) -> CommandDomain {
        match self {
            Self::CreateOrder
            | Self::AmendOrder
            | Self::ApproveOrder
            | Self::CancelOrder
            | Self::SendToEms => CommandDomain::Orders,
            Self::RequestExecution => CommandDomain::Executions,
            Self::ApproveProposal | Self::SendProposalToOms => CommandDomain::Portfolios,
            Self::EnableRule | Self::DisableRule | Self::DeleteRule | Self::PublishRuleSet => {
                CommandDomain::Compliance
            }
        }
    }

    /// Parameters a command of this kind must carry.
    #[must_use]
    pub const fn required_params(&self) -> &'static [&'static str] {
        match self {
            Self::CreateOrder => &[
                "accountId",
                "instrumentId",
                "side",
                "quantity",
                "orderType",
                "timeInForce",
            ],
            Self::AmendOrder
            | Self::ApproveOrder
            | Self::CancelOrder
            | Self::SendToEms
            | Self::RequestExecution => &["orderId"],
            Self::ApproveProposal | Self::SendProposalToOms => &["proposalId"],
            Self::EnableRule | Self::DisableRule | Self::DeleteRule => &["ruleId"],
            Self::PublishRuleSet => &["ruleSetId", "name"],
        }
    }

    /// Kinds owned by a domain service.
    pub fn for_domain(domain: CommandDomain) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |k| k.domain() == domain)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind name that does not match any known capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown command kind: {kind}")]
pub struct UnknownCommandKind {
    /// The name as received.
    pub kind: String,
}

/// Lowercase and drop separators so `cancel-order`, `cancel_order`,
/// `CancelOrder` and `CANCEL_ORDER` compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for CommandKind {
    type Err = UnknownCommandKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s.trim());
        Self::ALL
            .into_iter()
            .find(|kind| normalize(kind.as_str()) == wanted)
            .ok_or_else(|| UnknownCommandKind {
                kind: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("cancel-order", CommandKind::CancelOrder ; "kebab case")]
    #[test_case("CancelOrder", CommandKind::CancelOrder ; "pascal case")]
    #[test_case("cancel_order", CommandKind::CancelOrder ; "snake case")]
    #[test_case("SendToEMS", CommandKind::SendToEms ; "acronym")]
    #[test_case("SendProposalToOMS", CommandKind::SendProposalToOms ; "trailing acronym")]
    #[test_case(" publish-rule-set ", CommandKind::PublishRuleSet ; "surrounding whitespace")]
    fn parses_known_kinds(input: &str, expected: CommandKind) {
        assert_eq!(input.parse::<CommandKind>().unwrap(), expected);
    }

    #[test_case("launch-missiles" ; "unknown")]
    #[test_case("" ; "empty")]
    #[test_case("RunOptimization" ; "structured payload kind")]
    fn rejects_unknown_kinds(input: &str) {
        let err = input.parse::<CommandKind>().unwrap_err();
        assert_eq!(err.kind, input);
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.as_str().parse::<CommandKind>().unwrap(), kind);
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&CommandKind::SendProposalToOms).unwrap();
        assert_eq!(json, "\"send-proposal-to-oms\"");
    }

    #[test]
    fn every_kind_requires_at_least_one_param() {
        for kind in CommandKind::ALL {
            assert!(!kind.required_params().is_empty(), "{kind}");
        }
    }

    #[test]
    fn for_domain_partitions_all_kinds() {
        let total: usize = CommandDomain::ALL
            .into_iter()
            .map(|d| CommandKind::for_domain(d).count())
            .sum();
        assert_eq!(total, CommandKind::ALL.len());
        assert!(CommandKind::for_domain(CommandDomain::Orders).any(|k| k == CommandKind::CancelOrder));
    }
}
