//! Rolls individual balances up into (possibly overlapping) groups.
//!
//! A participant listed by `k` groups contributes `1/k` of their share,
//! gross payments, and balance to each of them, so a shared member is never
//! counted twice across the roster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{round_cents, AggregationWarning, Group, GroupRoster, Settlement};
use crate::ledger::Ledger;

use super::balance_service::BalanceReport;
use super::settlement_service::{DirectedFlows, SettlementService};
use super::{ServiceError, ServiceResult};

/// What a single member brings into one group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberContribution {
    pub name: String,
    /// Number of groups the member belongs to.
    pub divisor: usize,
    pub effective_share: f64,
    pub effective_balance: f64,
    pub effective_gross: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupStats {
    pub name: String,
    pub total_allocated_share: f64,
    pub total_gross_paid: f64,
    pub net_balance: f64,
    pub members: Vec<MemberContribution>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupReport {
    pub groups: Vec<GroupStats>,
    pub warnings: Vec<AggregationWarning>,
}

impl GroupReport {
    pub fn get(&self, name: &str) -> Option<&GroupStats> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn net_balances(&self) -> Vec<(&str, f64)> {
        self.groups
            .iter()
            .map(|g| (g.name.as_str(), g.net_balance))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterGroupReport {
    pub settlements: Vec<Settlement>,
    pub warnings: Vec<AggregationWarning>,
}

pub struct GroupService;

impl GroupService {
    /// Registers or replaces a group after checking its members exist.
    pub fn set_group(
        roster: &mut GroupRoster,
        ledger: &Ledger,
        name: &str,
        members: &[String],
    ) -> ServiceResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Group name cannot be empty".into()));
        }
        if members.is_empty() {
            return Err(ServiceError::Invalid(format!(
                "Group `{name}` needs at least one member"
            )));
        }
        if let Some(unknown) = members.iter().find(|m| !ledger.has_participant(m)) {
            return Err(ServiceError::Invalid(format!(
                "`{unknown}` is not a participant of trip `{}`",
                ledger.name
            )));
        }
        Ok(roster.upsert(Group::new(name, members.iter().cloned())))
    }

    pub fn remove_group(roster: &mut GroupRoster, name: &str) -> ServiceResult<Group> {
        roster
            .remove(name)
            .ok_or_else(|| ServiceError::Invalid(format!("Group `{name}` not found")))
    }

    /// Proportional per-group totals. Members missing from `balances` are
    /// skipped and reported as warnings.
    pub fn compute_group_stats(roster: &GroupRoster, balances: &BalanceReport) -> GroupReport {
        let mut membership_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut warnings = Vec::new();
        for group in roster.iter() {
            for member in &group.members {
                if balances.get(member).is_some() {
                    *membership_counts.entry(member.as_str()).or_insert(0) += 1;
                } else {
                    warnings.push(AggregationWarning::UnknownParticipant {
                        group: group.name.clone(),
                        member: member.clone(),
                    });
                }
            }
        }

        let groups = roster
            .iter()
            .map(|group| {
                let (mut share, mut gross, mut net) = (0.0, 0.0, 0.0);
                let mut members = Vec::new();
                for member in &group.members {
                    let Some(person) = balances.get(member) else {
                        continue;
                    };
                    let divisor = membership_counts.get(member.as_str()).copied().unwrap_or(1);
                    let k = divisor as f64;
                    let (eff_share, eff_balance, eff_gross) =
                        (person.share / k, person.balance / k, person.gross_paid / k);
                    share += eff_share;
                    net += eff_balance;
                    gross += eff_gross;
                    members.push(MemberContribution {
                        name: member.clone(),
                        divisor,
                        effective_share: round_cents(eff_share),
                        effective_balance: round_cents(eff_balance),
                        effective_gross: round_cents(eff_gross),
                    });
                }
                GroupStats {
                    name: group.name.clone(),
                    total_allocated_share: round_cents(share),
                    total_gross_paid: round_cents(gross),
                    net_balance: round_cents(net),
                    members,
                }
            })
            .collect();

        for warning in &warnings {
            tracing::warn!(%warning, "group aggregation");
        }

        GroupReport { groups, warnings }
    }

    /// Greedy settlement between groups based on their net balances.
    pub fn group_settlements(report: &GroupReport) -> Vec<Settlement> {
        SettlementService::net_settlements(report.net_balances())
    }

    /// Re-attributes individual settlements to groups and nets the result.
    ///
    /// A participant in several groups is attributed to the one registered
    /// last; each such case is reported once. Edges inside one group or
    /// touching an ungrouped participant are ignored.
    pub fn inter_group_settlements(
        individual: &[Settlement],
        roster: &GroupRoster,
    ) -> InterGroupReport {
        let mut attribution: BTreeMap<String, Option<String>> = BTreeMap::new();
        let mut warnings = Vec::new();

        let mut flows = DirectedFlows::new();
        for settlement in individual {
            let from = attribute(roster, &settlement.from, &mut attribution, &mut warnings);
            let to = attribute(roster, &settlement.to, &mut attribution, &mut warnings);
            let (Some(from), Some(to)) = (from, to) else {
                continue;
            };
            if from == to {
                continue;
            }
            *flows.entry((from, to)).or_insert(0.0) += settlement.amount;
        }

        let settlements = SettlementService::net_directed_flows(&flows);
        for warning in &warnings {
            tracing::warn!(%warning, "inter-group attribution");
        }
        InterGroupReport {
            settlements,
            warnings,
        }
    }
}

/// Resolves the single group a participant's settlements are booked against.
fn attribute(
    roster: &GroupRoster,
    participant: &str,
    cache: &mut BTreeMap<String, Option<String>>,
    warnings: &mut Vec<AggregationWarning>,
) -> Option<String> {
    if let Some(cached) = cache.get(participant) {
        return cached.clone();
    }
    let candidates = roster.groups_of(participant);
    let chosen = candidates.last().map(|g| g.to_string());
    if let (true, Some(chosen)) = (candidates.len() > 1, chosen.as_ref()) {
        warnings.push(AggregationWarning::AmbiguousGroupMembership {
            participant: participant.to_string(),
            groups: candidates.iter().map(|g| g.to_string()).collect(),
            chosen: chosen.clone(),
        });
    }
    cache.insert(participant.to_string(), chosen.clone());
    chosen
}
