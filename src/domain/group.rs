//! Named sub-groups of participants and the roster that orders them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named set of participants. Members keep insertion order without repeats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub members: Vec<String>,
}

impl Group {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for member in members {
            let member = member.into();
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        Self {
            name: name.into(),
            members: unique,
        }
    }

    pub fn contains(&self, participant: &str) -> bool {
        self.members.iter().any(|member| member == participant)
    }
}

/// Groups of a trip in registration order. Re-registering a name replaces its
/// members but keeps its position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GroupRoster {
    groups: Vec<Group>,
}

impl GroupRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a group; returns `true` when a group was replaced.
    pub fn upsert(&mut self, group: Group) -> bool {
        match self.groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => {
                existing.members = group.members;
                true
            }
            None => {
                self.groups.push(group);
                false
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Group> {
        let index = self.groups.iter().position(|g| g.name == name)?;
        Some(self.groups.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Names of the groups listing `participant`, in registration order.
    pub fn groups_of(&self, participant: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|g| g.contains(participant))
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Every member listed by any group, in roster order, without repeats.
    pub fn grouped_members(&self) -> Vec<&str> {
        let mut members: Vec<&str> = Vec::new();
        for member in self.groups.iter().flat_map(|g| g.members.iter()) {
            if !members.contains(&member.as_str()) {
                members.push(member);
            }
        }
        members
    }
}

impl FromIterator<Group> for GroupRoster {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        let mut roster = GroupRoster::new();
        for group in iter {
            roster.upsert(group);
        }
        roster
    }
}

/// Non-fatal conditions noticed while rolling individuals up into groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationWarning {
    /// A group lists someone who is not a participant of the trip.
    UnknownParticipant { group: String, member: String },
    /// A participant sits in several groups where one attribution is needed.
    AmbiguousGroupMembership {
        participant: String,
        groups: Vec<String>,
        chosen: String,
    },
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationWarning::UnknownParticipant { group, member } => write!(
                f,
                "group `{group}` lists `{member}`, who is not a trip participant; skipped"
            ),
            AggregationWarning::AmbiguousGroupMembership {
                participant,
                groups,
                chosen,
            } => write!(
                f,
                "`{participant}` belongs to {}; attributed to `{chosen}`",
                groups.join(", ")
            ),
        }
    }
}
