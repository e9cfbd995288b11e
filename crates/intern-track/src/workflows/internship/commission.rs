//! Commission roster and the chairman uniqueness rule.
//!
//! Invariant: at most one chairman per department. Promotion demotes the
//! sitting chairman in the same call and drops that member's cached role
//! sessions, so no live session keeps acting on a stale chairman claim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::CommissionMemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionRole {
    Member,
    Chairman,
}

impl CommissionRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Chairman => "Chairman",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionMember {
    pub id: CommissionMemberId,
    pub full_name: String,
    pub department: String,
    pub role: CommissionRole,
}

/// Callback into the identity layer so cached role claims are refreshed
/// whenever a member's role changes.
pub trait RoleSessions: Send + Sync {
    fn invalidate(&self, member: &CommissionMemberId) -> Result<(), SessionError>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CommissionError {
    #[error("commission member '{0}' is not registered")]
    UnknownMember(String),
    #[error("commission member '{member}' belongs to department '{actual}', not '{requested}'")]
    WrongDepartment {
        member: String,
        actual: String,
        requested: String,
    },
    #[error("commission member '{0}' is already registered")]
    DuplicateMember(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Outcome of a chairman promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChairmanChange {
    pub promoted: CommissionMemberId,
    pub demoted: Option<CommissionMemberId>,
}

#[derive(Debug, Default)]
pub struct CommissionRoster {
    members: Vec<CommissionMember>,
}

impl CommissionRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, member: CommissionMember) -> Result<(), CommissionError> {
        if self.members.iter().any(|m| m.id == member.id) {
            return Err(CommissionError::DuplicateMember(member.id.0.clone()));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn member(&self, id: &CommissionMemberId) -> Option<&CommissionMember> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn members_of(&self, department: &str) -> Vec<&CommissionMember> {
        self.members
            .iter()
            .filter(|m| m.department == department)
            .collect()
    }

    pub fn chairman_of(&self, department: &str) -> Option<&CommissionMember> {
        self.members
            .iter()
            .find(|m| m.department == department && m.role == CommissionRole::Chairman)
    }

    /// Promote a member to chairman of their department.
    ///
    /// The sitting chairman, if any, is demoted in the same call and their
    /// role sessions are invalidated before either role flips, so the
    /// roster is never observable with two chairmen. Promoting the sitting
    /// chairman again is a no-op.
    pub fn promote_chairman(
        &mut self,
        department: &str,
        id: &CommissionMemberId,
        sessions: &dyn RoleSessions,
    ) -> Result<ChairmanChange, CommissionError> {
        let candidate = self
            .member(id)
            .ok_or_else(|| CommissionError::UnknownMember(id.0.clone()))?;

        if candidate.department != department {
            return Err(CommissionError::WrongDepartment {
                member: id.0.clone(),
                actual: candidate.department.clone(),
                requested: department.to_string(),
            });
        }

        if candidate.role == CommissionRole::Chairman {
            return Ok(ChairmanChange {
                promoted: id.clone(),
                demoted: None,
            });
        }

        let sitting = self.chairman_of(department).map(|m| m.id.clone());
        if let Some(previous) = &sitting {
            sessions.invalidate(previous)?;
        }

        for member in &mut self.members {
            if member.department != department {
                continue;
            }
            if &member.id == id {
                member.role = CommissionRole::Chairman;
            } else if member.role == CommissionRole::Chairman {
                member.role = CommissionRole::Member;
            }
        }

        Ok(ChairmanChange {
            promoted: id.clone(),
            demoted: sitting,
        })
    }
}
