//! Panic-alert lifecycle: status enum, the closed role set, and the single
//! capability check every transition path goes through.
//!
//! Legal transitions: pending -> handling -> resolved, pending -> resolved,
//! and pending/handling -> cancelled (admin only). Resolved and cancelled
//! are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SiagaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Handling,
    Resolved,
    Cancelled,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Handling => "handling",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::Cancelled)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = SiagaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(AlertStatus::Pending),
            "handling" => Ok(AlertStatus::Handling),
            "resolved" => Ok(AlertStatus::Resolved),
            "cancelled" => Ok(AlertStatus::Cancelled),
            _ => Err(SiagaError::Validation(format!("Unknown alert status: {s}"))),
        }
    }
}

/// The closed set of principal roles. Reporters file alerts, relawan respond
/// to them, admins administer rosters and may override lifecycle guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Relawan,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Relawan => "relawan",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SiagaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "relawan" => Ok(Role::Relawan),
            "admin" => Ok(Role::Admin),
            _ => Err(SiagaError::Validation(format!("Unknown role: {s}"))),
        }
    }
}

/// The principal attempting a transition. `on_duty` is today's roster
/// membership, resolved by the caller; it is never consulted for admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub on_duty: bool,
}

/// A permitted transition and the bookkeeping it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEffect {
    pub new_status: AlertStatus,
    /// Record the actor as handler (handled_by, handled_at). Never set when
    /// a handler is already recorded, so handling -> resolved keeps the
    /// relawan who took the alert.
    pub stamp_handler: bool,
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenied {
    /// The target is not reachable from the current status.
    WrongState { from: AlertStatus, to: AlertStatus },
    /// The actor's role may never perform this transition.
    NotPermitted { role: Role },
    /// A relawan may only act while on today's roster.
    NotOnDuty,
    /// The alert is held by a different relawan.
    NotHandler,
}

impl TransitionDenied {
    pub fn into_error(self) -> SiagaError {
        match self {
            TransitionDenied::WrongState { from, to } => {
                SiagaError::Conflict(format!("Cannot move alert from {from} to {to}"))
            }
            TransitionDenied::NotPermitted { role } => SiagaError::Authorization(format!(
                "Role {role} is not permitted to perform this transition"
            )),
            TransitionDenied::NotOnDuty => SiagaError::Authorization(
                "Only relawan on today's roster may respond to alerts".to_string(),
            ),
            TransitionDenied::NotHandler => {
                SiagaError::Conflict("Alert is already being handled by another relawan".to_string())
            }
        }
    }
}

/// The one capability check used by every status mutation.
///
/// `handled_by` is the handler currently recorded on the alert. Rules:
/// admins may drive any legal transition; relawan must be on today's roster
/// for every transition they drive, and only the recorded handler may
/// resolve an alert in handling; cancellation is admin-only. State is
/// checked before the actor, so an impossible transition reads as a
/// conflict regardless of who asks.
pub fn check_transition(
    actor: &Actor,
    current: AlertStatus,
    handled_by: Option<Uuid>,
    target: AlertStatus,
) -> Result<TransitionEffect, TransitionDenied> {
    let denied_state = TransitionDenied::WrongState {
        from: current,
        to: target,
    };

    match target {
        AlertStatus::Pending => Err(denied_state),
        AlertStatus::Handling => {
            if current != AlertStatus::Pending {
                return Err(denied_state);
            }
            require_responder(actor)?;
            Ok(TransitionEffect {
                new_status: target,
                stamp_handler: true,
            })
        }
        AlertStatus::Resolved => match current {
            AlertStatus::Pending => {
                require_responder(actor)?;
                Ok(TransitionEffect {
                    new_status: target,
                    stamp_handler: true,
                })
            }
            AlertStatus::Handling => {
                if actor.role == Role::Admin {
                    return Ok(TransitionEffect {
                        new_status: target,
                        stamp_handler: false,
                    });
                }
                if actor.role != Role::Relawan {
                    return Err(TransitionDenied::NotPermitted { role: actor.role });
                }
                // An off-duty relawan is turned away before the handler
                // check; holding the alert does not outlast the shift.
                require_responder(actor)?;
                match handled_by {
                    Some(handler) if handler == actor.id => Ok(TransitionEffect {
                        new_status: target,
                        stamp_handler: false,
                    }),
                    Some(_) => Err(TransitionDenied::NotHandler),
                    // No recorded handler: treat like resolving from
                    // pending and adopt the alert.
                    None => Ok(TransitionEffect {
                        new_status: target,
                        stamp_handler: true,
                    }),
                }
            }
            _ => Err(denied_state),
        },
        AlertStatus::Cancelled => {
            if current.is_terminal() {
                return Err(denied_state);
            }
            if actor.role != Role::Admin {
                return Err(TransitionDenied::NotPermitted { role: actor.role });
            }
            Ok(TransitionEffect {
                new_status: target,
                stamp_handler: false,
            })
        }
    }
}

fn require_responder(actor: &Actor) -> Result<(), TransitionDenied> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Relawan if actor.on_duty => Ok(()),
        Role::Relawan => Err(TransitionDenied::NotOnDuty),
        Role::User => Err(TransitionDenied::NotPermitted { role: actor.role }),
    }
}

/// Whether a reporter may file a second alert on the same local day while an
/// earlier one is still active (any status other than resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    RejectSameDay,
    AllowMultiple,
}

impl FromStr for DuplicatePolicy {
    type Err = SiagaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject-same-day" | "reject" => Ok(DuplicatePolicy::RejectSameDay),
            "allow-multiple" | "allow" => Ok(DuplicatePolicy::AllowMultiple),
            _ => Err(SiagaError::Validation(format!(
                "Unknown duplicate policy: {s}"
            ))),
        }
    }
}

/// Emergency-service contact surfaced to the reporter when nobody is on
/// duty to receive the alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub service: String,
    pub phone: String,
}

/// National emergency numbers returned as the degraded-success fallback.
pub fn fallback_contacts() -> Vec<EmergencyContact> {
    [("police", "110"), ("fire", "113"), ("ambulance", "118")]
        .into_iter()
        .map(|(service, phone)| EmergencyContact {
            service: service.to_string(),
            phone: phone.to_string(),
        })
        .collect()
}
