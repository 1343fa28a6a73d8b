//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod chat;
pub mod entities;
pub mod errors;
pub mod report;
pub mod risk;

pub use chat::{BotIdentity, Button, ChatEvent, ChatMember, CommandScope, CommandSpec, MessageRef};
pub use entities::{
    BADGE_DISPLAY_LIMIT, BadgeAward, CommonMember, ComparisonResult, GroupId, GroupIntersection,
    GroupMembership, GroupRoster, Rank, UserGroup, UserId, UserProfile,
};
pub use errors::{DomainError, FailureKind, ResultExt};
pub use report::{Accent, Attachment, REPORT_FOOTER, Reply, Report, ReportField};
pub use risk::{RiskAssessment, RiskFactor, RiskInputs, RiskLevel, score_risk};
