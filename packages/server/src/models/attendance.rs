use chrono::{DateTime, NaiveDate, Utc};
use common::{AbsenceType, JustificationStanding};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::validate_optional_text;
use crate::entity::{absence, justification};
use crate::error::AppError;
use crate::utils::attendance::ComplianceSummary;

/// Admin bulk registration of absences for one fair day.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAbsencesRequest {
    pub date: NaiveDate,
    /// Merchants who missed the fair. Duplicates are ignored.
    pub user_ids: Vec<Uuid>,
}

pub fn validate_register_absences(payload: &RegisterAbsencesRequest) -> Result<(), AppError> {
    if payload.user_ids.is_empty() {
        return Err(AppError::Validation("userIds must not be empty".into()));
    }
    if payload.user_ids.len() > 1000 {
        return Err(AppError::Validation("Too many userIds: max 1000".into()));
    }
    Ok(())
}

/// A merchant announcing an upcoming absence.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct NotifyAbsenceRequest {
    pub date: NaiveDate,
    /// Becomes a pending justification when not blank.
    pub reason: Option<String>,
}

pub fn validate_notify_absence(payload: &NotifyAbsenceRequest) -> Result<(), AppError> {
    validate_optional_text(payload.reason.as_deref(), "Reason", 2000)
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewJustificationRequest {
    pub is_approved: bool,
    pub reason: Option<String>,
}

pub fn validate_review(payload: &ReviewJustificationRequest) -> Result<(), AppError> {
    validate_optional_text(payload.reason.as_deref(), "Reason", 1000)
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JustificationResponse {
    pub id: Uuid,
    pub absence_id: Uuid,
    pub description: String,
    /// `null` while pending, then the admin's decision.
    pub is_approved: Option<bool>,
    pub approved_by_admin_id: Option<Uuid>,
    pub review_reason: Option<String>,
    pub has_annex: bool,
    pub annex_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<justification::Model> for JustificationResponse {
    fn from(m: justification::Model) -> Self {
        Self {
            id: m.id,
            absence_id: m.absence_id,
            description: m.description,
            is_approved: m.approved,
            approved_by_admin_id: m.approved_by_admin_id,
            review_reason: m.review_reason,
            has_annex: m.annex.is_some(),
            annex_filename: m.annex_filename,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    pub is_accepted: bool,
    /// Derived from the justification's approval flag.
    pub standing: JustificationStanding,
    pub justification: Option<JustificationResponse>,
    pub created_at: DateTime<Utc>,
}

impl AbsenceResponse {
    pub fn new(m: absence::Model, justification: Option<justification::Model>) -> Self {
        let standing = JustificationStanding::derive(justification.as_ref().map(|j| j.approved));
        Self {
            id: m.id,
            user_id: m.user_id,
            date: m.date,
            absence_type: m.absence_type,
            is_accepted: m.accepted.unwrap_or(false),
            standing,
            justification: justification.map(JustificationResponse::from),
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_absences: u64,
    pub justified_absences: u64,
    pub pending_justifications: u64,
    pub unjustified_absences: u64,
    pub consecutive_absences: u64,
    pub is_compliant: bool,
}

impl From<ComplianceSummary> for SummaryResponse {
    fn from(s: ComplianceSummary) -> Self {
        Self {
            total_absences: s.total,
            justified_absences: s.justified,
            pending_justifications: s.pending,
            unjustified_absences: s.unjustified,
            consecutive_absences: s.consecutive,
            is_compliant: s.compliant,
        }
    }
}
