use std::collections::HashMap;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use common::{AbsenceType, AccountStatus, JustificationStanding, NotificationType};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{absence, justification, user};
use crate::error::{AppError, ErrorBody, is_unique_violation};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::attendance::*;
use crate::models::shared::{dedup_ids, trimmed};
use crate::state::AppState;
use crate::utils::attendance::{AbsenceFacts, summarize};
use crate::utils::lookup;
use crate::utils::notify::{self, Notice};
use crate::utils::upload::{
    UploadedFile, binary_response, multipart_error, read_file_field, read_text_field,
};

const DUPLICATE_ABSENCE: &str = "An absence is already recorded for this date";

/// Attach each absence's justification, preserving the input order.
async fn with_justifications<C: ConnectionTrait>(
    db: &C,
    absences: Vec<absence::Model>,
) -> Result<Vec<AbsenceResponse>, AppError> {
    let ids: Vec<Uuid> = absences.iter().map(|a| a.id).collect();
    let mut by_absence: HashMap<Uuid, justification::Model> = justification::Entity::find()
        .filter(justification::Column::AbsenceId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|j| (j.absence_id, j))
        .collect();

    Ok(absences
        .into_iter()
        .map(|a| {
            let j = by_absence.remove(&a.id);
            AbsenceResponse::new(a, j)
        })
        .collect())
}

async fn absences_of<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<AbsenceResponse>, AppError> {
    let absences = absence::Entity::find()
        .filter(absence::Column::UserId.eq(user_id))
        .order_by_desc(absence::Column::Date)
        .all(db)
        .await?;
    with_justifications(db, absences).await
}

#[utoipa::path(
    post,
    path = "/absences",
    tag = "Attendance",
    operation_id = "registerAbsences",
    summary = "Register absences for a fair day",
    description = "Creates a `REGISTERED` absence for each listed merchant. Unknown users, \
        users that are not `ACTIVE` and users that already have an absence on that date are \
        skipped. Only the absences actually created are returned.",
    request_body = RegisterAbsencesRequest,
    responses(
        (status = 201, description = "Absences created", body = Vec<AbsenceResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(date = %payload.date, count = payload.user_ids.len()))]
pub async fn register_absences(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterAbsencesRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_register_absences(&payload)?;

    let mut created = Vec::new();
    for user_id in dedup_ids(&payload.user_ids) {
        let Some(target) = user::Entity::find_by_id(user_id).one(&state.db).await? else {
            tracing::info!(%user_id, "Skipping absence: user not found");
            continue;
        };
        if target.status != AccountStatus::Active || target.user_type.is_admin() {
            tracing::info!(%user_id, status = %target.status, "Skipping absence: user is not an active merchant");
            continue;
        }

        let exists = absence::Entity::find()
            .filter(absence::Column::UserId.eq(user_id))
            .filter(absence::Column::Date.eq(payload.date))
            .one(&state.db)
            .await?
            .is_some();
        if exists {
            tracing::info!(%user_id, "Skipping absence: already recorded");
            continue;
        }

        let now = Utc::now();
        let new_absence = absence::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            date: Set(payload.date),
            absence_type: Set(AbsenceType::Registered),
            accepted: Set(Some(false)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        match new_absence.insert(&state.db).await {
            Ok(model) => created.push(AbsenceResponse::new(model, None)),
            Err(e) if is_unique_violation(&e) => {
                tracing::info!(%user_id, "Skipping absence: recorded concurrently");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/absences/me",
    tag = "Attendance",
    operation_id = "listMyAbsences",
    summary = "List the caller's absences",
    description = "Newest first, each with its justification embedded.",
    responses(
        (status = 200, description = "Absences", body = Vec<AbsenceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_absences(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AbsenceResponse>>, AppError> {
    Ok(Json(absences_of(&state.db, auth_user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/absences/user/{user_id}",
    tag = "Attendance",
    operation_id = "listUserAbsences",
    summary = "List a merchant's absences",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Absences", body = Vec<AbsenceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id))]
pub async fn list_user_absences(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AbsenceResponse>>, AppError> {
    auth_user.require_admin()?;
    lookup::find_user(&state.db, user_id).await?;
    Ok(Json(absences_of(&state.db, user_id).await?))
}

#[utoipa::path(
    post,
    path = "/absence/notify",
    tag = "Attendance",
    operation_id = "notifyAbsence",
    summary = "Announce an absence",
    description = "Records a `NOTIFIED` absence for the caller. A non-blank `reason` is stored \
        as a justification pending review.",
    request_body = NotifyAbsenceRequest,
    responses(
        (status = 201, description = "Absence recorded", body = AbsenceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Absence already recorded for that date (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, date = %payload.date))]
pub async fn notify_absence(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<NotifyAbsenceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_notify_absence(&payload)?;

    let txn = state.db.begin().await?;
    lookup::find_user(&txn, auth_user.user_id).await?;

    let exists = absence::Entity::find()
        .filter(absence::Column::UserId.eq(auth_user.user_id))
        .filter(absence::Column::Date.eq(payload.date))
        .one(&txn)
        .await?
        .is_some();
    if exists {
        return Err(AppError::Conflict(DUPLICATE_ABSENCE.into()));
    }

    let now = Utc::now();
    let absence = absence::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(auth_user.user_id),
        date: Set(payload.date),
        absence_type: Set(AbsenceType::Notified),
        accepted: Set(Some(false)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_ABSENCE))?;

    let justification = match trimmed(payload.reason) {
        Some(reason) => Some(
            justification::ActiveModel {
                id: Set(Uuid::now_v7()),
                absence_id: Set(absence.id),
                description: Set(reason),
                approved: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?,
        ),
        None => None,
    };

    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(AbsenceResponse::new(absence, justification)),
    ))
}

#[utoipa::path(
    post,
    path = "/absences/{id}/justify",
    tag = "Attendance",
    operation_id = "submitJustification",
    summary = "Justify an absence",
    description = "Multipart form with a required `description` and an optional `file` annex. \
        Resubmitting while the justification is pending replaces it; once reviewed it can no \
        longer change.",
    params(("id" = Uuid, Path, description = "Absence ID")),
    request_body(content_type = "multipart/form-data", description = "`description` text and optional `file`"),
    responses(
        (status = 201, description = "Justification stored", body = JustificationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Absence belongs to someone else (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Absence not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Justification already reviewed (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Annex too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(absence_id = %absence_id))]
pub async fn submit_justification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(absence_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let absence = lookup::find_absence(&state.db, absence_id).await?;
    if absence.user_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let limit = state.config.storage.max_upload_size;
    let mut description: Option<String> = None;
    let mut annex: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        match field.name() {
            Some("description") => {
                description = Some(read_text_field(field, "description").await?);
            }
            Some("file") => {
                annex = read_file_field(field, limit).await?;
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let description = trimmed(description)
        .ok_or_else(|| AppError::Validation("Description must not be empty".into()))?;
    if description.chars().count() > 2000 {
        return Err(AppError::Validation(
            "Description must be at most 2000 characters".into(),
        ));
    }

    let txn = state.db.begin().await?;
    let existing = justification::Entity::find()
        .filter(justification::Column::AbsenceId.eq(absence.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let now = Utc::now();
    let saved = match existing {
        Some(j) if j.approved.is_some() => {
            return Err(AppError::Conflict(
                "Justification has already been reviewed".into(),
            ));
        }
        Some(j) => {
            let mut active: justification::ActiveModel = j.into();
            active.description = Set(description);
            if let Some(file) = annex {
                active.annex = Set(Some(file.data));
                active.annex_filename = Set(Some(file.filename));
                active.annex_content_type = Set(Some(file.content_type));
            }
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            let (data, filename, content_type) = match annex {
                Some(f) => (Some(f.data), Some(f.filename), Some(f.content_type)),
                None => (None, None, None),
            };
            justification::ActiveModel {
                id: Set(Uuid::now_v7()),
                absence_id: Set(absence.id),
                description: Set(description),
                annex: Set(data),
                annex_filename: Set(filename),
                annex_content_type: Set(content_type),
                approved: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                AppError::conflict_on_unique(e, "A justification was submitted concurrently")
            })?
        }
    };

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(JustificationResponse::from(saved))))
}

#[utoipa::path(
    get,
    path = "/justifications/pending",
    tag = "Attendance",
    operation_id = "listPendingJustifications",
    summary = "List justifications awaiting review",
    description = "Absences whose justification has not been reviewed yet, oldest submission first.",
    responses(
        (status = 200, description = "Absences with pending justifications", body = Vec<AbsenceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pending_justifications(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AbsenceResponse>>, AppError> {
    auth_user.require_admin()?;

    let rows = absence::Entity::find()
        .find_also_related(justification::Entity)
        .filter(justification::Column::Id.is_not_null())
        .filter(justification::Column::Approved.is_null())
        .order_by_asc(justification::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(a, j)| AbsenceResponse::new(a, j))
            .collect(),
    ))
}

#[utoipa::path(
    put,
    path = "/justifications/{id}/review",
    tag = "Attendance",
    operation_id = "reviewJustification",
    summary = "Approve or reject a justification",
    description = "Records the decision and mirrors it onto the absence's `isAccepted`. Repeating \
        the same decision is a no-op; contradicting an earlier decision is a conflict. The \
        merchant receives an `ABSENCE` notification.",
    params(("id" = Uuid, Path, description = "Justification ID")),
    request_body = ReviewJustificationRequest,
    responses(
        (status = 200, description = "Updated absence", body = AbsenceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Justification not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed with another decision (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, approved = payload.is_approved))]
pub async fn review_justification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ReviewJustificationRequest>,
) -> Result<Json<AbsenceResponse>, AppError> {
    auth_user.require_admin()?;
    validate_review(&payload)?;

    let txn = state.db.begin().await?;
    let existing = lookup::find_justification_for_update(&txn, id).await?;

    match existing.approved {
        Some(previous) if previous == payload.is_approved => {
            let absence = lookup::find_absence(&txn, existing.absence_id).await?;
            txn.commit().await?;
            return Ok(Json(AbsenceResponse::new(absence, Some(existing))));
        }
        Some(_) => {
            return Err(AppError::Conflict(
                "Justification has already been reviewed with a different decision".into(),
            ));
        }
        None => {}
    }

    let now = Utc::now();
    let reason = trimmed(payload.reason);

    let mut active: justification::ActiveModel = existing.into();
    active.approved = Set(Some(payload.is_approved));
    active.approved_by_admin_id = Set(Some(auth_user.user_id));
    active.review_reason = Set(reason.clone());
    active.updated_at = Set(now);
    let reviewed = active.update(&txn).await?;

    let absence = lookup::find_absence(&txn, reviewed.absence_id).await?;
    let mut active: absence::ActiveModel = absence.into();
    active.accepted = Set(Some(payload.is_approved));
    active.updated_at = Set(now);
    let absence = active.update(&txn).await?;

    let (title, verdict) = if payload.is_approved {
        ("Justification approved", "approved")
    } else {
        ("Justification rejected", "rejected")
    };
    let mut message = format!("Your justification for {} was {verdict}.", absence.date);
    if let Some(reason) = &reason {
        message.push_str(&format!(" Reason: {reason}"));
    }
    notify::push(
        &txn,
        absence.user_id,
        &Notice {
            kind: NotificationType::Absence,
            title,
            message,
            action_url: Some("/attendance"),
        },
    )
    .await?;

    txn.commit().await?;

    Ok(Json(AbsenceResponse::new(absence, Some(reviewed))))
}

#[utoipa::path(
    get,
    path = "/justifications/{id}/annex",
    tag = "Attendance",
    operation_id = "downloadJustificationAnnex",
    summary = "Download a justification's annex",
    description = "Available to the absence's owner and to admins.",
    params(("id" = Uuid, Path, description = "Justification ID")),
    responses(
        (status = 200, description = "Annex bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Justification or annex not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn download_annex(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let found = justification::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Justification not found".into()))?;
    let absence = lookup::find_absence(&state.db, found.absence_id).await?;
    auth_user.require_owner_or_admin(absence.user_id)?;

    let data = found
        .annex
        .ok_or_else(|| AppError::NotFound("Justification has no annex".into()))?;
    let filename = found.annex_filename.unwrap_or_else(|| "annex".into());
    let content_type = found
        .annex_content_type
        .unwrap_or_else(|| "application/octet-stream".into());

    binary_response(data, &content_type, Some(&filename))
}

#[utoipa::path(
    get,
    path = "/summary",
    tag = "Attendance",
    operation_id = "getAttendanceSummary",
    summary = "Compliance summary for the caller",
    description = "Counts all of the caller's absences, or only the last \
        `attendance.summary_window_days` days when that setting is present, and reports the \
        current streak of unexcused absences. A merchant is compliant while the \
        streak is below 3 and fewer than 6 absences are unjustified.",
    responses(
        (status = 200, description = "Summary", body = SummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    let rules = &state.config.attendance;
    let mut query = absence::Entity::find()
        .find_also_related(justification::Entity)
        .filter(absence::Column::UserId.eq(auth_user.user_id));
    if let Some(days) = rules.summary_window_days {
        let since = Utc::now().date_naive() - Duration::days(days);
        query = query.filter(absence::Column::Date.gte(since));
    }

    let rows = query.all(&state.db).await?;

    let facts: Vec<AbsenceFacts> = rows
        .into_iter()
        .map(|(a, j)| AbsenceFacts {
            date: a.date,
            accepted: a.accepted.unwrap_or(false),
            standing: JustificationStanding::derive(j.map(|j| j.approved)),
        })
        .collect();

    Ok(Json(summarize(&facts, rules).into()))
}
