use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{course, course_presence};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::*;
use crate::models::shared::escape_like;
use crate::state::AppState;
use crate::utils::lookup;

/// Pair each course with its enrollment count, keeping the input order.
async fn with_counts<C: ConnectionTrait>(
    db: &C,
    courses: Vec<course::Model>,
) -> Result<Vec<CourseResponse>, AppError> {
    let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for presence in course_presence::Entity::find()
        .filter(course_presence::Column::CourseId.is_in(ids))
        .all(db)
        .await?
    {
        *counts.entry(presence.course_id).or_default() += 1;
    }

    Ok(courses
        .into_iter()
        .map(|c| {
            let enrolled = counts.get(&c.id).copied().unwrap_or(0);
            CourseResponse::new(c, enrolled)
        })
        .collect())
}

async fn single<C: ConnectionTrait>(db: &C, model: course::Model) -> Result<CourseResponse, AppError> {
    let enrolled = course_presence::Entity::find()
        .filter(course_presence::Column::CourseId.eq(model.id))
        .count(db)
        .await?;
    Ok(CourseResponse::new(model, enrolled))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Courses",
    operation_id = "listCourses",
    summary = "List courses",
    description = "All courses ordered by date.",
    responses(
        (status = 200, description = "Courses", body = Vec<CourseResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_courses(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let courses = course::Entity::find()
        .order_by_asc(course::Column::Datetime)
        .all(&state.db)
        .await?;
    Ok(Json(with_counts(&state.db, courses).await?))
}

#[utoipa::path(
    get,
    path = "/upcoming",
    tag = "Courses",
    operation_id = "listUpcomingCourses",
    summary = "List upcoming courses",
    description = "Courses scheduled from now on, soonest first.",
    responses(
        (status = 200, description = "Courses", body = Vec<CourseResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_upcoming_courses(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let courses = course::Entity::find()
        .filter(course::Column::Datetime.gte(Utc::now()))
        .order_by_asc(course::Column::Datetime)
        .all(&state.db)
        .await?;
    Ok(Json(with_counts(&state.db, courses).await?))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Courses",
    operation_id = "searchCourses",
    summary = "Search courses by title",
    description = "Case-insensitive substring match on the title.",
    params(CourseSearchQuery),
    responses(
        (status = 200, description = "Matching courses", body = Vec<CourseResponse>),
        (status = 400, description = "Blank search term (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn search_courses(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CourseSearchQuery>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let term = escape_like(query.title.trim());
    if term.is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }

    let courses = course::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(course::Column::Title)))
                .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
        )
        .order_by_asc(course::Column::Datetime)
        .all(&state.db)
        .await?;
    Ok(Json(with_counts(&state.db, courses).await?))
}

#[utoipa::path(
    get,
    path = "/enrollments/me",
    tag = "Courses",
    operation_id = "listMyEnrollments",
    summary = "Courses the caller is enrolled in",
    responses(
        (status = 200, description = "Courses", body = Vec<CourseResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_enrollments(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let course_ids: Vec<Uuid> = course_presence::Entity::find()
        .filter(course_presence::Column::UserId.eq(auth_user.user_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| p.course_id)
        .collect();

    let courses = course::Entity::find()
        .filter(course::Column::Id.is_in(course_ids))
        .order_by_asc(course::Column::Datetime)
        .all(&state.db)
        .await?;
    Ok(Json(with_counts(&state.db, courses).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Courses",
    operation_id = "getCourse",
    summary = "Get a course",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id = %id))]
pub async fn get_course(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, AppError> {
    let model = lookup::find_course(&state.db, id).await?;
    Ok(Json(single(&state.db, model).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Courses",
    operation_id = "createCourse",
    summary = "Create a course",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_course(&payload)?;
    lookup::ensure_address(&state.db, payload.address_id).await?;

    let now = Utc::now();
    let model = course::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        datetime: Set(payload.datetime),
        address_id: Set(payload.address_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(CourseResponse::new(model, 0))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Courses",
    operation_id = "updateCourse",
    summary = "Update a course",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_admin()?;
    validate_course(&payload)?;

    let existing = lookup::find_course(&state.db, id).await?;
    lookup::ensure_address(&state.db, payload.address_id).await?;

    let mut active: course::ActiveModel = existing.into();
    active.title = Set(payload.title.trim().to_string());
    active.description = Set(payload.description.trim().to_string());
    active.datetime = Set(payload.datetime);
    active.address_id = Set(payload.address_id);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(single(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Courses",
    operation_id = "deleteCourse",
    summary = "Delete a course",
    description = "Enrollments are removed with the course.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    let existing = lookup::find_course(&state.db, id).await?;
    existing.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/enrollment",
    tag = "Courses",
    operation_id = "enrollInCourse",
    summary = "Enroll in a course",
    description = "Merchants only; admins cannot enroll.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Admins cannot enroll (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or caller account not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already enrolled (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id, user_id = %auth_user.user_id))]
pub async fn enroll(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if auth_user.is_admin() {
        return Err(AppError::PermissionDenied);
    }
    lookup::find_course(&state.db, id).await?;
    lookup::find_user(&state.db, auth_user.user_id).await?;

    let existing = course_presence::Entity::find_by_id((auth_user.user_id, id))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Already enrolled in this course".into()));
    }

    let model = course_presence::ActiveModel {
        user_id: Set(auth_user.user_id),
        course_id: Set(id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Already enrolled in this course"))?;

    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from(model))))
}

#[utoipa::path(
    delete,
    path = "/{id}/enrollment",
    tag = "Courses",
    operation_id = "cancelEnrollment",
    summary = "Cancel an enrollment",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Enrollment cancelled"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not enrolled (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id, user_id = %auth_user.user_id))]
pub async fn cancel_enrollment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = course_presence::Entity::delete_many()
        .filter(course_presence::Column::UserId.eq(auth_user.user_id))
        .filter(course_presence::Column::CourseId.eq(id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Enrollment not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
