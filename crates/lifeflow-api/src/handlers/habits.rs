//! Habit and habit-log endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use lifeflow_store::{DateRange, HabitUpdate};

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorResponse},
    models::*,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/habits",
    params(AsOfParams),
    responses(
        (status = 200, description = "Habits with statistics, newest first", body = Vec<HabitWithStats>),
        (status = 400, description = "Invalid asOf date or UTC offset", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn list_habits(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<AsOfParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<HabitWithStats>>>> {
    let Query(params) = params?;
    let offset = state.utc_offset(params.utc_offset_minutes)?;
    let today = state.today(parse_day_param("asOf", params.as_of.as_deref())?, offset);

    let habits = state
        .aggregator
        .list_with_stats(&auth.user_id, today, offset)
        .await?;

    Ok(Json(ApiResponse::ok(habits)))
}

#[utoipa::path(
    post,
    path = "/api/v1/habits",
    request_body = CreateHabitRequest,
    responses(
        (status = 201, description = "Habit created", body = HabitResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn create_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateHabitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<HabitResponse>>)> {
    let Json(req) = body?;
    let new_habit = req.into_new_habit();
    new_habit.validate()?;

    let habit = state.store.create_habit(&auth.user_id, new_habit).await?;

    tracing::info!(habit_id = %habit.id, user_id = %auth.user_id, "habit created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(habit.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/habits/{id}",
    params(
        ("id" = String, Path, description = "Habit ID")
    ),
    responses(
        (status = 200, description = "Habit details", body = HabitResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn get_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<HabitResponse>>> {
    let habit = state
        .store
        .get_habit(&id, &auth.user_id)
        .await?
        .ok_or_else(ApiError::habit_not_found)?;

    Ok(Json(ApiResponse::ok(habit.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/habits/{id}",
    params(
        ("id" = String, Path, description = "Habit ID")
    ),
    request_body = UpdateHabitRequest,
    responses(
        (status = 200, description = "Habit updated", body = HabitResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn update_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateHabitRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<HabitResponse>>> {
    let Json(req) = body?;
    let update = HabitUpdate::from(req);
    update.validate()?;

    let habit = state.store.update_habit(&id, &auth.user_id, update).await?;

    Ok(Json(ApiResponse::ok(habit.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/habits/{id}",
    params(
        ("id" = String, Path, description = "Habit ID")
    ),
    responses(
        (status = 200, description = "Habit and its logs deleted", body = DeleteHabitResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn delete_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<DeleteHabitResponse>>> {
    state.store.delete_habit(&id, &auth.user_id).await?;

    tracing::info!(habit_id = %id, user_id = %auth.user_id, "habit deleted");

    Ok(Json(ApiResponse::ok(DeleteHabitResponse {
        id,
        message: "Habit deleted successfully".to_string(),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/habits/{id}/log",
    params(
        ("id" = String, Path, description = "Habit ID")
    ),
    request_body = LogHabitRequest,
    responses(
        (status = 201, description = "Log recorded (created or overwritten)", body = HabitLogResponse),
        (status = 400, description = "Invalid date or intensity", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn log_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<LogHabitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<HabitLogResponse>>)> {
    let Json(req) = body?;

    let log = state.ingestion.record(&auth.user_id, &id, req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(log.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/habits/{id}/logs",
    params(
        ("id" = String, Path, description = "Habit ID"),
        LogRangeParams
    ),
    responses(
        (status = 200, description = "Logs, newest day first", body = Vec<HabitLogResponse>),
        (status = 400, description = "Invalid date", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse)
    ),
    tag = "habits"
)]
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    params: Result<Query<LogRangeParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<HabitLogResponse>>>> {
    let Query(params) = params?;
    let range = DateRange::new(
        parse_day_param("startDate", params.start_date.as_deref())?,
        parse_day_param("endDate", params.end_date.as_deref())?,
    );

    let logs = state.store.list_logs(&id, &auth.user_id, range).await?;

    Ok(Json(ApiResponse::ok(
        logs.into_iter().map(HabitLogResponse::from).collect(),
    )))
}
