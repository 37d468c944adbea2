//! Analytics endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    auth::AuthUser,
    error::{ApiResult, ErrorResponse},
    models::*,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/analytics/dashboard",
    params(AsOfParams),
    responses(
        (status = 200, description = "Today's progress and the trailing week", body = DashboardResponse),
        (status = 400, description = "Invalid asOf date or UTC offset", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<AsOfParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<DashboardResponse>>> {
    let Query(params) = params?;
    let offset = state.utc_offset(params.utc_offset_minutes)?;
    let today = state.today(parse_day_param("asOf", params.as_of.as_deref())?, offset);

    let dashboard = state.aggregator.dashboard(&auth.user_id, today, offset).await?;

    Ok(Json(ApiResponse::ok(DashboardResponse {
        today: TodayStats {
            habits_completed: dashboard.habits_completed_today,
            total_habits: dashboard.total_habits,
        },
        week: WeekStats {
            habit_completion_rate: dashboard.week.rate(),
            best_streak: dashboard
                .best_streak
                .map(|(habit_name, streak)| BestStreak { habit_name, streak }),
        },
    })))
}
