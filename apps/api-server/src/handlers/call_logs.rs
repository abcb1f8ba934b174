use actix_web::{HttpResponse, web};
use surcharge_core::domain::CallLog;
use surcharge_shared::dto::CALL_LOG_TIMESTAMP_FORMAT;
use surcharge_shared::{CallLogPageQuery, CallLogResponse};

use crate::middleware::{AppError, AppResult};
use crate::state::AppState;

const MAX_PAGE_SIZE: u64 = 100;

fn to_response(log: CallLog) -> CallLogResponse {
    CallLogResponse {
        id: log.id,
        timestamp: log.timestamp.format(CALL_LOG_TIMESTAMP_FORMAT).to_string(),
        endpoint: log.endpoint,
        parameters: log.parameters,
        response: log.response,
        error: log.error,
        status_code: log.status_code,
    }
}

/// Recorded calls, most recent first.
///
/// GET /call-logs/?page=0&size=10
pub async fn list_call_logs(
    state: web::Data<AppState>,
    query: web::Query<CallLogPageQuery>,
) -> AppResult<HttpResponse> {
    let CallLogPageQuery { page, size } = query.into_inner();
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(AppError::InvalidRequest(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let logs = state.call_logs.recent(page, size).await?;
    let body: Vec<CallLogResponse> = logs.into_iter().map(to_response).collect();

    Ok(HttpResponse::Ok().json(body))
}
