use actix_web::{HttpResponse, web};
use surcharge_shared::CalculationQuery;

use crate::middleware::AppResult;
use crate::state::AppState;

/// Sum of both numbers plus the current percentage of that sum.
///
/// GET /calculation/?number1=..&number2=..
pub async fn calculate(
    state: web::Data<AppState>,
    query: web::Query<CalculationQuery>,
) -> AppResult<HttpResponse> {
    let result = state
        .calculator
        .calculate(query.number1, query.number2)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}
