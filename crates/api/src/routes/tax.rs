//! Income tax estimate routes.

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use gigbooks_core::tax::{TaxAssessment, TaxRegime, TaxService};

/// Creates the tax routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/tax/estimate", get(tax_estimate))
}

/// Query parameters for the tax estimate.
#[derive(Debug, Deserialize)]
pub struct TaxEstimateQuery {
    /// Annual income to assess.
    pub income: Decimal,
}

/// One regime's assessment in the estimate response.
#[derive(Debug, Serialize)]
pub struct RegimeEstimate {
    /// Tax due under this regime.
    pub tax_due: Decimal,
    /// Effective rate as a percentage.
    pub effective_rate: Decimal,
    /// Whether the income falls under the exemption threshold.
    pub is_exempt: bool,
}

impl From<TaxAssessment> for RegimeEstimate {
    fn from(assessment: TaxAssessment) -> Self {
        Self {
            tax_due: assessment.tax_due,
            effective_rate: assessment.effective_rate,
            is_exempt: assessment.is_exempt,
        }
    }
}

/// GET `/tax/estimate?income=` - Assess both regimes and recommend the
/// cheaper one.
async fn tax_estimate(Query(query): Query<TaxEstimateQuery>) -> impl IntoResponse {
    if query.income < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_income",
                "message": "Income must not be negative"
            })),
        )
            .into_response();
    }

    let flat = TaxService::flat_rate(query.income);
    let graduated = TaxService::graduated(query.income);

    let recommended = if flat.tax_due <= graduated.tax_due {
        TaxRegime::FlatRate
    } else {
        TaxRegime::Graduated
    };

    (
        StatusCode::OK,
        Json(json!({
            "income": query.income,
            "flat_rate": RegimeEstimate::from(flat),
            "graduated": RegimeEstimate::from(graduated),
            "recommended": recommended.to_string(),
        })),
    )
        .into_response()
}
