use axum::{extract::State, Extension, Json};
use rentscope_core::City;

use crate::middleware::{RequestId, UpstreamCalls};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (
    Extension<UpstreamCalls>,
    Result<Json<ApiResponse<Vec<City>>>, ApiError>,
) {
    // One branch-list call whether or not it succeeds.
    let calls = Extension(UpstreamCalls(1));
    let cities = match state.aggregator.list_cities().await {
        Ok(cities) => cities,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list cities");
            return (
                calls,
                Err(ApiError::new(
                    req_id.0,
                    "upstream_unavailable",
                    "rental broker is unavailable",
                )),
            );
        }
    };

    (
        calls,
        Ok(Json(ApiResponse {
            data: cities,
            meta: ResponseMeta::new(req_id.0),
        })),
    )
}
