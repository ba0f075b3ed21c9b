//! Quote API endpoint

use api_types::quote::{QuoteRequest, QuoteView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, map_currency, server::ServerState, user};

/// Prices a prospective selection without persisting anything.
pub async fn price(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteView>, ServerError> {
    let quote = state
        .engine
        .price_quote(engine::QuoteCmd {
            package_id: payload.package_id,
            adult_count: payload.adult_count,
            child_count: payload.child_count,
            upcharge_ids: payload.upcharge_ids,
            gratuity_percent: payload.gratuity_percent,
            user_id: user.username.clone(),
        })
        .await?;

    Ok(Json(QuoteView {
        subtotal_minor: quote.subtotal.minor(),
        gratuity_minor: quote.gratuity.minor(),
        total_minor: quote.total.minor(),
        currency: map_currency(engine::Currency::default()),
    }))
}
