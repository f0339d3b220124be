use axum::{
    extract::{Path, State},
    Json,
};
use parley_core::access::can_select;
use parley_core::presentation::{catalog_cards, plan_banner};
use parley_core::scenario::find_scenario;
use parley_core::script::opening_prompt;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/scenarios: the catalog as cards for the current entitlement
pub async fn list_scenarios(State(app): State<AppState>) -> Json<serde_json::Value> {
    let access = app.access();
    Json(serde_json::json!({
        "banner": plan_banner(access),
        "scenarios": catalog_cards(access),
    }))
}

/// GET /api/scenarios/:id: one scenario with its opening line
pub async fn get_scenario(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let scenario = find_scenario(&id)?;
    Ok(Json(serde_json::json!({
        "scenario": scenario,
        "locked": !can_select(scenario, app.access()),
        "opening": opening_prompt(Some(scenario.key)),
    })))
}

/// GET /api/access: current entitlement and plan banner
pub async fn get_access(State(app): State<AppState>) -> Json<serde_json::Value> {
    let access = app.access();
    Json(serde_json::json!({
        "access": access,
        "banner": plan_banner(access),
    }))
}
