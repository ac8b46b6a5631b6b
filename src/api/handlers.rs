use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::ApiState;
use crate::derivation::{
    AccessAndMobilityEntry, PlmnSnssaiEntry, PolicyControlEntry, SessionManagementEntry,
};
use crate::model::Plmn;

pub async fn plmn(State(state): State<ApiState>) -> Json<Vec<Plmn>> {
    Json(state.service.views().plmn.clone())
}

pub async fn plmn_snssai(State(state): State<ApiState>) -> Json<Vec<PlmnSnssaiEntry>> {
    Json(state.service.views().plmn_snssai.clone())
}

pub async fn access_and_mobility(
    State(state): State<ApiState>,
) -> Json<Vec<AccessAndMobilityEntry>> {
    Json(state.service.views().access_and_mobility.clone())
}

pub async fn session_management(
    State(state): State<ApiState>,
) -> Json<Vec<SessionManagementEntry>> {
    Json(state.service.views().session_management.clone())
}

pub async fn policy_control(State(state): State<ApiState>) -> Json<Vec<PolicyControlEntry>> {
    Json(state.service.views().policy_control.clone())
}

pub async fn imsi_qos(
    State(state): State<ApiState>,
    Path((dnn, imsi)): Path<(String, String)>,
) -> Response {
    match state.service.imsi_qos(&dnn, &imsi) {
        Some(entry) => Json(entry).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn trigger_sync(State(state): State<ApiState>) -> StatusCode {
    state.service.notify_config_changed();
    StatusCode::ACCEPTED
}
