/*
 * Responsibility
 * - GET /whoami: echo the confirmed identity
 * - Rejection (401) comes from the Identity extractor, i.e. the handler side decides
 */
use axum::Json;

use crate::api::v1::{dto::whoami::WhoAmIResponse, extractors::Identity};

pub async fn whoami(Identity(token): Identity) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse::from(token))
}
