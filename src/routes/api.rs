use actix_web::{HttpResponse, Responder, get, web};
use log::error;
use serde_json::json;

use crate::dto::api::LeadsApiQuery;
use crate::services::ServiceError;
use crate::services::api as api_service;
use crate::services::leads::LeadsController;
use crate::store::opportunities::OpportunitiesProvider;

#[get("/v1/leads")]
pub async fn api_v1_leads(
    params: web::Query<LeadsApiQuery>,
    controller: web::Data<LeadsController>,
) -> impl Responder {
    match api_service::list_leads(controller.api(), params.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ServiceError::Validation(message)) => {
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        Err(e) => {
            error!("Failed to list leads: {e}");
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[get("/v1/opportunities")]
pub async fn api_v1_opportunities(provider: web::Data<OpportunitiesProvider>) -> impl Responder {
    match api_service::list_opportunities(&provider.consumer()) {
        Ok(opportunities) => HttpResponse::Ok().json(opportunities),
        Err(e) => {
            error!("Failed to list opportunities: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
