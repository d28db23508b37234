use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use log::error;
use tera::Tera;

use crate::domain::lead::LeadStatus;
use crate::forms::leads::{ConvertLeadForm, PreferencesForm, SaveLeadForm};
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::leads::LeadsController;
use crate::services::main as main_service;

async fn render_index(
    controller: &LeadsController,
    selected: Option<&str>,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    let page = match main_service::load_index_page(controller, selected).await {
        Ok(page) => page,
        Err(ServiceError::NotFound | ServiceError::Validation(_)) => {
            FlashMessage::error("Lead not found.").send();
            return redirect("/");
        }
        Err(e) => {
            error!("Failed to load leads page: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(flash_messages, "index");
    context.insert("page", &page);
    context.insert("statuses", &LeadStatus::ALL);

    render_template(tera, "main/index.html", &context)
}

#[get("/")]
pub async fn show_index(
    controller: web::Data<LeadsController>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_index(&controller, None, &flash_messages, &tera).await
}

#[get("/lead/{lead_id}")]
pub async fn show_lead(
    lead_id: web::Path<String>,
    controller: web::Data<LeadsController>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_index(&controller, Some(lead_id.as_str()), &flash_messages, &tera).await
}

/// Loads the next page and lands on its first row, below the rows the user
/// already scrolled past.
#[get("/more")]
pub async fn load_more(controller: web::Data<LeadsController>) -> impl Responder {
    let loaded = controller.leads().len();
    match controller.load_more().await {
        Ok(true) => redirect(&format!("/#lead-{loaded}")),
        Ok(false) => redirect("/#leads-end"),
        Err(e) => {
            error!("Failed to load more leads: {e}");
            redirect("/#leads-end")
        }
    }
}

#[post("/lead/save")]
pub async fn save_lead(
    controller: web::Data<LeadsController>,
    web::Form(form): web::Form<SaveLeadForm>,
) -> impl Responder {
    let editor_url = format!("/lead/{}", form.id);

    match main_service::save_lead(&controller, form).await {
        Ok(()) => {
            FlashMessage::success("Lead saved.").send();
            redirect("/")
        }
        Err(ServiceError::Validation(message) | ServiceError::Transport(message)) => {
            FlashMessage::error(message).send();
            redirect(&editor_url)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Lead not found.").send();
            redirect("/")
        }
        Err(e) => {
            error!("Failed to save lead: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/lead/convert")]
pub async fn convert_lead(
    controller: web::Data<LeadsController>,
    web::Form(form): web::Form<ConvertLeadForm>,
) -> impl Responder {
    let editor_url = format!("/lead/{}", form.id);

    match main_service::convert_lead(&controller, form) {
        Ok(()) => {
            FlashMessage::success("Lead converted.").send();
            redirect(&editor_url)
        }
        Err(ServiceError::Validation(message)) => {
            FlashMessage::error(message).send();
            redirect(&editor_url)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Lead not found.").send();
            redirect("/")
        }
        Err(e) => {
            error!("Failed to convert lead: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/preferences")]
pub async fn save_preferences(
    controller: web::Data<LeadsController>,
    web::Form(form): web::Form<PreferencesForm>,
) -> impl Responder {
    // Fetch failures are kept in the controller state and shown by the page.
    if let Err(e) = main_service::update_preferences(&controller, form).await {
        error!("Failed to apply preferences: {e}");
    }
    redirect("/")
}

#[post("/preferences/sort")]
pub async fn toggle_sort(controller: web::Data<LeadsController>) -> impl Responder {
    if let Err(e) = controller.toggle_sort().await {
        error!("Failed to toggle sort: {e}");
    }
    redirect("/")
}
