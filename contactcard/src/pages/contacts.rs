use axum::extract::rejection::FormRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use card_axum::{Flash, FlashCategory, FlashMessage, IncomingFlash};
use card_core::errors::CardError;
use card_core::ErrorKind;
use serde::Deserialize;

use crate::services::contacts::contacts_shared::{NOT_FOUND, SERVICE};
use crate::services::ContactChanges;

use super::{page_params, views, PageError, PageState};

pub const UPDATED: &str = "Contact successfully updated.";
const BAD_CSRF: &str = "The CSRF token is missing or invalid.";

/// The posted edit form. Absent fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub firstname: String,
    pub lastname: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub csrf_token: String,
}

impl ContactForm {
    fn into_changes(self) -> (ContactChanges, String) {
        let changes = ContactChanges {
            firstname: self.firstname,
            lastname: self.lastname,
            title: Some(self.title),
            email: self.email,
            phone: self.phone,
        };
        (changes, self.csrf_token)
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    CardError::from_anyhow(err).is_some_and(|e| e.kind == ErrorKind::NotFound)
}

fn back_to_index() -> Response {
    Flash::new().danger(NOT_FOUND).redirect("/")
}

pub async fn index(
    State(state): State<PageState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    if let Some(redirect) = state.require_sync().await? {
        return Ok(redirect);
    }

    let params = page_params(&headers, "GET", &uri);
    let contacts = state.app.service(SERVICE)?.find(params).await?;

    let page = Html(views::index(&contacts, &flash.messages)).into_response();
    Ok(flash.consume(page))
}

pub async fn edit(
    State(state): State<PageState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Path(sfid): Path<String>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    if let Some(redirect) = state.require_sync().await? {
        return Ok(redirect);
    }

    let params = page_params(&headers, "GET", &uri);
    let contact = match state.app.service(SERVICE)?.get(&sfid, params).await {
        Ok(contact) => contact,
        Err(e) if is_not_found(&e) => return Ok(back_to_index()),
        Err(e) => return Err(e.into()),
    };

    let html = views::contact_form(
        &contact.sfid,
        &ContactChanges::from_contact(&contact),
        &[],
        &state.csrf.token(&contact.sfid),
        &flash.messages,
    );
    Ok(flash.consume(Html(html).into_response()))
}

/// Valid input is saved and redirected back to the form (303) with a
/// success flash; invalid input is re-rendered with status 422 and each
/// error shown as a danger notice.
pub async fn save(
    State(state): State<PageState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Path(sfid): Path<String>,
    flash: IncomingFlash,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Result<Response, PageError> {
    if let Some(redirect) = state.require_sync().await? {
        return Ok(redirect);
    }

    let Form(form) = form.map_err(|e| CardError::bad_request(e.body_text()))?;
    let (changes, token) = form.into_changes();

    if !state.csrf.verify(&sfid, &token) {
        tracing::warn!(sfid = %sfid, "rejected contact form with a bad csrf token");
        return Err(CardError::forbidden(BAD_CSRF).into());
    }

    let params = page_params(&headers, "POST", &uri);
    let err = match state
        .app
        .service(SERVICE)?
        .patch(&sfid, changes.clone(), params)
        .await
    {
        Ok(contact) => {
            return Ok(Flash::new()
                .success(UPDATED)
                .redirect(&views::contact_path(&contact.sfid)))
        }
        Err(e) => e,
    };

    if is_not_found(&err) {
        return Ok(back_to_index());
    }

    let mut field_errors = match CardError::from_anyhow(&err) {
        Some(card) if card.kind == ErrorKind::Unprocessable => card.field_messages(),
        _ => return Err(err.into()),
    };
    field_errors.sort_by_key(|(field, _)| views::field_position(field));

    let mut notices = flash.messages.clone();
    notices.extend(field_errors.iter().map(|(_, message)| FlashMessage {
        category: FlashCategory::Danger,
        message: message.clone(),
    }));

    let html = views::contact_form(
        &sfid,
        &changes,
        &field_errors,
        &state.csrf.token(&sfid),
        &notices,
    );
    let page = (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
    Ok(flash.consume(page))
}
