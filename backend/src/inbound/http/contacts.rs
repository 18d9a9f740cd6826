//! Contact API handlers.
//!
//! Every route is scoped to the authenticated owner except `GET /all`, which
//! is reserved for admins and moderators. Listing and creation are rate
//! limited per user.
//!
//! ```text
//! GET    /api/contacts?limit=10&offset=0
//! GET    /api/contacts/first_name?first_name=Grace
//! POST   /api/contacts {"firstName":"Grace","lastName":"Hopper",...}
//! DELETE /api/contacts/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ContactDraft, EmailAddress, Error, PageQuery};

use super::ApiResult;
use super::bearer::CurrentUser;
use super::schemas::{ContactResponse, contact_list};
use super::state::HttpState;
use super::validation::{
    EMAIL, FieldName, contact_field_error, parse_contact_id, parse_page, user_field_error,
};

const LIST_ROUTE: &str = "contacts.list";
const CREATE_ROUTE: &str = "contacts.create";

/// Contact fields accepted on create and update.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactBody {
    #[schema(example = "Grace")]
    pub first_name: String,
    #[schema(example = "Hopper")]
    pub last_name: String,
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[schema(example = "+380501234567")]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub friend_status: bool,
}

impl TryFrom<ContactBody> for ContactDraft {
    type Error = Error;

    fn try_from(value: ContactBody) -> Result<Self, Self::Error> {
        use crate::domain::{PersonName, PhoneNumber};

        let first_name = PersonName::first(&value.first_name)
            .map_err(|err| contact_field_error(FieldName::new("firstName"), &err))?;
        let last_name = PersonName::last(&value.last_name)
            .map_err(|err| contact_field_error(FieldName::new("lastName"), &err))?;
        let email = EmailAddress::new(&value.email).map_err(|err| user_field_error(EMAIL, &err))?;
        let phone = PhoneNumber::new(&value.phone)
            .map_err(|err| contact_field_error(FieldName::new("phone"), &err))?;
        Ok(Self {
            first_name,
            last_name,
            email,
            phone,
            birth_date: value.birth_date,
            friend_status: value.friend_status,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Contact email to look up.
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FirstNameQuery {
    /// Exact first name, 3 to 50 characters.
    pub first_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LastNameQuery {
    /// Exact last name, 3 to 50 characters.
    pub last_name: String,
}

/// Pagination parameters shared by list routes, documented for OpenAPI.
///
/// Handlers read [`PageQuery`] and validate it through `Page`.
#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page size, 10 to 500. Defaults to 10.
    pub limit: Option<u32>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<u32>,
}

/// The caller's contacts.
#[utoipa::path(
    get,
    path = "/api/contacts",
    params(PageParams),
    responses(
        (status = 200, description = "Contacts", body = [ContactResponse]),
        (status = 404, description = "No contacts", body = Error),
        (status = 429, description = "Rate limited", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "listContacts",
    security(("bearer" = []))
)]
#[get("")]
pub async fn list_contacts(
    state: web::Data<HttpState>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = parse_page(query.into_inner())?;
    state.rate_limiter.check(&user.id, LIST_ROUTE)?;
    let contacts = state.contacts.list(&user, page).await?;
    Ok(web::Json(contact_list(contacts)))
}

/// Contacts of every owner. Admins and moderators only.
#[utoipa::path(
    get,
    path = "/api/contacts/all",
    params(PageParams),
    responses(
        (status = 200, description = "Contacts", body = [ContactResponse]),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No contacts", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "listAllContacts",
    security(("bearer" = []))
)]
#[get("/all")]
pub async fn list_all_contacts(
    state: web::Data<HttpState>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = parse_page(query.into_inner())?;
    let contacts = state.contacts.list_all(&user, page).await?;
    Ok(web::Json(contact_list(contacts)))
}

/// Contacts whose birthday falls within the next seven days.
#[utoipa::path(
    get,
    path = "/api/contacts/birthday",
    params(PageParams),
    responses(
        (status = 200, description = "Contacts", body = [ContactResponse]),
        (status = 404, description = "No upcoming birthdays", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "upcomingBirthdays",
    security(("bearer" = []))
)]
#[get("/birthday")]
pub async fn upcoming_birthdays(
    state: web::Data<HttpState>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = parse_page(query.into_inner())?;
    let contacts = state.contacts.upcoming_birthdays(&user, page).await?;
    Ok(web::Json(contact_list(contacts)))
}

#[utoipa::path(
    get,
    path = "/api/contacts/email",
    params(EmailQuery),
    responses(
        (status = 200, description = "Contact", body = ContactResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "contactByEmail",
    security(("bearer" = []))
)]
#[get("/email")]
pub async fn contact_by_email(
    state: web::Data<HttpState>,
    user: CurrentUser,
    query: web::Query<EmailQuery>,
) -> ApiResult<web::Json<ContactResponse>> {
    let email = EmailAddress::new(&query.email).map_err(|err| user_field_error(EMAIL, &err))?;
    let contact = state.contacts.by_email(&user, &email).await?;
    Ok(web::Json(ContactResponse::from(contact)))
}

#[utoipa::path(
    get,
    path = "/api/contacts/first_name",
    params(FirstNameQuery, PageParams),
    responses(
        (status = 200, description = "Contacts", body = [ContactResponse]),
        (status = 400, description = "Invalid name", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "contactsByFirstName",
    security(("bearer" = []))
)]
#[get("/first_name")]
pub async fn contacts_by_first_name(
    state: web::Data<HttpState>,
    user: CurrentUser,
    name: web::Query<FirstNameQuery>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = parse_page(query.into_inner())?;
    let contacts = state
        .contacts
        .by_first_name(&user, &name.first_name, page)
        .await?;
    Ok(web::Json(contact_list(contacts)))
}

#[utoipa::path(
    get,
    path = "/api/contacts/last_name",
    params(LastNameQuery, PageParams),
    responses(
        (status = 200, description = "Contacts", body = [ContactResponse]),
        (status = 400, description = "Invalid name", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "contactsByLastName",
    security(("bearer" = []))
)]
#[get("/last_name")]
pub async fn contacts_by_last_name(
    state: web::Data<HttpState>,
    user: CurrentUser,
    name: web::Query<LastNameQuery>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ContactResponse>>> {
    let page = parse_page(query.into_inner())?;
    let contacts = state
        .contacts
        .by_last_name(&user, &name.last_name, page)
        .await?;
    Ok(web::Json(contact_list(contacts)))
}

#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    params(("id" = String, Path, description = "Contact UUID")),
    responses(
        (status = 200, description = "Contact", body = ContactResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "getContact",
    security(("bearer" = []))
)]
#[get("/{id}")]
pub async fn get_contact(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
) -> ApiResult<web::Json<ContactResponse>> {
    let id = parse_contact_id(&id)?;
    let contact = state.contacts.get(&user, &id).await?;
    Ok(web::Json(ContactResponse::from(contact)))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = ContactBody,
    responses(
        (status = 201, description = "Created", body = ContactResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already used", body = Error),
        (status = 429, description = "Rate limited", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "createContact",
    security(("bearer" = []))
)]
#[post("")]
pub async fn create_contact(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: web::Json<ContactBody>,
) -> ApiResult<HttpResponse> {
    let draft = ContactDraft::try_from(payload.into_inner())?;
    state.rate_limiter.check(&user.id, CREATE_ROUTE)?;
    let contact = state.contacts.create(&user, draft).await?;
    Ok(HttpResponse::Created().json(ContactResponse::from(contact)))
}

#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    params(("id" = String, Path, description = "Contact UUID")),
    request_body = ContactBody,
    responses(
        (status = 200, description = "Updated", body = ContactResponse),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Email already used", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "updateContact",
    security(("bearer" = []))
)]
#[put("/{id}")]
pub async fn update_contact(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
    payload: web::Json<ContactBody>,
) -> ApiResult<web::Json<ContactResponse>> {
    let id = parse_contact_id(&id)?;
    let draft = ContactDraft::try_from(payload.into_inner())?;
    let contact = state.contacts.update(&user, &id, draft).await?;
    Ok(web::Json(ContactResponse::from(contact)))
}

#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    params(("id" = String, Path, description = "Contact UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "deleteContact",
    security(("bearer" = []))
)]
#[delete("/{id}")]
pub async fn delete_contact(
    state: web::Data<HttpState>,
    user: CurrentUser,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_contact_id(&id)?;
    state.contacts.delete(&user, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the `/api/contacts` routes. Fixed segments precede `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/contacts")
            .service(list_contacts)
            .service(create_contact)
            .service(list_all_contacts)
            .service(upcoming_birthdays)
            .service(contact_by_email)
            .service(contacts_by_first_name)
            .service(contacts_by_last_name)
            .service(get_contact)
            .service(update_contact)
            .service(delete_contact),
    );
}

#[cfg(test)]
mod tests;
