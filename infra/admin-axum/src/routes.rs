use crate::error::AdminHttpError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use gantry_admin::{
    Admin, DEFAULT_LIMIT, Direction, Filter, FindOptions, Record, ResourceAdapter, ResourceMeta,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

type AdminState = State<Arc<Admin>>;
type ApiResult<T> = Result<T, AdminHttpError>;

const FILTER_PREFIX: &str = "filters.";

pub(crate) fn router(admin: Arc<Admin>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/resources/{resource}", get(list_html))
        .route("/resources/{resource}/records/{id}", get(detail_html))
        .route("/api/resources", get(resources))
        .route("/api/resources/{resource}/records", get(list_records).post(create_record))
        .route(
            "/api/resources/{resource}/records/{id}",
            get(show_record).put(update_record).delete(delete_record),
        )
        .with_state(admin)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListMeta {
    page: u32,
    per_page: u32,
    total: u64,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    records: Vec<Record>,
    meta: ListMeta,
}

/// Query string of list endpoints: `page`, `perPage`, `sortBy`, `direction`, `filters.<field>`.
#[derive(Debug)]
struct ListQuery {
    page: u32,
    per_page: u32,
    sort: Option<(String, Direction)>,
    filter: Filter,
}

impl ListQuery {
    fn parse(raw: HashMap<String, String>) -> ApiResult<Self> {
        let mut query =
            Self { page: 1, per_page: DEFAULT_LIMIT, sort: None, filter: Filter::new() };
        let mut sort_by = None;
        let mut direction = Direction::Asc;

        for (key, value) in raw {
            match key.as_str() {
                "page" => query.page = parse_number(&key, &value)?,
                "perPage" => query.per_page = parse_number(&key, &value)?,
                "sortBy" => sort_by = Some(value),
                "direction" => direction = parse_direction(&value)?,
                _ => match key.strip_prefix(FILTER_PREFIX) {
                    Some(field) if !field.is_empty() => query.filter.insert(field, value),
                    _ => {}
                },
            }
        }

        query.sort = sort_by.map(|field| (field, direction));
        Ok(query)
    }

    fn find_options(&self) -> FindOptions {
        let options = FindOptions::page(self.page, self.per_page);
        match &self.sort {
            Some((field, direction)) => options.sort(field.clone(), *direction),
            None => options,
        }
    }
}

fn parse_number(key: &str, value: &str) -> ApiResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| AdminHttpError::bad_request(format!("{key} must be a positive number")))
}

fn parse_direction(value: &str) -> ApiResult<Direction> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(Direction::Asc),
        "desc" => Ok(Direction::Desc),
        _ => Err(AdminHttpError::bad_request("direction must be 'asc' or 'desc'")),
    }
}

fn resource<'a>(admin: &'a Admin, id: &str) -> ApiResult<&'a Arc<dyn ResourceAdapter>> {
    Ok(admin.resource(id)?)
}

fn body(payload: Result<Json<Map<String, Value>>, JsonRejection>) -> ApiResult<Map<String, Value>> {
    payload
        .map(|Json(params)| params)
        .map_err(|rejection| AdminHttpError::bad_request(rejection.body_text()))
}

async fn dashboard(State(admin): AdminState) -> ApiResult<Html<String>> {
    Ok(Html(admin.dashboard_page().await?))
}

async fn list_html(
    State(admin): AdminState,
    Path(resource): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let query = ListQuery::parse(raw)?;
    Ok(Html(admin.list_page(&resource, &query.filter, &query.find_options()).await?))
}

async fn detail_html(
    State(admin): AdminState,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Html<String>> {
    Ok(Html(admin.detail_page(&resource, &id).await?))
}

async fn resources(State(admin): AdminState) -> Json<Vec<ResourceMeta>> {
    Json(admin.metadata())
}

async fn list_records(
    State(admin): AdminState,
    Path(id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> ApiResult<Json<ListResponse>> {
    let resource = resource(&admin, &id)?;
    let query = ListQuery::parse(raw)?;
    let options = query.find_options();

    let total = resource.count(&query.filter).await?;
    let records = resource.find(&query.filter, &options).await?;

    Ok(Json(ListResponse {
        records,
        meta: ListMeta { page: query.page.max(1), per_page: options.limit, total },
    }))
}

async fn create_record(
    State(admin): AdminState,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let params = body(payload)?;
    let record = resource(&admin, &id)?.create(params).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn show_record(
    State(admin): AdminState,
    Path((resource_id, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    resource(&admin, &resource_id)?
        .find_one(&id)
        .await?
        .map(Json)
        .ok_or_else(|| gantry_admin::AdminError::not_found(format!("record '{id}'")).into())
}

async fn update_record(
    State(admin): AdminState,
    Path((resource_id, id)): Path<(String, String)>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let params = body(payload)?;
    Ok(Json(resource(&admin, &resource_id)?.update(&id, params).await?))
}

async fn delete_record(
    State(admin): AdminState,
    Path((resource_id, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    resource(&admin, &resource_id)?.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
