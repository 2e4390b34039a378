//! HTTP routing table: the eight placement endpoints over a shared store.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{AdKind, CompanyProfile, CompanyUpdate, NewCompany, NewOffer, Offer};
use crate::service;

/// Shared state accessible from the handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    fn db(&self) -> std::result::Result<MutexGuard<'_, Database>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }
}

/// Build the router with all eight routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/companydetails_add/", post(company_add))
        .route("/details/", get(company_details))
        .route("/companydetails_update/", post(company_update))
        .route("/companydetails_delete/", post(company_delete))
        .route("/joboffers_add/", post(job_offer_add))
        .route("/job_offers/", get(job_offers))
        .route("/internship_offers_add/", post(internship_offer_add))
        .route("/internship_offers/", get(internship_offers))
        .with_state(state)
}

pub async fn serve(db: Database, host: &str, port: u16) -> Result<()> {
    let app = router(AppState::new(db));
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "placement backend listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Error mapping ---

pub enum ApiError {
    Store(Error),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e) => {
                let status = match &e {
                    Error::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    Error::NotFound { .. } => StatusCode::NOT_FOUND,
                    Error::Protected { .. } => StatusCode::CONFLICT,
                    _ if e.is_constraint_violation() => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(%message, "request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// --- Company handlers ---

async fn company_add(
    State(state): State<AppState>,
    Json(new): Json<NewCompany>,
) -> ApiResult<(StatusCode, Json<CompanyProfile>)> {
    let db = state.db()?;
    let company = service::register_company(&db, &new)?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[derive(Deserialize)]
struct DetailsQuery {
    id: Option<i64>,
    name: Option<String>,
}

async fn company_details(
    State(state): State<AppState>,
    Query(query): Query<DetailsQuery>,
) -> ApiResult<Json<CompanyProfile>> {
    let db = state.db()?;
    let company = match (query.id, query.name) {
        (Some(id), _) => db.get_company(id)?,
        (None, Some(name)) => db.get_company_by_name(&name)?,
        (None, None) => {
            return Err(Error::invalid("query", "provide either id or name").into());
        }
    };
    let company = company.ok_or(Error::NotFound { entity: "company" })?;
    Ok(Json(company))
}

#[derive(Deserialize)]
struct UpdateRequest {
    id: i64,
    #[serde(flatten)]
    update: CompanyUpdate,
}

async fn company_update(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> ApiResult<Json<CompanyProfile>> {
    let db = state.db()?;
    let company = service::update_company(&db, req.id, &req.update)?;
    Ok(Json(company))
}

#[derive(Deserialize)]
struct DeleteRequest {
    id: i64,
}

async fn company_delete(
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let db = state.db()?;
    service::delete_company(&db, req.id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// --- Offer handlers ---

#[derive(Deserialize)]
struct OffersQuery {
    company: Option<i64>,
}

async fn job_offer_add(
    State(state): State<AppState>,
    Json(new): Json<NewOffer>,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    add_offer(&state, AdKind::Job, &new)
}

async fn internship_offer_add(
    State(state): State<AppState>,
    Json(new): Json<NewOffer>,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    add_offer(&state, AdKind::Internship, &new)
}

fn add_offer(
    state: &AppState,
    kind: AdKind,
    new: &NewOffer,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    let db = state.db()?;
    let offer = service::create_offer(&db, kind, new)?;
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn job_offers(
    State(state): State<AppState>,
    Query(query): Query<OffersQuery>,
) -> ApiResult<Json<Vec<Offer>>> {
    let db = state.db()?;
    Ok(Json(db.list_offers(AdKind::Job, query.company)?))
}

async fn internship_offers(
    State(state): State<AppState>,
    Query(query): Query<OffersQuery>,
) -> ApiResult<Json<Vec<Offer>>> {
    let db = state.db()?;
    Ok(Json(db.list_offers(AdKind::Internship, query.company)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, NewAdvertisement};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn make_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        AppState::new(db)
    }

    fn acme_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Acme",
            "username": "acme_hr",
            "domain": "software",
            "country": "1",
            "contact": "9876543210"
        })
    }

    fn seed_advertisement(state: &AppState, kind: AdKind) -> (i64, Uuid) {
        let db = state.db.lock().unwrap();
        let company = service::register_company(
            &db,
            &NewCompany {
                name: "Acme".to_string(),
                username: "acme_hr".to_string(),
                domain: "software".to_string(),
                url: None,
                city: None,
                state: None,
                country: Country::Indian,
                pin_code: None,
                contact: "9876543210".to_string(),
            },
        )
        .unwrap();
        let ad = service::create_advertisement(
            &db,
            kind,
            &NewAdvertisement {
                company_id: company.id,
                expiry: None,
                active: true,
                designation: "Backend Engineer".to_string(),
                description: "Build services".to_string(),
                tentative_join_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                tentative_job_location: "Bengaluru".to_string(),
                ad_file: None,
                ctc: 10.0,
                gross_salary: None,
                bonus: None,
                bond: false,
                bond_details: None,
                resume_required: true,
                resume_shortlist_criteria: None,
                aptitude_test_required: false,
                group_discussion_required: false,
                number_of_technical_interviews: 0,
                number_of_technical_tests: 0,
                number_of_hr_rounds: 0,
                medical_test_required: false,
                min_gpa: 7.0,
                number_of_members: None,
                other_details: None,
                eligible_program_branch: None,
                email_ids: Vec::new(),
            },
        )
        .unwrap();
        (company.id, ad.id)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn company_registration_roundtrip() {
        let state = make_state();

        let resp = router(state.clone())
            .oneshot(post_json("/companydetails_add/", &acme_json()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["name"], "Acme");
        assert_eq!(created["username"], "acme_hr");

        let resp = router(state)
            .oneshot(get_req("/details/?name=Acme"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched = body_json(resp).await;
        assert_eq!(fetched["country"], "1");
    }

    #[tokio::test]
    async fn details_requires_id_or_name() {
        let state = make_state();
        let resp = router(state)
            .oneshot(get_req("/details/"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn details_for_unknown_company_is_404() {
        let state = make_state();
        let resp = router(state)
            .oneshot(get_req("/details/?name=Globex"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_company_payload_is_422() {
        let state = make_state();
        let mut payload = acme_json();
        payload["name"] = serde_json::json!("");
        let resp = router(state)
            .oneshot(post_json("/companydetails_add/", &payload))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn duplicate_username_is_409() {
        let state = make_state();
        let app = router(state);
        let resp = app
            .clone()
            .oneshot(post_json("/companydetails_add/", &acme_json()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let mut second = acme_json();
        second["name"] = serde_json::json!("Acme Two");
        let resp = app
            .oneshot(post_json("/companydetails_add/", &second))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn company_update_changes_fields() {
        let state = make_state();
        let app = router(state);
        let resp = app
            .clone()
            .oneshot(post_json("/companydetails_add/", &acme_json()))
            .await
            .unwrap();
        let id = body_json(resp).await["id"].as_i64().unwrap();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/companydetails_update/",
                &serde_json::json!({ "id": id, "city": "Chennai", "country": "2" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["city"], "Chennai");
        assert_eq!(updated["country"], "2");
        assert_eq!(updated["name"], "Acme");
    }

    #[tokio::test]
    async fn ppo_job_offer_is_accepted_after_save() {
        let state = make_state();
        let (company_id, ad_id) = seed_advertisement(&state, AdKind::Job);
        let student_id = {
            let db = state.db.lock().unwrap();
            db.add_student("B19001", "Asha").unwrap()
        };

        let resp = router(state.clone())
            .oneshot(post_json(
                "/joboffers_add/",
                &serde_json::json!({
                    "student_id": student_id,
                    "company_id": company_id,
                    "advertisement_id": ad_id,
                    "ppo": true,
                    "is_accepted": false
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let offer = body_json(resp).await;
        assert_eq!(offer["is_accepted"], true);
        assert_eq!(offer["ctc"], 10.0);

        let resp = router(state)
            .oneshot(get_req("/job_offers/"))
            .await
            .unwrap();
        let listed = body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["designation"], "Backend Engineer");
    }

    #[tokio::test]
    async fn job_offer_against_unknown_advertisement_is_404() {
        let state = make_state();
        let resp = router(state)
            .oneshot(post_json(
                "/joboffers_add/",
                &serde_json::json!({ "advertisement_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internship_routes_are_separate_from_job_routes() {
        let state = make_state();
        let (company_id, ad_id) = seed_advertisement(&state, AdKind::Internship);

        let resp = router(state.clone())
            .oneshot(post_json(
                "/internship_offers_add/",
                &serde_json::json!({
                    "company_id": company_id,
                    "advertisement_id": ad_id
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        // A job offer against an internship advertisement is rejected
        let resp = router(state.clone())
            .oneshot(post_json(
                "/joboffers_add/",
                &serde_json::json!({
                    "company_id": company_id,
                    "advertisement_id": ad_id
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = router(state.clone())
            .oneshot(get_req("/internship_offers/"))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

        let resp = router(state)
            .oneshot(get_req("/job_offers/"))
            .await
            .unwrap();
        assert!(body_json(resp).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_company_nulls_offers_and_removes_user() {
        let state = make_state();
        let (company_id, ad_id) = seed_advertisement(&state, AdKind::Job);
        // Second company owns the advertisement's offer so the ad survives
        let other = {
            let db = state.db.lock().unwrap();
            service::register_company(
                &db,
                &NewCompany {
                    name: "Globex".to_string(),
                    username: "globex_hr".to_string(),
                    domain: "software".to_string(),
                    url: None,
                    city: None,
                    state: None,
                    country: Country::Other,
                    pin_code: None,
                    contact: "12345".to_string(),
                },
            )
            .unwrap()
        };

        let resp = router(state.clone())
            .oneshot(post_json(
                "/joboffers_add/",
                &serde_json::json!({
                    "company_id": other.id,
                    "advertisement_id": ad_id
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = router(state.clone())
            .oneshot(post_json(
                "/companydetails_delete/",
                &serde_json::json!({ "id": other.id }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        {
            let db = state.db.lock().unwrap();
            assert!(db.get_user_account(other.user_id).unwrap().is_none());
            // The first company still exists untouched
            assert!(db.get_company(company_id).unwrap().is_some());
        }

        let resp = router(state)
            .oneshot(get_req("/job_offers/"))
            .await
            .unwrap();
        let listed = body_json(resp).await;
        assert_eq!(listed[0]["company_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn deleting_unknown_company_is_404() {
        let state = make_state();
        let resp = router(state)
            .oneshot(post_json(
                "/companydetails_delete/",
                &serde_json::json!({ "id": 42 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let state = make_state();
        let resp = router(state)
            .oneshot(get_req("/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
