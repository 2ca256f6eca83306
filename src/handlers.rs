use std::future::{Ready, ready};

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, Responder, dev::Payload, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use crate::error::AppError;
use crate::forms::{self, FieldSpec};
use crate::inference::{Disease, Prediction, RawFields};
use crate::models::{PatientRecord, UserInfo};
use crate::quiz::{Feedback, QuizView};
use crate::records::RecordEntry;
use crate::session::{Mode, Session};

/// Bearer token from the `Authorization` header.
pub struct SessionToken(pub String);

impl FromRequest for SessionToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|t| !t.is_empty())
            .map(|t| SessionToken(t.to_string()));
        ready(token.ok_or(AppError::Unauthorized))
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user: UserInfo,
}

#[derive(Serialize)]
struct SessionView {
    user: UserInfo,
    mode: Option<Mode>,
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: Option<Mode>,
}

#[derive(Serialize)]
struct DiseaseForm {
    disease: Disease,
    slug: &'static str,
    name: &'static str,
    fields: &'static [FieldSpec],
}

#[derive(Deserialize)]
pub struct RecordsQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct DiagnosisRequest {
    #[serde(default)]
    pub patient_name: String,
    pub fields: RawFields,
}

#[derive(Serialize)]
struct DiagnosisResponse {
    result: &'static str,
    confidence: f64,
    prediction: Prediction,
    record: PatientRecord,
}

#[derive(Deserialize)]
pub struct StartQuizRequest {
    pub disease: String,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub choice: String,
}

#[derive(Serialize)]
struct AnswerResponse {
    feedback: Feedback,
    quiz: QuizView,
}

// Run `f` against the caller's live session
fn in_session<T>(
    state: &AppState,
    token: &SessionToken,
    f: impl FnOnce(&mut Session) -> Result<T, AppError>,
) -> Result<T, AppError> {
    state
        .sessions
        .with_session(&token.0, f)
        .ok_or(AppError::Unauthorized)?
}

fn require_mode(session: &Session, mode: Mode) -> Result<(), AppError> {
    if session.mode == Some(mode) {
        Ok(())
    } else {
        Err(AppError::WrongMode(mode))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login))
                .route("/logout", web::post().to(logout)),
        )
        .route("/session", web::get().to(session_info))
        .route("/session/mode", web::put().to(set_mode))
        .route("/diseases", web::get().to(diseases))
        .route("/records", web::get().to(recent_records))
        .route("/diagnosis/{disease}", web::post().to(diagnose))
        .service(
            web::scope("/quiz")
                .route("", web::get().to(quiz_view))
                .route("/start", web::post().to(quiz_start))
                .route("/answer", web::post().to(quiz_answer))
                .route("/next", web::post().to(quiz_next))
                .route("/reset", web::post().to(quiz_reset)),
        );
}

async fn index() -> impl Responder {
    HttpResponse::Ok().body("MediRisk is running")
}

// Handler to create an account
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    web::block(move || state.auth.register(&body.name, &body.email, &body.password)).await??;

    Ok(HttpResponse::Created().json(json!({ "message": "Account created" })))
}

// Handler to log in and open a session
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let auth_state = state.clone();

    let user = web::block(move || auth_state.auth.login(&body.email, &body.password)).await??;
    let user = user.to_info();
    let token = state.sessions.create(user.clone());

    Ok(HttpResponse::Ok().json(LoginResponse { token, user }))
}

// Handler to end the caller's session
pub async fn logout(state: web::Data<AppState>, token: SessionToken) -> Result<HttpResponse, AppError> {
    if !state.sessions.destroy(&token.0) {
        return Err(AppError::Unauthorized);
    }
    Ok(HttpResponse::NoContent().finish())
}

// Handler to show the current user and mode
pub async fn session_info(
    state: web::Data<AppState>,
    token: SessionToken,
) -> Result<HttpResponse, AppError> {
    let view = in_session(&state, &token, |s| {
        Ok(SessionView {
            user: s.user.clone(),
            mode: s.mode,
        })
    })?;
    Ok(HttpResponse::Ok().json(view))
}

// Handler to pick diagnosis or training mode, or go back to the menu
pub async fn set_mode(
    state: web::Data<AppState>,
    token: SessionToken,
    body: web::Json<ModeRequest>,
) -> Result<HttpResponse, AppError> {
    let view = in_session(&state, &token, |s| {
        s.set_mode(body.mode);
        Ok(SessionView {
            user: s.user.clone(),
            mode: s.mode,
        })
    })?;
    Ok(HttpResponse::Ok().json(view))
}

// Handler to list the input form of every disease
pub async fn diseases() -> impl Responder {
    let list: Vec<DiseaseForm> = Disease::ALL
        .into_iter()
        .map(|disease| DiseaseForm {
            disease,
            slug: disease.slug(),
            name: disease.display_name(),
            fields: forms::form(disease),
        })
        .collect();
    HttpResponse::Ok().json(list)
}

// Handler to list the caller's most recent records
pub async fn recent_records(
    state: web::Data<AppState>,
    token: SessionToken,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(state.recent_limit);
    if limit < 1 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }
    let user_id = in_session(&state, &token, |s| Ok(s.user.id))?;

    let records = web::block(move || state.records.list_recent(user_id, limit)).await??;
    Ok(HttpResponse::Ok().json(records))
}

// Handler to run a prediction, audit it and save it as a patient record
pub async fn diagnose(
    state: web::Data<AppState>,
    token: SessionToken,
    disease: web::Path<String>,
    body: web::Json<DiagnosisRequest>,
) -> Result<HttpResponse, AppError> {
    let disease: Disease = disease.parse().map_err(AppError::NotFound)?;
    let user_id = in_session(&state, &token, |s| {
        require_mode(s, Mode::Diagnosis)?;
        Ok(s.user.id)
    })?;

    let DiagnosisRequest { patient_name, fields } = body.into_inner();
    forms::validate_patient_name(&patient_name)?;
    forms::validate(disease, &fields)?;
    let prediction = state.dispatcher.predict(disease, &fields)?;
    let summary = forms::summarize(disease, &fields);

    let record = web::block(move || -> Result<PatientRecord, AppError> {
        state
            .audit
            .append(disease, &fields, prediction.label)
            .map_err(AppError::Audit)?;
        let entry = RecordEntry {
            patient_name,
            age: summary.age,
            gender: summary.gender,
            symptoms: summary.symptoms,
            disease: disease.display_name().to_string(),
            result: prediction.label.result_text().to_string(),
            confidence: prediction.confidence_percent,
        };
        Ok(state.records.save(user_id, entry)?)
    })
    .await??;

    Ok(HttpResponse::Ok().json(DiagnosisResponse {
        result: prediction.label.result_text(),
        confidence: prediction.confidence_percent,
        prediction,
        record,
    }))
}

// Handler to show the quiz state
pub async fn quiz_view(state: web::Data<AppState>, token: SessionToken) -> Result<HttpResponse, AppError> {
    let view = in_session(&state, &token, |s| {
        require_mode(s, Mode::Training)?;
        Ok(s.quiz.view())
    })?;
    Ok(HttpResponse::Ok().json(view))
}

// Handler to start a quiz for a disease
pub async fn quiz_start(
    state: web::Data<AppState>,
    token: SessionToken,
    body: web::Json<StartQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let disease: Disease = body.disease.parse().map_err(AppError::BadRequest)?;
    let view = in_session(&state, &token, |s| {
        require_mode(s, Mode::Training)?;
        s.quiz.start(disease, &mut rand::thread_rng());
        Ok(s.quiz.view())
    })?;
    Ok(HttpResponse::Ok().json(view))
}

// Handler to answer the current question
pub async fn quiz_answer(
    state: web::Data<AppState>,
    token: SessionToken,
    body: web::Json<AnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let response = in_session(&state, &token, |s| {
        require_mode(s, Mode::Training)?;
        let feedback = s.quiz.submit(&body.choice)?;
        Ok(AnswerResponse {
            feedback,
            quiz: s.quiz.view(),
        })
    })?;
    Ok(HttpResponse::Ok().json(response))
}

// Handler to move on to the next question
pub async fn quiz_next(state: web::Data<AppState>, token: SessionToken) -> Result<HttpResponse, AppError> {
    let view = in_session(&state, &token, |s| {
        require_mode(s, Mode::Training)?;
        s.quiz.next()?;
        Ok(s.quiz.view())
    })?;
    Ok(HttpResponse::Ok().json(view))
}

// Handler to abandon the quiz
pub async fn quiz_reset(state: web::Data<AppState>, token: SessionToken) -> Result<HttpResponse, AppError> {
    let view = in_session(&state, &token, |s| {
        require_mode(s, Mode::Training)?;
        s.quiz.reset();
        Ok(s.quiz.view())
    })?;
    Ok(HttpResponse::Ok().json(view))
}
