use crate::{errors::AppResult, mail::Mailer, AppError};
use anyhow::{anyhow, Context};
use axum::{
    body::Bytes,
    http::{Method, StatusCode},
    routing::post,
    Extension, Json, Router,
};
use lettre::Transport;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

pub const CONTACT_PATH: &str = "/api/contact";

pub const SUCCESS_MESSAGE: &str = "Mesajınız başarıyla gönderildi!";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Desteklenmeyen metot";
pub const INVALID_JSON_MESSAGE: &str = "JSON verisi okunamadı";
pub const MISSING_FIELDS_MESSAGE: &str = "Tüm alanlar zorunludur";
pub const RELAY_FAILED_MESSAGE: &str = "Mesaj gönderilirken bir hata oluştu.";

/// One contact form payload. Absent fields decode as empty strings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Submission {
    /// Decodes a request body. Only a json object is a submission, `null`
    /// counts as one with every field empty.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        match serde_json::from_slice::<Option<Map<String, Value>>>(body)? {
            Some(fields) => serde_json::from_value(Value::Object(fields)),
            None => Ok(Self::default()),
        }
    }

    /// The only check made on a submission: every field is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.message.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub message: &'static str,
}

/// Routes `POST /api/contact` to the relay, every other method gets a 405.
pub fn router<T>(mailer: Mailer<T>) -> Router
where
    T: Transport + Clone + Send + Sync + 'static,
    T::Error: Into<anyhow::Error>,
{
    Router::new()
        .route(
            CONTACT_PATH,
            post(contact::<T>).fallback(method_not_allowed),
        )
        .layer(Extension(mailer))
}

/// Content-Type is not looked at, the body only has to be json.
pub async fn contact<T>(
    Extension(mailer): Extension<Mailer<T>>,
    body: Bytes,
) -> AppResult<Json<Confirmation>>
where
    T: Transport + Clone + Send + Sync + 'static,
    T::Error: Into<anyhow::Error>,
{
    let submission = Submission::from_json(&body)
        .map_err(|e| AppError::new(StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE, e))?;
    if !submission.is_complete() {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            MISSING_FIELDS_MESSAGE,
            anyhow!("submission with empty fields"),
        ));
    }

    info!(name = %submission.name, email = %submission.email, "New contact message");

    tokio::task::spawn_blocking(move || mailer.send(&submission))
        .await
        .context("mail relay task failed")
        .and_then(|sent| sent)
        .map_err(|e| AppError::new(StatusCode::INTERNAL_SERVER_ERROR, RELAY_FAILED_MESSAGE, e))?;

    Ok(Json(Confirmation {
        message: SUCCESS_MESSAGE,
    }))
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        METHOD_NOT_ALLOWED_MESSAGE,
        anyhow!("{method} {CONTACT_PATH}"),
    )
}
