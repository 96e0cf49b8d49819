//! services/client/src/adapters/http_api.rs
//!
//! The HTTP adapter: concrete implementation of the `InspectionApi` port
//! against the backend's REST contract. It owns the wire format (serde
//! records with the backend's snake_case field names) and converts every
//! response into the pure domain structs before it leaves this module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::session::TokenCell;
use lep_inspect_core::domain::{
    AiModel, BatchInit, BatchListQuery, BatchPage, BatchStatus, BatchSummary, Detection,
    DetectionKind, FileInit, ImageStats, PhotoPage, PhotoResult, ProcessingStatus, TokenPair,
    UploadTarget, UserProfile,
};
use lep_inspect_core::ports::{InspectionApi, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `InspectionApi` port over reqwest.
#[derive(Clone)]
pub struct HttpInspectionApi {
    http: reqwest::Client,
    base_url: String,
    token: TokenCell,
}

impl HttpInspectionApi {
    /// `token` is the session manager's read handle; whatever token it holds
    /// at request time is injected as the bearer credential.
    pub fn new(base_url: impl Into<String>, token: TokenCell) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends one request and maps the status: 401/403 become `Unauthorized`,
    /// any other non-2xx becomes `RequestFailed`. No retries.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> PortResult<reqwest::Response> {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = self.token.get() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PortError::Unauthorized);
        }
        if !status.is_success() {
            return Err(PortError::RequestFailed(status.as_u16()));
        }
        Ok(response)
    }

    async fn json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> PortResult<T> {
        let response = self.send(method, path, body).await?;
        response
            .json()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))
    }

    /// For endpoints whose success response carries no body (204 from
    /// delete, the confirm/logout acks): a 2xx with an empty or unparseable
    /// body is success here, never a decode failure.
    async fn no_content<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> PortResult<()> {
        let _ = self.send(method, path, body).await?;
        Ok(())
    }
}

// Convenience alias for body-less requests.
type NoBody = ();
const NO_BODY: Option<&NoBody> = None;

//=========================================================================================
// `InspectionApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl InspectionApi for HttpInspectionApi {
    async fn login(&self, email: &str, password: &str) -> PortResult<TokenPair> {
        let body = LoginBody { email, password };
        let pair: TokenPairRecord = self
            .json(Method::POST, "users/login/", Some(&body))
            .await?;
        Ok(pair.to_domain())
    }

    async fn refresh(&self, refresh_token: &str) -> PortResult<TokenPair> {
        let body = RefreshBody {
            refresh: refresh_token,
        };
        let pair: TokenPairRecord = self
            .json(Method::POST, "users/refresh/", Some(&body))
            .await?;
        Ok(pair.to_domain())
    }

    async fn whoami(&self) -> PortResult<UserProfile> {
        let user: UserRecord = self.json(Method::GET, "users/me/", NO_BODY).await?;
        Ok(user.to_domain())
    }

    async fn logout(&self, refresh_token: &str) -> PortResult<()> {
        let body = RefreshBody {
            refresh: refresh_token,
        };
        self.no_content(Method::POST, "users/logout/", Some(&body))
            .await
    }

    async fn list_models(&self) -> PortResult<Vec<AiModel>> {
        let models: Vec<ModelRecord> = self.json(Method::GET, "vision/models/", NO_BODY).await?;
        Ok(models.into_iter().map(ModelRecord::to_domain).collect())
    }

    async fn list_batches(&self, query: &BatchListQuery) -> PortResult<BatchPage> {
        let page: PageRecord<BatchSummaryRecord> = self
            .json(Method::GET, &batch_list_path(query), NO_BODY)
            .await?;
        Ok(BatchPage {
            count: page.count,
            next: page.next,
            previous: page.previous,
            results: page
                .results
                .into_iter()
                .map(BatchSummaryRecord::to_domain)
                .collect(),
        })
    }

    async fn delete_batch(&self, batch_id: u64) -> PortResult<()> {
        self.no_content(
            Method::DELETE,
            &format!("vision/batches/delete/{batch_id}/"),
            NO_BODY,
        )
        .await
    }

    async fn batch_status(&self, batch_id: u64) -> PortResult<BatchStatus> {
        let status: BatchStatusRecord = self
            .json(
                Method::GET,
                &format!("vision/batches/status/{batch_id}/"),
                NO_BODY,
            )
            .await?;
        Ok(status.to_domain())
    }

    async fn init_batch(&self, batch_name: &str, files: &[FileInit]) -> PortResult<BatchInit> {
        let body = InitBody {
            batch_name,
            files: files
                .iter()
                .map(|f| FileInitRecord {
                    filename: &f.filename,
                    latitude: &f.latitude,
                    longitude: &f.longitude,
                })
                .collect(),
        };
        let init: BatchInitRecord = self
            .json(Method::POST, "vision/batches/init/", Some(&body))
            .await?;
        Ok(init.to_domain())
    }

    async fn confirm_batch(&self, batch_id: u64, model_id: u64) -> PortResult<()> {
        let body = ConfirmBody { batch_id, model_id };
        self.no_content(Method::POST, "vision/batches/confirm/", Some(&body))
            .await
    }

    async fn photo_page(&self, path: &str) -> PortResult<PhotoPage> {
        let page: PageRecord<PhotoRecord> = self.json(Method::GET, path, NO_BODY).await?;
        Ok(PhotoPage {
            count: page.count,
            next: page.next,
            results: page
                .results
                .into_iter()
                .map(PhotoRecord::to_domain)
                .collect(),
        })
    }

    async fn batch_stats(&self) -> PortResult<ImageStats> {
        let stats: ImageStatsRecord = self
            .json(Method::GET, "vision/batches/stats/", NO_BODY)
            .await?;
        Ok(ImageStats {
            total: stats.total,
            processed: stats.processed,
            not_processed: stats.not_processed,
        })
    }
}

fn batch_list_path(query: &BatchListQuery) -> String {
    let mut params: Vec<String> = Vec::new();
    if let Some(page) = query.page {
        params.push(format!("page={page}"));
    }
    if let Some(size) = query.size {
        params.push(format!("size={size}"));
    }
    if let Some(date_from) = &query.date_from {
        params.push(format!("date_from={date_from}"));
    }
    if let Some(date_to) = &query.date_to {
        params.push(format!("date_to={date_to}"));
    }
    if params.is_empty() {
        "vision/batches/".to_string()
    } else {
        format!("vision/batches/?{}", params.join("&"))
    }
}

//=========================================================================================
// Request Bodies
//=========================================================================================

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh: &'a str,
}

#[derive(Serialize)]
struct FileInitRecord<'a> {
    filename: &'a str,
    latitude: &'a str,
    longitude: &'a str,
}

#[derive(Serialize)]
struct InitBody<'a> {
    batch_name: &'a str,
    files: Vec<FileInitRecord<'a>>,
}

#[derive(Serialize)]
struct ConfirmBody {
    batch_id: u64,
    model_id: u64,
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct TokenPairRecord {
    access: String,
    refresh: String,
}
impl TokenPairRecord {
    fn to_domain(self) -> TokenPair {
        TokenPair {
            access: self.access,
            refresh: self.refresh,
        }
    }
}

#[derive(Deserialize)]
struct UserRecord {
    id: u64,
    email: String,
    first_name: String,
    last_name: String,
}
impl UserRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[derive(Deserialize)]
struct ModelRecord {
    id: u64,
    name: String,
}
impl ModelRecord {
    fn to_domain(self) -> AiModel {
        AiModel {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum ProcessingStatusRecord {
    NotProcessed,
    Processing,
    Completed,
    Reviewed,
}
impl ProcessingStatusRecord {
    fn to_domain(self) -> ProcessingStatus {
        match self {
            ProcessingStatusRecord::NotProcessed => ProcessingStatus::NotProcessed,
            ProcessingStatusRecord::Processing => ProcessingStatus::Processing,
            ProcessingStatusRecord::Completed => ProcessingStatus::Completed,
            ProcessingStatusRecord::Reviewed => ProcessingStatus::Reviewed,
        }
    }
}

#[derive(Deserialize)]
struct BatchStatusRecord {
    id: u64,
    name: String,
    uploaded_at: DateTime<Utc>,
    processing_status: ProcessingStatusRecord,
}
impl BatchStatusRecord {
    fn to_domain(self) -> BatchStatus {
        BatchStatus {
            id: self.id,
            name: self.name,
            uploaded_at: self.uploaded_at,
            processing_status: self.processing_status.to_domain(),
        }
    }
}

#[derive(Deserialize)]
struct BatchSummaryRecord {
    id: u64,
    name: String,
    uploaded_at: DateTime<Utc>,
    #[serde(default)]
    photo_count: u64,
    processing_status: ProcessingStatusRecord,
}
impl BatchSummaryRecord {
    fn to_domain(self) -> BatchSummary {
        BatchSummary {
            id: self.id,
            name: self.name,
            uploaded_at: self.uploaded_at,
            photo_count: self.photo_count,
            processing_status: self.processing_status.to_domain(),
        }
    }
}

#[derive(Deserialize)]
struct PageRecord<T> {
    count: u64,
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
    results: Vec<T>,
}

#[derive(Deserialize)]
struct UploadTargetRecord {
    image_id: u64,
    file_key: String,
    upload_url: String,
}

#[derive(Deserialize)]
struct BatchInitRecord {
    batch_id: u64,
    files: Vec<UploadTargetRecord>,
}
impl BatchInitRecord {
    fn to_domain(self) -> BatchInit {
        BatchInit {
            batch_id: self.batch_id,
            files: self
                .files
                .into_iter()
                .map(|f| UploadTarget {
                    image_id: f.image_id,
                    file_key: f.file_key,
                    upload_url: f.upload_url,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Clone)]
struct DetectionRecord {
    class: String,
    confidence: f32,
}

#[derive(Deserialize)]
struct PhotoRecord {
    id: u64,
    file_key: String,
    preview: Option<String>,
    result: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    damages: Vec<DetectionRecord>,
    #[serde(default)]
    objects: Vec<DetectionRecord>,
}
impl PhotoRecord {
    /// Folds the wire's separate damage/object arrays into the single
    /// tagged detection list.
    fn to_domain(self) -> PhotoResult {
        let mut detections =
            Vec::with_capacity(self.damages.len() + self.objects.len());
        detections.extend(self.damages.into_iter().map(|d| Detection {
            kind: DetectionKind::Damage,
            label: d.class,
            confidence: d.confidence,
        }));
        detections.extend(self.objects.into_iter().map(|d| Detection {
            kind: DetectionKind::Object,
            label: d.class,
            confidence: d.confidence,
        }));
        PhotoResult {
            id: self.id,
            file_key: self.file_key,
            preview: self.preview,
            result: self.result,
            latitude: self.latitude.unwrap_or_else(|| "0".to_string()),
            longitude: self.longitude.unwrap_or_else(|| "0".to_string()),
            uploaded_at: self.uploaded_at,
            detections,
        }
    }
}

#[derive(Deserialize)]
struct ImageStatsRecord {
    total: u64,
    processed: u64,
    not_processed: u64,
}
