use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backend::{BackendError, Collection, Document, RecordSource, Removal, CURRENT_USER_PATH};
use crate::models::CandidateStatus;
use crate::session::{Session, SessionUser};
use crate::table::Record;

const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    is_active: bool,
}

/// HTTP client for the CV Align REST backend.
/// Reads are retried on 429 and 5xx with exponential backoff; writes are sent once.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, session: &Session, path: &str) -> Result<T, BackendError> {
        let mut last_error: Option<BackendError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "GET {} attempt {} failed, retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .get(self.url(path))
                .bearer_auth(session.token())
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(BackendError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let detail = error_detail(response).await;
                warn!("GET {} returned {}: {}", path, status, detail);
                last_error = Some(BackendError::Api {
                    status: status.as_u16(),
                    detail,
                });
                continue;
            }

            return read_json(response).await;
        }

        Err(last_error.unwrap_or(BackendError::Unavailable {
            attempts: MAX_ATTEMPTS,
        }))
    }

    async fn patch_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, BackendError> {
        let mut request = self.client.patch(self.url(path)).bearer_auth(session.token());
        if let Some(body) = body {
            request = request.json(&body);
        }
        read_json(request.send().await?).await
    }

    /// DELETE sent once. The body of a successful response is ignored, the
    /// backend answers some deletes with 204.
    async fn delete(&self, session: &Session, path: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(session.token())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                detail: error_detail(response).await,
            });
        }
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Api {
            status: status.as_u16(),
            detail: error_detail(response).await,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// FastAPI-style `{"detail": "..."}` message, else the raw body.
async fn error_detail(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            detail: Value::String(detail),
        }) => detail,
        _ => body,
    }
}

#[async_trait]
impl RecordSource for BackendClient {
    async fn current_user(&self, session: &Session) -> Result<SessionUser, BackendError> {
        self.get_json(session, CURRENT_USER_PATH).await
    }

    async fn list(&self, session: &Session, collection: Collection) -> Result<Vec<Record>, BackendError> {
        let records: Vec<Record> = self.get_json(session, collection.path()).await?;
        debug!("Fetched {} records from {}", records.len(), collection.path());
        Ok(records)
    }

    async fn document(&self, session: &Session, document: Document) -> Result<Record, BackendError> {
        self.get_json(session, &document.path()).await
    }

    async fn update_candidate_status(
        &self,
        session: &Session,
        id: &str,
        status: CandidateStatus,
    ) -> Result<(), BackendError> {
        let _: Value = self
            .patch_json(session, &format!("/{id}/status"), Some(json!({ "status": status })))
            .await?;
        debug!("Candidate {id} status set to {status}");
        Ok(())
    }

    async fn toggle_user_status(&self, session: &Session, id: &str) -> Result<bool, BackendError> {
        let toggled: ToggleResponse = self
            .patch_json(session, &format!("/users/{id}/toggle-status"), None)
            .await?;
        Ok(toggled.is_active)
    }

    async fn remove(&self, session: &Session, removal: Removal) -> Result<(), BackendError> {
        self.delete(session, &removal.path()).await?;
        debug!("Deleted {:?}", removal);
        Ok(())
    }
}
