//! API client for the equipment dashboard backend.
//!
//! Dataset calls go through the authenticated transport and so pick up
//! bearer injection and 401 recovery transparently. Login and register use
//! the unauthenticated path because they run before a session exists.

use std::sync::Arc;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Dataset, DatasetEntry, DatasetSummary};

use super::transport::{ApiRequest, AuthTransport};
use super::ApiError;

/// Successful login payload. The refresh token is handed out once here and
/// never rotated by the refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
}

/// API client for the dashboard backend.
/// Clone is cheap - the transport is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<AuthTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<AuthTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<AuthTransport> {
        &self.transport
    }

    // ===== Auth endpoints =====

    /// Exchange credentials for a token pair. Does not touch the token
    /// store; the session facade owns that side effect.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post(
            "/auth/login/",
            serde_json::json!({ "username": username, "password": password }),
        );
        let response = self.transport.execute_unauthenticated(&request).await?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Bad login response: {}", e)))
    }

    /// Create an account. Registration does not start a session.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(
            "/auth/register/",
            serde_json::json!({ "username": username, "email": email, "password": password }),
        );
        let response = self.transport.execute_unauthenticated(&request).await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Dataset endpoints =====

    /// Fetch the dataset list (summary rows, newest first)
    pub async fn list_datasets(&self) -> Result<Vec<DatasetEntry>, ApiError> {
        self.get_json("/datasets/").await
    }

    /// Fetch one dataset with its statistics and equipment rows
    pub async fn get_dataset(&self, id: i64) -> Result<Dataset, ApiError> {
        self.get_json(&format!("/datasets/{}/", id)).await
    }

    /// Upload a CSV file as a new dataset
    pub async fn upload_dataset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Dataset, ApiError> {
        let request = ApiRequest::upload("/datasets/upload/", "file", file_name, bytes);
        let response = self.transport.execute(&request).await?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Bad upload response: {}", e)))
    }

    /// Delete a dataset
    pub async fn delete_dataset(&self, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/datasets/{}/", id));
        let response = self.transport.execute(&request).await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Fetch the per-metric statistics and type distribution for a dataset
    pub async fn dataset_summary(&self, id: i64) -> Result<DatasetSummary, ApiError> {
        self.get_json(&format!("/datasets/{}/summary/", id)).await
    }

    /// Download the PDF report for a dataset as raw bytes
    pub async fn download_report(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        let request = ApiRequest::get(format!("/datasets/{}/download_pdf/", id));
        let response = self.transport.execute(&request).await?;
        let response = Self::check_response(response).await?;
        let bytes = response.bytes().await?;
        debug!(id, size = bytes.len(), "Report downloaded");
        Ok(bytes.to_vec())
    }

    // ===== Helpers =====

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = ApiRequest::get(path);
        let response = self.transport.execute(&request).await?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Bad response from {}: {}", path, e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}
