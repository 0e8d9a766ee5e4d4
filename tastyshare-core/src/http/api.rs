//! Authenticated API client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::transport::{ApiRequest, ApiResponse, Method, MultipartForm, RequestBody, Transport};
use crate::error::ApiError;
use crate::navigation::{Navigator, Redirect};
use crate::session::SessionStore;
use crate::types::{ErrorBody, MessageResponse};

/// Wraps a [`Transport`] with session headers and 401 handling.
///
/// Every call returns `Result<T, ApiError>`; transport failures never escape
/// as anything else.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Send `request` with the session's default headers merged under the
    /// caller's.
    ///
    /// A 401 for a request that carried a token ends the session, navigates
    /// to `/login` and yields [`ApiError::SessionExpired`]. Other statuses are
    /// returned as-is for the caller to interpret.
    pub async fn fetch_with_auth(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let multipart = matches!(request.body, RequestBody::Multipart(_));
        for (name, value) in self.session.auth_headers() {
            if multipart && name.eq_ignore_ascii_case("Content-Type") {
                continue;
            }
            if request.header_value(&name).is_none() {
                request.headers.push((name, value));
            }
        }
        let sent_with_token = request
            .header_value("Authorization")
            .is_some_and(|v| v.starts_with("Bearer "));

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path_and_query(),
            "api request"
        );
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, "api request failed");
            ApiError::Network(e.to_string())
        })?;

        if response.status == 401 && sent_with_token {
            if self.session.is_authenticated() {
                tracing::warn!("session expired, redirecting to login");
                self.session.logout();
                self.navigator.navigate(Redirect::now("/login"));
            }
            return Err(ApiError::SessionExpired);
        }

        Ok(response)
    }

    /// Send `request` and decode a successful JSON body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.fetch_with_auth(request).await?;
        decode_response(response)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.request_json(ApiRequest::get(path).query(query)).await
    }

    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.request_json(ApiRequest::new(method, path).json(body)).await
    }

    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: MultipartForm,
    ) -> Result<T, ApiError> {
        self.request_json(ApiRequest::new(method, path).multipart(form)).await
    }

    pub async fn delete(&self, path: &str) -> Result<MessageResponse, ApiError> {
        let response = self.fetch_with_auth(ApiRequest::delete(path)).await?;
        if !response.is_success() {
            return Err(error_for_status(&response));
        }
        // Some endpoints answer 204 with no body.
        if response.body.is_empty() {
            return Ok(MessageResponse::default());
        }
        decode_response(response)
    }
}

/// Decode a 2xx JSON body or map the status to an [`ApiError`].
pub fn decode_response<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(error_for_status(&response));
    }
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Error for a non-2xx response, carrying the body's `error` text verbatim.
pub fn error_for_status(response: &ApiResponse) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_default();

    match response.status {
        401 => ApiError::Unauthorized(message),
        403 if message.is_empty() => ApiError::Forbidden("Access denied".to_string()),
        403 => ApiError::Forbidden(message),
        404 => ApiError::NotFound(message),
        status => ApiError::Server { status, message },
    }
}
