//! Shared handling of content API responses

use serde::de::DeserializeOwned;

use super::error::CmsError;

/// Decode a successful response, map anything else to [`CmsError::Status`]
pub(super) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CmsError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes).map_err(|e| CmsError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(CmsError::Status {
        status: status.as_u16(),
        body,
    })
}
