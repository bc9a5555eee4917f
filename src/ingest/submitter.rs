use crate::crawler::ImageCandidate;
use crate::SubmitError;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Metadata sent in the `json` form field
#[derive(Debug, Clone, Serialize)]
pub struct ArtistMetadata<'a> {
    pub name: &'a str,
}

/// One artist ready for upload
#[derive(Debug, Clone)]
pub struct ArtistSubmission {
    pub name: String,
    pub image: Option<ImageCandidate>,
}

/// Client for the artist upload route
#[derive(Clone)]
pub struct IngestClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl IngestClient {
    /// Creates an upload client
    ///
    /// # Arguments
    ///
    /// * `client` - The shared HTTP client
    /// * `endpoint` - Full URL of the upload route
    /// * `token` - Bearer token; an empty token is sent as-is and left for
    ///   the endpoint to refuse
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Uploads one artist
    ///
    /// Sends a single multipart POST. The `img` part is only attached when an
    /// image was resolved. Nothing is retried.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The endpoint answered `200 OK`
    /// * `Err(SubmitError::Rejected)` - Any other status, including other 2xx
    ///   codes, with the response body
    /// * `Err(SubmitError::Http)` - The request never completed
    pub async fn submit(&self, submission: &ArtistSubmission) -> Result<(), SubmitError> {
        let form = build_form(submission)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::debug!("Uploaded {} ({})", submission.name, status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Encodes the metadata field for an artist name
///
/// Names are escaped, so quotes and backslashes survive intact:
///
/// ```
/// use cvrs_scraper::ingest::metadata_json;
///
/// assert_eq!(metadata_json("O\"Brien").unwrap(), r#"{"name":"O\"Brien"}"#);
/// ```
pub fn metadata_json(name: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ArtistMetadata { name })
}

fn build_form(submission: &ArtistSubmission) -> Result<Form, SubmitError> {
    let form = Form::new().text("json", metadata_json(&submission.name)?);

    let form = match &submission.image {
        Some(image) => {
            let part = Part::bytes(image.content.clone())
                .file_name(image.filename.clone())
                .mime_str(&image.mime)?;
            form.part("img", part)
        }
        None => form,
    };

    Ok(form)
}
