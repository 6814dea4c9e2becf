//! HTTP adapter for listing and uploading shorts.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};

use super::auth_client::decode_json;
use super::dto::{ShortDto, ShortListDto};
use super::transport::AuthorizedTransport;
use crate::domain::ports::{ApiError, CatalogueApi};
use crate::domain::{FilterSet, MediaFile, Short, ShortDraft};

const SHORTS_PATH: &str = "shorts/";

/// `CatalogueApi` over the shared [`AuthorizedTransport`].
pub struct HttpCatalogueApi {
    transport: Arc<AuthorizedTransport>,
}

impl HttpCatalogueApi {
    /// Adapter sharing `transport` with the auth client.
    pub fn new(transport: Arc<AuthorizedTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CatalogueApi for HttpCatalogueApi {
    async fn list_shorts(&self, filters: &FilterSet) -> Result<Vec<Short>, ApiError> {
        let request = self
            .transport
            .request(Method::GET, SHORTS_PATH)?
            .query(&filters.query_pairs());
        let body = self.transport.send(request).await?;
        let listing: ShortListDto = decode_json(&body, "listing")?;
        Ok(listing.into_domain())
    }

    async fn create_short(&self, draft: &ShortDraft) -> Result<Short, ApiError> {
        let form = upload_form(draft)?;
        let request = self
            .transport
            .request(Method::POST, SHORTS_PATH)?
            .multipart(form);
        let body = self.transport.send(request).await?;
        let created: ShortDto = decode_json(&body, "created short")?;
        Ok(created.into())
    }
}

/// Multipart body: text fields, one `tags` part per tag, then the media.
fn upload_form(draft: &ShortDraft) -> Result<Form, ApiError> {
    draft
        .validate()
        .map_err(|error| ApiError::validation(error.to_string()))?;

    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("description", draft.description.clone());
    for tag in draft.tags() {
        form = form.text("tags", tag.clone());
    }
    if let Some(video) = &draft.video {
        form = form.part("video_file", media_part("video_file", video)?);
    }
    if let Some(thumbnail) = &draft.thumbnail {
        form = form.part("thumbnail", media_part("thumbnail", thumbnail)?);
    }
    Ok(form)
}

fn media_part(field: &str, media: &MediaFile) -> Result<Part, ApiError> {
    Part::bytes(media.bytes.clone())
        .file_name(media.file_name.clone())
        .mime_str(&media.content_type)
        .map_err(|error| {
            ApiError::validation(format!(
                "{field}: unsupported content type {}: {error}",
                media.content_type
            ))
        })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for upload form assembly.
    use super::*;

    fn media(name: &str, content_type: &str) -> MediaFile {
        MediaFile {
            file_name: name.to_owned(),
            content_type: content_type.to_owned(),
            bytes: vec![0, 1, 2, 3],
        }
    }

    #[test]
    fn draft_without_video_is_refused_before_sending() {
        let draft = ShortDraft::new("Sunset", "");

        let error = upload_form(&draft).expect_err("video is required");

        assert_eq!(error.to_string(), "Please upload a video file.");
    }

    #[test]
    fn malformed_content_type_is_a_validation_error() {
        let mut draft = ShortDraft::new("Sunset", "");
        draft.video = Some(media("clip.mp4", "not a mime"));

        let error = upload_form(&draft).expect_err("content type rejected");

        assert!(matches!(error, ApiError::Validation { .. }));
        assert!(error.to_string().starts_with("video_file:"));
    }

    #[test]
    fn complete_draft_builds_a_form() {
        let mut draft = ShortDraft::new("Sunset", "golden hour");
        draft.add_tag("beach");
        draft.add_tag("travel");
        draft.video = Some(media("clip.mp4", "video/mp4"));
        draft.thumbnail = Some(media("thumb.jpg", "image/jpeg"));

        let form = upload_form(&draft).expect("form builds");

        assert!(form.boundary().len() > 10);
    }
}
