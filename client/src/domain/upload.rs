//! Draft of a new short before it is posted to the catalogue.

/// In-memory media attachment.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Name sent as the multipart filename.
    pub file_name: String,
    /// MIME type, e.g. `video/mp4`.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Reasons a draft cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    /// No video attached.
    #[error("Please upload a video file.")]
    MissingVideo,
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Content-creation form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortDraft {
    /// Required title.
    pub title: String,
    /// Optional description.
    pub description: String,
    tags: Vec<String>,
    /// Required video file.
    pub video: Option<MediaFile>,
    /// Optional cover image.
    pub thumbnail: Option<MediaFile>,
}

impl ShortDraft {
    /// Draft with no tags and no media.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Add a trimmed tag; blanks and duplicates are ignored.
    ///
    /// Returns whether the tag was added.
    ///
    /// # Examples
    /// ```
    /// use shortflix_client::domain::ShortDraft;
    ///
    /// let mut draft = ShortDraft::default();
    /// assert!(draft.add_tag(" cats "));
    /// assert!(!draft.add_tag("cats"));
    /// assert!(!draft.add_tag("   "));
    /// assert_eq!(draft.tags(), ["cats"]);
    /// ```
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.tags.iter().any(|existing| existing == tag) {
            return false;
        }
        self.tags.push(tag.to_owned());
        true
    }

    /// Drop `tag` if present.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|existing| existing != tag);
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check the rules enforced before any network call.
    pub fn validate(&self) -> Result<(), UploadValidationError> {
        if self.video.is_none() {
            return Err(UploadValidationError::MissingVideo);
        }
        if self.title.trim().is_empty() {
            return Err(UploadValidationError::EmptyTitle);
        }
        Ok(())
    }
}
