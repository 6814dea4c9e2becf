//! Wire shapes for the catalogue and account endpoints.
//!
//! The adapters decode into these DTOs first and map into domain types in one
//! pass, so serde attributes never leak into the domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::FieldErrors;
use crate::domain::{Identity, OwnerRef, Short, ShortId, UserId};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenDto {
    pub(super) auth_token: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct IdentityDto {
    id: u64,
    username: String,
    #[serde(default)]
    email: String,
}

impl From<IdentityDto> for Identity {
    fn from(dto: IdentityDto) -> Self {
        Self {
            id: UserId::new(dto.id),
            username: dto.username,
            email: dto.email,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwnerDto {
    Id(u64),
    Username(String),
}

#[derive(Debug, Deserialize)]
pub(super) struct ShortDto {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    video_file: String,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    views: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user: OwnerDto,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<ShortDto> for Short {
    fn from(dto: ShortDto) -> Self {
        Self {
            id: ShortId::new(dto.id),
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            tags: dto.tags,
            media_uri: dto.video_file,
            thumbnail_uri: dto.thumbnail.filter(|uri| !uri.is_empty()),
            view_count: dto.views,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            owner: match dto.user {
                OwnerDto::Id(id) => OwnerRef::Id(id),
                OwnerDto::Username(name) => OwnerRef::Username(name),
            },
        }
    }
}

/// Listing body: a bare array, or a paginated envelope when paging is on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ShortListDto {
    Plain(Vec<ShortDto>),
    Paged { results: Vec<ShortDto> },
}

impl ShortListDto {
    pub(super) fn into_domain(self) -> Vec<Short> {
        let items = match self {
            Self::Plain(items) | Self::Paged { results: items } => items,
        };
        items.into_iter().map(Short::from).collect()
    }
}

/// Error body summary plus the per-field breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ErrorBody {
    pub(super) summary: String,
    pub(super) fields: FieldErrors,
}

/// Decode a JSON error body.
///
/// `{"detail": "..."}` yields the detail as summary. Field maps such as
/// `{"username": ["taken"], "password": ["short", "common"]}` are flattened to
/// `"password: short, common. username: taken"`. Returns `None` for bodies
/// that are not JSON or carry no message.
pub(super) fn decode_error_body(body: &[u8]) -> Option<ErrorBody> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let mut fields = FieldErrors::new();
    let mut detail = None;

    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let messages = messages_of(value);
                if messages.is_empty() {
                    continue;
                }
                if key == "detail" {
                    detail = Some(messages.join(" "));
                } else {
                    fields.insert(key, messages);
                }
            }
        }
        Value::Array(_) | Value::String(_) => {
            let messages = messages_of(value);
            if !messages.is_empty() {
                detail = Some(messages.join(" "));
            }
        }
        _ => return None,
    }

    let summary = detail.or_else(|| {
        (!fields.is_empty()).then(|| {
            fields
                .iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                .collect::<Vec<_>>()
                .join(". ")
        })
    })?;
    Some(ErrorBody { summary, fields })
}

fn messages_of(value: Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message],
        Value::Array(items) => items.into_iter().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        Value::Object(map) => map
            .into_iter()
            .flat_map(|(key, nested)| {
                messages_of(nested)
                    .into_iter()
                    .map(move |message| format!("{key}: {message}"))
            })
            .collect(),
        other => vec![other.to_string()],
    }
}
