use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

/// Body of a text response: a single string or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextContent {
    Single(String),
    Lines(Vec<String>),
}

impl TextContent {
    /// The lines of the content, a single string counting as one line.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            TextContent::Single(text) => vec![text.as_str()],
            TextContent::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }

    /// Lines joined with newlines.
    pub fn to_plain_text(&self) -> String {
        self.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines().iter().all(|line| line.trim().is_empty())
    }
}

impl Default for TextContent {
    fn default() -> Self {
        TextContent::Single(String::new())
    }
}

impl From<&str> for TextContent {
    fn from(text: &str) -> Self {
        TextContent::Single(text.to_string())
    }
}

/// Target of the link in a text-with-link response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LinkTarget {
    /// Where the link points to.
    #[validate(length(min = 1))]
    pub url: String,
    /// The clickable label.
    #[serde(rename = "displayText")]
    pub label: String,
}

/// A canned chatbot answer. Exactly one variant per response.
///
/// In the configuration document the variant is selected by the `type`
/// field. Unrecognized `type` values are read as [`Response::Text`] showing
/// the raw `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResponse", into = "RawResponse")]
pub enum Response {
    Text { content: TextContent },
    Image { url: String },
    Video { url: String },
    Link { label: String, url: String },
    TextWithLink { text: String, link: LinkTarget },
}

impl Response {
    pub fn text(content: impl Into<String>) -> Self {
        Response::Text {
            content: TextContent::Single(content.into()),
        }
    }

    /// The `type` tag used in the configuration document.
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Text { .. } => "text",
            Response::Image { .. } => "image",
            Response::Video { .. } => "video",
            Response::Link { .. } => "link",
            Response::TextWithLink { .. } => "textWithLink",
        }
    }
}

/// Wire shape of a response object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<LinkTarget>,
}

/// Problem with a single response object of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseShapeError(String);

impl fmt::Display for ResponseShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ResponseShapeError {}

fn required<T>(value: Option<T>, kind: &str, field: &str) -> Result<T, ResponseShapeError> {
    value.ok_or_else(|| ResponseShapeError(format!("`{}` response needs a `{}` field", kind, field)))
}

fn single(content: TextContent, kind: &str) -> Result<String, ResponseShapeError> {
    match content {
        TextContent::Single(value) => Ok(value),
        TextContent::Lines(_) => Err(ResponseShapeError(format!(
            "`{}` response expects `content` to be a single string",
            kind
        ))),
    }
}

impl TryFrom<RawResponse> for Response {
    type Error = ResponseShapeError;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("text") => Ok(Response::Text {
                content: required(raw.content, "text", "content")?,
            }),
            Some(kind @ ("image" | "video")) => {
                let url = single(required(raw.content, kind, "content")?, kind)?;
                Ok(if kind == "image" {
                    Response::Image { url }
                } else {
                    Response::Video { url }
                })
            }
            Some("link") => Ok(Response::Link {
                label: single(required(raw.content, "link", "content")?, "link")?,
                url: required(raw.url, "link", "url")?,
            }),
            Some("textWithLink") => Ok(Response::TextWithLink {
                text: required(raw.text, "textWithLink", "text")?,
                link: required(raw.link, "textWithLink", "link")?,
            }),
            // Unknown or missing type: show whatever raw content there is
            _ => Ok(Response::Text {
                content: raw
                    .content
                    .or_else(|| raw.text.map(TextContent::Single))
                    .unwrap_or_default(),
            }),
        }
    }
}

impl From<Response> for RawResponse {
    fn from(response: Response) -> Self {
        let kind = Some(response.kind().to_string());
        match response {
            Response::Text { content } => RawResponse {
                kind,
                content: Some(content),
                ..Default::default()
            },
            Response::Image { url } | Response::Video { url } => RawResponse {
                kind,
                content: Some(TextContent::Single(url)),
                ..Default::default()
            },
            Response::Link { label, url } => RawResponse {
                kind,
                content: Some(TextContent::Single(label)),
                url: Some(url),
                ..Default::default()
            },
            Response::TextWithLink { text, link } => RawResponse {
                kind,
                text: Some(text),
                link: Some(link),
                ..Default::default()
            },
        }
    }
}

/// A shortcut button offered to the user; clicking it sends `utterance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QuickReply {
    #[validate(length(min = 1))]
    pub label: String,
    #[validate(length(min = 1))]
    pub utterance: String,
}

/// A raw user question, as recorded for later review.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    /// The unique identifier for the question.
    pub id: i64,
    /// The text exactly as the user submitted it.
    pub text: String,
    /// Unix timestamp of when the question was recorded.
    pub timestamp: i64,
}

/// Payload for recording a question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}
