//! Response rendering.
//!
//! One render function per [`Response`] variant. The HTML renderer mirrors the
//! chat widget markup (paragraph, `<img>`, `<iframe>`, link opened in a new
//! tab); the terminal renderer prints plain text.

use crate::models::{LinkTarget, QuickReply, Response, TextContent};
use serde::Serialize;
use std::fmt::Write;

/// Who a chat message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn css_class(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Session state a render call may depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'a> {
    /// Quick replies to attach under the message, empty when hidden.
    pub quick_replies: &'a [QuickReply],
}

/// A message ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub sender: Sender,
    /// The `type` of the rendered response, `"user"` for user echoes.
    pub kind: &'static str,
    pub body: String,
    /// Text answers are typed out progressively by the host.
    pub animate_typing: bool,
}

/// Turns responses into displayable messages.
pub trait Renderer {
    fn render_text(&self, content: &TextContent) -> String;
    fn render_image(&self, url: &str) -> String;
    fn render_video(&self, url: &str) -> String;
    fn render_link(&self, label: &str, url: &str) -> String;
    fn render_text_with_link(&self, text: &str, link: &LinkTarget) -> String;
    fn render_quick_replies(&self, quick_replies: &[QuickReply]) -> String;
    fn render_user(&self, text: &str) -> String;

    /// Render a bot response.
    fn render(&self, response: &Response, context: &RenderContext<'_>) -> RenderedMessage {
        let mut body = match response {
            Response::Text { content } => self.render_text(content),
            Response::Image { url } => self.render_image(url),
            Response::Video { url } => self.render_video(url),
            Response::Link { label, url } => self.render_link(label, url),
            Response::TextWithLink { text, link } => self.render_text_with_link(text, link),
        };
        if !context.quick_replies.is_empty() {
            body.push_str(&self.render_quick_replies(context.quick_replies));
        }

        RenderedMessage {
            sender: Sender::Bot,
            kind: response.kind(),
            body,
            animate_typing: matches!(response, Response::Text { .. }),
        }
    }

    /// Echo of what the user typed.
    fn render_user_message(&self, text: &str) -> RenderedMessage {
        RenderedMessage {
            sender: Sender::User,
            kind: "user",
            body: self.render_user(text),
            animate_typing: false,
        }
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML fragments for the web chat widget.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn wrap(sender: Sender, inner: &str) -> String {
        format!(r#"<div class="message {}">{}</div>"#, sender.css_class(), inner)
    }
}

impl Renderer for HtmlRenderer {
    fn render_text(&self, content: &TextContent) -> String {
        let paragraphs: String = content
            .lines()
            .iter()
            .map(|line| format!("<p>{}</p>", escape_html(line)))
            .collect();
        Self::wrap(Sender::Bot, &paragraphs)
    }

    fn render_image(&self, url: &str) -> String {
        Self::wrap(
            Sender::Bot,
            &format!(
                r#"<img src="{}" alt="Image" style="max-width: 100%; height: auto;">"#,
                escape_html(url)
            ),
        )
    }

    fn render_video(&self, url: &str) -> String {
        Self::wrap(
            Sender::Bot,
            &format!(
                r#"<iframe width="100%" height="315" src="{}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#,
                escape_html(url)
            ),
        )
    }

    fn render_link(&self, label: &str, url: &str) -> String {
        Self::wrap(
            Sender::Bot,
            &format!(
                r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                escape_html(url),
                escape_html(label)
            ),
        )
    }

    fn render_text_with_link(&self, text: &str, link: &LinkTarget) -> String {
        Self::wrap(
            Sender::Bot,
            &format!(
                r#"<p>{}</p><a href="{}" target="_blank" rel="noopener">{}</a>"#,
                escape_html(text),
                escape_html(&link.url),
                escape_html(&link.label)
            ),
        )
    }

    fn render_quick_replies(&self, quick_replies: &[QuickReply]) -> String {
        let mut html = String::from(r#"<div class="quick-replies">"#);
        for reply in quick_replies {
            let _ = write!(
                html,
                r#"<button type="button" data-utterance="{}">{}</button>"#,
                escape_html(&reply.utterance),
                escape_html(&reply.label)
            );
        }
        html.push_str("</div>");
        html
    }

    fn render_user(&self, text: &str) -> String {
        Self::wrap(Sender::User, &format!("<p>{}</p>", escape_html(text)))
    }
}

/// Plain text for the terminal chat.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render_text(&self, content: &TextContent) -> String {
        content.to_plain_text()
    }

    fn render_image(&self, url: &str) -> String {
        format!("[image] {}", url)
    }

    fn render_video(&self, url: &str) -> String {
        format!("[video] {}", url)
    }

    fn render_link(&self, label: &str, url: &str) -> String {
        format!("{} <{}>", label, url)
    }

    fn render_text_with_link(&self, text: &str, link: &LinkTarget) -> String {
        format!("{}\n{} <{}>", text, link.label, link.url)
    }

    fn render_quick_replies(&self, quick_replies: &[QuickReply]) -> String {
        let mut text = String::new();
        for (position, reply) in quick_replies.iter().enumerate() {
            let _ = write!(text, "\n  [{}] {}", position + 1, reply.label);
        }
        text
    }

    fn render_user(&self, text: &str) -> String {
        format!("> {}", text)
    }
}

/// Progressive prefixes of `text`, one more character each, for the typing
/// animation. Yields nothing for empty text.
pub fn typing_frames(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(|(offset, c)| offset + c.len_utf8())
        .map(move |end| &text[..end])
}
