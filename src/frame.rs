//! # Frames
//!
//! Views returned to the frame host.
//!
//! A frame is an HTML document whose `fc:frame*` meta tags describe one image
//! and up to four interactive controls. Hosts post interactions back to
//! `fc:frame:post_url`.
//!
//! ## Image
//! - SVG card embedded as a base64 data URI, 1.91:1
//! - Heading plus optional wrapped body text
//! - Palette: text `#000000`, background `#ffffff`, accent `#0070f3`
//!
//! ## Intents
//! - At most one text input
//! - Buttons are numbered from 1 in declaration order, text inputs are skipped
use axum::response::{Html, IntoResponse, Response};
use base64::{Engine, engine::general_purpose::STANDARD};
use url::Url;

pub const ADD_CAST_ACTION_URL: &str = "https://warpcast.com/~/add-cast-action";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 630;
const LINE_CHARS: usize = 44;

const TEXT_COLOR: &str = "#000000";
const BACKGROUND_COLOR: &str = "#ffffff";
const ACCENT_COLOR: &str = "#0070f3";
const FONT: &str = "'Open Sans', sans-serif";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub heading: String,
    pub text: Option<String>,
}

impl Card {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        );
        svg.push_str(&format!(
            r#"<rect width="100%" height="100%" fill="{BACKGROUND_COLOR}"/>"#
        ));
        svg.push_str(&format!(
            r#"<rect x="0" y="0" width="16" height="{HEIGHT}" fill="{ACCENT_COLOR}"/>"#
        ));
        svg.push_str(&format!(
            r#"<text x="80" y="200" font-family="{FONT}" font-size="64" font-weight="600" fill="{TEXT_COLOR}">{}</text>"#,
            escape(&self.heading)
        ));

        if let Some(text) = &self.text {
            for (i, line) in wrap(text, LINE_CHARS).iter().enumerate() {
                svg.push_str(&format!(
                    r#"<text x="80" y="{}" font-family="{FONT}" font-size="40" fill="{TEXT_COLOR}">{}</text>"#,
                    290 + i * 56,
                    escape(line)
                ));
            }
        }

        svg.push_str("</svg>");
        svg
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(self.to_svg()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    TextInput { placeholder: String },
    Button { label: String },
    /// Link button that opens the client's install prompt for a cast action.
    AddCastAction { label: String, action_url: String },
}

impl Intent {
    pub fn text_input(placeholder: impl Into<String>) -> Self {
        Intent::TextInput {
            placeholder: placeholder.into(),
        }
    }

    pub fn button(label: impl Into<String>) -> Self {
        Intent::Button {
            label: label.into(),
        }
    }

    pub fn add_cast_action(label: impl Into<String>, action_url: impl Into<String>) -> Self {
        Intent::AddCastAction {
            label: label.into(),
            action_url: action_url.into(),
        }
    }

    fn is_button(&self) -> bool {
        !matches!(self, Intent::TextInput { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub card: Card,
    pub intents: Vec<Intent>,
    pub post_url: Option<String>,
}

impl Frame {
    pub fn new(card: Card) -> Self {
        Self {
            card,
            intents: Vec::new(),
            post_url: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Card::new(message))
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intents.push(intent);
        self
    }

    pub fn with_post_url(mut self, post_url: impl Into<String>) -> Self {
        self.post_url = Some(post_url.into());
        self
    }

    pub fn text_inputs(&self) -> usize {
        self.intents.iter().filter(|i| !i.is_button()).count()
    }

    pub fn buttons(&self) -> usize {
        self.intents.iter().filter(|i| i.is_button()).count()
    }

    pub fn to_html(&self) -> String {
        let image = self.card.to_data_uri();
        let mut tags = vec![
            meta("fc:frame", "vNext"),
            meta("fc:frame:image", &image),
            meta("fc:frame:image:aspect_ratio", "1.91:1"),
            meta("og:image", &image),
            meta("og:title", &self.card.heading),
        ];

        if let Some(post_url) = &self.post_url {
            tags.push(meta("fc:frame:post_url", post_url));
        }

        let mut index = 0;
        for intent in &self.intents {
            match intent {
                Intent::TextInput { placeholder } => {
                    tags.push(meta("fc:frame:input:text", placeholder));
                }
                Intent::Button { label } => {
                    index += 1;
                    tags.push(meta(&format!("fc:frame:button:{index}"), label));
                    tags.push(meta(&format!("fc:frame:button:{index}:action"), "post"));
                }
                Intent::AddCastAction { label, action_url } => {
                    index += 1;
                    tags.push(meta(&format!("fc:frame:button:{index}"), label));
                    tags.push(meta(&format!("fc:frame:button:{index}:action"), "link"));
                    tags.push(meta(
                        &format!("fc:frame:button:{index}:target"),
                        &install_link(action_url),
                    ));
                }
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body></body>\n</html>\n",
            escape(&self.card.heading),
            tags.join("\n")
        )
    }
}

impl IntoResponse for Frame {
    fn into_response(self) -> Response {
        Html(self.to_html()).into_response()
    }
}

fn install_link(action_url: &str) -> String {
    match Url::parse_with_params(ADD_CAST_ACTION_URL, &[("url", action_url)]) {
        Ok(url) => url.to_string(),
        Err(_) => ADD_CAST_ACTION_URL.to_string(),
    }
}

fn meta(property: &str, content: &str) -> String {
    format!(
        r#"<meta property="{}" content="{}">"#,
        escape(property),
        escape(content)
    )
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}
