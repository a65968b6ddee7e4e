//! Turns transcript messages into markup for the exported chat page.

use crate::core::message::Message;
use crate::core::mode::UiMode;
use crate::ui::generative::{is_safe_url, render_node};
use crate::ui::html::{escape_html, Html};
use crate::ui::sanitize::Sanitizer;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<script src="https://cdn.tailwindcss.com"></script>
"#;

pub fn render_message(message: &Message, sanitizer: &dyn Sanitizer) -> Html {
    let (row_class, bubble_class, badge) = if message.is_model() {
        ("flex items-start gap-3", "bg-gray-800", "AI")
    } else {
        ("flex items-start gap-3 flex-row-reverse", "bg-cyan-800", "You")
    };
    let text_class = if message.is_error {
        "text-red-300"
    } else {
        "text-gray-100"
    };

    let mut html = Html::new();
    html.push_trusted(&format!(
        "<div class=\"{row_class}\" data-message-id=\"{}\">",
        escape_html(message.id.as_str())
    ));
    html.push_trusted(
        "<div class=\"w-10 h-10 rounded-full bg-gray-700 flex items-center justify-center \
         flex-shrink-0 border-2 border-gray-600 text-xs\">",
    );
    html.push_text(badge);
    html.push_trusted(&format!(
        "</div><div class=\"max-w-xl lg:max-w-2xl rounded-lg px-4 py-3 shadow-md {bubble_class} {text_class}\">"
    ));

    if !message.text_part.is_empty() {
        html.push_trusted("<div>");
        html.push_html(&sanitizer.sanitize(&message.text_part));
        html.push_trusted("</div>");
    }

    if let Some(node) = &message.ui_part {
        let divider = if message.text_part.is_empty() {
            ""
        } else {
            " class=\"mt-3 pt-3 border-t border-gray-600\""
        };
        html.push_trusted(&format!("<div{divider}>"));
        html.push_html(&render_node(Some(node)));
        html.push_trusted("</div>");
    }

    if !message.sources.is_empty() {
        html.push_html(&render_sources(message));
    }

    html.push_trusted("</div></div>");
    html
}

fn render_sources(message: &Message) -> Html {
    let mut html = Html::new();
    html.push_trusted(
        "<div class=\"mt-3 pt-3 border-t border-gray-600 text-sm\"><p class=\"text-gray-400\">Sources</p><ul>",
    );
    for source in &message.sources {
        let Some(label) = source.label() else {
            continue;
        };
        html.push_trusted("<li>");
        match source.uri.as_deref().filter(|uri| is_safe_url(uri)) {
            Some(uri) => {
                html.push_trusted(&format!(
                    "<a class=\"text-cyan-400 underline\" href=\"{}\" rel=\"noopener noreferrer\">",
                    escape_html(uri)
                ));
                html.push_text(label);
                html.push_trusted("</a>");
            }
            None => html.push_text(label),
        }
        html.push_trusted("</li>");
    }
    html.push_trusted("</ul></div>");
    html
}

pub fn render_transcript<'a, I>(messages: I, sanitizer: &dyn Sanitizer) -> Html
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut html = Html::new();
    html.push_trusted("<div class=\"max-w-4xl mx-auto space-y-6\">");
    for message in messages {
        html.push_html(&render_message(message, sanitizer));
    }
    html.push_trusted("</div>");
    html
}

/// Complete standalone page: dark theme, Tailwind from its CDN, a header with
/// the current mode, then the transcript.
pub fn render_page<'a, I>(title: &str, mode: UiMode, messages: I, sanitizer: &dyn Sanitizer) -> Html
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut html = Html::trusted(PAGE_HEAD);
    html.push_trusted("<title>");
    html.push_text(title);
    html.push_trusted("</title>\n</head>\n<body class=\"bg-gray-900 text-white min-h-screen flex flex-col\">\n");
    html.push_trusted(
        "<header class=\"p-4 border-b border-gray-700 flex items-center justify-between\"><h1 class=\"text-xl font-bold\">",
    );
    html.push_text(title);
    html.push_trusted("</h1><span class=\"text-sm text-gray-400\">");
    html.push_text(mode.display_name());
    html.push_trusted("</span></header>\n<main class=\"flex-1 p-4 md:p-6\">");
    html.push_html(&render_transcript(messages, sanitizer));
    html.push_trusted("</main>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{GroundingSource, Role};
    use crate::core::ui_tree::UiNode;
    use crate::ui::sanitize::AmmoniaSanitizer;

    fn model(text: &str) -> Message {
        Message::new(Role::Model, text)
    }

    #[test]
    fn model_html_is_sanitized() {
        let message = model("<p class=\"text-lg\" onclick=\"x()\">Hi</p><script>bad()</script>");
        let html = render_message(&message, &AmmoniaSanitizer::new()).into_string();

        assert!(html.contains("<p class=\"text-lg\">Hi</p>"));
        assert!(!html.contains("script"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn user_text_cannot_inject_markup() {
        let message = Message::user("<img src=x onerror=alert(1)>");
        let html = render_message(&message, &AmmoniaSanitizer::new()).into_string();

        assert!(html.contains("flex-row-reverse"));
        assert!(html.contains("bg-cyan-800"));
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn error_messages_use_error_styling() {
        let mut message = model("partial\n\nError: Connection lost");
        message.is_error = true;
        let html = render_message(&message, &AmmoniaSanitizer::new()).into_string();

        assert!(html.contains("text-red-300"));
        assert!(html.contains("Error: Connection lost"));
    }

    #[test]
    fn ui_part_is_rendered_below_text() {
        let mut message = model("Here you go");
        message.ui_part = Some(UiNode::new("Card").with_text("hello"));
        let html = render_message(&message, &AmmoniaSanitizer::new()).into_string();

        let text_at = html.find("Here you go").expect("text");
        let card_at = html.find("bg-gray-700 p-4").expect("card");
        assert!(text_at < card_at);
        assert!(html.contains("mt-3 pt-3 border-t border-gray-600"));
    }

    #[test]
    fn sources_link_only_to_web_urls() {
        let mut message = model("Sunny");
        message.sources = vec![
            GroundingSource {
                uri: Some("https://weather.example/rome".into()),
                title: Some("Rome <forecast>".into()),
            },
            GroundingSource {
                uri: Some("javascript:alert(1)".into()),
                title: Some("bad".into()),
            },
            GroundingSource::default(),
        ];
        let html = render_message(&message, &AmmoniaSanitizer::new()).into_string();

        assert!(html.contains("href=\"https://weather.example/rome\""));
        assert!(html.contains("Rome &lt;forecast&gt;"));
        assert!(!html.contains("javascript:"));
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn page_wraps_transcript_in_document() {
        let messages = [Message::user("hi"), model("<p>hello</p>")];
        let page = render_page(
            "Gen UI Chat",
            UiMode::GenerativeUi,
            messages.iter(),
            &AmmoniaSanitizer::new(),
        )
        .into_string();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Gen UI Chat</title>"));
        assert!(page.contains("cdn.tailwindcss.com"));
        assert!(page.contains(">Gen UI</span>"));
        assert!(page.contains("<p>hello</p>"));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
