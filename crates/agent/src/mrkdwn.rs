use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(.*?)\]\((.*?)\)").expect("markdown link regex is valid")
});

/// Rewrite common Markdown into Slack mrkdwn.
///
/// `[label](url)` becomes `<url|label>` and `**bold**` becomes `*bold*`.
/// Text without either pattern passes through unchanged.
pub fn to_mrkdwn(text: &str) -> String {
    MARKDOWN_LINK.replace_all(text, "<$2|$1>").replace("**", "*")
}
