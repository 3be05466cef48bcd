//! Notification message rendering.
//!
//! Templates are literal strings with `%{field}` interpolation over the
//! build-event fields. Each template line becomes one IRC message, prefixed
//! with the dispatcher's nick in brackets.

use std::collections::HashMap;

use tracing::debug;

use crate::event::BuildEvent;

/// The default three-line notification: summary, change view, build details.
pub const DEFAULT_TEMPLATE: [&str; 3] = [
    "%{repository}#%{build_number} (%{branch} - %{commit} : %{author}): %{message}",
    "Change view : %{compare_url}",
    "Build details : %{build_url}",
];

/// Interpolation context, built once per dispatch run.
#[derive(Debug, Clone)]
pub struct TemplateVars {
    vars: HashMap<&'static str, String>,
}

impl TemplateVars {
    /// Build the context from an event. URLs are passed in separately
    /// because they have already been through the shortener.
    pub fn new(event: &BuildEvent, compare_url: String, build_url: String) -> Self {
        let mut vars = HashMap::new();
        vars.insert("repository", event.repository.clone());
        vars.insert("build_number", event.build_number.clone());
        vars.insert("branch", event.branch.clone());
        vars.insert("commit", short_sha(&event.commit));
        vars.insert("author", event.author.clone());
        vars.insert("message", event.message.clone());
        vars.insert("compare_url", compare_url);
        vars.insert("build_url", build_url);
        Self { vars }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Render one message per template line, each prefixed with `[<nick>] `.
/// `None` selects the default template.
pub fn render(templates: Option<&[String]>, vars: &TemplateVars, nick: &str) -> Vec<String> {
    let lines: Vec<&str> = match templates {
        Some(custom) => custom.iter().map(String::as_str).collect(),
        None => DEFAULT_TEMPLATE.to_vec(),
    };
    lines
        .iter()
        .map(|template| format!("[{nick}] {}", interpolate(template, vars)))
        .collect()
}

fn interpolate(template: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let key = &rest[start + 2..start + 2 + end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    // Unknown keys render empty rather than failing dispatch.
                    None => debug!(key, "unknown template variable"),
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                // Unterminated `%{` is kept literally.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn short_sha(sha: &str) -> String {
    sha.chars().take(7).collect()
}
