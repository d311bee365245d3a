use interpersona_core::config::ReportConfig;
use interpersona_core::reference::content::TextQuery;
use interpersona_core::traits::ContentLookup;
use tracing::debug;

/// Replace every occurrence of `placeholder` with the subject's first name.
pub fn personalize(text: &str, placeholder: &str, first_name: &str) -> String {
    if placeholder.is_empty() {
        return text.to_string();
    }
    text.replace(placeholder, first_name)
}

/// Look up a text and personalize it; `None` when nothing is authored.
pub fn lookup_text(
    lookup: &dyn ContentLookup,
    query: &TextQuery,
    config: &ReportConfig,
    first_name: &str,
) -> Option<String> {
    match lookup.text(query) {
        Ok(text) => Some(personalize(&text, &config.name_placeholder, first_name)),
        Err(e) => {
            debug!(error = %e, "text lookup missed");
            None
        }
    }
}

/// Like [`lookup_text`], falling back to the configured placeholder text.
pub fn resolve_text(
    lookup: &dyn ContentLookup,
    query: &TextQuery,
    config: &ReportConfig,
    first_name: &str,
) -> String {
    lookup_text(lookup, query, config, first_name).unwrap_or_else(|| config.missing_content.clone())
}
