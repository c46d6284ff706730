/// Go-link recognition and short name extraction
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SCHEME_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://go/").expect("static pattern"));

/// Host name that marks a parsed URL as a go-link
const GO_HOST: &str = "go";

/// Prefix of a go-link typed without a scheme
const BARE_PREFIX: &str = "go/";

/// Which of the recognized shapes a go-link arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoLinkForm {
    /// Absolute URL whose host is `go`, e.g. `https://go/docs`
    Host,
    /// Address-bar text without a scheme, e.g. `go/docs`
    Bare,
    /// Raw string matching `^https?://go/` that did not parse as a URL
    SchemePrefixed,
}

/// Classify a navigation target.
///
/// The host form wins when several forms match, since it works on the
/// already-parsed URL and avoids a second pass over the raw string.
pub fn classify(input: &str) -> Option<GoLinkForm> {
    if parse_go_url(input).is_some() {
        Some(GoLinkForm::Host)
    } else if input.starts_with(BARE_PREFIX) {
        Some(GoLinkForm::Bare)
    } else if SCHEME_PREFIXED.is_match(input) {
        Some(GoLinkForm::SchemePrefixed)
    } else {
        None
    }
}

/// Check whether a URL or address-bar string is a go-link
pub fn is_go_link(input: &str) -> bool {
    classify(input).is_some()
}

/// Extract the short name candidate from a go-link
///
/// Algorithm:
/// 1. Take the path after `go/` (leading slash stripped)
/// 2. Cut at the first `?`
/// 3. Cut at the first `#`
///
/// Nested segments such as `docs/api` are kept verbatim. Returns an empty
/// string when the input is not a go-link or carries no name; callers skip
/// the lookup in that case.
///
/// Examples:
/// - http://go/docs → docs
/// - https://go/docs?x=1 → docs
/// - go/jira → jira
/// - go/ → ""
pub fn extract_short_name(input: &str) -> String {
    let raw = match classify(input) {
        Some(GoLinkForm::Host) => parse_go_url(input)
            .map(|url| url.path().trim_start_matches('/').to_string())
            .unwrap_or_default(),
        Some(GoLinkForm::Bare) => input[BARE_PREFIX.len()..].to_string(),
        Some(GoLinkForm::SchemePrefixed) => SCHEME_PREFIXED.replace(input, "").into_owned(),
        None => String::new(),
    };

    strip_suffixes(&raw).to_string()
}

fn parse_go_url(input: &str) -> Option<Url> {
    Url::parse(input)
        .ok()
        .filter(|url| url.host_str() == Some(GO_HOST))
}

/// Drop any query string and fragment, whichever comes first
fn strip_suffixes(raw: &str) -> &str {
    let raw = raw.split('?').next().unwrap_or_default();
    raw.split('#').next().unwrap_or_default()
}
