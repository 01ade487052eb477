//! User-Agent string sent with every API request.

/// Product token used in the User-Agent header.
const PRODUCT: &str = "outline-rs";

/// Default User-Agent: product token, crate version and the Rust HTTP stack.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version} (reqwest)")
}
