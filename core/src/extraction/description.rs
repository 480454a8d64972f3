use regex::Regex;
use std::sync::OnceLock;

/// Removes bracketed annotations from a series description
///
/// Every shortest run from an opening `<`, `(` or `[` to the next closing
/// `]`, `)` or `>` is deleted in one pass, then the result is trimmed. The
/// opening and closing characters need not be of the same kind.
///
/// # Example
///
/// ```
/// use mrseq_core::extraction::rm_extra_info;
///
/// assert_eq!(rm_extra_info("AX T2 (ACR) [3mm]"), "AX T2");
/// ```
pub fn rm_extra_info(text: &str) -> String {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(r"[<(\[].*?[\])>]").expect("Failed to compile regex"));
    re.replace_all(text, "").trim().to_string()
}
