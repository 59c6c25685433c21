fn strip_invisible(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "")
}

/// Collapses runs of whitespace so display labels compare cleanly.
pub(crate) fn clean_label(value: &str) -> String {
    strip_invisible(value)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derives a stable criterion key: lowercase alphanumerics joined by `_`.
pub(crate) fn criterion_key(value: &str) -> String {
    let lowered = strip_invisible(value).to_lowercase();
    let mut key = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(ch);
        } else {
            pending_separator = true;
        }
    }

    key
}
