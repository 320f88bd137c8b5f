pub(crate) const MAX_RATING: u8 = 5;

/// `"A^B"` -> `"A, B"`; the backend joins multiple authors with `^`.
pub(crate) fn display_authors(raw: &str) -> String {
    raw.split('^')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Filled/empty star flags for a rating, clamped to `0..=MAX_RATING`.
pub(crate) fn star_flags(rating: u8) -> [bool; MAX_RATING as usize] {
    let filled = rating.min(MAX_RATING) as usize;
    let mut stars = [false; MAX_RATING as usize];
    for star in stars.iter_mut().take(filled) {
        *star = true;
    }
    stars
}

/// Date part of an ISO-8601 timestamp; anything unparseable is returned as is.
pub(crate) fn date_only(timestamp: &str) -> &str {
    let t = timestamp.trim();
    match t.split_once('T') {
        Some((date, _)) if date.len() == 10 => date,
        _ => t,
    }
}

/// Locale date string via the browser, falling back to [`date_only`].
pub(crate) fn format_local_date(timestamp: &str) -> String {
    let d = js_sys::Date::new(&wasm_bindgen::JsValue::from_str(timestamp));
    if d.get_time().is_nan() {
        return date_only(timestamp).to_string();
    }
    String::from(d.to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_authors_splits_caret_list() {
        assert_eq!(display_authors("Han Kang^Deborah Smith"), "Han Kang, Deborah Smith");
        assert_eq!(display_authors("Solo"), "Solo");
        assert_eq!(display_authors("^A^^B^"), "A, B");
        assert_eq!(display_authors(""), "");
    }

    #[test]
    fn test_star_flags_clamps() {
        assert_eq!(star_flags(0), [false; 5]);
        assert_eq!(star_flags(3), [true, true, true, false, false]);
        assert_eq!(star_flags(9), [true; 5]);
    }

    #[test]
    fn test_date_only() {
        assert_eq!(date_only("2025-01-03T10:00:00"), "2025-01-03");
        assert_eq!(date_only("2025-01-03"), "2025-01-03");
        assert_eq!(date_only("yesterday"), "yesterday");
    }
}
