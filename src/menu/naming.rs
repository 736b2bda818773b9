use chrono::{Datelike, Duration, NaiveDate};

/// The suffix counter a candidate name contributes for `base`: the bare name
/// counts as 0, `base (N)` counts as N, anything else does not match.
fn suffix_counter(base: &str, candidate: &str) -> Option<u32> {
    if candidate == base {
        return Some(0);
    }
    let rest = candidate.strip_prefix(base)?;
    let digits = rest.strip_prefix(" (")?.strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Derives a menu name unique among `existing`: if the desired name (bare or
/// with a ` (N)` suffix) already appears, the result is
/// `desired (max seen + 1)`; otherwise the desired name is returned
/// unchanged. Max-based, not count-based, so deleted menus never cause a
/// collision with a surviving higher suffix.
///
/// `existing` is whatever the caller's prefix probe returned; a failed probe
/// must abort the create/update instead of calling this with partial data.
pub fn resolve_unique_name<S: AsRef<str>>(desired: &str, existing: &[S]) -> String {
    let mut max_counter: Option<u32> = None;
    for candidate in existing {
        if let Some(counter) = suffix_counter(desired, candidate.as_ref()) {
            max_counter = Some(max_counter.unwrap_or(0).max(counter));
        }
    }
    match max_counter {
        Some(max) => format!("{} ({})", desired, max + 1),
        None => desired.to_string(),
    }
}

/// ISO year and week number of the week containing `date`.
pub fn week_of(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// Default display name for the menu of the week containing `date`, e.g.
/// "Menú Semana del 25/08 al 31/08 de 2025".
pub fn default_menu_name(date: NaiveDate) -> String {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);
    format!(
        "Menú Semana del {} al {} de {}",
        monday.format("%d/%m"),
        sunday.format("%d/%m"),
        sunday.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unique_name_no_collision() {
        let existing: [&str; 0] = [];
        assert_eq!(resolve_unique_name("Menu X", &existing), "Menu X");
    }

    #[test]
    fn test_resolve_unique_name_bare_collision() {
        assert_eq!(resolve_unique_name("Menu X", &["Menu X"]), "Menu X (1)");
    }

    #[test]
    fn test_resolve_unique_name_uses_max_not_count() {
        // Max seen is 3 (the bare name counts as 0), so the next is 4.
        let existing = ["Menu X", "Menu X (1)", "Menu X (3)"];
        assert_eq!(resolve_unique_name("Menu X", &existing), "Menu X (4)");
    }

    #[test]
    fn test_resolve_unique_name_ignores_unrelated_prefixed_names() {
        // Prefix probes over-fetch: names that merely start with the desired
        // text must not count as collisions.
        let existing = ["Menu X de prueba", "Menu X (dos)", "Menu X ()", "Menu X (2) extra"];
        assert_eq!(resolve_unique_name("Menu X", &existing), "Menu X");
    }

    #[test]
    fn test_resolve_unique_name_handles_parentheses_in_desired() {
        // Parentheses inside the desired name must not confuse the suffix
        // parse.
        let existing = ["Menú (verano)", "Menú (verano) (2)"];
        assert_eq!(resolve_unique_name("Menú (verano)", &existing), "Menú (verano) (3)");
    }

    #[test]
    fn test_week_of_matches_iso_numbering() {
        // 2026-01-01 is a Thursday, ISO week 1 of 2026.
        let (year, week) = week_of(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!((year, week), (2026, 1));
        // 2023-01-01 is a Sunday belonging to ISO week 52 of 2022.
        let (year, week) = week_of(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!((year, week), (2022, 52));
    }

    #[test]
    fn test_default_menu_name_spans_monday_to_sunday() {
        // 2025-08-27 is a Wednesday; its week runs 25/08 to 31/08.
        let name = default_menu_name(NaiveDate::from_ymd_opt(2025, 8, 27).unwrap());
        assert_eq!(name, "Menú Semana del 25/08 al 31/08 de 2025");
        // A Sunday anchors to its own week, not the next one.
        let name = default_menu_name(NaiveDate::from_ymd_opt(2025, 8, 31).unwrap());
        assert_eq!(name, "Menú Semana del 25/08 al 31/08 de 2025");
    }
}
