/// Sanitizes learner-written text (essay answers) before it is stored.
///
/// Tutors read essays in the browser, so markup goes through ammonia's
/// whitelist: harmless formatting tags survive, scripts and event
/// handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_keeps_formatting() {
        let cleaned = clean_html("<b>Osmosis</b><script>alert(1)</script>");
        assert_eq!(cleaned, "<b>Osmosis</b>");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(clean_html("Water moves across"), "Water moves across");
    }
}
