/// Substitute placeholder pairs into user-facing text.
///
/// Each `(placeholder, value)` pair is applied in order, so
/// `translate("[name] (*.[ext])", &[("[name]", "Level"), ("[ext]", "arc")])`
/// yields `"Level (*.arc)"`.
pub fn translate(english: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(english.to_string(), |text, (from, to)| text.replace(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(translate("Blank level", &[]), "Blank level");
    }

    #[test]
    fn placeholders_are_replaced_in_order() {
        let out = translate("[name] (*.[ext])", &[("[name]", "Level"), ("[ext]", "arc")]);
        assert_eq!(out, "Level (*.arc)");
    }
}
