/// Content type for a filename, guessed from its extension.
pub fn guess_content_type(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Content type to serve a blob with: the recorded one, else a guess from
/// the name, else `fallback`. A recorded `application/octet-stream` says
/// nothing and loses to the guess.
pub fn content_type_for(recorded: Option<&str>, filename: &str, fallback: &str) -> String {
    recorded
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && *ct != mime_guess::mime::APPLICATION_OCTET_STREAM.essence_str())
        .map(str::to_string)
        .or_else(|| guess_content_type(filename))
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_type_wins() {
        assert_eq!(
            content_type_for(Some("text/markdown"), "notes.txt", "application/octet-stream"),
            "text/markdown"
        );
    }

    #[test]
    fn guesses_from_extension() {
        assert_eq!(
            content_type_for(None, "diagram.png", "application/octet-stream"),
            "image/png"
        );
        assert_eq!(
            content_type_for(Some(""), "style.css", "application/octet-stream"),
            "text/css"
        );
        assert_eq!(
            content_type_for(Some("application/octet-stream"), "diagram.png", "application/octet-stream"),
            "image/png"
        );
    }

    #[test]
    fn falls_back_for_unknown() {
        assert_eq!(
            content_type_for(None, "README", "application/octet-stream"),
            "application/octet-stream"
        );
    }
}
