use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default word cleanup applied before a lookup
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Full-width latin and compatibility forms fold to plain ASCII
        let text: String = text.nfkc().collect();

        text.replace(['\n', '\r'], "").trim().to_string()
    }
}

pub struct WordPreprocessor;
impl Preprocessor for WordPreprocessor {}
