const MAX_TEXT_CHARS: usize = 30;
const STRIPPED_CHARS: [char; 3] = [':', '\'', '"'];
const EMPTY_TEXT: &str = "No Poster";

/// Last step of the poster chain: a generated image showing the title text
#[derive(Debug, Clone)]
pub struct PlaceholderPoster {
    base_url: String,
}

impl PlaceholderPoster {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn render(&self, title: &str) -> String {
        format!(
            "{}?text={}",
            self.base_url,
            urlencoding::encode(&placeholder_text(title))
        )
    }
}

/// Title with `:`, `'` and `"` removed, cut to 30 characters
pub fn placeholder_text(title: &str) -> String {
    let text: String = title
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .take(MAX_TEXT_CHARS)
        .collect();

    if text.trim().is_empty() {
        EMPTY_TEXT.to_string()
    } else {
        text
    }
}
