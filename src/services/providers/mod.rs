/// Poster provider abstraction
///
/// Each provider is one step of the poster fallback chain. The resolver tries
/// providers in order and stops at the first one that yields a URL; the
/// placeholder generator sits behind all of them and cannot fail.
use crate::{error::AppResult, models::Title};

pub mod placeholder;
pub mod tmdb;

pub use placeholder::PlaceholderPoster;
pub use tmdb::{TmdbDetailProvider, TmdbSearchProvider};

/// One poster lookup strategy
///
/// `Ok(None)` means the source had nothing usable for this title (no match,
/// no poster, no join key). `Err` covers network and decoding failures.
/// Either way the resolver moves on to the next provider.
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    async fn find_poster(&self, title: &Title) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Joins a CDN base and a poster path with exactly one slash
pub fn poster_url(image_base: &str, poster_path: &str) -> String {
    format!(
        "{}/{}",
        image_base.trim_end_matches('/'),
        poster_path.trim_start_matches('/')
    )
}

/// Treats null, empty and whitespace-only poster paths as absent
pub(crate) fn usable_path(poster_path: Option<String>) -> Option<String> {
    poster_path.filter(|p| !p.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url_single_slash() {
        let base = "https://image.tmdb.org/t/p/w500";
        assert_eq!(
            poster_url(base, "/kyeqWdyUXW608qlYkRqosgbbJyK.jpg"),
            "https://image.tmdb.org/t/p/w500/kyeqWdyUXW608qlYkRqosgbbJyK.jpg"
        );
        assert_eq!(
            poster_url("https://image.tmdb.org/t/p/w500/", "poster.jpg"),
            "https://image.tmdb.org/t/p/w500/poster.jpg"
        );
    }

    #[test]
    fn test_usable_path() {
        assert_eq!(usable_path(Some("/a.jpg".to_string())), Some("/a.jpg".to_string()));
        assert_eq!(usable_path(Some("  ".to_string())), None);
        assert_eq!(usable_path(None), None);
    }
}
