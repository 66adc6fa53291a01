use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod title;

pub use title::{Title, TitleRecord};

/// A catalog title paired with its similarity to the queried title
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub title: Title,
    pub score: f32,
}

/// A single recommended title, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedTitle {
    pub title: String,
    pub movie_id: Option<u64>,
    pub score: f32,
    pub poster_url: String,
}

/// Result of one recommendation request
///
/// Built fresh per call and handed back to the caller; nothing about it is
/// retained by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub query: String,
    pub recommendations: Vec<RecommendedTitle>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    /// Recommended titles in rank order
    pub fn names(&self) -> Vec<String> {
        self.recommendations.iter().map(|r| r.title.clone()).collect()
    }

    /// Poster URLs aligned with `names()`
    pub fn posters(&self) -> Vec<String> {
        self.recommendations
            .iter()
            .map(|r| r.poster_url.clone())
            .collect()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        self.recommendations
            .into_iter()
            .map(|r| (r.title, r.poster_url))
            .unzip()
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from GET /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Search hit; only the poster is of interest here
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Response from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recommendation() -> Recommendation {
        Recommendation {
            query: "Avatar".to_string(),
            recommendations: vec![
                RecommendedTitle {
                    title: "Aliens".to_string(),
                    movie_id: Some(679),
                    score: 0.42,
                    poster_url: "https://image.tmdb.org/t/p/w500/aliens.jpg".to_string(),
                },
                RecommendedTitle {
                    title: "Titan A.E.".to_string(),
                    movie_id: None,
                    score: 0.31,
                    poster_url: "https://via.placeholder.com/500x750?text=Titan%20A.E.".to_string(),
                },
            ],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_recommendation_parts_are_aligned() {
        let recommendation = sample_recommendation();
        assert_eq!(recommendation.names(), vec!["Aliens", "Titan A.E."]);
        assert_eq!(recommendation.posters().len(), 2);

        let (names, posters) = recommendation.into_parts();
        assert_eq!(names[1], "Titan A.E.");
        assert!(posters[1].contains("Titan%20A.E."));
    }

    #[test]
    fn test_search_response_with_null_poster() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 19995, "title": "Avatar", "poster_path": null}
            ]
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, Some(19995));
        assert_eq!(response.results[0].poster_path, None);
    }

    #[test]
    fn test_search_response_missing_results() {
        let response: TmdbSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_movie_details_deserialization() {
        let json = r#"{"id": 603, "title": "The Matrix", "poster_path": "/matrix.jpg"}"#;
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.poster_path, Some("/matrix.jpg".to_string()));
    }
}
