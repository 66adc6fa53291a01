use serde::{Deserialize, Serialize};

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    /// Row of this title in the similarity matrix
    pub index: usize,
    /// Display name, unique within the catalog
    pub name: String,
    /// TMDB movie id, when the catalog carries one
    pub movie_id: Option<u64>,
}

impl Title {
    pub fn new(index: usize, name: impl Into<String>, movie_id: Option<u64>) -> Self {
        Self {
            index,
            name: name.into(),
            movie_id,
        }
    }
}

/// One row of the on-disk title table
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRecord {
    pub title: String,
    #[serde(default)]
    pub movie_id: Option<u64>,
}
