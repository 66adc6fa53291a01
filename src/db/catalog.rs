use std::{collections::HashMap, fs, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::{Neighbor, Title, TitleRecord},
};

/// Fixed movie catalog with its precomputed similarity matrix
///
/// Loaded once at startup and never mutated afterwards, so it can be shared
/// behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    titles: Vec<Title>,
    by_name: HashMap<String, usize>,
    similarity: Vec<Vec<f32>>,
}

impl CatalogStore {
    /// Loads the title table and the similarity matrix chunks from disk
    ///
    /// Chunks are concatenated row-wise in the order given. Any unreadable
    /// file, malformed JSON or shape mismatch is a `Load` error.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        titles_path: P,
        similarity_paths: &[Q],
    ) -> AppResult<Self> {
        let titles_path = titles_path.as_ref();
        let records: Vec<TitleRecord> = read_json(titles_path)?;

        if similarity_paths.is_empty() {
            return Err(AppError::Load(
                "No similarity matrix chunks configured".to_string(),
            ));
        }

        let mut similarity: Vec<Vec<f32>> = Vec::new();
        for path in similarity_paths {
            let chunk: Vec<Vec<f32>> = read_json(path.as_ref())?;
            tracing::debug!(
                path = %path.as_ref().display(),
                rows = chunk.len(),
                "Read similarity chunk"
            );
            similarity.extend(chunk);
        }

        let titles = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Title::new(index, record.title, record.movie_id))
            .collect();

        let store = Self::from_parts(titles, similarity)?;

        tracing::info!(
            titles = store.len(),
            chunks = similarity_paths.len(),
            source = %titles_path.display(),
            "Catalog loaded"
        );

        Ok(store)
    }

    /// Builds a catalog from in-memory data, applying the same validation as `load`
    ///
    /// Title indices are reassigned from their position in `titles`.
    pub fn from_parts(titles: Vec<Title>, similarity: Vec<Vec<f32>>) -> AppResult<Self> {
        if titles.is_empty() {
            return Err(AppError::Load("Title table is empty".to_string()));
        }

        let n = titles.len();
        if similarity.len() != n {
            return Err(AppError::Load(format!(
                "Similarity matrix has {} rows but catalog has {} titles",
                similarity.len(),
                n
            )));
        }

        if let Some((row, values)) = similarity
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != n)
        {
            return Err(AppError::Load(format!(
                "Similarity row {} has {} columns, expected {}",
                row,
                values.len(),
                n
            )));
        }

        let mut by_name = HashMap::with_capacity(n);
        let mut indexed = Vec::with_capacity(n);
        for (index, mut title) in titles.into_iter().enumerate() {
            title.index = index;
            if by_name.insert(title.name.clone(), index).is_some() {
                return Err(AppError::Load(format!(
                    "Duplicate title in catalog: {}",
                    title.name
                )));
            }
            indexed.push(title);
        }

        Ok(Self {
            titles: indexed,
            by_name,
            similarity,
        })
    }

    /// Titles most similar to `name`, best first, excluding `name` itself
    ///
    /// Scores are ordered descending; equal scores keep matrix column order.
    pub fn neighbors(&self, name: &str, k: usize) -> AppResult<Vec<Neighbor>> {
        let title = self
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("Title not in catalog: {}", name)))?;

        let mut ranked: Vec<(usize, f32)> = self.similarity[title.index]
            .iter()
            .copied()
            .enumerate()
            .collect();
        // sort_by is stable, so ties stay in column order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let neighbors = ranked
            .into_iter()
            .filter(|(index, _)| *index != title.index)
            .take(k)
            .map(|(index, score)| Neighbor {
                title: self.titles[index].clone(),
                score,
            })
            .collect();

        Ok(neighbors)
    }

    pub fn get(&self, name: &str) -> Option<&Title> {
        self.by_name.get(name).map(|&index| &self.titles[index])
    }

    /// All titles in row order
    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    /// Case-insensitive substring match over title names, in row order
    pub fn search(&self, query: &str) -> Vec<&Title> {
        let needle = query.trim().to_lowercase();
        self.titles
            .iter()
            .filter(|t| needle.is_empty() || t.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Load(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Load(format!("Malformed JSON in {}: {}", path.display(), e)))
}
