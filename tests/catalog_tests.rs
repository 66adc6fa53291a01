use marquee_api::{db::CatalogStore, error::AppError};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn load_chunked() -> CatalogStore {
    CatalogStore::load(
        fixture("movies.json"),
        &[fixture("similarity_part1.json"), fixture("similarity_part2.json")],
    )
    .unwrap()
}

#[test]
fn test_load_concatenates_chunks_in_order() {
    let catalog = load_chunked();
    assert_eq!(catalog.len(), 7);

    let names: Vec<String> = catalog
        .neighbors("Avatar", 5)
        .unwrap()
        .into_iter()
        .map(|n| n.title.name)
        .collect();
    assert_eq!(names, vec!["Aliens", "Jaws", "Titanic", "Up", "Unobtainium Movie"]);

    // Row 6 comes from the second chunk
    let top = catalog.neighbors("Unobtainium Movie", 1).unwrap();
    assert_eq!(top[0].title.name, "Avatar");
    assert_eq!(top[0].score, 0.8);
}

#[test]
fn test_load_keeps_optional_movie_ids() {
    let catalog = load_chunked();
    assert_eq!(catalog.get("Avatar").unwrap().movie_id, Some(19995));
    assert_eq!(catalog.get("Unobtainium Movie").unwrap().movie_id, None);
    assert_eq!(catalog.get("Unobtainium Movie").unwrap().index, 6);
}

#[test]
fn test_every_title_gets_five_neighbors() {
    let catalog = load_chunked();
    for title in catalog.titles() {
        let neighbors = catalog.neighbors(&title.name, 5).unwrap();
        assert_eq!(neighbors.len(), 5);
        assert!(neighbors.iter().all(|n| n.title.index != title.index));
        assert!(neighbors.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn test_load_missing_file() {
    let err = CatalogStore::load(fixture("does_not_exist.json"), &[fixture("similarity_part1.json")])
        .unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
}

#[test]
fn test_load_malformed_matrix() {
    let err = CatalogStore::load(fixture("movies.json"), &[fixture("malformed.json")]).unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
}

#[test]
fn test_load_row_count_mismatch() {
    // Only the first chunk: 4 rows for 7 titles
    let err = CatalogStore::load(fixture("movies.json"), &[fixture("similarity_part1.json")])
        .unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
}

#[test]
fn test_load_ragged_row() {
    let err = CatalogStore::load(
        fixture("movies.json"),
        &[fixture("similarity_part1.json"), fixture("similarity_ragged.json")],
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
}

#[test]
fn test_load_without_chunks() {
    let chunks: [String; 0] = [];
    let err = CatalogStore::load(fixture("movies.json"), &chunks).unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
}

#[test]
fn test_bundled_sample_catalog_loads() {
    let root = env!("CARGO_MANIFEST_DIR");
    let catalog = CatalogStore::load(
        format!("{}/data/movies.json", root),
        &[format!("{}/data/similarity.json", root)],
    )
    .unwrap();

    assert_eq!(catalog.len(), 8);
    assert_eq!(catalog.neighbors("Aliens", 5).unwrap()[0].title.name, "Alien");
}
