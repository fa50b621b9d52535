use search_core::persist::{load_index_lines, load_meta, IndexPaths};
use search_core::{index_collection, Error, IdfRounding, Indexer, IndexerConfig, Searcher, StemmerKind};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

/// Collection dir, output dir and an empty stopword list under one temp root.
fn scaffold(root: &Path) -> IndexerConfig {
    let collection = root.join("collection");
    fs::create_dir_all(&collection).unwrap();
    let stopwords = root.join("stopwords.txt");
    fs::write(&stopwords, "").unwrap();
    IndexerConfig::new(collection, root.join("index"), stopwords)
}

#[test]
fn two_document_collection_produces_expected_lines() {
    let root = tempdir().unwrap();
    let config = scaffold(root.path());
    write(&config.collection, "doc1.txt", "cat dog cat");
    write(&config.collection, "doc2.txt", "dog bird");

    let summary = index_collection(&config).unwrap();
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.terms, 3);
    assert_eq!(summary.skipped, 0);

    let lines = load_index_lines(&IndexPaths::new(&config.output)).unwrap();
    assert_eq!(lines, vec!["bird,doc2,1,0.000", "cat,doc1,2,0.000", "dog,doc1,1,doc2,1,-0.405"]);

    let meta = load_meta(&IndexPaths::new(&config.output)).unwrap().unwrap();
    assert_eq!(meta.num_docs, 2);
    assert_eq!(meta.stemmer, StemmerKind::Porter);

    // "cat" occurs in one of two documents, so ln(2 / 2) leaves it no weight.
    let searcher = Searcher::load(&lines).unwrap();
    let ranking = searcher.rank(&searcher.create_query_vector(&["cat"]), 10);
    assert!(ranking.is_empty());
}

#[test]
fn rare_term_ranks_its_document_first() {
    let root = tempdir().unwrap();
    let config = scaffold(root.path());
    write(&config.collection, "doc1.txt", "cat dog cat");
    write(&config.collection, "doc2.txt", "dog bird");
    write(&config.collection, "doc3.txt", "fish dog");
    write(&config.collection, "doc4.txt", "fish bird");
    index_collection(&config).unwrap();

    let (searcher, meta) = Searcher::open(&config.output).unwrap();
    assert!(meta.is_some());
    let ranking = searcher.rank(&searcher.create_query_vector(&["cat"]), 10);
    assert_eq!(ranking.hits.len(), 1);
    assert_eq!(ranking.hits[0].document, "doc1");
    assert!(ranking.hits[0].score > 0.0);
    assert!(ranking.is_partial());
}

#[test]
fn postings_sum_to_surviving_token_count() {
    let root = tempdir().unwrap();
    let config = scaffold(root.path());
    fs::write(&config.stopwords, "the\nof\n").unwrap();
    let text = "The Quick Brown fox jumps over the 'lazy dog' near\nhttp://example.com/x, of course. Connect-\ned nodes!";
    write(&config.collection, "story.txt", text);

    let indexer = Indexer::new(&config.stopwords, None, &config.analyzer).unwrap();
    let terms = indexer.tokenise_document(&config.collection.join("story.txt")).unwrap();

    index_collection(&config).unwrap();
    let searcher = Searcher::open(&config.output).unwrap().0;
    let lines = load_index_lines(&IndexPaths::new(&config.output)).unwrap();
    let recorded: u32 = lines
        .iter()
        .map(|l| search_core::IndexEntry::parse(l, 0).unwrap())
        .flat_map(|e| e.postings)
        .filter(|p| p.doc == "story")
        .map(|p| p.tf)
        .sum();
    assert_eq!(recorded as usize, terms.len());
    assert!(searcher.vocabulary().any(|t| t == "the quick brown"));
    assert!(searcher.vocabulary().any(|t| t == "lazy dog"));
    assert!(searcher.vocabulary().any(|t| t == "connect"));
}

#[test]
fn round_trip_vectors_match_vocabulary() {
    let root = tempdir().unwrap();
    let config = scaffold(root.path());
    write(&config.collection, "a.txt", "information retrieval systems retrieve information");
    write(&config.collection, "b.txt", "vector space models rank documents");
    write(&config.collection, "c.txt", "relevance feedback refines the query vector");
    index_collection(&config).unwrap();

    let lines = load_index_lines(&IndexPaths::new(&config.output)).unwrap();
    let searcher = Searcher::load(&lines).unwrap();
    assert_eq!(searcher.dimension(), lines.len());
    assert_eq!(searcher.documents().len(), 3);
    for doc in searcher.documents() {
        assert_eq!(searcher.document_vector(doc).unwrap().len(), lines.len());
    }
}

#[test]
fn localisation_and_stopwords_apply_to_documents() {
    let root = tempdir().unwrap();
    let mut config = scaffold(root.path());
    fs::write(&config.stopwords, "and\n").unwrap();
    let table = root.path().join("localisation.txt");
    fs::write(&table, "colour\nflavour\ncolor\nflavor\n").unwrap();
    config.localisation = Some(table);
    write(&config.collection, "d.txt", "colour and flavour, Colour");
    index_collection(&config).unwrap();

    let lines = load_index_lines(&IndexPaths::new(&config.output)).unwrap();
    let terms: Vec<&str> = lines.iter().map(|l| l.split(',').next().unwrap()).collect();
    // "Colour" is not a table key and is only lowercased.
    assert_eq!(terms, vec!["color", "colour", "flavor"]);
}

#[test]
fn unreadable_document_is_skipped() {
    let root = tempdir().unwrap();
    let config = scaffold(root.path());
    write(&config.collection, "good.txt", "readable words here");
    fs::write(config.collection.join("bad.bin"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let summary = index_collection(&config).unwrap();
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn parallel_indexing_matches_sequential() {
    let root = tempdir().unwrap();
    let mut config = scaffold(root.path());
    for i in 0..9 {
        write(&config.collection, &format!("d{i}.txt"), &format!("shared term{i} words{} shared", i % 3));
    }
    index_collection(&config).unwrap();
    let sequential = load_index_lines(&IndexPaths::new(&config.output)).unwrap();

    config.jobs = 4;
    config.output = root.path().join("index-parallel");
    index_collection(&config).unwrap();
    let parallel = load_index_lines(&IndexPaths::new(&config.output)).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn nearest_rounding_is_configurable() {
    let root = tempdir().unwrap();
    let mut config = scaffold(root.path());
    config.idf_rounding = IdfRounding::Nearest;
    for name in ["a", "b", "c", "d", "e", "f", "g"] {
        write(&config.collection, &format!("{name}.txt"), "common");
    }
    write(&config.collection, "h.txt", "rare");
    index_collection(&config).unwrap();
    let lines = load_index_lines(&IndexPaths::new(&config.output)).unwrap();
    // ln(8 / 2) = 1.38629...
    assert!(lines.contains(&"rare,h,1,1.386".to_string()));
}

#[test]
fn fatal_errors_are_distinct() {
    let root = tempdir().unwrap();
    let mut config = scaffold(root.path());
    assert!(matches!(index_collection(&config), Err(Error::EmptyCollection { .. })));

    write(&config.collection, "a.txt", "text");
    config.stopwords = root.path().join("missing.txt");
    assert!(matches!(index_collection(&config), Err(Error::MissingStopwords { .. })));

    assert!(matches!(Searcher::open(&root.path().join("nowhere")), Err(Error::MissingIndex { .. })));
}
