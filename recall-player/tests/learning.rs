use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use recall_othello::bitboard::Bitboard;
use recall_othello::{Board, Color, Location};
use recall_player::{
    apply_outcome, play_game, AgentConfig, JsonFileStore, KnowledgeSnapshot, KnowledgeStore,
    MemoryConfig, MemoryEntry, MemoryStore, SharedKnowledge,
};
use std::path::PathBuf;

fn quick_config() -> AgentConfig {
    let mut config = AgentConfig::default();
    config.search.default_depth = 1;
    config.search.secondary_depth = 1;
    config.search.midgame_depth = 2;
    config.search.exact_solve_empties = 4;
    config
}

/// A distinct, parseable board for every `i`.
fn board_for(i: u64) -> Board {
    Board::from_bitboards(Bitboard::from(i + 1), Bitboard::from(0u64)).unwrap()
}

#[test]
fn eviction_keeps_the_best_entries_in_rank_order() {
    let base = Utc.timestamp_opt(1_650_000_000, 0).unwrap();
    let mut snapshot = KnowledgeSnapshot {
        memory_capacity: 100,
        ..KnowledgeSnapshot::default()
    };

    // 150 entries: confidences 1..=5, and within a confidence every
    // timestamp is distinct.
    for i in 0..150u64 {
        snapshot.memory.insert(
            board_for(i).fingerprint(),
            MemoryEntry {
                location: Location::from_index(63),
                confidence: (i % 5) as u32 + 1,
                updated_at: base + Duration::minutes(i as i64),
            },
        );
    }
    let mut expected: Vec<(u32, i64)> = (0..150u64)
        .map(|i| ((i % 5) as u32 + 1, i as i64))
        .collect();
    expected.sort_by(|a, b| b.cmp(a));
    expected.truncate(100);

    let mut store = MemoryStore::new();
    store.save(&mut snapshot, &MemoryConfig::default()).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.memory.len(), 100);
    let kept: Vec<(u32, i64)> = loaded
        .memory
        .ranked()
        .into_iter()
        .map(|(_, entry)| (entry.confidence, (entry.updated_at - base).num_minutes()))
        .collect();
    assert_eq!(kept, expected);
}

#[test]
fn replaying_a_win_strengthens_without_duplicating() {
    let config = quick_config();
    let mut rng = StdRng::seed_from_u64(12);
    let start = KnowledgeSnapshot::default();
    let record = play_game(&start, &config, &mut rng).unwrap();
    let winner = record.winner.unwrap_or(Color::Black);
    let now = Utc::now();

    let once = apply_outcome(&start, &record.history, Some(winner), winner, &config, now);
    let twice = apply_outcome(&once, &record.history, Some(winner), winner, &config, now);

    assert!(!once.memory.is_empty());
    assert_eq!(once.memory.len(), twice.memory.len());
    for (fingerprint, entry) in twice.memory.iter() {
        let before = once.memory.get(fingerprint).unwrap();
        assert_eq!(entry.confidence, before.confidence + 1);
        assert_eq!(entry.location, before.location);
    }
    assert_eq!(twice.experience, 2 * once.experience);
}

#[test]
fn training_persists_through_a_file_and_moves_between_stores() {
    let dir = std::env::temp_dir().join(format!("recall-learning-{}", std::process::id()));
    let path: PathBuf = dir.join("knowledge.json");
    let config = quick_config();
    let shared = SharedKnowledge::new(JsonFileStore::new(&path));

    let mut rng = StdRng::seed_from_u64(30);
    for _ in 0..3 {
        let snapshot = shared.snapshot().unwrap();
        let record = play_game(&snapshot, &config, &mut rng).unwrap();
        shared.record_game(&record, Color::Black, &config).unwrap();
    }

    let file_store = shared.into_inner();
    let trained = file_store.load().unwrap();
    assert_eq!(trained.total_games, 3);
    assert_eq!(trained.wins + trained.losses + trained.draws, 3);
    assert_ne!(trained.weights, KnowledgeSnapshot::default().weights);

    let mut copy = MemoryStore::new();
    copy.import(&file_store.export().unwrap()).unwrap();
    assert_eq!(copy.load().unwrap(), trained);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn legacy_documents_load_with_defaults() {
    let mut store = MemoryStore::new();
    store
        .write_raw(r#"{ "totalGames": 40, "wins": 25, "losses": 15, "experience": 300 }"#)
        .unwrap();

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.version, recall_player::SCHEMA_VERSION);
    assert_eq!(snapshot.total_games, 40);
    assert_eq!(snapshot.wins, 25);
    assert_eq!(snapshot.draws, 0);
    assert!(snapshot.memory.is_empty());
    assert_eq!(snapshot.memory_capacity, recall_player::DEFAULT_MEMORY_CAPACITY);
}
