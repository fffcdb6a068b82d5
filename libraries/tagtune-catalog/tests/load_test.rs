//! Integration tests for catalog loading
//!
//! Exercises the loader against whole documents on disk.

use std::io::Write;

use serde_json::json;
use tagtune_catalog::{load_from_path, load_from_str, CatalogError, LoadWarning};
use tagtune_core::limits::{MAX_CARDS, MAX_GAMES, MAX_PENDING, MAX_POOL_TRACKS, MAX_QUESTIONS};
use tagtune_core::{AnswerRule, CardRole, MusicPlay, ParentAction, TagMode};

// ===== Helpers =====

fn answer_cards(n: usize) -> Vec<serde_json::Value> {
    (0..n)
        .map(|i| json!({ "uid": format!("{i:08x}"), "role": "answer", "tags": ["x"] }))
        .collect()
}

fn write_catalog(doc: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(doc.to_string().as_bytes()).unwrap();
    file
}

// ===== Tests =====

#[test]
fn test_full_document_from_disk() {
    let doc = json!({
        "cards": [
            { "uid": "04a1b2", "role": "music", "title": "Rain", "artist": "Band",
              "play": { "kind": "single", "file": "music/rain.mp3" } },
            { "uid": "04a1b3", "role": "music", "title": "Mix",
              "play": { "kind": "playlist", "tracks": [
                  "mix/one.mp3",
                  { "title": "Two", "file": "/mix/two.mp3" },
                  { "title": "No file" },
                  42
              ] } },
            { "uid": "c0ffee", "role": "answer", "title": "Red", "tags": ["red", "big"] },
            { "uid": "d00d", "role": "game_selector", "title": "Colors", "gameId": "colors" },
            { "uid": "beef", "role": "parent", "action": "toggle_anti_repeat" }
        ],
        "games": [{
            "id": "colors",
            "title": "Colors",
            "audio": { "intro": "/game/intro.mp3", "done": "/game/done.mp3", "musicHint": "" },
            "timing": { "answerTimeoutMs": 10000, "maxRepeat": 2 },
            "questions": [
                { "prompt": "/game/q_red.mp3",
                  "answer": { "type": "requireTags", "mode": "all", "tags": ["red", "big"], "cards": 2 } },
                { "prompt": "/game/q_sum.mp3",
                  "audio": { "correct": "/game/yay.mp3" },
                  "answer": { "type": "sum", "equals": 10, "cards": 2, "tags": ["tal"] } }
            ]
        }],
        "messages": {
            "antiRepeatWarning": "/sys/again.mp3",
            "masterCardUsed": "/sys/master.mp3"
        }
    });
    let file = write_catalog(&doc);

    let loaded = load_from_path(file.path()).unwrap();
    let catalog = &loaded.catalog;

    assert_eq!(catalog.cards().len(), 5);

    let rain = catalog.card("04A1B2").unwrap();
    assert_eq!(rain.artist.as_deref(), Some("Band"));
    assert_eq!(
        rain.role,
        CardRole::Music {
            play: MusicPlay::Single("/music/rain.mp3".into())
        }
    );

    let CardRole::Music {
        play: MusicPlay::AlbumTracks(slice),
    } = catalog.card("04a1b3").unwrap().role
    else {
        panic!("expected album tracks");
    };
    let tracks = catalog.pool().slice(slice);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].file, "/mix/one.mp3");
    assert_eq!(tracks[1].title.as_deref(), Some("Two"));

    assert_eq!(
        catalog.card("BEEF").unwrap().role,
        CardRole::Parent {
            action: ParentAction::ToggleAntiRepeat
        }
    );

    let game = catalog.game("colors").unwrap();
    assert_eq!(game.audio.intro.as_deref(), Some("/game/intro.mp3"));
    assert_eq!(game.audio.music_hint, None);
    assert_eq!(game.timing.answer_timeout_ms, 10_000);
    assert_eq!(game.timing.next_card_repeat_ms, 18_000);
    assert_eq!(game.timing.max_repeat, 2);
    assert_eq!(
        game.questions[0].rule,
        AnswerRule::RequireTags {
            mode: TagMode::All,
            tags: vec!["red".into(), "big".into()],
            cards: 2
        }
    );
    assert_eq!(
        game.questions[1].rule,
        AnswerRule::Sum {
            equals: 10,
            cards: 2,
            required_tags: vec!["tal".into()]
        }
    );
    assert_eq!(
        game.questions[1].audio.correct.as_deref(),
        Some("/game/yay.mp3")
    );

    assert_eq!(
        catalog.messages().anti_repeat_warning.as_deref(),
        Some("/sys/again.mp3")
    );
    assert_eq!(
        catalog.messages().master_card_used.as_deref(),
        Some("/sys/master.mp3")
    );
}

#[test]
fn test_card_ceiling_truncates_with_warning() {
    let loaded = load_from_str(&json!({ "cards": answer_cards(MAX_CARDS + 5) }).to_string()).unwrap();

    assert_eq!(loaded.catalog.cards().len(), MAX_CARDS);
    assert!(loaded.report.has_truncation());
    assert!(loaded.report.warnings().contains(&LoadWarning::Truncated {
        what: "cards".into(),
        limit: MAX_CARDS,
        dropped: 5
    }));
}

#[test]
fn test_game_and_question_ceilings() {
    let questions: Vec<_> = (0..MAX_QUESTIONS + 3)
        .map(|i| json!({ "prompt": format!("/q/{i}.mp3"), "answer": { "tags": ["x"] } }))
        .collect();
    let games: Vec<_> = (0..MAX_GAMES + 2)
        .map(|i| json!({ "id": format!("g{i}"), "questions": questions }))
        .collect();

    let loaded = load_from_str(&json!({ "cards": [], "games": games }).to_string()).unwrap();

    assert_eq!(loaded.catalog.games().len(), MAX_GAMES);
    for game in loaded.catalog.games() {
        assert_eq!(game.questions.len(), MAX_QUESTIONS);
    }
    assert!(loaded.report.warnings().contains(&LoadWarning::Truncated {
        what: "games".into(),
        limit: MAX_GAMES,
        dropped: 2
    }));
}

#[test]
fn test_track_pool_ceiling_spans_cards() {
    let tracks: Vec<_> = (0..400).map(|i| format!("/a/{i:03}.mp3")).collect();
    let doc = json!({
        "cards": [
            { "uid": "01", "role": "music", "play": { "kind": "album", "tracks": tracks } },
            { "uid": "02", "role": "music", "play": { "kind": "album", "tracks": tracks } }
        ]
    });

    let loaded = load_from_str(&doc.to_string()).unwrap();
    assert_eq!(loaded.catalog.pool().len(), MAX_POOL_TRACKS);

    let count = |uid: &str| match loaded.catalog.card(uid).unwrap().role {
        CardRole::Music {
            play: MusicPlay::AlbumTracks(slice),
        } => slice.count(),
        _ => 0,
    };
    assert_eq!(count("01"), 400);
    assert_eq!(count("02"), MAX_POOL_TRACKS - 400);
}

#[test]
fn test_uid_lookup_ignores_case() {
    let doc = json!({ "cards": [{ "uid": "ab12", "role": "answer", "tags": ["x"] }] });
    let loaded = load_from_str(&doc.to_string()).unwrap();

    let lower = loaded.catalog.card("ab12").unwrap();
    let upper = loaded.catalog.card("AB12").unwrap();
    assert_eq!(lower, upper);
}

#[test]
fn test_bad_entries_are_skipped_not_fatal() {
    let doc = json!({
        "cards": [
            { "uid": "", "role": "answer" },
            { "uid": "01", "role": "wizard" },
            { "uid": "02", "role": "music" },
            { "uid": "03", "role": "answer", "value": "ten" },
            { "uid": "04", "role": "answer", "tags": ["ok"] },
            { "uid": "04", "role": "answer", "tags": ["dup"] }
        ]
    });

    let loaded = load_from_str(&doc.to_string()).unwrap();
    let uids: Vec<_> = loaded.catalog.cards().iter().map(|c| c.uid.as_str()).collect();
    assert_eq!(uids, ["02", "04"]);
    assert_eq!(
        loaded.catalog.card("02").unwrap().role,
        CardRole::Music {
            play: MusicPlay::Unplayable
        }
    );
    assert!(loaded
        .report
        .warnings()
        .contains(&LoadWarning::DuplicateUid("04".into())));
    assert_eq!(loaded.report.warnings().len(), 5);
}

#[test]
fn test_cards_requirement_clamped() {
    let doc = json!({
        "cards": [],
        "games": [{ "id": "g", "questions": [
            { "prompt": "/q.mp3", "answer": { "type": "sum", "equals": 3, "cards": 9 } }
        ] }]
    });

    let loaded = load_from_str(&doc.to_string()).unwrap();
    let rule = &loaded.catalog.game("g").unwrap().questions[0].rule;
    assert_eq!(rule.cards_required(), MAX_PENDING);
    assert!(loaded
        .report
        .warnings()
        .iter()
        .any(|w| matches!(w, LoadWarning::CardsClamped { requested: 9, .. })));
}

#[test]
fn test_negative_limits_are_clamped_not_skipped() {
    let doc = json!({
        "cards": [],
        "games": [{
            "id": "g",
            "timing": { "maxRepeat": -2 },
            "questions": [
                { "prompt": "/q.mp3", "answer": { "tags": ["red"], "cards": -1 } }
            ]
        }]
    });

    let loaded = load_from_str(&doc.to_string()).unwrap();
    let game = loaded.catalog.game("g").unwrap();
    assert_eq!(game.timing.max_repeat, 1);
    assert_eq!(game.questions.len(), 1);
    assert_eq!(game.questions[0].rule.cards_required(), 1);

    let warnings = loaded.report.warnings();
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::RepeatClamped { requested: -2, used: 1, .. })));
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::CardsClamped { requested: -1, used: 1, .. })));
}

#[test]
fn test_unreadable_and_unparsable_documents() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("settings.json");
    assert!(matches!(
        load_from_path(&missing),
        Err(CatalogError::Io { .. })
    ));

    assert!(matches!(
        load_from_str("{ \"cards\": [ "),
        Err(CatalogError::Parse(_))
    ));
}
