//! Property-based tests for playlist navigation and the anti-repeat gate
//!
//! Uses proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use tagtune_playback::{ActivePlaylist, AntiRepeatGate, GateDecision};

// ===== Helpers =====

#[derive(Debug, Clone, Copy)]
enum Nav {
    Next,
    Prev,
    End,
}

fn arbitrary_nav() -> impl Strategy<Value = Nav> {
    prop_oneof![Just(Nav::Next), Just(Nav::Prev), Just(Nav::End)]
}

fn playlist_of(len: usize, start: usize) -> ActivePlaylist {
    let mut playlist = ActivePlaylist::default();
    playlist.set_tracks((0..len).map(|i| format!("/t/{i:03}.mp3")).collect(), start, true);
    playlist
}

// ===== Property Tests =====

proptest! {
    /// Property: the cursor always stays inside the playlist and the returned
    /// path is the one under the cursor
    #[test]
    fn cursor_stays_in_bounds(
        len in 1usize..40,
        start in 0usize..40,
        ops in prop::collection::vec(arbitrary_nav(), 0..100)
    ) {
        let mut playlist = playlist_of(len, start);

        for op in ops {
            let played = match op {
                Nav::Next => playlist.next(),
                Nav::Prev => playlist.prev(),
                Nav::End => {
                    playlist.mark_ended();
                    None
                }
            };

            let index = playlist.index().expect("non-empty playlist has a cursor");
            prop_assert!(index < len);
            if let Some(path) = played {
                prop_assert_eq!(Some(path.as_str()), playlist.current());
            }
        }
    }

    /// Property: next from the last index yields 0, prev from 0 yields the last
    #[test]
    fn navigation_wraps(len in 1usize..40) {
        let mut playlist = playlist_of(len, len - 1);
        playlist.next();
        prop_assert_eq!(playlist.index(), Some(0));

        playlist.prev();
        prop_assert_eq!(playlist.index(), Some(len - 1));
    }

    /// Property: len nexts bring the cursor back where it started
    #[test]
    fn full_cycle_returns_home(len in 1usize..40, start in 0usize..40) {
        let mut playlist = playlist_of(len, start);
        let home = playlist.index();
        for _ in 0..len {
            playlist.next();
        }
        prop_assert_eq!(playlist.index(), home);
    }

    /// Property: with the gate on, no path is ever allowed three times in a row
    #[test]
    fn gate_never_allows_three_in_a_row(
        starts in prop::collection::vec(0u8..3, 0..60)
    ) {
        let mut gate = AntiRepeatGate::new(true);
        let mut last: Option<u8> = None;
        let mut run = 0;

        for s in starts {
            let path = format!("/p/{s}.mp3");
            if gate.check(&path) == GateDecision::Allow {
                run = if last == Some(s) { run + 1 } else { 1 };
                last = Some(s);
                prop_assert!(run <= 2, "path {} allowed {} times in a row", s, run);
            } else {
                prop_assert_eq!(last, Some(s));
            }
        }
    }
}

#[test]
fn empty_playlist_navigation_is_noop() {
    let mut playlist = ActivePlaylist::default();
    assert_eq!(playlist.next(), None);
    assert_eq!(playlist.prev(), None);
    assert_eq!(playlist.restart(), None);
    assert!(playlist.is_empty());
}
