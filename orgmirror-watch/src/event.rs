//! Filesystem notifications as seen by the move detector.
//!
//! Backends report renames differently: inotify sends `From`, `To` and then
//! a paired `Both`; Windows sends `From` and `To` only; FSEvents sends one
//! single-path `Any` per side. [`RenamePairer`] folds all of these into one
//! move per rename.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

/// How long a rename half waits for its counterpart.
pub const RENAME_PAIR_WINDOW: Duration = Duration::from_secs(1);

/// One filesystem notification under the watched base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsNotification {
    DirectoryMoved { from: PathBuf, to: PathBuf },
    FileMoved { from: PathBuf, to: PathBuf },
    /// Creations, content changes, half-paired renames.
    Other,
}

impl FsNotification {
    /// Convert a raw `notify` event.
    ///
    /// Only rename events carrying both paths become moves; the destination
    /// decides between directory and file since the source no longer exists.
    pub fn from_event(event: &Event) -> Self {
        let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind else {
            return FsNotification::Other;
        };
        let [from, to] = event.paths.as_slice() else {
            return FsNotification::Other;
        };
        FsNotification::moved(from, to)
    }

    fn moved(from: &Path, to: &Path) -> Self {
        let (from, to) = (from.to_path_buf(), to.to_path_buf());
        if to.is_dir() {
            FsNotification::DirectoryMoved { from, to }
        } else {
            FsNotification::FileMoved { from, to }
        }
    }
}

// ---------------------------------------------------------------------------
// Rename pairing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    From,
    To,
}

#[derive(Debug)]
struct Half {
    side: Side,
    path: PathBuf,
    tracker: Option<usize>,
    seen_at: Instant,
}

/// Stateful converter that joins single-path rename halves into moves.
#[derive(Debug)]
pub struct RenamePairer {
    window: Duration,
    pending: VecDeque<Half>,
    /// Pairs already reported, so a trailing `Both` is not reported twice.
    reported: VecDeque<(PathBuf, PathBuf, Instant)>,
}

impl Default for RenamePairer {
    fn default() -> Self {
        Self::new(RENAME_PAIR_WINDOW)
    }
}

impl RenamePairer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: VecDeque::new(),
            reported: VecDeque::new(),
        }
    }

    /// Feed one raw event; returns a notification once a move is complete.
    pub fn feed(&mut self, event: &Event, now: Instant) -> FsNotification {
        self.expire(now);

        let EventKind::Modify(ModifyKind::Name(mode)) = event.kind else {
            return FsNotification::Other;
        };
        match (mode, event.paths.as_slice()) {
            (RenameMode::Both, [from, to]) => {
                self.pending.retain(|h| h.path != *from && h.path != *to);
                let already = self
                    .reported
                    .iter()
                    .position(|(f, t, _)| f == from && t == to);
                if let Some(index) = already {
                    self.reported.remove(index);
                    return FsNotification::Other;
                }
                FsNotification::moved(from, to)
            }
            (RenameMode::From, [path]) => self.half(Side::From, path, event.tracker(), now),
            (RenameMode::To, [path]) => self.half(Side::To, path, event.tracker(), now),
            // FSEvents cannot tell the sides apart; the old path is gone.
            (RenameMode::Any | RenameMode::Other, [path]) => {
                let side = if path.exists() { Side::To } else { Side::From };
                self.half(side, path, event.tracker(), now)
            }
            _ => FsNotification::Other,
        }
    }

    /// Halves waiting for a counterpart.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn half(
        &mut self,
        side: Side,
        path: &Path,
        tracker: Option<usize>,
        now: Instant,
    ) -> FsNotification {
        let counterpart = self.pending.iter().position(|h| {
            h.side != side
                && h.path != path
                && match (h.tracker, tracker) {
                    (Some(a), Some(b)) => a == b,
                    _ => true,
                }
        });
        let Some(index) = counterpart else {
            self.pending.push_back(Half {
                side,
                path: path.to_path_buf(),
                tracker,
                seen_at: now,
            });
            return FsNotification::Other;
        };

        let other = self.pending.remove(index).map(|h| h.path);
        let Some(other) = other else {
            return FsNotification::Other;
        };
        let (from, to) = match side {
            Side::To => (other, path.to_path_buf()),
            Side::From => (path.to_path_buf(), other),
        };
        self.reported.push_back((from.clone(), to.clone(), now));
        FsNotification::moved(&from, &to)
    }

    fn expire(&mut self, now: Instant) {
        let window = self.window;
        self.pending
            .retain(|h| now.saturating_duration_since(h.seen_at) <= window);
        self.reported
            .retain(|(_, _, at)| now.saturating_duration_since(*at) <= window);
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, ModifyKind, RenameMode};
    use tempfile::TempDir;

    use super::*;

    fn rename_both(from: PathBuf, to: PathBuf) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(from)
            .add_path(to)
    }

    #[test]
    fn directory_rename_becomes_directory_moved() {
        let base = TempDir::new().expect("base");
        let to = base.path().join("other/web");
        std::fs::create_dir_all(&to).expect("mkdir");
        let from = base.path().join("acme/web");

        let notification = FsNotification::from_event(&rename_both(from.clone(), to.clone()));
        assert_eq!(notification, FsNotification::DirectoryMoved { from, to });
    }

    #[test]
    fn file_rename_becomes_file_moved() {
        let base = TempDir::new().expect("base");
        let to = base.path().join("notes.txt");
        std::fs::write(&to, "x").expect("write");
        let from = base.path().join("old.txt");

        let notification = FsNotification::from_event(&rename_both(from, to));
        assert!(matches!(notification, FsNotification::FileMoved { .. }));
    }

    #[test]
    fn non_rename_events_are_other() {
        let event = Event::new(EventKind::Create(CreateKind::Folder)).add_path("/base/acme/web".into());
        assert_eq!(FsNotification::from_event(&event), FsNotification::Other);

        let half = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path("/base/acme/web".into());
        assert_eq!(FsNotification::from_event(&half), FsNotification::Other);
    }

    fn half(mode: RenameMode, path: &Path) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Name(mode))).add_path(path.to_path_buf())
    }

    fn moved_repo() -> (TempDir, PathBuf, PathBuf) {
        let base = TempDir::new().expect("base");
        let to = base.path().join("other/svc");
        std::fs::create_dir_all(&to).expect("mkdir");
        let from = base.path().join("acme/svc");
        (base, from, to)
    }

    #[test]
    fn from_then_to_pairs_into_one_directory_move() {
        let (_base, from, to) = moved_repo();
        let mut pairer = RenamePairer::default();
        let now = Instant::now();

        assert_eq!(pairer.feed(&half(RenameMode::From, &from), now), FsNotification::Other);
        assert_eq!(
            pairer.feed(&half(RenameMode::To, &to), now),
            FsNotification::DirectoryMoved { from, to }
        );
        assert_eq!(pairer.pending_len(), 0);
    }

    #[test]
    fn trailing_both_after_a_pair_is_not_reported_twice() {
        let (_base, from, to) = moved_repo();
        let mut pairer = RenamePairer::default();
        let now = Instant::now();

        let events = [
            half(RenameMode::From, &from).set_tracker(7),
            half(RenameMode::To, &to).set_tracker(7),
            rename_both(from.clone(), to.clone()).set_tracker(7),
        ];
        let moves: Vec<FsNotification> = events
            .iter()
            .map(|e| pairer.feed(e, now))
            .filter(|n| *n != FsNotification::Other)
            .collect();
        assert_eq!(moves, [FsNotification::DirectoryMoved { from, to }]);
    }

    #[test]
    fn single_path_any_halves_pair_by_existence() {
        let (_base, from, to) = moved_repo();
        let mut pairer = RenamePairer::default();
        let now = Instant::now();

        // FSEvents may report either side first.
        assert_eq!(pairer.feed(&half(RenameMode::Any, &to), now), FsNotification::Other);
        assert_eq!(
            pairer.feed(&half(RenameMode::Any, &from), now),
            FsNotification::DirectoryMoved { from, to }
        );
    }

    #[test]
    fn mismatched_trackers_do_not_pair() {
        let (_base, from, to) = moved_repo();
        let mut pairer = RenamePairer::default();
        let now = Instant::now();

        pairer.feed(&half(RenameMode::From, &from).set_tracker(1), now);
        assert_eq!(
            pairer.feed(&half(RenameMode::To, &to).set_tracker(2), now),
            FsNotification::Other
        );
        assert_eq!(pairer.pending_len(), 2);
    }

    #[test]
    fn unpaired_half_expires_after_the_window() {
        let (_base, from, to) = moved_repo();
        let mut pairer = RenamePairer::default();
        let start = Instant::now();

        pairer.feed(&half(RenameMode::From, &from), start);
        let later = start + RENAME_PAIR_WINDOW + Duration::from_millis(1);
        assert_eq!(pairer.feed(&half(RenameMode::To, &to), later), FsNotification::Other);
        assert_eq!(pairer.pending_len(), 1, "only the fresh half is kept");
    }
}
