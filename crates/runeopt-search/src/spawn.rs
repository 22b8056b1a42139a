//! Named search threads

use std::io;
use std::thread::{self, JoinHandle};

#[cfg(test)]
thread_local! {
    static REFUSED: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

/// Spawn a named thread for the search
pub(crate) fn spawn_named<F>(name: String, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    #[cfg(test)]
    {
        if REFUSED.with(|r| r.get()) {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "spawning refused"));
        }
    }
    thread::Builder::new().name(name).spawn(f)
}

/// Make every `spawn_named` on the current thread fail until reset
#[cfg(test)]
pub(crate) fn refuse_spawns(refused: bool) {
    REFUSED.with(|r| r.set(refused));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_spawn_fails() {
        refuse_spawns(true);
        let refused = spawn_named("t".to_string(), || {});
        refuse_spawns(false);
        assert_eq!(refused.unwrap_err().kind(), io::ErrorKind::WouldBlock);

        let handle = spawn_named("runeopt-test".to_string(), || {
            assert_eq!(thread::current().name(), Some("runeopt-test"));
        })
        .unwrap();
        assert!(handle.join().is_ok());
    }
}
