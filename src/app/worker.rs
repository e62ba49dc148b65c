use anyhow::{anyhow, Context, Result};
use std::thread::{self, JoinHandle};

/// A traversal running off the calling thread; yields one result when done.
pub struct Job<T> {
    handle: JoinHandle<T>,
}

/// Runs `work` on a dedicated background thread.
pub fn spawn_traversal<F, T>(work: F) -> Result<Job<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = thread::Builder::new()
        .name("respacer-traversal".into())
        .spawn(work)
        .context("Failed to start traversal thread")?;
    Ok(Job { handle })
}

impl<T> Job<T> {
    /// Blocks until the traversal finishes.
    pub fn wait(self) -> Result<T> {
        self.handle
            .join()
            .map_err(|_| anyhow!("Traversal thread panicked"))
    }
}
