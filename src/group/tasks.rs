//! Work handed from mutator threads to the render thread.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::FilterError;

type Task<B> = Box<dyn FnOnce(&mut B) -> Result<(), FilterError> + Send>;

/// A FIFO of closures that must run with the graphics context current.
///
/// Any thread may queue; the render thread drains the queue at the start of
/// each draw.
pub(crate) struct DeferredTasks<B> {
    queue: Mutex<VecDeque<Task<B>>>,
}

impl<B> DeferredTasks<B> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push<F>(&self, task: F)
    where
        F: FnOnce(&mut B) -> Result<(), FilterError> + Send + 'static,
    {
        self.queue.lock().push_back(Box::new(task));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs queued tasks in order, including any queued while running.
    ///
    /// Stops at the first failing task; tasks after it stay queued.
    pub fn run_pending(&self, backend: &mut B) -> Result<(), FilterError> {
        loop {
            let Some(task) = self.queue.lock().pop_front() else {
                return Ok(());
            };
            task(backend)?;
        }
    }
}
