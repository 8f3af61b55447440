//! Job queue shared by the workers of one run.
//!
//! An ordered list plus a cursor behind a mutex. `try_pop` is the only
//! coordination point between workers: the critical section compares and
//! advances the cursor and nothing else.

use std::sync::{Mutex, PoisonError};

use crate::job::Job;

pub struct JobQueue {
    jobs: Vec<Job>,
    cursor: Mutex<usize>,
}

impl JobQueue {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            cursor: Mutex::new(0),
        }
    }

    /// Claim the next unclaimed job with its queue index, or `None` once the
    /// queue is exhausted. Each index is returned at most once.
    pub fn try_pop(&self) -> Option<(usize, &Job)> {
        let index = {
            let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
            if *cursor >= self.jobs.len() {
                return None;
            }
            let index = *cursor;
            *cursor += 1;
            index
        };
        Some((index, &self.jobs[index]))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs not yet claimed.
    pub fn remaining(&self) -> usize {
        let cursor = *self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        self.jobs.len().saturating_sub(cursor)
    }

    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }
}
