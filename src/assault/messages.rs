use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Keeps the first few messages as samples and counts the rest, so a long run does not grow without bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages<M> {
    samples: Vec<M>,
    total: usize,
}
impl<M> Default for Messages<M> {
    fn default() -> Self {
        // derive(Default) do not implement Default when T are not implement Default
        // https://github.com/rust-lang/rust/issues/26925
        Self { samples: Vec::new(), total: 0 }
    }
}
impl<M: Display> Display for Messages<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.samples.len();
        for (i, message) in self.samples.iter().enumerate() {
            if i < m - 1 {
                writeln!(f, "{}", message)?;
            } else {
                write!(f, "{}", message)?;
            }
        }
        if self.total > m {
            writeln!(f)?;
            write!(f, "... and {} more", self.total - m)?;
        }
        Ok(())
    }
}
impl<M> FromIterator<M> for Messages<M> {
    fn from_iter<T: IntoIterator<Item = M>>(iter: T) -> Self {
        let mut messages = Self::new();
        messages.extend(iter);
        messages
    }
}
impl<M> Extend<M> for Messages<M> {
    fn extend<T: IntoIterator<Item = M>>(&mut self, iter: T) {
        iter.into_iter().for_each(|m| self.push(m))
    }
}

impl<M> Messages<M> {
    pub const SAMPLES: usize = 3;

    pub fn new() -> Self {
        Default::default()
    }

    pub fn samples(&self) -> &[M] {
        &self.samples
    }
    pub fn total(&self) -> usize {
        self.total
    }
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn push(&mut self, message: M) {
        if self.samples.len() < Self::SAMPLES {
            self.samples.push(message);
        }
        self.total += 1;
    }
    pub fn push_unwrap<T>(&mut self, message: Result<T, M>) -> Option<T> {
        match message {
            Ok(t) => Some(t),
            Err(m) => {
                self.push(m);
                None
            }
        }
    }

    pub fn merge(&mut self, other: Self) {
        let Self { samples, total } = other;
        let dropped = total - samples.len();
        self.extend(samples);
        self.total += dropped;
    }
}
