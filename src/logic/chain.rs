//! Ordered source chains
//!
//! A chain is a list of named lookup attempts for one capability. Attempts
//! run strictly in order, the first `Some` wins, and nothing is retried.
//! Attempts after the winner are never invoked.

/// The winning attempt of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainHit<T> {
    /// Name of the attempt that produced the value
    pub source: String,
    pub value: T,
}

type Attempt<'a, T> = Box<dyn FnOnce() -> Option<T> + 'a>;

/// Named lookup attempts for one capability, evaluated lazily.
pub struct SourceChain<'a, T> {
    capability: &'static str,
    attempts: Vec<(String, Attempt<'a, T>)>,
}

impl<'a, T> SourceChain<'a, T> {
    pub fn new(capability: &'static str) -> Self {
        Self {
            capability,
            attempts: Vec::new(),
        }
    }

    /// Append an attempt. `lookup` returns `None` for "no value here".
    pub fn attempt(
        mut self,
        source: impl Into<String>,
        lookup: impl FnOnce() -> Option<T> + 'a,
    ) -> Self {
        self.attempts.push((source.into(), Box::new(lookup)));
        self
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Run attempts in order until one yields a value.
    pub fn evaluate(self) -> Option<ChainHit<T>> {
        let capability = self.capability;
        for (source, lookup) in self.attempts {
            tracing::debug!("{}: trying {}", capability, source);
            if let Some(value) = lookup() {
                tracing::debug!("{}: resolved from {}", capability, source);
                return Some(ChainHit { source, value });
            }
        }
        tracing::debug!("{}: chain exhausted", capability);
        None
    }
}

impl<'a> SourceChain<'a, String> {
    /// Same as [`evaluate`](Self::evaluate), treating empty strings as misses.
    pub fn first_non_empty(self) -> Option<ChainHit<String>> {
        let capability = self.capability;
        let attempts = self
            .attempts
            .into_iter()
            .map(|(source, lookup)| {
                let filtered: Attempt<'a, String> =
                    Box::new(move || lookup().filter(|value| !value.is_empty()));
                (source, filtered)
            })
            .collect();
        SourceChain { capability, attempts }.evaluate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_first_hit_wins_and_later_attempts_are_skipped() {
        let calls = Cell::new(0);
        let hit = SourceChain::new("test")
            .attempt("a", || {
                calls.set(calls.get() + 1);
                None
            })
            .attempt("b", || {
                calls.set(calls.get() + 1);
                Some(2)
            })
            .attempt("c", || {
                calls.set(calls.get() + 1);
                Some(3)
            })
            .evaluate()
            .unwrap();

        assert_eq!(hit.source, "b");
        assert_eq!(hit.value, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_exhausted_chain() {
        let chain: SourceChain<'_, u32> = SourceChain::new("test").attempt("a", || None);
        assert_eq!(chain.len(), 1);
        assert!(chain.evaluate().is_none());
        assert!(SourceChain::<u32>::new("empty").is_empty());
    }

    #[test]
    fn test_first_non_empty_skips_empty_strings() {
        let hit = SourceChain::new("test")
            .attempt("empty", || Some(String::new()))
            .attempt("set", || Some("kona".to_string()))
            .first_non_empty()
            .unwrap();
        assert_eq!(hit.source, "set");
        assert_eq!(hit.value, "kona");
    }
}
