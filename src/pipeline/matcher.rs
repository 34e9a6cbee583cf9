// src/pipeline/matcher.rs

//! Substring matching of capture URLs against a criteria set.
//!
//! Every (category, term) pair is tried; the sweep does not stop at the first
//! hit, so a URL containing two terms yields two match events. The negative
//! filter is checked once per record before any positive term, and a hit
//! vetoes the whole record.

use std::borrow::Cow;

use crate::models::{CriteriaSet, NegativeFilter};
use crate::pipeline::report::Counters;

/// Lowercase `text` unless comparisons are case-sensitive.
pub fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

/// One confirmed (category, term) hit for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEvent<'c> {
    pub category: &'c str,
    pub term: &'c str,
}

/// Per-run evaluation state threaded through the matchers.
#[derive(Debug, Clone)]
pub struct EvalContext {
    counters: Counters,
    suppressed: bool,
    records_evaluated: usize,
    records_excluded: usize,
}

impl EvalContext {
    pub fn new(counters: Counters) -> Self {
        Self {
            counters,
            suppressed: false,
            records_evaluated: 0,
            records_excluded: 0,
        }
    }

    fn begin_record(&mut self) {
        self.suppressed = false;
        self.records_evaluated += 1;
    }

    fn suppress(&mut self) {
        self.suppressed = true;
        self.records_excluded += 1;
    }

    pub(crate) fn record_hit(&mut self, category: &str) {
        self.counters.increment(category);
    }

    /// Whether the last evaluated record was vetoed.
    pub fn suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn records_evaluated(&self) -> usize {
        self.records_evaluated
    }

    pub fn records_excluded(&self) -> usize {
        self.records_excluded
    }

    pub fn into_counters(self) -> Counters {
        self.counters
    }
}

/// Exclusion terms folded the same way as the candidate.
#[derive(Debug, Clone)]
pub(crate) struct Exclusions {
    terms: Vec<String>,
    case_sensitive: bool,
}

impl Exclusions {
    pub(crate) fn new(filter: &NegativeFilter, case_sensitive: bool) -> Self {
        Self {
            terms: filter
                .terms()
                .iter()
                .map(|t| fold(t, case_sensitive).into_owned())
                .collect(),
            case_sensitive,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Start a record: reset the flag and veto it if any term occurs in `url`.
    ///
    /// Returns `true` when the record is vetoed.
    pub(crate) fn screen(&self, url: &str, ctx: &mut EvalContext) -> bool {
        ctx.begin_record();
        if self.terms.is_empty() {
            return false;
        }
        let candidate = fold(url, self.case_sensitive);
        if self.terms.iter().any(|t| candidate.contains(t.as_str())) {
            ctx.suppress();
            return true;
        }
        false
    }

    /// Start a record that has no URL to screen.
    pub(crate) fn pass(&self, ctx: &mut EvalContext) {
        ctx.begin_record();
    }
}

#[derive(Debug, Clone)]
struct Term<'c> {
    category: &'c str,
    original: &'c str,
    folded: String,
}

/// Matches capture URLs against every term of a criteria set.
#[derive(Debug, Clone)]
pub struct Matcher<'c> {
    terms: Vec<Term<'c>>,
    exclusions: Exclusions,
    case_sensitive: bool,
}

impl<'c> Matcher<'c> {
    pub fn new(
        criteria: &'c CriteriaSet,
        negative: &NegativeFilter,
        case_sensitive: bool,
    ) -> Self {
        let terms = criteria
            .categories()
            .iter()
            .flat_map(|category| {
                category.terms.iter().map(move |term| Term {
                    category: category.key.as_str(),
                    original: term.as_str(),
                    folded: fold(term, case_sensitive).into_owned(),
                })
            })
            .collect();

        Self {
            terms,
            exclusions: Exclusions::new(negative, case_sensitive),
            case_sensitive,
        }
    }

    /// Evaluate one URL, counting every hit in `ctx`.
    pub fn evaluate(&self, url: &str, ctx: &mut EvalContext) -> Vec<MatchEvent<'c>> {
        if self.exclusions.screen(url, ctx) {
            return Vec::new();
        }

        let candidate = fold(url, self.case_sensitive);
        let events: Vec<MatchEvent<'c>> = self
            .terms
            .iter()
            .filter(|term| candidate.contains(term.folded.as_str()))
            .map(|term| MatchEvent {
                category: term.category,
                term: term.original,
            })
            .collect();

        for event in &events {
            ctx.record_hit(event.category);
        }
        events
    }
}
