// src/pipeline/field.rs

//! Exact field equality matching.

use crate::error::Result;
use crate::models::{Capture, FieldMatch, NegativeFilter};
use crate::pipeline::matcher::{EvalContext, Exclusions, fold};

/// Matches records whose named field equals a target value.
#[derive(Debug, Clone)]
pub struct FieldMatcher<'c> {
    field: &'c str,
    target: String,
    exclusions: Exclusions,
    case_sensitive: bool,
}

impl<'c> FieldMatcher<'c> {
    pub fn new(wanted: &'c FieldMatch, negative: &NegativeFilter, case_sensitive: bool) -> Self {
        Self {
            field: wanted.field.as_str(),
            target: fold(&wanted.value, case_sensitive).into_owned(),
            exclusions: Exclusions::new(negative, case_sensitive),
            case_sensitive,
        }
    }

    /// Evaluate one record, counting a hit in `ctx`.
    ///
    /// Fails if the record lacks the field, or lacks its URL while exclusion
    /// terms are configured.
    pub fn evaluate(&self, capture: &Capture<'_>, ctx: &mut EvalContext) -> Result<bool> {
        if self.exclusions.is_empty() {
            self.exclusions.pass(ctx);
        } else if self.exclusions.screen(capture.url()?, ctx) {
            return Ok(false);
        }

        let value = capture.field(self.field)?;
        let matched = fold(value, self.case_sensitive) == self.target.as_str();
        if matched {
            ctx.record_hit(self.field);
        }
        Ok(matched)
    }
}
