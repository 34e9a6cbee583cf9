// src/pipeline/scan.rs

//! Scan pipeline: match every record and emit the hits.

use std::io::Write;

use chrono::Utc;

use crate::error::Result;
use crate::models::{CriteriaSet, FieldMatch, NegativeFilter, RecordStore, ScanPlan};
use crate::pipeline::criteria::{self, Criteria};
use crate::pipeline::field::FieldMatcher;
use crate::pipeline::matcher::{EvalContext, Matcher};
use crate::pipeline::report::{Counters, ScanReport};
use crate::storage::{
    HtmlListSink, JsonArraySink, LinkSink, OutputSet, PlainListSink, prepare_outputs,
};
use crate::utils::url::UrlNormalizer;

/// Run a scan over `store`.
///
/// Matched URLs (or whole records in field mode) are echoed to `echo` unless
/// the plan is quiet. Records are processed strictly in order; the first
/// missing field aborts the run.
pub fn run_scan<W: Write>(
    plan: &ScanPlan,
    store: &RecordStore,
    echo: &mut W,
) -> Result<ScanReport> {
    let started_at = Utc::now();
    plan.validate()?;

    let criteria = criteria::build(&plan.criteria)?;
    let negative = NegativeFilter::new(plan.exclude_terms.clone());
    if !negative.is_empty() {
        log::info!("Excluding URLs containing: {}", negative.terms().join(", "));
    }

    prepare_outputs(&plan.outputs, plan.force)?;

    log::info!(
        "Scanning {} records ({} mode, case {})",
        store.len(),
        plan.mode(),
        if plan.case_sensitive { "sensitive" } else { "insensitive" }
    );

    let ctx = match &criteria {
        Criteria::Terms(set) => scan_terms(plan, store, set, &negative, echo)?,
        Criteria::Field(wanted) => scan_field(plan, store, wanted, &negative, echo)?,
    };

    let report = ScanReport {
        mode: plan.mode(),
        case_sensitive: plan.case_sensitive,
        records_scanned: ctx.records_evaluated(),
        records_excluded: ctx.records_excluded(),
        counts: ctx.into_counters(),
        started_at,
        finished_at: Utc::now(),
        outputs: plan.outputs.clone(),
    };

    log::info!(
        "Matched {} of {} records in {:.3}s",
        report.total(),
        report.records_scanned,
        report.elapsed_secs()
    );

    Ok(report)
}

fn link_outputs(plan: &ScanPlan) -> OutputSet {
    let mut outputs = OutputSet::new();
    if let Some(path) = &plan.outputs.plain_list {
        outputs.push(Box::new(PlainListSink::new(path)));
    }
    if let Some(path) = &plan.outputs.html_list {
        outputs.push(Box::new(HtmlListSink::new(path, plan.html_title.as_str())));
    }
    if let Some(path) = &plan.outputs.json_array {
        outputs.push(Box::new(JsonArraySink::new(path)));
    }
    outputs
}

fn scan_terms<W: Write>(
    plan: &ScanPlan,
    store: &RecordStore,
    set: &CriteriaSet,
    negative: &NegativeFilter,
    echo: &mut W,
) -> Result<EvalContext> {
    let matcher = Matcher::new(set, negative, plan.case_sensitive);
    let normalizer = UrlNormalizer::new(plan.archive_base.as_str(), plan.url_policy);
    let mut ctx = EvalContext::new(Counters::for_criteria(set));

    let mut outputs = link_outputs(plan);
    outputs.begin()?;

    for capture in store.captures() {
        let url = capture.url()?;
        let timestamp = capture.timestamp()?;

        let events = matcher.evaluate(url, &mut ctx);
        if events.is_empty() {
            continue;
        }

        let link = normalizer.normalize(url, timestamp)?;
        for event in &events {
            log::debug!(
                "Record {} matched '{}' in {}",
                capture.index,
                event.term,
                event.category
            );
            if !plan.quiet {
                writeln!(echo, "{url}")?;
            }
            outputs.write(&link, capture.record)?;
        }
    }

    outputs.finish()?;
    Ok(ctx)
}

fn scan_field<W: Write>(
    plan: &ScanPlan,
    store: &RecordStore,
    wanted: &FieldMatch,
    negative: &NegativeFilter,
    echo: &mut W,
) -> Result<EvalContext> {
    let matcher = FieldMatcher::new(wanted, negative, plan.case_sensitive);
    let mut ctx = EvalContext::new(Counters::single());
    let mut output = plan.outputs.field_output.as_ref().map(JsonArraySink::new);

    for capture in store.captures() {
        if !matcher.evaluate(&capture, &mut ctx)? {
            continue;
        }
        if !plan.quiet {
            writeln!(echo, "{}", serde_json::to_string(capture.record)?)?;
        }
        if let Some(sink) = output.as_mut() {
            sink.push(capture.record)?;
        }
    }

    if let Some(sink) = output.as_mut() {
        sink.close()?;
        log::info!("Wrote {}", sink.path().display());
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Config, CriteriaSource, Record};
    use crate::pipeline::load::parse_records;
    use crate::utils::url::UrlPolicy;
    use scraper::{Html, Selector};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const INPUT: &str = r#"[
        {"original": "http://a.com/x.jpg", "timestamp": "20200101"},
        {"original": "http://a.com/y.png", "timestamp": "20200102"}
    ]"#;

    fn plan(criteria: CriteriaSource) -> ScanPlan {
        ScanPlan::new(criteria, &Config::default())
    }

    fn scan(plan: &ScanPlan, input: &str) -> Result<(ScanReport, String)> {
        let store = parse_records(input)?;
        let mut echo = Vec::new();
        let report = run_scan(plan, &store, &mut echo)?;
        Ok((report, String::from_utf8(echo).unwrap()))
    }

    #[test]
    fn test_single_term_scenario() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        let mut p = plan(CriteriaSource::Scan(".jpg".into()));
        p.outputs.plain_list = Some(list.clone());

        let (report, echo) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(report.records_scanned, 2);
        assert_eq!(echo, "http://a.com/x.jpg\n");
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            "https://web.archive.org/web/20200101/http://a.com/x.jpg\n"
        );
    }

    #[test]
    fn test_two_terms_scenario() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        let mut p = plan(CriteriaSource::Scan(".jpg,.png".into()));
        p.outputs.plain_list = Some(list.clone());

        let (report, _) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(fs::read_to_string(&list).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_negative_filter_scenario() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        let mut p = plan(CriteriaSource::Scan(".jpg,.png".into()));
        p.exclude_terms = vec!["a.com".into()];
        p.outputs.plain_list = Some(list.clone());

        let (report, echo) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(report.records_excluded, 2);
        assert!(echo.is_empty());
        assert!(!list.exists());
    }

    #[test]
    fn test_duplicate_emission_reaches_every_sink() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        let html = tmp.path().join("links.html");
        let json = tmp.path().join("results.json");
        let mut p = plan(CriteriaSource::Scan("x,.jpg".into()));
        p.outputs.plain_list = Some(list.clone());
        p.outputs.html_list = Some(html.clone());
        p.outputs.json_array = Some(json.clone());

        let (report, echo) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(echo.lines().count(), 2);
        assert_eq!(fs::read_to_string(&list).unwrap().lines().count(), 2);

        let page = Html::parse_document(&fs::read_to_string(&html).unwrap());
        let items = Selector::parse("li").unwrap();
        assert_eq!(page.select(&items).count(), 2);

        let parsed: Vec<Record> = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], parsed[1]);
    }

    #[test]
    fn test_json_output_holds_matched_records_only() {
        let tmp = TempDir::new().unwrap();
        let json = tmp.path().join("results.json");
        let mut p = plan(CriteriaSource::Scan(".png".into()));
        p.outputs.json_array = Some(json.clone());

        let store = parse_records(INPUT).unwrap();
        let report = run_scan(&p, &store, &mut Vec::new()).unwrap();
        assert_eq!(report.total(), 1);

        let parsed: Vec<Record> = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(parsed, vec![store.records()[1].clone()]);
    }

    #[test]
    fn test_quiet_suppresses_echo() {
        let mut p = plan(CriteriaSource::Scan(".jpg".into()));
        p.quiet = true;
        let (report, echo) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 1);
        assert!(echo.is_empty());
    }

    #[test]
    fn test_html_written_without_matches() {
        let tmp = TempDir::new().unwrap();
        let html = tmp.path().join("links.html");
        let mut p = plan(CriteriaSource::Scan(".gif".into()));
        p.outputs.html_list = Some(html.clone());

        let (report, _) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 0);
        let content = fs::read_to_string(&html).unwrap();
        assert!(content.contains("<ul>"));
        assert!(content.contains("</ul>"));
    }

    #[test]
    fn test_path_rewrite_policy() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        let mut p = plan(CriteriaSource::Scan("a.com".into()));
        p.url_policy = UrlPolicy::PathRewrite;
        p.outputs.plain_list = Some(list.clone());

        let input = r#"[{"original": "http://a.com:80/docs/", "timestamp": "2004"}]"#;
        scan(&p, input).unwrap();
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            "https://web.archive.org/web/2004/a.com/docs/index.html\n"
        );
    }

    #[test]
    fn test_path_rewrite_survives_malformed_urls() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        let mut p = plan(CriteriaSource::Scan(".jpg".into()));
        p.url_policy = UrlPolicy::PathRewrite;
        p.outputs.plain_list = Some(list.clone());

        let input = r#"[
            {"original": "http://a.com/x.jpg", "timestamp": "1"},
            {"original": "http://a.com:99999/y.jpg", "timestamp": "2"},
            {"original": "http://a.com/z.jpg", "timestamp": "3"}
        ]"#;
        let (report, echo) = scan(&p, input).unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(echo.lines().count(), 3);
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            "https://web.archive.org/web/1/a.com/x.jpg\n\
             https://web.archive.org/web/2/a.com/y.jpg\n\
             https://web.archive.org/web/3/a.com/z.jpg\n"
        );
    }

    #[test]
    fn test_json_criteria_counts_per_category() {
        let tmp = TempDir::new().unwrap();
        let criteria = tmp.path().join("criteria.json");
        fs::write(&criteria, r#"[{"images": ".jpg,.png", "video": ".mp4"}]"#).unwrap();

        let p = plan(CriteriaSource::JsonFile(criteria));
        let (report, _) = scan(&p, INPUT).unwrap();
        assert_eq!(report.counts.get("images"), Some(2));
        assert_eq!(report.counts.get("video"), Some(0));
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_textfile_criteria() {
        let tmp = TempDir::new().unwrap();
        let terms = tmp.path().join("terms.txt");
        fs::write(&terms, "\n.PNG\n\n").unwrap();

        let p = plan(CriteriaSource::TextFile(terms));
        let (report, echo) = scan(&p, INPUT).unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(echo, "http://a.com/y.png\n");
    }

    #[test]
    fn test_field_mode_writes_records() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("field.json");
        let input = r#"[
            {"original": "http://a.com/", "timestamp": "1", "mimetype": "text/html"},
            {"original": "http://a.com/x.png", "timestamp": "2", "mimetype": "image/png"},
            {"original": "http://a.com/y", "timestamp": "3", "mimetype": "text/html; charset=utf-8"}
        ]"#;
        let mut p = plan(CriteriaSource::Field(FieldMatch::new("mimetype", "TEXT/HTML")));
        p.outputs.field_output = Some(out.clone());

        let (report, echo) = scan(&p, input).unwrap();
        assert_eq!(report.total(), 1);
        assert!(echo.starts_with(r#"{"original":"http://a.com/","#));

        let parsed: Vec<Record> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["mimetype"], "text/html");
    }

    #[test]
    fn test_missing_timestamp_aborts() {
        let p = plan(CriteriaSource::Scan(".jpg".into()));
        let input = r#"[
            {"original": "http://a.com/x.jpg", "timestamp": "1"},
            {"original": "http://a.com/y.jpg"}
        ]"#;
        let err = scan(&p, input).unwrap_err();
        assert!(matches!(err, AppError::MissingField { index: 1, .. }));
    }

    #[test]
    fn test_conflicting_plan_rejected_before_output() {
        let tmp = TempDir::new().unwrap();
        let list: PathBuf = tmp.path().join("links.txt");
        let mut p = plan(CriteriaSource::Field(FieldMatch::new("mimetype", "text/html")));
        p.outputs.plain_list = Some(list.clone());

        let err = scan(&p, INPUT).unwrap_err();
        assert!(matches!(err, AppError::CriteriaConflict(_)));
        assert!(!list.exists());
    }

    #[test]
    fn test_existing_output_needs_force() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("links.txt");
        fs::write(&list, "stale\n").unwrap();

        let mut p = plan(CriteriaSource::Scan(".jpg".into()));
        p.outputs.plain_list = Some(list.clone());
        assert!(matches!(scan(&p, INPUT), Err(AppError::Config(_))));

        p.force = true;
        scan(&p, INPUT).unwrap();
        assert_eq!(
            fs::read_to_string(&list).unwrap(),
            "https://web.archive.org/web/20200101/http://a.com/x.jpg\n"
        );
    }
}
