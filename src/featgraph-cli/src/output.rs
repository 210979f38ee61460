//! Rendering of reports for the terminal and for JSON consumers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use anyhow::Result;
use featgraph_core::prelude::*;
use featgraph_core::{Finding, ValidationReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CheckSummary<'a> {
    features: usize,
    findings: &'a [Finding],
    counts: BTreeMap<Rule, usize>,
}

#[derive(Debug, Serialize)]
struct FeatureView<'a> {
    name: &'a str,
    base_name: &'a str,
    version: Option<&'a str>,
    short_name: Option<&'a str>,
    visibility: Visibility,
    kind: &'static str,
    edition: &'static str,
    singleton: bool,
    auto_feature: bool,
    path: String,
    dependencies: &'a [String],
    auto_feature_targets: &'a BTreeSet<String>,
    activated_by: &'a BTreeSet<String>,
}

impl<'a> FeatureView<'a> {
    fn new(record: &'a FeatureRecord) -> Self {
        Self {
            name: record.name(),
            base_name: record.base_name(),
            version: record.version(),
            short_name: record.short_name(),
            visibility: record.visibility(),
            kind: record.kind().as_str(),
            edition: record.edition().as_str(),
            singleton: record.is_singleton(),
            auto_feature: record.is_auto_feature(),
            path: record.path().display().to_string(),
            dependencies: record.dependency_names(),
            auto_feature_targets: record.auto_feature_targets(),
            activated_by: record.activating_auto_features(),
        }
    }
}

pub fn render_check_text(catalog: &FeatureCatalog, report: &ValidationReport) -> String {
    let mut out = String::new();
    for finding in report.findings() {
        let _ = writeln!(out, "{}", finding);
    }
    if report.is_empty() {
        let _ = writeln!(out, "{} features checked, no findings", catalog.len());
    } else {
        let _ = writeln!(
            out,
            "{} features checked, {} findings",
            catalog.len(),
            report.len()
        );
        for (rule, count) in report.counts() {
            let _ = writeln!(out, "  {:<26} {}", rule.as_str(), count);
        }
    }
    out
}

pub fn render_check_json(catalog: &FeatureCatalog, report: &ValidationReport) -> Result<String> {
    let summary = CheckSummary {
        features: catalog.len(),
        findings: report.findings(),
        counts: report.counts(),
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

fn join(items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let joined: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

pub fn render_feature_text(record: &FeatureRecord) -> String {
    let view = FeatureView::new(record);
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.name);
    let _ = writeln!(out, "  path:         {}", view.path);
    let _ = writeln!(out, "  visibility:   {}", view.visibility);
    let _ = writeln!(out, "  kind:         {}", view.kind);
    let _ = writeln!(out, "  edition:      {}", view.edition);
    if let Some(short) = view.short_name {
        let _ = writeln!(out, "  short name:   {}", short);
    }
    let _ = writeln!(out, "  singleton:    {}", view.singleton);
    let _ = writeln!(out, "  dependencies: {}", join(view.dependencies));
    if view.auto_feature {
        let _ = writeln!(out, "  activates on: {}", join(view.auto_feature_targets));
    }
    let _ = writeln!(out, "  activated by: {}", join(view.activated_by));
    out
}

pub fn render_feature_json(record: &FeatureRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(&FeatureView::new(record))?)
}

pub fn render_cohorts_text(cohorts: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::new();
    for (base, versions) in cohorts {
        let _ = writeln!(out, "{}: {}", base, versions.join(", "));
    }
    out
}

pub fn render_conflicts_text(report: &ConflictReport) -> String {
    let mut out = String::new();
    for (root, violations) in report.iter() {
        for violation in violations {
            let _ = writeln!(
                out,
                "{} -> {} ({})",
                root, violation.feature, violation.classification
            );
        }
    }
    if report.is_empty() {
        out.push_str("no conflicts\n");
    }
    out
}

pub fn render_merged_text(merged: &BTreeMap<String, BTreeSet<String>>) -> String {
    let mut out = String::new();
    for (root, violators) in merged {
        let _ = writeln!(out, "{}: {}", root, join(violators));
    }
    if merged.is_empty() {
        out.push_str("no conflicts\n");
    }
    out
}
