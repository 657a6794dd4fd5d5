use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::analysis::Analysis;
use crate::cli::{GroupBy, OutputFormat};
use crate::group::{Grouping, by_class, by_package};

#[derive(Debug, Serialize)]
pub struct Summary {
    pub inputs: usize,
    pub classes: usize,
    pub decoded: usize,
    pub placeholders: usize,
    pub failures: usize,
    pub skipped_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct ClassSummary {
    pub name: String,
    pub package: String,
    pub source_file: Option<String>,
    pub origin: Option<String>,
    pub placeholder: bool,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub afferent_coupling: usize,
    pub efferent_coupling: usize,
    pub instability: f64,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub member_count: usize,
    pub afferent_coupling: usize,
    pub efferent_coupling: usize,
    pub instability: f64,
    pub efferents: Vec<String>,
    pub afferents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FailureSummary {
    pub origin: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub group_by: &'static str,
    pub groups: Vec<GroupSummary>,
    pub cycles: Vec<Vec<String>>,
    pub classes: Vec<ClassSummary>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub packages: usize,
    pub cycles: Vec<Vec<String>>,
    pub failures: Vec<FailureSummary>,
}

impl Report {
    pub fn new(analysis: &Analysis, group_by: GroupBy) -> Self {
        let (label, grouping) = match group_by {
            GroupBy::Package => ("package", analysis.group(by_package)),
            GroupBy::Class => ("class", analysis.group(by_class)),
        };

        let graph = analysis.graph();
        let classes = analysis
            .classes()
            .map(|node| {
                let class = node.class();
                ClassSummary {
                    name: class.name().to_string(),
                    package: class.package().to_string(),
                    source_file: class.source_file().map(str::to_string),
                    origin: class.origin().map(str::to_string),
                    placeholder: node.is_placeholder(),
                    is_abstract: class.is_abstract(),
                    is_interface: class.is_interface(),
                    afferent_coupling: node.afferent_coupling(),
                    efferent_coupling: node.efferent_coupling(),
                    instability: node.instability(),
                }
            })
            .collect();

        Self {
            summary: Summary {
                inputs: analysis.inputs(),
                classes: graph.len(),
                decoded: graph.decoded_len(),
                placeholders: graph.len() - graph.decoded_len(),
                failures: analysis.failures().len(),
                skipped_entries: analysis.skipped_entries(),
            },
            group_by: label,
            groups: group_summaries(&grouping),
            cycles: cycle_names(&grouping),
            classes,
            failures: failure_summaries(analysis),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_text(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(out, "inputs: {}", s.inputs);
        let _ = writeln!(
            out,
            "classes: {} (decoded: {}, placeholders: {})",
            s.classes, s.decoded, s.placeholders
        );
        let _ = writeln!(out, "failures: {}", s.failures);
        let _ = writeln!(out, "groups by {}:", self.group_by);
        for g in &self.groups {
            let _ = write!(
                out,
                "- {} members={} ca={} ce={} instability={:.2}",
                g.name, g.member_count, g.afferent_coupling, g.efferent_coupling, g.instability
            );
            if !g.efferents.is_empty() {
                let _ = write!(out, " -> {}", g.efferents.join(", "));
            }
            out.push('\n');
        }
        write_cycles(&mut out, &self.cycles);
        write_failures(&mut out, &self.failures);
        out
    }
}

impl CycleReport {
    pub fn new(analysis: &Analysis) -> Self {
        let packages = analysis.packages();
        Self {
            packages: packages.len(),
            cycles: cycle_names(&packages),
            failures: failure_summaries(analysis),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => {
                let mut out = String::new();
                let _ = writeln!(out, "packages: {}", self.packages);
                write_cycles(&mut out, &self.cycles);
                write_failures(&mut out, &self.failures);
                Ok(out)
            }
        }
    }
}

fn group_summaries(grouping: &Grouping<String>) -> Vec<GroupSummary> {
    grouping
        .iter()
        .map(|g| GroupSummary {
            name: g.key().clone(),
            member_count: g.member_count(),
            afferent_coupling: g.afferent_coupling(),
            efferent_coupling: g.efferent_coupling(),
            instability: g.instability(),
            efferents: g.efferents().map(|e| e.key().clone()).collect(),
            afferents: g.afferents().map(|a| a.key().clone()).collect(),
        })
        .collect()
}

fn cycle_names(grouping: &Grouping<String>) -> Vec<Vec<String>> {
    grouping
        .cycles()
        .into_iter()
        .map(|cycle| cycle.into_iter().cloned().collect())
        .collect()
}

fn failure_summaries(analysis: &Analysis) -> Vec<FailureSummary> {
    analysis
        .failures()
        .iter()
        .map(|f| FailureSummary {
            origin: f.origin.clone(),
            error: f.error.to_string(),
        })
        .collect()
}

fn write_cycles(out: &mut String, cycles: &[Vec<String>]) {
    if cycles.is_empty() {
        out.push_str("cycles: none\n");
        return;
    }
    out.push_str("cycles:\n");
    for cycle in cycles {
        let _ = writeln!(out, "- {}", cycle.join(" <-> "));
    }
}

fn write_failures(out: &mut String, failures: &[FailureSummary]) {
    for f in failures {
        let _ = writeln!(out, "! {}: {}", f.origin, f.error);
    }
}

/// Prints to stdout, or writes `output` after creating its parent directory.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
