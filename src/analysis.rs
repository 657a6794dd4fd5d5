//! Batch driver: find inputs, decode them in parallel, assemble the graph.
//!
//! A failing input is logged and recorded in [`Analysis::failures`]; it never
//! stops the other inputs from being decoded.

use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::read_class_entries;
use crate::class::DecodedClass;
use crate::decoder::{ClassDecoder, DecodeListener};
use crate::error::{DecodeError, DecodeFailure};
use crate::filter::Filter;
use crate::graph::{DependencyGraph, NodeRef};
use crate::group::{Grouping, by_package};
use crate::scan::{Input, InputKind, class_path_to_class_name, collect_inputs};

#[derive(Clone, Default)]
pub struct Analyzer {
    paths: Vec<PathBuf>,
    filter: Filter,
    listeners: Vec<Arc<dyn DecodeListener>>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("paths", &self.paths)
            .field("filter", &self.filter)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Adds a directory, archive or class file to analyze.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn includes(mut self, prefix: impl Into<String>) -> Self {
        self.filter.includes.push(prefix.into());
        self
    }

    pub fn excludes(mut self, prefix: impl Into<String>) -> Self {
        self.filter.excludes.push(prefix.into());
        self
    }

    pub fn including_inner_classes(mut self) -> Self {
        self.filter.include_inner_classes = true;
        self
    }

    pub fn excluding_inner_classes(mut self) -> Self {
        self.filter.include_inner_classes = false;
        self
    }

    pub fn with_listener(mut self, listener: impl DecodeListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn analyze(&self) -> Analysis {
        let inputs = collect_inputs(&self.paths, &self.filter);
        tracing::info!(inputs = inputs.len(), "decoding inputs");
        self.analyze_inputs(&inputs)
    }

    pub fn analyze_inputs(&self, inputs: &[Input]) -> Analysis {
        let decoder = ClassDecoder::new(self.filter.clone(), self.listeners.clone());

        let outcomes: Vec<InputOutcome> = inputs
            .par_iter()
            .map(|input| isolated(input, || decode_input(&decoder, input)))
            .collect();

        let mut classes = Vec::new();
        let mut failures = Vec::new();
        let mut skipped_entries = 0usize;
        for outcome in outcomes {
            classes.extend(outcome.classes);
            failures.extend(outcome.failures);
            skipped_entries += outcome.skipped_entries;
        }

        for failure in &failures {
            tracing::warn!(origin = %failure.origin, error = %failure.error, "failed to decode input");
        }

        let decoded = classes.len();
        classes.retain(|c| self.filter.accept(c.name()));
        tracing::info!(
            decoded,
            kept = classes.len(),
            failures = failures.len(),
            "decoding finished"
        );

        let mut analysis = Analysis::new(classes);
        analysis.inputs = inputs.len();
        analysis.failures = failures;
        analysis.skipped_entries = skipped_entries;
        analysis
    }
}

#[derive(Default)]
struct InputOutcome {
    classes: Vec<DecodedClass>,
    failures: Vec<DecodeFailure>,
    skipped_entries: usize,
}

/// Turns a panic while handling one input into a failure for that input alone.
fn isolated<F>(input: &Input, decode: F) -> InputOutcome
where
    F: FnOnce() -> InputOutcome,
{
    match panic::catch_unwind(AssertUnwindSafe(decode)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(path = %input.path.display(), %message, "input handling panicked");
            InputOutcome {
                failures: vec![DecodeFailure::new(
                    input.path.display().to_string(),
                    DecodeError::Panicked { message },
                )],
                ..InputOutcome::default()
            }
        }
    }
}

fn decode_input(decoder: &ClassDecoder, input: &Input) -> InputOutcome {
    let mut outcome = InputOutcome::default();
    let origin = input.path.display().to_string();

    match input.kind {
        InputKind::ClassFile => {
            let decoded = std::fs::read(&input.path)
                .map_err(Into::into)
                .and_then(|bytes| decoder.decode(&bytes, None));
            match decoded {
                Ok(class) => outcome.classes.push(class),
                Err(error) => outcome.failures.push(DecodeFailure::new(origin, error)),
            }
        }
        InputKind::Archive => {
            let contents = match read_class_entries(&input.path, decoder.filter()) {
                Ok(contents) => contents,
                Err(error) => {
                    outcome.failures.push(DecodeFailure::new(origin, error));
                    return outcome;
                }
            };
            outcome.skipped_entries = contents.skipped.len();
            let archive_name = input.archive_name();
            for entry in contents.entries {
                match decoder.decode(&entry.bytes, archive_name.as_deref()) {
                    Ok(class) => outcome.classes.push(class),
                    Err(error) => {
                        tracing::debug!(
                            class = %class_path_to_class_name(&entry.name),
                            "archive entry failed to decode"
                        );
                        outcome
                            .failures
                            .push(DecodeFailure::new(format!("{origin}!{}", entry.name), error));
                    }
                }
            }
        }
    }

    outcome
}

/// Result of one analysis run. Immutable; re-analysis means a new run.
#[derive(Debug, Default)]
pub struct Analysis {
    graph: DependencyGraph,
    failures: Vec<DecodeFailure>,
    inputs: usize,
    skipped_entries: usize,
}

impl Analysis {
    /// Assembles an analysis from classes decoded elsewhere.
    pub fn new<I>(classes: I) -> Self
    where
        I: IntoIterator<Item = DecodedClass>,
    {
        Self {
            graph: DependencyGraph::assemble(classes),
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Every node, placeholders included.
    pub fn classes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.graph.nodes()
    }

    pub fn number_of_classes(&self) -> usize {
        self.graph.len()
    }

    pub fn failures(&self) -> &[DecodeFailure] {
        &self.failures
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn skipped_entries(&self) -> usize {
        self.skipped_entries
    }

    pub fn group<K, F>(&self, extractor: F) -> Grouping<K>
    where
        K: Ord + Clone,
        F: Fn(&NodeRef<'_>) -> K,
    {
        self.graph.group_by(extractor)
    }

    pub fn packages(&self) -> Grouping<String> {
        self.graph.group_by(by_package)
    }
}
