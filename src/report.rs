use std::collections::BTreeMap;
use std::fmt::Write as _;

use colored::Colorize;

use crate::extractor::{Layer, RelationType};
use crate::scanner::ScanOutcome;

const EDGE_ORDER: [RelationType; 4] = [
    RelationType::Extends,
    RelationType::Implements,
    RelationType::Calls,
    RelationType::Injects,
];

/// Human-readable overview of a scan for terminal output.
pub fn render_summary(outcome: &ScanOutcome) -> String {
    let structure = &outcome.structure;
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Project structure".bold().green());
    let _ = writeln!(out, "{}", "=================".green());
    let _ = writeln!(
        out,
        "Files scanned: {}  Classes: {}  Without class: {}  Skipped: {}",
        outcome.files_seen,
        structure.classes.len(),
        outcome.files_without_class,
        outcome.skipped.len()
    );

    let mut layers: BTreeMap<Layer, usize> = BTreeMap::new();
    for pattern in structure
        .classes
        .iter()
        .flat_map(|c| c.architectural_patterns.iter())
    {
        *layers.entry(pattern.layer).or_default() += 1;
    }
    if !layers.is_empty() {
        let _ = writeln!(out, "\n{}", "Layers".bold());
        for (layer, count) in &layers {
            let _ = writeln!(out, "  {:<14} {}", layer.as_str(), count);
        }
    }

    let endpoints: Vec<String> = structure
        .classes
        .iter()
        .flat_map(|class| {
            class.methods.iter().filter_map(move |method| {
                method.endpoint.as_ref().map(|e| {
                    format!(
                        "  {:<7}{}  {}#{}",
                        e.method.as_str().cyan(),
                        e.path,
                        class.name,
                        method.name
                    )
                })
            })
        })
        .collect();
    if !endpoints.is_empty() {
        let _ = writeln!(out, "\n{}", "Endpoints".bold());
        for line in &endpoints {
            let _ = writeln!(out, "{}", line);
        }
    }

    let counts = structure.edge_counts();
    let _ = writeln!(out, "\n{}", "Relationships".bold());
    for kind in EDGE_ORDER {
        let _ = writeln!(
            out,
            "  {:<11} {}",
            kind.as_str(),
            counts.get(&kind).copied().unwrap_or(0)
        );
    }

    if !outcome.skipped.is_empty() {
        let _ = writeln!(out, "\n{}", "Skipped files".bold().yellow());
        for skipped in &outcome.skipped {
            let _ = writeln!(out, "  {} ({})", skipped.path.display(), skipped.reason);
        }
    }

    out
}
