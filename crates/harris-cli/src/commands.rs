//! Subcommand implementations

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use harris_core::{
    analyze_site, Diagnostic, FileStore, Severity, SiteSummary, UnitSource, ValidationReport,
};
use harris_graphml::{
    export_graphml, export_site, inspect, render_dot, serialize_legend, write_document,
    EdgeStyleMap, GroupingMode, HarrisConfig,
};
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Nothing to report
    Clean,
    /// Command ran but found problems (invalid site, failed exports, broken document)
    Findings,
}

pub(crate) fn run(matches: &ArgMatches) -> Result<Outcome> {
    let config = load_config(matches)?;
    match matches.subcommand() {
        Some(("export", args)) => export(args, apply_overrides(args, config)),
        Some(("export-all", args)) => export_all(args, &apply_overrides(args, config)),
        Some(("validate", args)) => validate(args),
        Some(("legend", args)) => legend(args, &config),
        Some(("inspect", args)) => inspect_file(args),
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
}

fn required<'a, T: Any + Clone + Send + Sync + 'static>(
    args: &'a ArgMatches,
    id: &str,
) -> Result<&'a T> {
    args.get_one::<T>(id)
        .with_context(|| format!("missing argument '{id}'"))
}

fn load_config(matches: &ArgMatches) -> Result<HarrisConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => HarrisConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(HarrisConfig::default()),
    }
}

fn apply_overrides(args: &ArgMatches, config: HarrisConfig) -> HarrisConfig {
    let mut export = config.export;
    if args.get_flag("extended-labels") {
        export = export.with_extended_labels(true);
    }
    if args.get_flag("no-periods") {
        export = export.with_periods(false);
    }
    if args.get_flag("reverse-epochs") {
        export = export.with_reverse_epochs(true);
    }
    if let Some(mode) = args.get_one::<GroupingMode>("grouping") {
        export = export.with_grouping(*mode);
    }
    config.with_export(export)
}

fn open_store(args: &ArgMatches) -> Result<FileStore> {
    let path = required::<PathBuf>(args, "fixture")?;
    FileStore::open(path).with_context(|| format!("opening fixture {}", path.display()))
}

fn report_diagnostics(site: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Info => tracing::debug!(site, "{diagnostic}"),
            Severity::Warning => tracing::warn!(site, "{diagnostic}"),
            Severity::Error => tracing::error!(site, "{diagnostic}"),
        }
    }
}

/// Write to a file, or to stdout when no path is given
fn emit(path: Option<&PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            write_document(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(text.as_bytes()).context("writing to stdout")?;
            out.flush().context("writing to stdout")
        }
    }
}

/// File name for a site's document
fn file_stem(site: &str) -> String {
    site.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn export(args: &ArgMatches, config: HarrisConfig) -> Result<Outcome> {
    let store = open_store(args)?;
    let site = required::<String>(args, "site")?;
    let analysis = analyze_site(&store, site).with_context(|| format!("analysing site {site}"))?;
    report_diagnostics(site, &analysis.diagnostics);

    let xml = export_graphml(&analysis.value, &config)
        .with_context(|| format!("rendering site {site}"))?;
    emit(args.get_one::<PathBuf>("out"), &xml)?;

    if let Some(path) = args.get_one::<PathBuf>("dot") {
        let units = analysis.value.graph.node_count();
        if config.is_large(units) {
            tracing::warn!(
                site,
                units,
                threshold = config.large_graph_threshold,
                "large graph, DOT preview skipped"
            );
        } else {
            let dot = render_dot(
                &analysis.value.graph,
                &analysis.value.layout,
                &EdgeStyleMap::new(),
            );
            write_document(path, &dot).with_context(|| format!("writing {}", path.display()))?;
        }
    }
    Ok(Outcome::Clean)
}

fn export_all(args: &ArgMatches, config: &HarrisConfig) -> Result<Outcome> {
    let store = open_store(args)?;
    let out_dir = required::<PathBuf>(args, "out-dir")?;
    let sites = store.sites().context("listing sites")?;

    let export_one = |site: &str| -> Result<(PathBuf, usize)> {
        let out = export_site(&store, site, config)?;
        report_diagnostics(site, &out.diagnostics);
        let path = out_dir.join(format!("{}.graphml", file_stem(site)));
        write_document(&path, &out.value)?;
        Ok((path, out.diagnostics.len()))
    };
    let results: Vec<(&String, Result<(PathBuf, usize)>)> =
        sites.par_iter().map(|site| (site, export_one(site))).collect();

    let mut failed = 0usize;
    for (site, result) in &results {
        match result {
            Ok((path, diagnostics)) => {
                tracing::info!(site = %site, path = %path.display(), diagnostics, "site exported");
            }
            Err(err) => {
                failed += 1;
                tracing::error!(site = %site, "{err:#}");
            }
        }
    }
    tracing::info!(sites = results.len(), failed, "export finished");
    Ok(if failed == 0 {
        Outcome::Clean
    } else {
        Outcome::Findings
    })
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    summary: SiteSummary,
    report: &'a ValidationReport,
    diagnostics: &'a [Diagnostic],
}

fn validate(args: &ArgMatches) -> Result<Outcome> {
    let store = open_store(args)?;
    let site = required::<String>(args, "site")?;
    let analysis = analyze_site(&store, site).with_context(|| format!("analysing site {site}"))?;
    let summary = analysis.summary();
    let report = &analysis.value.report;
    let valid = summary.valid;

    if args.get_flag("json") {
        let output = ValidationOutput {
            summary,
            report,
            diagnostics: &analysis.diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        report_diagnostics(site, &analysis.diagnostics);
        print_summary(&summary, report);
    }
    Ok(if valid { Outcome::Clean } else { Outcome::Findings })
}

fn print_summary(summary: &SiteSummary, report: &ValidationReport) {
    println!("Site: {}", summary.site);
    println!(
        "  Units: {}  Relationships: {}  Rendered edges: {} (redundant {}, excluded {})",
        summary.units,
        summary.relationships,
        summary.rendered_edges,
        summary.redundant_edges,
        summary.excluded_edges
    );
    println!("  Layers: {}  Periods: {}", summary.layers, summary.periods);
    println!(
        "  Diagnostics: {} errors, {} warnings, {} info",
        summary.errors, summary.warnings, summary.infos
    );
    println!("  Status: {}", if summary.valid { "VALID" } else { "INVALID" });

    for cycle in &report.cycles {
        let mut path: Vec<&str> = cycle.iter().map(|u| u.as_str()).collect();
        path.extend(cycle.first().map(|u| u.as_str()));
        println!("  Cycle: {}", path.join(" -> "));
    }
    for paradox in &report.paradoxes {
        let kinds: Vec<&str> = paradox.kinds.iter().map(|k| k.label()).collect();
        println!(
            "  Paradox: {} / {} ({})",
            paradox.first,
            paradox.second,
            kinds.join(", ")
        );
    }
    if !report.orphans.is_empty() {
        let orphans: Vec<&str> = report.orphans.iter().map(|u| u.as_str()).collect();
        println!("  Orphans: {}", orphans.join(", "));
    }
}

fn legend(args: &ArgMatches, config: &HarrisConfig) -> Result<Outcome> {
    let xml = serialize_legend(&EdgeStyleMap::new(), &config.style)?;
    emit(args.get_one::<PathBuf>("out"), &xml)?;
    Ok(Outcome::Clean)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn inspect_file(args: &ArgMatches) -> Result<Outcome> {
    let path = required::<PathBuf>(args, "graphml")?;
    let report = inspect(&read_text(path)?).with_context(|| format!("parsing {}", path.display()))?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Document: {}", path.display());
        println!(
            "  Nodes: {}  Groups: {}  Edges: {}",
            report.nodes, report.groups, report.edges
        );
        for row in &report.rows {
            let members = report.row_membership.get(row).copied().unwrap_or(0);
            println!("  Row: {row} ({members} units)");
        }
        for id in &report.duplicate_ids {
            println!("  Duplicate id: {id}");
        }
        for id in &report.dangling_edges {
            println!("  Dangling edge: {id}");
        }
    }
    Ok(if report.is_consistent() {
        Outcome::Clean
    } else {
        Outcome::Findings
    })
}
