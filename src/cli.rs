//! CLI: model files → (fragments | java)
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;

use crate::codegen::CallableFragments;
use crate::error::GenError;
use crate::model::{Model, UnitOutput};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate JDBC callable-statement code from JSON type and signature models
#[derive(Parser, Debug)]
#[command(name = "procbind", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit the raw fragments of every callable as JSON
    Fragments(FragmentsOut),
    /// render every unit as a Java class
    Java(JavaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more model files. May be literal paths or quoted glob patterns.
    /// Later files add classes and units to earlier ones; options come from
    /// the first.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// override the statement variable
    #[arg(long)]
    stmt_var: Option<String>,

    /// override the position variable
    #[arg(long)]
    position_var: Option<String>,

    /// override the class holding the conversion helpers
    #[arg(long)]
    conversions_class: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct FragmentsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct JavaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .java file (stdout if omitted)
    #[arg(short, long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// write one `<Unit>.java` per unit into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// Callable counts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Serialize)]
struct UnitReport<'m> {
    unit: &'m str,
    package: Option<&'m str>,
    callables: Vec<CallableReport<'m>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CallableReport<'m> {
    Generated(&'m CallableFragments),
    Failed { callable: &'m str, error: String },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_model(&self) -> anyhow::Result<Model> {
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut merged: Option<Model> = None;
        for source_path in source_paths {
            let model = Model::load(&source_path)
                .with_context(|| format!("failed to load model {}", source_path.display()))?;
            match merged.as_mut() {
                Some(merged) => merged.merge(model),
                None => merged = Some(model),
            }
        }
        let Some(mut model) = merged else {
            bail!("no input files");
        };
        if let Some(stmt_var) = &self.stmt_var {
            model.options.statement_var = stmt_var.clone();
        }
        if let Some(position_var) = &self.position_var {
            model.options.position_var = position_var.clone();
        }
        if let Some(conversions_class) = &self.conversions_class {
            model.options.conversions_class = conversions_class.clone();
        }
        Ok(model)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        match &self.cmd {
            Command::Fragments(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(RunSummary::default());
                }

                let model = target.input_settings.load_model()?;
                let outputs = model.generate();
                let summary = report_status(&outputs);

                let reports = outputs.iter().map(unit_report).collect::<Vec<_>>();
                let json_src = serde_json::to_string_pretty(&reports).context("failed to serialize fragments")?;
                write_output(target.out.as_deref(), &json_src)?;
                Ok(summary)
            }
            Command::Java(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(RunSummary::default());
                }

                let model = target.input_settings.load_model()?;
                let outputs = model.generate();
                let summary = report_status(&outputs);

                if let Some(dir) = target.out_dir.as_ref() {
                    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
                    for output in &outputs {
                        let java_src = crate::template::render_unit(output, &model.options);
                        let path = dir.join(format!("{}.java", output.unit.name));
                        write_output(Some(path.as_path()), &java_src)?;
                    }
                } else {
                    let java_src = outputs
                        .iter()
                        .map(|output| crate::template::render_unit(output, &model.options))
                        .collect::<Vec<_>>()
                        .join("\n");
                    write_output(target.out.as_deref(), &java_src)?;
                }
                Ok(summary)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn unit_report<'m>(output: &'m UnitOutput<'_>) -> UnitReport<'m> {
    let callables = output
        .results
        .iter()
        .map(|(sig, result)| match result {
            Ok(fragments) => CallableReport::Generated(fragments),
            Err(err) => CallableReport::Failed { callable: &sig.name, error: err.kind.to_string() },
        })
        .collect();
    UnitReport { unit: &output.unit.name, package: output.unit.package.as_deref(), callables }
}

/// One colored line per callable on stderr.
fn report_status(outputs: &[UnitOutput<'_>]) -> RunSummary {
    let mut summary = RunSummary::default();
    for output in outputs {
        for (sig, result) in &output.results {
            let label = format!("{}::{}", output.unit.name, sig.name);
            match result {
                Ok(_) => summary.succeeded += 1,
                Err(_) => summary.failed += 1,
            }
            eprintln!("{}", status_line(&label, result));
        }
    }
    summary
}

fn status_line<T>(label: &str, result: &Result<T, GenError>) -> String {
    match result {
        Ok(_) => format!("{} {label}", "ok".green().bold()),
        Err(err) => format!("{} {label}: {}", "FAILED".red().bold(), err.kind),
    }
}

fn write_output(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {pattern}"))?
                .collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.append(&mut matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenErrorKind;

    #[test]
    fn globs_expand_sorted_and_literals_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "c.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let pattern = format!("{}/*.json", dir.path().display());
        let paths = resolve_file_path_patterns([pattern.as_str(), "literal.json"]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.json", "b.json", "literal.json"]);
    }

    #[test]
    fn status_lines_mark_ok_and_failed() {
        colored::control::set_override(false);
        let ok: Result<(), GenError> = Ok(());
        assert_eq!(status_line("MemberDao::save_member", &ok), "ok MemberDao::save_member");

        let failed: Result<(), GenError> =
            Err(GenErrorKind::UnknownType { ty: "com.acme.Ghost".into() }.in_callable("load_ghost"));
        let line = status_line("MemberDao::load_ghost", &failed);
        assert!(line.starts_with("FAILED MemberDao::load_ghost: "), "{line}");
        assert!(line.contains("com.acme.Ghost"), "{line}");
        assert!(line.is_ascii());
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let err = resolve_file_path_patterns([pattern]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }
}
