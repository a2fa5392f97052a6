//! Subcommand implementations. Each returns the process exit code.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tmpl_core::catalog::data_fields_for;
use tmpl_core::lint::{LintSeverity, lint_template};
use tmpl_core::model::{DocumentType, ObjectKind};
use tmpl_core::serialize::{LoadReport, collect_tokens, deserialize_scene, serialize_scene_pretty};
use tmpl_core::starter::starter_scene;
use tmpl_render::render_thumbnail;

fn load(path: &Path) -> Result<LoadReport> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let report = deserialize_scene(&json).with_context(|| format!("decoding {}", path.display()))?;
    for skipped in &report.skipped {
        log::warn!("object {} skipped: {}", skipped.index, skipped.reason);
    }
    Ok(report)
}

pub fn run_inspect(path: &Path) -> Result<i32> {
    let report = load(path)?;
    let scene = &report.scene;
    println!("{}: {} objects", path.display(), scene.len());
    for obj in scene.iter() {
        let g = &obj.geometry;
        let mut line = format!(
            "  {:<20} {:<11} ({:.1}, {:.1}) {:.1}x{:.1}",
            obj.id.as_str(),
            obj.kind.tag(),
            g.left,
            g.top,
            g.scaled_width(),
            g.scaled_height()
        );
        if g.angle != 0.0 {
            line.push_str(&format!(" @{:.0}°", g.angle));
        }
        if obj.locked {
            line.push_str(" [locked]");
        }
        match &obj.kind {
            ObjectKind::DataField { field_name, .. } => line.push_str(&format!(" -> {field_name}")),
            ObjectKind::Table { rows, objects } => {
                line.push_str(&format!(" {rows} rows, {} parts", objects.len()))
            }
            ObjectKind::Group { objects } => line.push_str(&format!(" {} parts", objects.len())),
            _ => {}
        }
        println!("{line}");
    }

    let tokens = collect_tokens(scene);
    if !tokens.is_empty() {
        println!("tokens ({}):", tokens.len());
        for token in tokens {
            println!("  {{{{{token}}}}}");
        }
    }
    if !report.skipped.is_empty() {
        println!("skipped ({}):", report.skipped.len());
        for skipped in &report.skipped {
            println!("  #{}: {}", skipped.index, skipped.reason);
        }
    }
    Ok(0)
}

pub fn run_lint(path: &Path, document_type: DocumentType) -> Result<i32> {
    let report = load(path)?;
    let diags = lint_template(&report.scene, document_type);
    for d in &diags {
        let level = match d.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        println!("{level}[{}] {}: {}", d.rule, d.object_id, d.message);
    }
    let warnings = diags
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    println!(
        "{}: {} warnings, {} notes",
        path.display(),
        warnings,
        diags.len() - warnings
    );
    Ok(if warnings > 0 { 1 } else { 0 })
}

pub fn run_thumbnail(path: &Path, out: Option<&Path>, scale: f64) -> Result<i32> {
    let report = load(path)?;
    let thumb = render_thumbnail(&report.scene, scale)?;
    match out {
        Some(out) => {
            fs::write(out, &thumb.png).with_context(|| format!("writing {}", out.display()))?;
            println!("{} ({}x{})", out.display(), thumb.width, thumb.height);
        }
        None => println!("{}", thumb.to_data_url()),
    }
    Ok(0)
}

pub fn run_starter(document_type: DocumentType, out: Option<&Path>) -> Result<i32> {
    let json = serialize_scene_pretty(&starter_scene(document_type))?;
    match out {
        Some(out) => fs::write(out, json).with_context(|| format!("writing {}", out.display()))?,
        None => println!("{json}"),
    }
    Ok(0)
}

pub fn run_fields(document_type: DocumentType) -> Result<i32> {
    let fields = data_fields_for(document_type);
    let width = fields.iter().map(|f| f.field_path.len()).max().unwrap_or(0);
    for field in fields {
        println!("{:<width$}  {}", field.field_path, field.label);
    }
    Ok(0)
}
