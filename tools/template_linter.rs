//! Template Linter: validates battle text coverage and quality.
//!
//! Usage: template_linter <templates.ron | dir> [--weapons <a,b,...>] [--shields <a,b,...>]

use battle_narrative::core::template::{Placeholder, TemplateCategory, TemplatePool};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: template_linter <templates.ron | dir> [--weapons <a,b,...>] [--shields <a,b,...>]");
        process::exit(0);
    }

    let templates_arg = &args[1];
    let mut weapons: Vec<String> = Vec::new();
    let mut shields: Vec<String> = Vec::new();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--weapons" if i + 1 < args.len() => {
                i += 1;
                weapons = split_list(&args[i]);
            }
            "--shields" if i + 1 < args.len() => {
                i += 1;
                shields = split_list(&args[i]);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut pool = TemplatePool::default();
    let templates_path = Path::new(templates_arg);

    if templates_path.is_file() {
        match TemplatePool::load_from_ron(templates_path) {
            Ok(p) => pool.merge(p),
            Err(e) => {
                eprintln!("ERROR: Failed to load template file: {}", e);
                process::exit(1);
            }
        }
    } else if templates_path.is_dir() {
        load_templates_recursive(templates_path, &mut pool);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", templates_arg);
        process::exit(1);
    }

    println!("Loaded {} templates", pool.len());

    let (errors, warnings) = lint_pool(&pool, &weapons, &shields);

    println!("\n=== Template Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    process::exit(if errors.is_empty() { 0 } else { 1 });
}

fn split_list(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn load_templates_recursive(dir: &Path, pool: &mut TemplatePool) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            load_templates_recursive(&path, pool);
        } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            match TemplatePool::load_from_ron(&path) {
                Ok(p) => {
                    println!("  Loaded: {}", path.display());
                    pool.merge(p);
                }
                Err(e) => {
                    eprintln!("  ERROR loading {}: {}", path.display(), e);
                }
            }
        }
    }
}

fn lint_pool(pool: &TemplatePool, weapons: &[String], shields: &[String]) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = pool.validate() {
        errors.push(e.to_string());
    }

    // Lines that would be rendered with a placeholder left unfilled.
    for tag in pool.tags(TemplateCategory::Hit) {
        for template in pool.bucket(TemplateCategory::Hit, tag).unwrap_or_default() {
            if template.uses(Placeholder::HitTyped)
                && pool.bucket(TemplateCategory::HitType, tag).is_none()
            {
                errors.push(format!(
                    "hit.{} uses {{hittyped}} but there is no hittype.{} bucket",
                    tag, tag
                ));
            }
        }
    }

    for category in TemplateCategory::ALL {
        for tag in pool.tags(category) {
            let Some(templates) = pool.bucket(category, tag) else {
                warnings.push(format!("{}.{} is empty", category, tag));
                continue;
            };
            if templates.iter().any(|t| t.uses(Placeholder::Winner)) {
                errors.push(format!(
                    "{}.{} uses {{winner}}, which is only bound in the victory line",
                    category, tag
                ));
            }
            if templates.len() < 2 && category != TemplateCategory::HitType {
                warnings.push(format!(
                    "{}.{} has only {} line (repetition is likely)",
                    category,
                    tag,
                    templates.len()
                ));
            }
        }
    }

    for tag in pool.tags(TemplateCategory::Attack) {
        if pool.bucket(TemplateCategory::Hit, tag).is_none() {
            warnings.push(format!("attack.{} has no hit lines; hits fall back to general", tag));
        }
    }

    for weapon in weapons {
        for category in [TemplateCategory::Attack, TemplateCategory::Hit] {
            if pool.bucket(category, weapon).is_none() {
                warnings.push(format!("weapon '{}' has no {} lines", weapon, category));
            }
        }
    }
    for shield in shields {
        if pool.bucket(TemplateCategory::Shield, shield).is_none() {
            warnings.push(format!("shield '{}' has no shield lines", shield));
        }
    }

    (errors, warnings)
}
