use console::style;
use miette::{miette, Result};

use stache::check::check_site;
use stache::config::ResolvedTarget;

use super::{load_site_config, resolve_targets, target_label};
use crate::cli::SourceArgs;

pub fn run(target: Option<String>, source: SourceArgs) -> Result<()> {
    let config = load_site_config(&source)?;
    let names: Vec<String> = target.into_iter().collect();
    let resolved = resolve_targets(&config, &names, &source, &[])?;
    check_targets(&resolved)
}

/// Check each target in turn. A target that cannot be checked is reported and
/// counted as failed without stopping the rest.
fn check_targets(resolved: &[ResolvedTarget]) -> Result<()> {
    let mut failed = 0;
    for target in resolved {
        println!(
            "{} {} {}",
            style("Checking").bold(),
            style(target_label(target)).cyan(),
            style(format!("({})", target.options.src.display())).dim()
        );

        let result = match check_site(&target.options) {
            Ok(result) => result,
            Err(e) if resolved.len() == 1 => return Err(e.into()),
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                failed += 1;
                continue;
            }
        };

        println!("  Layouts: {}", result.layouts);
        println!("  Partials: {}", result.partials);
        println!("  Pages: {}", result.pages);

        if !result.warnings.is_empty() {
            println!("\n{}", style("Warnings:").yellow().bold());
            for w in &result.warnings {
                println!("  {} {}", style("⚠").yellow(), w);
            }
        }

        if !result.errors.is_empty() {
            println!("\n{}", style("Errors:").red().bold());
            for e in &result.errors {
                println!("  {} {}", style("✗").red(), e);
            }
            println!(
                "\n{} Site has {} error(s)",
                style("✗").red().bold(),
                result.errors.len()
            );
            failed += 1;
        } else {
            println!("\n{} Site is valid!", style("✓").green().bold());
        }
    }

    match (failed, resolved.len()) {
        (0, _) => Ok(()),
        (_, 1) => Err(miette!("check failed")),
        (failed, total) => Err(miette!("{failed} of {total} target(s) failed")),
    }
}
