use std::path::PathBuf;

use console::style;
use miette::{miette, Result};

use stache::{BuildPlan, BuildReport};

use super::{load_site_config, parse_global, resolve_targets, target_label};
use crate::cli::SourceArgs;

pub fn run(
    targets: Vec<String>,
    source: SourceArgs,
    dist: Option<PathBuf>,
    globals: Vec<String>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let globals = globals
        .iter()
        .map(|pair| parse_global(pair))
        .collect::<Result<Vec<_>>>()?;

    let config = load_site_config(&source)?;
    let mut resolved = resolve_targets(&config, &targets, &source, &globals)?;
    if let Some(dist) = &dist {
        for target in &mut resolved {
            target.options.dist = dist.clone();
        }
    }

    let mut failed = 0;
    for target in &resolved {
        println!(
            "{} {}",
            style("Building target").bold(),
            style(target_label(target)).cyan()
        );

        let outcome = if dry_run {
            stache::plan_build(&target.globals, &target.options)
                .map(|plan| print_plan(&plan, verbose))
        } else {
            stache::build(&target.globals, &target.options).map(|report| print_report(&report))
        };

        // One failing target must not stop the others.
        match outcome {
            Ok(()) => {}
            Err(e) if resolved.len() == 1 => return Err(e.into()),
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(miette!(
            "{failed} of {} target(s) failed",
            resolved.len()
        ));
    }

    Ok(())
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!(
            "{} {}",
            style("warning:").yellow().bold(),
            style(warning).yellow()
        );
    }
}

fn print_report(report: &BuildReport) {
    print_warnings(&report.warnings);
    println!(
        "  {} {} layouts, {} partials, {} pages",
        style("✓").green().bold(),
        report.layouts,
        report.partials,
        report.pages
    );
}

fn print_plan(plan: &BuildPlan, verbose: bool) {
    print_warnings(&plan.warnings);

    println!(
        "\n{} Dry run \u{2014} pages that would be written to {}:",
        style("==>").cyan().bold(),
        style(plan.dist.display()).cyan()
    );

    for page in &plan.pages {
        let layout = page.layout.as_deref().unwrap_or("-");
        println!(
            "  {} {} {}",
            style("create").green(),
            page.relative_path.display(),
            style(format!("(layout: {layout})")).dim()
        );

        if verbose {
            println!("  {}", style("──────").dim());
            for line in page.content.lines() {
                println!("  {}", line);
            }
            println!("  {}", style("──────").dim());
            println!();
        }
    }

    println!(
        "\nSummary: {} layouts, {} partials, {} pages",
        plan.layouts,
        plan.partials,
        plan.pages.len()
    );
    println!(
        "\n{} Dry run \u{2014} no files written.",
        style("\u{2139}").blue().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn source(src: &Path) -> SourceArgs {
        SourceArgs {
            src: Some(src.to_path_buf()),
            ..SourceArgs::default()
        }
    }

    #[test]
    fn builds_site_with_command_line_globals() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/pages/index.mustache", "{{title}}");
        let dist = tmp.path().join("dist");

        run(
            vec![],
            source(&tmp.path().join("src")),
            Some(dist.clone()),
            vec!["title=Hello".into()],
            false,
            false,
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dist.join("index.html")).unwrap(),
            "Hello"
        );
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/pages/index.mustache", "hi");
        let dist = tmp.path().join("dist");

        run(
            vec![],
            source(&tmp.path().join("src")),
            Some(dist.clone()),
            vec![],
            true,
            true,
        )
        .unwrap();

        assert!(!dist.exists());
    }

    #[test]
    fn empty_pages_folder_fails() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/layouts/main.mustache", "{{> content}}");
        let dist = tmp.path().join("dist");

        let result = run(
            vec![],
            source(&tmp.path().join("src")),
            Some(dist.clone()),
            vec![],
            false,
            false,
        );

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("No page found in folder"));
        assert!(!dist.exists());
    }
}
