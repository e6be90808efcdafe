//! reasonopt - reasoning optimization from the command line
//!
//! Run with: cargo run -- optimize problem.json

use anyhow::{Context, Result};
use reasoning_optimizer::{
    bias::BiasId,
    config::OptimizerConfig,
    optimizer::{run_batch, OptimizationReport, ReasoningOptimizer},
    reduction::ReductionCatalog,
    techniques::TechniqueId,
    types::ProblemDescriptor,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  reasonopt optimize <descriptor.json> [--json] [--domain=X] [--techniques=a,b] [--config=path]
  reasonopt refine <descriptor.json> <report.json> <request...> [--json] [--config=path]
  reasonopt --batch <descriptors.json> [--domain=X] [--config=path]
  reasonopt --techniques | --biases | --methods";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let positional: Vec<&str> = args
        .iter()
        .skip(2)
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();
    let json_output = args.iter().any(|a| a == "--json");
    let domain = flag_value(&args, "--domain=");
    let config_path = flag_value(&args, "--config=").map(PathBuf::from);

    match args.get(1).map(String::as_str) {
        Some("optimize") => {
            let path = positional.first().context(USAGE)?;
            let techniques = flag_value(&args, "--techniques=");
            run_optimize(
                Path::new(path),
                domain.as_deref(),
                techniques.as_deref(),
                config_path.as_deref(),
                json_output,
            )
        }
        Some("refine") => {
            let (descriptor, report) = match positional.as_slice() {
                [d, r, ..] => (*d, *r),
                _ => anyhow::bail!(USAGE),
            };
            let request = positional[2..].join(" ");
            run_refine(
                Path::new(descriptor),
                Path::new(report),
                &request,
                config_path.as_deref(),
                json_output,
            )
        }
        Some("--batch") => {
            let path = positional.first().context(USAGE)?;
            run_batch_cmd(Path::new(path), domain, config_path.as_deref()).await
        }
        Some("--techniques") => {
            list_techniques();
            Ok(())
        }
        Some("--biases") => {
            list_biases();
            Ok(())
        }
        Some("--methods") => list_methods(config_path.as_deref()),
        _ => {
            eprintln!("{}", USAGE);
            Ok(())
        }
    }
}

fn flag_value(args: &[String], prefix: &str) -> Option<String> {
    args.iter()
        .find_map(|a| a.strip_prefix(prefix))
        .map(String::from)
}

fn load_config(path: Option<&Path>) -> Result<OptimizerConfig> {
    match path {
        Some(path) => OptimizerConfig::load(path),
        None => OptimizerConfig::load_or_default(&OptimizerConfig::default_path()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn run_optimize(
    path: &Path,
    domain: Option<&str>,
    techniques: Option<&str>,
    config_path: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let descriptor: ProblemDescriptor = read_json(path)?;
    let optimizer = ReasoningOptimizer::from_config(&load_config(config_path)?);

    let report = match techniques {
        Some(list) => {
            let ids: Vec<&str> = list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
            optimizer.optimize_with(&descriptor, &ids)
        }
        None => optimizer.optimize(&descriptor, domain),
    };

    print_report(&report, json_output)
}

fn run_refine(
    descriptor_path: &Path,
    report_path: &Path,
    request: &str,
    config_path: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let descriptor: ProblemDescriptor = read_json(descriptor_path)?;
    let previous: OptimizationReport = read_json(report_path)?;
    let optimizer = ReasoningOptimizer::from_config(&load_config(config_path)?);

    let report = optimizer.refine(&descriptor, &previous, request);
    print_report(&report, json_output)
}

async fn run_batch_cmd(path: &Path, domain: Option<String>, config_path: Option<&Path>) -> Result<()> {
    let descriptors: Vec<ProblemDescriptor> = read_json(path)?;
    let optimizer = Arc::new(ReasoningOptimizer::from_config(&load_config(config_path)?));

    let results = run_batch(optimizer, descriptors, domain).await;
    let items = results
        .into_iter()
        .map(|result| match result {
            Ok(report) => serde_json::to_value(report).context("Failed to serialize report"),
            Err(e) => Ok(serde_json::json!({ "error": format!("{:#}", e) })),
        })
        .collect::<Result<Vec<_>>>()?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn print_report(report: &OptimizationReport, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let eval = &report.evaluation;
    println!("\n{} problem ({} complexity)", report.problem_type, report.complexity);
    println!("Strategies: {}", report.applied_strategies.join(", "));
    println!("Techniques: {}", report.approach.applied_techniques.join(", "));
    println!();

    println!("{}", report.approach.rationale);
    for (i, step) in report.approach.steps.iter().enumerate() {
        println!("  {:>2}. {} - {}", i + 1, step.name, step.description);
    }
    println!();

    if let Some(record) = &report.approach.bias_reduction {
        let biases: Vec<&str> = record.identified_biases.iter().map(|b| b.as_str()).collect();
        println!("Biases: {}", biases.join(", "));
        println!("Mitigated with: {}", report.bias_reduction_methods.join(", "));
        println!("Reduction effectiveness: {:.2}", record.reduction_effectiveness);
        println!();
    }

    println!(
        "Validity {:.2} | Efficiency {:.2} | Robustness {:.2} | Bias {:.2}",
        eval.validity_score, eval.efficiency_score, eval.robustness_score, eval.bias_score
    );
    println!(
        "Overall quality {:.2} | Confidence {:.2}",
        eval.overall_quality, report.confidence_score
    );

    if !report.recommendations.is_empty() {
        println!("\nRecommendations:");
        for r in &report.recommendations {
            println!("  • {}", r);
        }
    }

    if report.metadata.refinement_iteration > 0 {
        println!(
            "\nRefinement {} | improvement {:+.3}",
            report.metadata.refinement_iteration,
            report.metadata.improvement_score.unwrap_or_default()
        );
    }

    println!("\nReport {} ({})", report.id, &report.fingerprint);
    Ok(())
}

fn list_techniques() {
    for id in TechniqueId::ALL {
        let fragment = id.builtin_fragment();
        println!(
            "{:<24} {:<26} {}",
            id.as_str(),
            id.category().as_str(),
            fragment.complexity
        );
    }
}

fn list_biases() {
    for bias in BiasId::ALL {
        println!("{:<24} {}", bias.as_str(), bias.description());
    }
}

fn list_methods(config_path: Option<&Path>) -> Result<()> {
    let catalog: ReductionCatalog = load_config(config_path)?.reduction_catalog();
    for method in catalog.iter() {
        let targets: Vec<&str> = method.target_biases.iter().map(|b| b.as_str()).collect();
        println!("{:<28} {}", method.id.as_str(), method.name);
        println!("{:<28} {} [{}]", "", method.description, targets.join(", "));
    }
    Ok(())
}
