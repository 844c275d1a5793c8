use crate::infra::{build_service, load_definition};
use clap::Args;
use credit_ahp::config::{AppConfig, ScoringConfig};
use credit_ahp::error::AppError;
use credit_ahp::matrix::{self, MatrixAnalysis, PairwiseMatrix, RandomIndexTable};
use credit_ahp::scoring::{
    ApplicantBatchImporter, ApplicantRow, ApplicantScores, EligibilityVerdict,
};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Applicant scores: a JSON object of leaf id -> score, or a CSV batch
    /// with an `applicant` column
    #[arg(long)]
    pub(crate) scores: PathBuf,
    /// Hierarchy definition (JSON). Defaults to AHP_HIERARCHY_PATH or the
    /// built-in farmer hierarchy
    #[arg(long)]
    pub(crate) hierarchy: Option<PathBuf>,
    /// Print verdicts as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Pairwise matrix as a JSON array of rows
    #[arg(long)]
    pub(crate) matrix: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SummaryArgs {
    /// Hierarchy definition (JSON). Defaults to AHP_HIERARCHY_PATH or the
    /// built-in farmer hierarchy
    #[arg(long)]
    pub(crate) hierarchy: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        scores,
        hierarchy,
        json,
    } = args;

    let config = AppConfig::load()?;
    let definition = load_definition(hierarchy.as_deref(), &config.scoring)?;
    let service = build_service(&definition, &config.scoring)?;

    let applicants = read_applicants(&scores)?;
    let verdicts: Vec<(String, EligibilityVerdict)> = applicants
        .into_iter()
        .map(|row| {
            let verdict = service.evaluate(&row.scores);
            (row.applicant, verdict)
        })
        .collect();

    if json {
        let payload: Vec<serde_json::Value> = verdicts
            .iter()
            .map(|(applicant, verdict)| {
                serde_json::json!({ "applicant": applicant, "verdict": verdict })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Hierarchy: {}", definition.name);
    for line in service.consistency_summary() {
        println!("  {line}");
    }
    println!();
    for (applicant, verdict) in &verdicts {
        println!("{}", render_verdict(applicant, verdict));
    }

    Ok(())
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let file = std::fs::File::open(&args.matrix)?;
    let rows: Vec<Vec<f64>> = serde_json::from_reader(std::io::BufReader::new(file))?;
    let matrix = PairwiseMatrix::new(rows)?;

    let analysis = matrix::analyze(&matrix, &random_index(&config.scoring));
    print!("{}", render_analysis(&analysis));
    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let definition = load_definition(args.hierarchy.as_deref(), &config.scoring)?;
    let service = build_service(&definition, &config.scoring)?;
    let engine = service.current();

    println!("Hierarchy: {}", engine.name());
    for line in engine.consistency_summary() {
        println!("  {line}");
    }
    if engine.is_usable() {
        println!("Scoring enabled for {} criteria", engine.leaf_ids().len());
    } else {
        println!(
            "Scoring disabled: {}",
            engine.failing_matrices().join(", ")
        );
    }
    Ok(())
}

fn random_index(config: &ScoringConfig) -> RandomIndexTable {
    RandomIndexTable::new(config.random_index_fallback)
}

/// CSV files are batches; anything else is a single applicant's JSON score map.
fn read_applicants(path: &Path) -> Result<Vec<ApplicantRow>, AppError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        return Ok(ApplicantBatchImporter::from_path(path)?);
    }

    let file = std::fs::File::open(path)?;
    let scores: ApplicantScores = serde_json::from_reader(std::io::BufReader::new(file))?;
    let applicant = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("applicant")
        .to_string();
    Ok(vec![ApplicantRow { applicant, scores }])
}

fn render_verdict(applicant: &str, verdict: &EligibilityVerdict) -> String {
    match verdict.score {
        Some(score) => format!("{applicant}: {score:.2}% - {}", verdict.message),
        None => format!("{applicant}: {}", verdict.message),
    }
}

fn render_analysis(analysis: &MatrixAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!("Order: {}\n", analysis.order));
    out.push_str("Normalized matrix:\n");
    for row in &analysis.normalized {
        let cells: Vec<String> = row.iter().map(|value| format!("{value:.4}")).collect();
        out.push_str(&format!("  [{}]\n", cells.join(", ")));
    }
    let weights: Vec<String> = analysis
        .weights
        .iter()
        .map(|weight| format!("{weight:.4}"))
        .collect();
    out.push_str(&format!("Weights: [{}]\n", weights.join(", ")));

    let consistency = &analysis.consistency;
    out.push_str(&format!("Lambda max: {:.4}\n", consistency.lambda_max));
    out.push_str(&format!("CI: {:.4}\n", consistency.consistency_index));
    out.push_str(&format!("RI: {:.2}\n", consistency.random_index));
    out.push_str(&format!(
        "CR: {:.4} ({})\n",
        consistency.consistency_ratio,
        if consistency.is_consistent {
            "consistent"
        } else {
            "inconsistent"
        }
    ));
    out
}
