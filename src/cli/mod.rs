//! ChurnGuard CLI Module
//!
//! Command-line front end: dataset generation, analytics, model evaluation
//! and single-customer scoring.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};

use crate::analysis::{
    category_table, churn_by_category, correlation_matrix, filter_records, ChurnFilter,
    KeyInsights, SummaryStats, CORRELATION_COLUMNS,
};
use crate::config::PipelineConfig;
use crate::pipeline::ChurnPipeline;
use crate::synthetic::{generate, CategoricalColumn, CustomerProfile, CONTRACT_TYPES};
use crate::training::{KNN_11, KNN_5, LOGISTIC_REGRESSION};
use crate::utils::Timer;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn warn(s: &str) -> ColoredString   { s.truecolor(233, 79, 55) }

fn kv(key: &str, val: &str) {
    println!("  {:<22} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "churnguard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Customer churn analytics: synthetic data, models and risk scoring")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Pipeline parameters shared by every command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of synthetic customers
    #[arg(short = 'n', long)]
    pub n_samples: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Held-out share for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub cv_folds: Option<usize>,
}

impl RunArgs {
    pub fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(n) = self.n_samples {
            config.n_samples = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(folds) = self.cv_folds {
            config.cv_folds = folds;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Logistic,
    Knn5,
    Knn11,
}

impl ModelChoice {
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelChoice::Logistic => LOGISTIC_REGRESSION,
            ModelChoice::Knn5 => KNN_5,
            ModelChoice::Knn11 => KNN_11,
        }
    }
}

/// Churn label filter of `stats`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChurnChoice {
    #[default]
    All,
    Loyal,
    Churn,
}

impl From<ChurnChoice> for ChurnFilter {
    fn from(choice: ChurnChoice) -> Self {
        match choice {
            ChurnChoice::All => ChurnFilter::All,
            ChurnChoice::Loyal => ChurnFilter::LoyalOnly,
            ChurnChoice::Churn => ChurnFilter::ChurnOnly,
        }
    }
}

/// Segment filters of `stats`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Contract types to keep (comma separated); all when omitted
    #[arg(long, value_delimiter = ',')]
    pub contract: Vec<String>,

    /// Keep all customers, only loyal ones or only churned ones
    #[arg(long, value_enum, default_value = "all")]
    pub churn: ChurnChoice,
}

impl FilterArgs {
    pub fn contract_types(&self) -> Vec<&str> {
        if self.contract.is_empty() {
            CONTRACT_TYPES.to_vec()
        } else {
            self.contract.iter().map(String::as_str).collect()
        }
    }
}

/// Raw customer fields for `predict`; defaults match the prediction form
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, default_value_t = 35)]
    pub age: u32,
    #[arg(long, default_value = "Homme")]
    pub gender: String,
    #[arg(long, default_value_t = 12)]
    pub tenure: u32,
    #[arg(long, default_value_t = 65.0)]
    pub monthly_charges: f64,
    #[arg(long, default_value = "Mensuel")]
    pub contract: String,
    #[arg(long, default_value = "Carte bancaire")]
    pub payment: String,
    #[arg(long, default_value_t = 3)]
    pub services: u32,
    #[arg(long, default_value_t = 2)]
    pub tickets: u32,
    #[arg(long, default_value_t = 3.5)]
    pub satisfaction: f64,
    #[arg(long, default_value = "Faible")]
    pub activity: String,
    #[arg(long)]
    pub partner: bool,
    #[arg(long)]
    pub dependents: bool,
}

impl From<ProfileArgs> for CustomerProfile {
    fn from(args: ProfileArgs) -> Self {
        CustomerProfile {
            age: args.age,
            gender: args.gender,
            tenure_months: args.tenure,
            monthly_charges: args.monthly_charges,
            contract_type: args.contract,
            payment_method: args.payment,
            num_services: args.services,
            support_tickets: args.tickets,
            satisfaction_score: args.satisfaction,
            online_activity: args.activity,
            has_partner: args.partner,
            has_dependents: args.dependents,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the synthetic dataset and show its first rows
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Rows to display
        #[arg(long, default_value = "10")]
        head: usize,

        /// Write every record as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summary statistics and churn by segment
    Stats {
        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Train all models and print the evaluation report
    Evaluate {
        #[command(flatten)]
        run: RunArgs,

        /// Skip cross-validation
        #[arg(long)]
        no_cv: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score one customer
    Predict {
        #[command(flatten)]
        run: RunArgs,

        /// Model to score with
        #[arg(short, long, value_enum, default_value = "logistic")]
        model: ModelChoice,

        #[command(flatten)]
        profile: ProfileArgs,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_generate(run: &RunArgs, head: usize, output: Option<&Path>) -> anyhow::Result<()> {
    let config = run.to_config()?;
    section("Generate");

    step_run("Generating customers");
    let timer = Timer::start();
    let dataset = generate(config.n_samples, config.seed)?;
    step_done(&format!("{} rows in {:?}", dataset.len(), timer.elapsed()));

    kv("Seed", &config.seed.to_string());
    kv("Churn rate", &format!("{:.1}%", dataset.churn_rate() * 100.0));
    kv("Fingerprint", &dataset.fingerprint()?[..16]);

    let df = dataset.to_dataframe()?;
    println!();
    println!("{}", df.head(Some(head)));

    if let Some(path) = output {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, dataset.records())?;
        step_ok(&format!("Wrote {}", path.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_stats(run: &RunArgs, filter: &FilterArgs) -> anyhow::Result<()> {
    let config = run.to_config()?;
    let full = generate(config.n_samples, config.seed)?;
    let dataset = filter_records(&full, &filter.contract_types(), filter.churn.into());
    if dataset.is_empty() {
        anyhow::bail!("no customers match the filters");
    }
    let stats = SummaryStats::compute(&dataset);

    section("Summary");
    if dataset.len() != full.len() {
        kv("Filtered", &format!("{} of {}", dataset.len(), full.len()));
    }
    kv("Clients", &stats.total_clients.to_string());
    kv("Churned", &stats.churn_count.to_string());
    kv("Churn rate", &format!("{:.1}%", stats.churn_rate));
    kv("Avg tenure (months)", &format!("{:.1}", stats.avg_tenure));
    kv("Avg monthly charges", &format!("{:.2}", stats.avg_charges));
    kv("Avg satisfaction", &format!("{:.2}", stats.avg_satisfaction));
    kv("Total revenue", &format!("{:.2}", stats.total_revenue));

    let insights = KeyInsights::compute(&dataset);
    section("Key insights");
    println!(
        "  {} {}",
        warn("!"),
        format!("Contrats Mensuels : {:.1}% de churn", insights.monthly_contract_churn_rate)
    );
    println!(
        "  {} {}",
        warn("!"),
        format!("Satisfaction < 3 : {:.1}% de churn", insights.low_satisfaction_churn_rate)
    );

    for column in CategoricalColumn::ALL {
        section(&format!("Churn by {}", column));
        let table = category_table(column, &churn_by_category(&dataset, column))?;
        println!("{}", table);
    }

    section("Correlations with churn");
    let corr = correlation_matrix(&dataset);
    let churn_idx = CORRELATION_COLUMNS.len() - 1;
    for (i, name) in CORRELATION_COLUMNS.iter().enumerate().take(churn_idx) {
        println!("  {:<22} {:>7.3}", muted(name), corr[[i, churn_idx]]);
    }

    println!();
    Ok(())
}

pub fn cmd_evaluate(run: &RunArgs, no_cv: bool, json: bool) -> anyhow::Result<()> {
    let config = run.to_config()?;

    if json {
        let pipeline = ChurnPipeline::fit(&config)?;
        println!("{}", pipeline.report(!no_cv)?.to_json()?);
        return Ok(());
    }

    section("Evaluate");
    step_run("Training models");
    let timer = Timer::start();
    let pipeline = ChurnPipeline::fit(&config)?;
    step_done(&format!("{:?}", timer.elapsed()));

    if !no_cv {
        step_run(&format!("Cross-validating ({} folds)", config.cv_folds));
    }
    let timer = Timer::start();
    let report = pipeline.report(!no_cv)?;
    if !no_cv {
        step_done(&format!("{:?}", timer.elapsed()));
    }

    println!();
    for line in report.render().lines() {
        println!("  {}", line);
    }
    if let Some(best) = report.best_model() {
        step_ok(&format!("Best F1: {} ({:.4})", best.model.cyan(), best.metrics.f1));
    }
    println!();
    Ok(())
}

pub fn cmd_predict(run: &RunArgs, model: ModelChoice, profile: ProfileArgs) -> anyhow::Result<()> {
    let config = run.to_config()?;
    let pipeline = ChurnPipeline::fit(&config)?;
    let profile = CustomerProfile::from(profile);
    let prediction = pipeline.predict(model.model_name(), &profile)?;

    section("Résultat");
    kv("Model", model.model_name());
    let verdict = if prediction.is_churn() {
        warn("RISQUE ÉLEVÉ").bold()
    } else {
        ok("FAIBLE RISQUE").bold()
    };
    println!("  {}", verdict);
    kv("Probability", &format!("{:.1}%", prediction.probability * 100.0));
    kv("Risk level", &prediction.risk_level.to_string());

    section("Facteurs identifiés");
    if prediction.risk_flags.is_empty() {
        println!("  {}", dim("Aucun facteur de risque majeur"));
    } else {
        for flag in &prediction.risk_flags {
            println!("  {} {}", warn("•"), flag);
        }
    }

    section("Recommandations");
    for action in prediction.recommendations() {
        println!("  {} {}", accent("›"), action);
    }
    println!();
    Ok(())
}
