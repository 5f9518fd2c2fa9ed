//! Somnia CLI
//!
//! Command-line interface for the dream analysis pipeline.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use somnia_core::{
    AnalysisBundle, AnalysisError, DemographicsHint, EntityCategory, Language, Lexicon,
    LexiconDetectors, OrchestrationResult, Orchestrator, PipelineConfig, TextDetectors, Tone,
};

/// Narratives shorter than this are rejected before analysis
const MIN_DREAM_CHARS: usize = 20;

/// Somnia - dream narrative analysis
#[derive(Parser)]
#[command(name = "somnia")]
#[command(author = "Somnia Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze dream narratives into one consistent report")]
#[command(long_about = "Somnia scores a dream narrative for emotions, entities, sleep stage, plausibility, continuity and themes,\nthen reconciles the results under explicit consistency rules.")]
struct Cli {
    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a dream narrative
    Analyze {
        /// File containing the narrative (stdin when absent or "-")
        file: Option<PathBuf>,
        /// Narrative language: en or tr
        #[arg(long, default_value = "en")]
        language: String,
        /// Dreamer's age
        #[arg(long)]
        age: Option<u32>,
        /// Dreamer's gender
        #[arg(long)]
        gender: Option<String>,
        /// Usual bedtime (HH:MM)
        #[arg(long)]
        bedtime: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Path to a JSON pipeline config
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the text detectors only
    Detect {
        /// File containing the narrative (stdin when absent or "-")
        file: Option<PathBuf>,
    },

    /// Print the effective pipeline configuration
    Config {
        /// Path to a JSON pipeline config
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            language,
            age,
            gender,
            bedtime,
            json,
            config,
        } => run_analyze(file, language, age, gender, bedtime, json, config).await,
        Commands::Detect { file } => run_detect(file),
        Commands::Config { config } => run_config(config),
    }
}

/// Read the narrative from a file, or stdin for `None` / `-`
fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Run analyze command
async fn run_analyze(
    file: Option<PathBuf>,
    language: String,
    age: Option<u32>,
    gender: Option<String>,
    bedtime: Option<String>,
    json: bool,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let language: Language = language.parse().map_err(anyhow::Error::msg)?;
    let bedtime = bedtime
        .map(|b| {
            NaiveTime::parse_from_str(&b, "%H:%M")
                .with_context(|| format!("Invalid bedtime '{}', expected HH:MM", b))
        })
        .transpose()?;

    let raw = read_input(file.as_deref())?;
    let text = raw.trim();
    if text.chars().count() < MIN_DREAM_CHARS {
        bail!("Dream text must be at least {} characters", MIN_DREAM_CHARS);
    }

    let config = PipelineConfig::load(config.as_deref())?;
    let orchestrator = Orchestrator::heuristic(config)?;

    let demographics = (age.is_some() || gender.is_some() || bedtime.is_some()).then(|| {
        DemographicsHint {
            age,
            gender,
            bedtime,
        }
    });

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let translate = |key: &str, _vars: Option<&BTreeMap<String, String>>| {
        key.rsplit('.').next().unwrap_or(key).replace('_', " ")
    };

    let result = match orchestrator
        .orchestrate_with_cancellation(text, language, demographics.as_ref(), Some(&translate), &token)
        .await
    {
        Ok(result) => result,
        Err(AnalysisError::Cancelled) => {
            eprintln!("{}", "Analysis cancelled.".yellow());
            return Ok(());
        }
        Err(e) => return Err(e).context("Analysis unavailable"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &OrchestrationResult) {
    let bundle = &result.bundle;

    println!("{}", "=== Dream Analysis ===".cyan().bold());
    println!();
    print_emotions(bundle);
    println!();
    print_sleep_and_realism(bundle);
    println!();
    print_entities_and_themes(bundle);

    println!();
    if bundle.hide_continuity_data {
        println!("{}", "Continuity: no day-residue data".dimmed());
    } else {
        println!(
            "{}: {:.0}% (thematic {:.0}%)",
            "Continuity".white().bold(),
            bundle.continuity.overall,
            bundle.continuity.thematic
        );
    }

    if !result.violations.is_empty() {
        println!();
        println!("{}", "=== Corrections ===".yellow().bold());
        for violation in &result.violations {
            println!("  {} {}", violation.rule.yellow(), violation.message.dimmed());
        }
    }

    println!();
    println!(
        "{}: {:.0}%  {}",
        "Confidence".white().bold(),
        bundle.metadata.confidence,
        format!("v{}", bundle.metadata.analysis_version).dimmed()
    );
}

fn print_emotions(bundle: &AnalysisBundle) {
    let emotions = &bundle.emotions;
    let tone = match emotions.tone {
        Tone::Positive => "positive".green().bold(),
        Tone::Negative => "negative".red().bold(),
        Tone::Neutral => "neutral".white().bold(),
    };
    println!("{}: {}", "Tone".white().bold(), tone);
    print_share_bar("Positive", emotions.pos, "green");
    print_share_bar("Negative", emotions.neg, "red");
    print_share_bar("Neutral", emotions.neu, "white");

    if bundle.hide_emotion_cards {
        println!("{}", "No emotions detected.".dimmed());
        return;
    }
    for label in &emotions.labels {
        println!(
            "  {:12} intensity {:>3.0}  arousal {:.2}",
            label.tag, label.intensity, label.arousal
        );
    }
}

fn print_sleep_and_realism(bundle: &AnalysisBundle) {
    let sleep = &bundle.sleep;
    match (bundle.hide_sleep_percentages, sleep.prob) {
        (false, Some(prob)) => println!(
            "{}: {} ({:.0}% REM probability)",
            "Sleep Stage".white().bold(),
            sleep.stage,
            prob
        ),
        _ => println!("{}: {}", "Sleep Stage".white().bold(), sleep.stage),
    }
    println!(
        "  vividness {:.0}  intensity {:.0}  coherence {:.0}",
        sleep.vividness, sleep.emotional_intensity, sleep.narrative_coherence
    );

    let p = &bundle.plausibility;
    println!(
        "{}: {:.0}% (logical {:.0}, physical {:.0}, social {:.0}, bizarreness {:.0})",
        "Realism".white().bold(),
        p.overall,
        p.logical,
        p.physical,
        p.social,
        p.bizarreness
    );
    if bundle.has_metamorphosis {
        println!("  {}", "Metamorphosis detected".magenta());
    }
}

fn print_entities_and_themes(bundle: &AnalysisBundle) {
    if bundle.entities.is_empty() {
        println!("{}", "No entities found.".dimmed());
    } else {
        println!("{}", "Entities".white().bold());
        for category in EntityCategory::ALL {
            let values = bundle.entities.category(category);
            if !values.is_empty() {
                println!("  {:8} {}", category.as_str(), values.join(", "));
            }
        }
    }

    if bundle.themes.is_empty() {
        return;
    }
    println!("{}", "Themes".white().bold());
    for theme in &bundle.themes {
        let name = theme.label.as_deref().unwrap_or(&theme.id);
        match theme.score_norm {
            Some(score) => println!("  {:16} {:>5.1}  strength {}", name, score, theme.strength),
            None => println!("  {:16}     -  strength {}", name, theme.strength),
        }
    }
}

fn print_share_bar(label: &str, percentage: f64, color: &str) {
    let bar_width: usize = 30;
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "red" => bar.red(),
        _ => bar.white(),
    };

    println!("  {:10} [{:30}] {:>5.1}%", label, colored_bar, percentage);
}

/// Run detect command
fn run_detect(file: Option<PathBuf>) -> anyhow::Result<()> {
    let text = read_input(file.as_deref())?;
    let detectors = LexiconDetectors::new(Arc::new(Lexicon::new()?));

    println!("{}", "=== Text Detectors ===".cyan().bold());
    println!();
    let yes_no = |b: bool| if b { "yes".green() } else { "no".dimmed() };
    println!("{}: {}", "Metamorphosis".white().bold(), yes_no(detectors.detect_metamorphosis(&text)));
    println!("{}: {}", "Dialogue".white().bold(), yes_no(detectors.detect_dialogue(&text)));
    println!(
        "{}: {}",
        "Emotional Content".white().bold(),
        yes_no(detectors.detect_emotional_content(&text))
    );
    println!("{}: {:.0}", "Bizarreness".white().bold(), detectors.detect_bizarreness(&text));

    let entities = detectors.extract_entities(&text);
    for category in EntityCategory::ALL {
        let values = entities.category(category);
        if !values.is_empty() {
            println!("  {:8} {}", category.as_str(), values.join(", "));
        }
    }
    Ok(())
}

/// Run config command
fn run_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = PipelineConfig::load(path.as_deref())?;

    println!("{}", "=== Pipeline Configuration ===".cyan().bold());
    match path.or_else(PipelineConfig::default_path) {
        Some(p) => println!("{}: {}", "Config File".white().bold(), p.display()),
        None => println!("{}", "No platform config directory".dimmed()),
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
