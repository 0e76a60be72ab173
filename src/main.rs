// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use locflow::app_config::{Config, LogLevel};
use locflow::file_utils::FileManager;
use locflow::filter::{FilterRegistry, OutputTarget, PlainTextFilter, SharedBuffer};
use locflow::pipeline::{
    BatchItemContext, BatchReport, EventSequenceValidator, FilterWriterStep, ParameterKind,
    ParameterValue, Pipeline, PipelineDriver, PseudoTranslateStep, RawDocumentToEventsStep,
    TargetSegmentSyncStep,
};
use locflow::resource::RawDocument;
use locflow::{Event, get_language_name};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the text units of documents
    Extract(ExtractArgs),

    /// Read and rewrite documents without changes and check the output is identical
    Roundtrip(InputArgs),

    /// Pseudo-translate documents into output files
    Pseudo(PseudoArgs),

    /// Generate shell completions for locflow
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Input file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Source locale (e.g. 'en', 'en-US')
    #[arg(short, long)]
    source_locale: Option<String>,

    /// Filter configuration to read the documents with
    #[arg(long, default_value = PlainTextFilter::CONFIG_ID)]
    filter: String,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Show codes with their original markup instead of plain text
    #[arg(long)]
    with_codes: bool,
}

#[derive(Args, Debug)]
struct PseudoArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Target locale (e.g. 'fr', 'de-DE')
    #[arg(short, long)]
    target_locale: Option<String>,

    /// Output directory; defaults to the directory of each input
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// locflow - localization extraction and merge engine
///
/// Reads documents into translatable units and writes them back unchanged
/// outside the translated text.
#[derive(Parser, Debug)]
#[command(name = "locflow")]
#[command(version)]
#[command(about = "Localization extraction and merge engine")]
#[command(long_about = "locflow extracts translatable text from documents and writes them back.

EXAMPLES:
    locflow extract notes.txt                    # List the text units of a file
    locflow roundtrip docs/                      # Check every document rewrites identically
    locflow pseudo -t de -o out/ docs/           # Pseudo-translate a directory into out/
    locflow completions bash > locflow.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "locflow", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(&cli.config_path, cli.log_level)?;

    match cli.command {
        Commands::Extract(args) => {
            apply_input_overrides(&mut config, &args.input)?;
            run_extract(&config, &args)
        }
        Commands::Roundtrip(args) => {
            apply_input_overrides(&mut config, &args)?;
            run_roundtrip(&config, &args)
        }
        Commands::Pseudo(args) => {
            apply_input_overrides(&mut config, &args.input)?;
            if let Some(target) = &args.target_locale {
                config.target_locale = target.clone();
            }
            config.validate().context("Configuration validation failed")?;
            run_pseudo(&config, &args)
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(config_path: &str, cli_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    // Update log level in config if specified via command line
    match cli_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn apply_input_overrides(config: &mut Config, args: &InputArgs) -> Result<()> {
    if let Some(source) = &args.source_locale {
        config.source_locale = source.clone();
        config.validate().context("Configuration validation failed")?;
    }
    Ok(())
}

fn registry_for(config: &Config) -> Arc<FilterRegistry> {
    let mut registry = FilterRegistry::with_defaults();
    registry.register_plaintext(config.plaintext_parameters());
    Arc::new(registry)
}

fn extensions_for(filter: &str) -> &'static [&'static str] {
    match filter {
        PlainTextFilter::CONFIG_ID => &["txt", "text"],
        _ => &[],
    }
}

fn collect_documents(config: &Config, args: &InputArgs) -> Result<Vec<PathBuf>> {
    let inputs = FileManager::collect_inputs(&args.input_path, extensions_for(&args.filter))?;
    if inputs.is_empty() {
        return Err(anyhow!("No documents found in {:?}", args.input_path));
    }
    let name = |locale: &str| {
        locflow::locale::LocaleId::new(locale)
            .ok()
            .and_then(|id| get_language_name(id.language()).ok())
            .unwrap_or_else(|| locale.to_string())
    };
    info!(
        "Found {} documents ({} -> {})",
        inputs.len(),
        name(&config.source_locale),
        name(&config.target_locale)
    );
    Ok(inputs)
}

fn raw_document(config: &Config, args: &InputArgs, path: &Path) -> Result<RawDocument> {
    Ok(RawDocument::from_path(path, config.source_locale_id()?)
        .with_target_locale(config.target_locale_id()?)
        .with_encoding(&config.default_encoding)
        .with_filter(&args.filter))
}

fn progress_bar(total: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("=> "));
    progress_bar
}

fn run_batch(mut driver: PipelineDriver, total: usize) -> BatchReport {
    let bar = progress_bar(total);
    let callback_bar = bar.clone();
    driver = driver.with_progress(Box::new(move |done, _total, document| {
        callback_bar.set_position(done as u64);
        callback_bar.set_message(document.to_string());
    }));
    let report = driver.process_batch();
    bar.finish_and_clear();
    report
}

fn report_failures(report: &BatchReport) -> Result<()> {
    for (document, error) in report.failures() {
        error!("{}: {}", document, error);
    }
    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow!("Batch did not complete: {}", report.summary()))
    }
}

fn run_extract(config: &Config, args: &ExtractArgs) -> Result<()> {
    let registry = registry_for(config);
    let inputs = collect_documents(config, &args.input)?;

    let mut stdout = std::io::stdout();
    for path in inputs {
        let document = raw_document(config, &args.input, &path)?;
        let mut filter = registry.create(&args.input.filter)?;
        filter.open(&document)?;

        let mut units = 0;
        while filter.has_next() {
            if let Event::TextUnit(tu) = filter.next()? {
                let text = if args.with_codes {
                    tu.source().to_string()
                } else {
                    tu.source().plain_text()
                };
                writeln!(stdout, "{}\t{}\t{}", path.display(), tu.id, text)?;
                units += 1;
            }
        }
        filter.close();
        info!("{}: {} text units", path.display(), units);
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn run_roundtrip(config: &Config, args: &InputArgs) -> Result<()> {
    let registry = registry_for(config);
    let inputs = collect_documents(config, args)?;

    let mut writer = FilterWriterStep::new(Arc::clone(&registry));
    if let Some(line_break) = &config.line_break {
        writer = writer.with_line_break(line_break);
    }
    let pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(&registry), &args.filter))
        .with_step(EventSequenceValidator::new())
        .with_step(writer);

    let mut driver = PipelineDriver::new(pipeline);
    let mut buffers: Vec<(PathBuf, SharedBuffer)> = Vec::new();
    for path in &inputs {
        let (target, buffer) = OutputTarget::buffer();
        // Output in the source locale so language properties stay untouched
        let item = BatchItemContext::new(raw_document(config, args, path)?)
            .with_parameter(
                ParameterKind::TargetLocale,
                ParameterValue::Locale(config.source_locale_id()?),
            )
            .with_output(target);
        driver.add_item(item);
        buffers.push((path.clone(), buffer));
    }

    let report = run_batch(driver, inputs.len());

    let mut mismatches = 0;
    for (outcome, (path, buffer)) in report.outcomes.iter().zip(&buffers) {
        if !outcome.is_success() {
            continue;
        }
        let original = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let input_hash = sha256_hex(&original);
        let output_hash = sha256_hex(&buffer.lock());
        if input_hash == output_hash {
            info!("{}: identical ({})", path.display(), input_hash);
        } else {
            mismatches += 1;
            warn!("{}: differs ({} -> {})", path.display(), input_hash, output_hash);
        }
    }

    info!("{}", report.summary());
    report_failures(&report)?;
    if mismatches > 0 {
        return Err(anyhow!("{} documents were not rewritten identically", mismatches));
    }
    Ok(())
}

fn run_pseudo(config: &Config, args: &PseudoArgs) -> Result<()> {
    let registry = registry_for(config);
    let inputs = collect_documents(config, &args.input)?;
    let target_locale = config.target_locale_id()?;

    let mut writer = FilterWriterStep::new(Arc::clone(&registry));
    if let Some(line_break) = &config.line_break {
        writer = writer.with_line_break(line_break);
    }
    let pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(&registry), &args.input.filter))
        .with_step(PseudoTranslateStep::new(
            &config.pseudo.prefix,
            &config.pseudo.suffix,
            config.pseudo.expand_ratio,
        ))
        .with_step(TargetSegmentSyncStep::new(config.segmentation.mismatch_policy))
        .with_step(writer);

    let mut driver = PipelineDriver::new(pipeline);
    let mut queued = 0;
    for path in &inputs {
        let output_dir = match &args.output_dir {
            Some(dir) => dir.clone(),
            None => path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        let output = FileManager::generate_output_path(path, &output_dir, target_locale.as_str());
        if output.exists() && !args.force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output);
            continue;
        }

        let mut item = BatchItemContext::new(raw_document(config, &args.input, path)?)
            .with_output(OutputTarget::Path(output));
        if let Some(encoding) = &config.output_encoding {
            item = item.with_parameter(ParameterKind::OutputEncoding, ParameterValue::Text(encoding.clone()));
        }
        driver.add_item(item);
        queued += 1;
    }

    if queued == 0 {
        info!("Nothing to do");
        return Ok(());
    }

    let report = run_batch(driver, queued);
    info!("{}", report.summary());
    report_failures(&report)
}
