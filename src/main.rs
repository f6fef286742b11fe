use clap::Parser;
use config_assert::config::OutputFormat;
use config_assert::core::suite::StepStatus;
use config_assert::utils::{logger, validation::Validate};
use config_assert::{run_suite, CliConfig, ConfigFixture, RunOptions, SuiteConfig, SuiteReport};

const EXIT_FAILURES: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;

fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting config-assert");
    tracing::debug!("CLI config: {:?}", args);

    // 驗證參數
    if let Err(e) = args.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    tracing::info!("📁 Loading configuration fixture from: {}", args.config);
    let fixture = match ConfigFixture::from_file(&args.config) {
        Ok(fixture) => fixture,
        Err(e) => {
            eprintln!("❌ Failed to load config fixture '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML or JSON");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    tracing::info!("📁 Loading assertion suite from: {}", args.suite);
    let suite = match SuiteConfig::from_file(&args.suite).and_then(|suite| {
        suite.validate_with_module(args.module.as_deref())?;
        Ok(suite)
    }) {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("❌ Invalid assertion suite '{}': {}", args.suite, e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let options = RunOptions {
        module: args.module.clone(),
        fail_fast: args.fail_fast,
    };
    let report = run_suite(&fixture, &suite, &options);

    match args.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.is_success() {
        std::process::exit(EXIT_FAILURES);
    }

    Ok(())
}

fn print_report(report: &SuiteReport) {
    println!("📋 Suite: {}", report.suite);
    println!();

    for result in &report.results {
        let marker = match result.status {
            StepStatus::Passed => "✅",
            StepStatus::Failed => "❌",
            StepStatus::Error => "⚠️",
            StepStatus::Skipped => "⏭️",
        };
        println!(
            "{} #{} {:?} {}",
            marker, result.index, result.assertion, result.target
        );
        if let Some(detail) = &result.detail {
            for line in detail.lines() {
                println!("     {}", line);
            }
        }
    }

    let elapsed = report.finished_at - report.started_at;
    println!();
    println!(
        "{} passed, {} failed, {} errors, {} skipped ({} ms)",
        report.passed,
        report.failed,
        report.errors,
        report.skipped,
        elapsed.num_milliseconds()
    );
}
