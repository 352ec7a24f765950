use crate::cli::RunArgs;
use crate::config::{PartialRunConfig, RunMode};
use crate::display::{TableReporter, print_summary};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use mimpp::{
    core::fragment::StandardFragmenters,
    core::io::{derivative, traits::MolecularFile, xyz::XyzFile},
    core::methods::MethodRegistry,
    engine::progress::ProgressReporter,
    workflows::{self, mim::MimContext},
};
use tracing::info;

pub fn run(args: RunArgs, threads: Option<usize>, quiet: bool) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args, threads)?;

    info!("Loading input geometry from {:?}", &args.input);
    let (system, metadata) =
        XyzFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
    if system.is_empty() {
        return Err(CliError::Argument(format!(
            "Input geometry '{}' contains no atoms.",
            args.input.display()
        )));
    }
    info!(
        atoms = system.len(),
        charge = system.charge(),
        multiplicity = system.multiplicity(),
        comment = %metadata.comment,
        "Geometry loaded."
    );

    let methods = MethodRegistry::with_builtin();
    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let progress = ProgressReporter::with_callback(progress_handler.get_callback());
    let tables = TableReporter::stdout();
    let context = MimContext::new(&methods, &StandardFragmenters, &tables, &progress);

    println!("Starting MIM computation (derivative order {})...", config.order);
    let result = match &config.mode {
        RunMode::Mim(mim_config) => {
            info!("Invoking the MIM workflow...");
            workflows::mim::run(&system, mim_config, config.order, &context)?
        }
        RunMode::Mbe(mbe_config) => {
            info!(
                "Invoking the MBE workflow (truncation {})...",
                mbe_config.truncation
            );
            workflows::mbe::run(&system, mbe_config, config.order, &context)?
        }
    };

    print_summary(result.order, system.len(), &result.derivative);

    if let Some(output) = &args.output {
        info!("Writing accumulated derivative to {:?}", output);
        derivative::write_csv_to_path(output, &system, &result.derivative, result.order).map_err(
            |e| CliError::FileParsing {
                path: output.clone(),
                source: e.into(),
            },
        )?;
        println!("✓ Derivative written to: {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const TRIMER: &str = "3\nargon trimer\nAr 0.0 0.0 0.0\nAr 3.8 0.0 0.0\nAr 1.9 3.3 0.0\n";

    fn args_for(dir: &Path, config: &str, extra: &[&str]) -> RunArgs {
        let input = dir.join("trimer.xyz");
        let config_path = dir.join("config.toml");
        fs::write(&input, TRIMER).unwrap();
        fs::write(&config_path, config).unwrap();
        let mut argv = vec![
            "mim".to_string(),
            "run".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c".to_string(),
            config_path.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
        }
    }

    #[test]
    fn gradient_run_writes_csv() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("gradient.csv").display().to_string();
        let args = args_for(
            dir.path(),
            r#"
            methods = ["lennard-jones"]
            basis-sets = ["argon"]
            order = 1
            [mbe]
            truncation = 2
            "#,
            &["-o", &output],
        );
        run(args, Some(2), true).unwrap();
        let csv = fs::read_to_string(&output).unwrap();
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn missing_input_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let mut args = args_for(
            dir.path(),
            "methods = [\"lennard-jones\"]\nweights = [1.0]\n",
            &[],
        );
        args.input = dir.path().join("absent.xyz");
        assert!(matches!(run(args, None, true), Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn unknown_method_fails_the_run() {
        let dir = tempdir().unwrap();
        let args = args_for(dir.path(), "methods = [\"ccsd\"]\nweights = [1.0]\n", &[]);
        assert!(matches!(run(args, None, true), Err(CliError::Core(_))));
    }
}
