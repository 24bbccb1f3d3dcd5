//! Command handlers returning process exit codes

use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::cli::commands::ExtractArgs;
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::CheckdocConfig;
use crate::extract::Extractor;
use crate::fs::RealFileSystem;

pub fn handle_extract(args: &ExtractArgs, quiet: bool) -> i32 {
    info!("Starting check documentation extraction");

    let root = match &args.root {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to determine current directory: {}", e);
                return 1;
            }
        },
    };

    debug!("Checkout root: {}", root.display());

    if !root.exists() {
        error!("Checkout root does not exist: {}", root.display());
        return 1;
    }

    if !root.is_dir() {
        error!("Checkout root is not a directory: {}", root.display());
        return 1;
    }

    let root: PathBuf = match root.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize checkout root: {}", e);
            return 1;
        }
    };

    let mut config = CheckdocConfig::for_root(root);
    if let Some(templates_dir) = &args.templates_dir {
        config.templates_dir = templates_dir.clone();
    }
    if let Some(vars_dir) = &args.vars_dir {
        config.vars_dir = vars_dir.clone();
    }

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    debug!("Configuration: {}", config);

    let extractor = Extractor::new(RealFileSystem::new(), config);
    let docs = match extractor.extract() {
        Ok(docs) => docs,
        Err(e) => {
            error!("Extraction failed: {}", e);
            return 1;
        }
    };

    let format: OutputFormat = args.format.into();
    let formatter = OutputFormatter::new(format);

    let output = match formatter.format_multiple(&docs) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };

    if let Some(output_file) = &args.output {
        match std::fs::write(output_file, &output) {
            Ok(_) => {
                info!("Output written to: {}", output_file.display());
                if !quiet {
                    println!("Output written to: {}", output_file.display());
                }
            }
            Err(e) => {
                error!("Failed to write output to file: {}", e);
                return 1;
            }
        }
    } else {
        print!("{}", output);
    }

    0
}
