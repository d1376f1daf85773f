//! Command dispatch: wires configuration, discovery, and the pipeline
//! together for each CLI command.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::args::{Arguments, CollectCommand, Command};
use crate::config::{CONFIG_FILE_NAME, Config, default_config_json, load_config};
use crate::core::{
    ArgPosition, FileStemResolver, JsonCollector, LiteralResolver, NamespaceResolver, Pipeline,
    PipelineOptions,
};
use crate::discovery::discover_files;
use crate::logger::{ConsoleLogger, LogSink};
use crate::report;

pub fn run(Arguments { command }: Arguments) -> Result<()> {
    match command {
        Some(Command::Collect(cmd)) => collect(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn collect(cmd: CollectCommand) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let root = cmd.args.common.source_root.clone().unwrap_or(cwd);
    let logger = ConsoleLogger::new(cmd.args.common.verbose);

    let loaded = load_config(&root)?;
    if !loaded.from_file {
        logger.debug(
            "no {file} found, using defaults",
            &[("file", CONFIG_FILE_NAME.to_string())],
        );
    }
    let mut config = loaded.config;
    apply_overrides(&mut config, &cmd);
    config.validate()?;

    let files = discover_files(&root, &config)?;
    logger.debug(
        "discovered {count} source files under {root}",
        &[
            ("count", files.len().to_string()),
            ("root", root.display().to_string()),
        ],
    );

    let resolver: Box<dyn NamespaceResolver> = if config.namespace_from_path {
        Box::new(FileStemResolver)
    } else {
        Box::new(LiteralResolver)
    };

    let output_dir = root.join(&config.output_dir);
    let collector = JsonCollector::new(&output_dir);
    let options = PipelineOptions {
        tag_name: config.tag_name.clone(),
        arg_position: ArgPosition::from_index(config.translation_arg_position)
            .context("'translationArgPosition' must be 1 or 2")?,
        library: config.is_library,
        output_dir,
        language: config.base_language_code.clone(),
        package_name: config
            .package_name
            .clone()
            .unwrap_or_else(|| project_name(&root)),
        clean: cmd.args.clean,
        regenerate: !cmd.args.no_regenerate,
        from_library: false,
    };

    let pipeline = Pipeline::new(options, resolver.as_ref(), &collector, &logger)?;
    let run_report = pipeline.run(&files)?;
    report::print_summary(&run_report);

    Ok(())
}

fn apply_overrides(config: &mut Config, cmd: &CollectCommand) {
    if let Some(output_dir) = &cmd.args.common.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(tag_name) = &cmd.args.common.tag_name {
        config.tag_name = tag_name.clone();
    }
}

fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "taglet-project".to_string())
}

fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, default_config_json()?)?;
    println!("Created {}", CONFIG_FILE_NAME);
    Ok(())
}
