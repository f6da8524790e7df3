//! Command dispatch: wires parsed arguments to the services

use std::io::{self, Read};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::TreeSource;
use crate::cli::args::{Cli, Commands, LayoutFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::AnyTree;
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::graphviz::to_dot;
use crate::infrastructure::InfraError;

/// Run the parsed command line; returns the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    if let Commands::Completion { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(exitcode::OK);
    }

    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };
    let settings = Settings::load(Some(&config_dir))?;
    let container = ServiceContainer::new(settings);
    run(cli, &container)
}

/// Dispatch against an explicit container.
#[instrument(level = "debug", skip(cli, container), fields(command = ?cli.command))]
pub fn run(cli: &Cli, container: &ServiceContainer) -> CliResult<i32> {
    match &cli.command {
        Commands::Show { file } => {
            let tree = load(cli, container, file)?;
            output::info(tree.to_text_tree());
        }
        Commands::Traverse { file, order } => {
            let tree = load(cli, container, file)?;
            let values = tree.values((*order).into());
            output::info(values.iter().join(" "));
        }
        Commands::Compare { left, right } => return compare(cli, container, left, right),
        Commands::Colorize { file, color } => {
            let tree = load(cli, container, file)?;
            let recolored = tree.colorize((*color).into());
            output::info(recolored.to_json_pretty());
        }
        Commands::Layout {
            file,
            sentinels,
            no_sentinels,
            format,
            title,
        } => {
            let tree = load(cli, container, file)?;
            let show = match (*sentinels, *no_sentinels) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let service = container.diagram_service();
            let graph = service.layout(&tree, &service.options(title.as_deref(), show))?;
            match format {
                LayoutFormat::Json => {
                    let json = serde_json::to_string_pretty(&graph)
                        .map_err(|e| CliError::Usage(format!("cannot serialize layout: {e}")))?;
                    output::info(json);
                }
                LayoutFormat::Dot => output::info(to_dot(&graph, &container.settings.render)),
            }
        }
        Commands::Render {
            file,
            output: path,
            title,
            base64,
        } => {
            let tree = load(cli, container, file)?;
            let service = container.diagram_service();
            if *base64 {
                output::info(service.render_base64(&tree, title.as_deref())?);
            } else if let Some(path) = path {
                service.save(&tree, path, title.as_deref())?;
                output::success(format!("Saved {}", path.display()));
            } else {
                return Err(CliError::InvalidArgs("--output or --base64 required".into()));
            }
        }
        Commands::View { file, title } => {
            let tree = load(cli, container, file)?;
            let path = container.diagram_service().display(&tree, title.as_deref())?;
            output::action("Opened", path.display());
        }
        Commands::Config { template } => {
            if *template {
                output::info(Settings::template());
            } else {
                output::info(container.settings.to_toml()?);
            }
        }
        Commands::Completion { .. } => {
            return Err(CliError::Usage("completion is handled before dispatch".into()))
        }
    }
    Ok(exitcode::OK)
}

fn compare(cli: &Cli, container: &ServiceContainer, left: &str, right: &str) -> CliResult<i32> {
    let a = load(cli, container, left)?;
    let b = load(cli, container, right)?;

    let shallow = a.roots_equal(&b);
    let deep = a.is_equal_including_subtrees(&b);
    debug!(shallow, deep, "compared");

    output::detail(format!("roots equal: {shallow}"));
    if deep {
        output::success("trees are equal");
        Ok(exitcode::OK)
    } else {
        output::failure("trees differ");
        Ok(exitcode::DIFFERENT)
    }
}

/// Resolve a file argument; `-` reads stdin.
fn source(arg: &str) -> CliResult<TreeSource> {
    if arg == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| InfraError::io("read stdin", e))?;
        Ok(TreeSource::Inline(text))
    } else {
        Ok(TreeSource::File(PathBuf::from(arg)))
    }
}

fn load(cli: &Cli, container: &ServiceContainer, arg: &str) -> CliResult<AnyTree> {
    let source = source(arg)?;
    Ok(container
        .tree_service()
        .load(&source, cli.variant.kind(), cli.pointer.as_deref())?)
}
