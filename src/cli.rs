use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stylekit::render::{render_diagnostic, render_summary};
use stylekit::{decode, Color, Config, Expander, Expansion, ExpansionReport, Summary};

/// Expand SwiftUI styling macros into plain Swift
#[derive(Parser, Debug)]
#[command(name = "stylekit")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./stylekit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging; repeat for more detail. RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Expand every macro in a Swift file
    Expand {
        file: PathBuf,

        /// Write the expanded source here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Report diagnostics without writing anything
    Check {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Apply every suggested fix-it
    Fix {
        file: PathBuf,

        /// Rewrite the file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },

    /// Decode a hex color the way `#color` does
    Decode { hex: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Expand {
            file,
            output,
            format,
        } => {
            let expander = expander(cli.config.as_deref(), &file)?;
            let (source, expansion) = expand_file(&expander, &file)?;

            if let Some(output) = &output {
                std::fs::write(output, &expansion.source)
                    .with_context(|| format!("failed to write {}", output.display()))?;
                tracing::info!(output = %output.display(), "wrote expanded source");
            }

            let failed = expansion.has_errors();
            match format {
                Format::Json => {
                    let report = ExpansionReport::new(display(&file), expansion, output.is_none());
                    println!("{}", report.to_json()?);
                }
                Format::Text => {
                    print_diagnostics(&file, &source, &expansion);
                    if output.is_none() {
                        print!("{}", expansion.source);
                    }
                }
            }
            Ok(exit_code(failed))
        }

        Command::Check { file, format } => {
            let expander = expander(cli.config.as_deref(), &file)?;
            let (source, expansion) = expand_file(&expander, &file)?;
            let failed = expansion.has_errors();
            match format {
                Format::Json => {
                    let report = ExpansionReport::new(display(&file), expansion, false);
                    println!("{}", report.to_json()?);
                }
                Format::Text => {
                    print_diagnostics(&file, &source, &expansion);
                    eprintln!("{}", render_summary(&Summary::of(&expansion.diagnostics)));
                }
            }
            Ok(exit_code(failed))
        }

        Command::Fix { file, in_place } => {
            let expander = expander(cli.config.as_deref(), &file)?;
            let source = read(&file)?;
            let fixed = expander.fix(&source)?;

            if in_place {
                if fixed != source {
                    std::fs::write(&file, &fixed)
                        .with_context(|| format!("failed to write {}", file.display()))?;
                    eprintln!("fixed {}", file.display());
                } else {
                    eprintln!("nothing to fix in {}", file.display());
                }
            } else {
                print!("{fixed}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Decode { hex } => {
            let components = decode(&hex)?;
            let color = Color::from_components(components);
            println!("{color}");
            println!(
                "red: {}, green: {}, blue: {}, opacity: {}",
                components.red, components.green, components.blue, components.opacity
            );
            println!(
                "normalized: {:.4}, {:.4}, {:.4}, {:.4}",
                color.red, color.green, color.blue, color.opacity
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn expander(config: Option<&Path>, file: &Path) -> Result<Expander> {
    let dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = Config::discover(config, dir)?;
    Ok(Expander::from_config(&config))
}

fn read(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn expand_file(expander: &Expander, file: &Path) -> Result<(String, Expansion)> {
    let source = read(file)?;
    let expansion = expander
        .expand(&source)
        .with_context(|| format!("failed to expand {}", file.display()))?;
    Ok((source, expansion))
}

fn print_diagnostics(file: &Path, source: &str, expansion: &Expansion) {
    let name = display(file);
    for diagnostic in &expansion.diagnostics {
        eprintln!("{}", render_diagnostic(diagnostic, &name, source));
    }
}

fn display(file: &Path) -> String {
    file.display().to_string()
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_expand() {
        let cli = Cli::parse_from(["stylekit", "-vv", "expand", "View.swift", "--format", "json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Expand { file, output, format } => {
                assert_eq!(file, PathBuf::from("View.swift"));
                assert_eq!(output, None);
                assert_eq!(format, Format::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
