use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use yaml_property_edit::{try_rename_property, DocumentTransform, Yaml};

#[derive(Parser)]
#[command(name = "yaml-property-edit")]
#[command(about = "Rename a dotted property in a YAML file, keeping its formatting")]
struct Cli {
    /// Leave nested single-entry mappings as they are
    #[arg(long)]
    no_coalesce: bool,

    /// Property to rename, e.g. spring.datasource.url
    old: String,

    /// New name of the property
    new: String,

    /// File to read (defaults to stdin)
    file: Option<PathBuf>,
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let rename = try_rename_property(&cli.old, &cli.new, !cli.no_coalesce)?;
    log::debug!("{:?}", rename);

    let text = read_input(cli.file.as_ref())?;
    let yaml = Yaml::from_str(&text).context("Input is not valid YAML")?;
    Ok(rename.transform_yaml(&yaml).to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    print!("{}", output);
    Ok(())
}
