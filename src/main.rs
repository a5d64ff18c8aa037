use std::env;

use anyhow::{anyhow, Result};
use log::{error, info};

use gl_cookbook::app::{self, BootstrapError};
use gl_cookbook::config::AppConfig;
use gl_cookbook::recipes::{self, DEFAULT_RECIPE};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run(env::args().skip(1)) {
        if err.downcast_ref::<BootstrapError>().is_some() {
            error!("{}", err);
            std::process::exit(-1);
        }
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }
}

fn run<I: Iterator<Item = String>>(args: I) -> Result<()> {
    let options = CliOptions::parse(args)?;
    if options.list {
        for entry in recipes::RECIPES {
            println!("{:<16} {}", entry.name, entry.title);
        }
        return Ok(());
    }

    let entry = recipes::find(&options.recipe).ok_or_else(|| {
        anyhow!(
            "Unknown recipe: {}. Expected one of: {}",
            options.recipe,
            recipes::names().collect::<Vec<_>>().join(", ")
        )
    })?;
    let config = AppConfig::from_env().with_title(entry.title);
    info!("assets from {}", config.asset_root.display());
    app::run(config, entry.build)
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    recipe: String,
    list: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(args: I) -> Result<Self> {
        let mut recipe = None;
        let mut list = false;
        for arg in args {
            match arg.as_str() {
                "--list" => list = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {}. Usage: gl-cookbook [RECIPE] [--list]", other));
                }
                other => {
                    if let Some(previous) = recipe.replace(other.to_owned()) {
                        return Err(anyhow!("Only one recipe can run at a time, got {} and {}", previous, other));
                    }
                }
            }
        }
        Ok(CliOptions {
            recipe: recipe.unwrap_or_else(|| DEFAULT_RECIPE.to_owned()),
            list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_default_recipe() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.recipe, DEFAULT_RECIPE);
        assert!(!options.list);
    }

    #[test]
    fn recipe_and_list_flag() {
        let options = parse(&["lightcasters", "--list"]).unwrap();
        assert_eq!(
            options,
            CliOptions {
                recipe: "lightcasters".to_owned(),
                list: true,
            }
        );
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = parse(&["--fullscreen"]).unwrap_err();
        assert!(err.to_string().contains("--fullscreen"));
    }

    #[test]
    fn two_recipes_are_rejected() {
        assert!(parse(&["triangle", "camera"]).is_err());
    }

    #[test]
    fn unknown_recipe_fails_before_opening_a_window() {
        let err = run(vec!["teapot".to_owned()].into_iter()).unwrap_err();
        assert!(err.to_string().starts_with("Unknown recipe: teapot"));
        assert!(err.downcast_ref::<BootstrapError>().is_none());
    }
}
