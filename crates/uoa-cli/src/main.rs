use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use uoa_core::{AppError, Config, ErrorMetadata, OrgHierarchy, PersonResolver};
use uoa_directory::{create_directory, lookup_person, resolve_all, Directory};

use uoa_cli::{
    error_report, init_tracing, log_error, render_paths, render_person, Sections,
    SEARCH_SEPARATOR,
};

#[derive(Parser, Debug)]
#[command(name = "uoa-groups")]
#[command(about = "UoA directory query tool")]
struct Cli {
    /// Departments workbook to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    departments: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
struct SectionArgs {
    /// Display groups
    #[arg(short, long)]
    groups: bool,

    /// Display roles
    #[arg(short, long)]
    roles: bool,

    /// Department entry in the directory (beware, this is usually not very reliable)
    #[arg(short, long)]
    department: bool,
}

impl From<SectionArgs> for Sections {
    fn from(args: SectionArgs) -> Self {
        Sections {
            groups: args.groups,
            roles: args.roles,
            department: args.department,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up one person by UPI
    Upi {
        #[arg(value_name = "UPI")]
        upi: String,

        #[command(flatten)]
        sections: SectionArgs,

        /// Print the person as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search people by name
    Search {
        #[arg(value_name = "SEARCH_TERM")]
        term: String,

        #[command(flatten)]
        sections: SectionArgs,
    },

    /// Find units by id or name and print their position in the hierarchy
    Group {
        #[arg(value_name = "GROUP")]
        group: String,

        /// Only match the exact unit id (case-insensitive)
        #[arg(long)]
        id: bool,
    },

    /// Display the complete unit hierarchy
    AllGroups {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<AppError>() {
                Some(app_err) => {
                    log_error(app_err);
                    eprintln!("{}", error_report(app_err));
                    app_err.exit_code()
                }
                None => {
                    tracing::error!(error = %err, "Command failed");
                    eprintln!("Error: {:#}", err);
                    1
                }
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env(cli.departments)?;
    tracing::debug!(
        departments = %config.departments_file.display(),
        ldap_url = %config.ldap.url,
        "Configuration loaded"
    );
    let hierarchy = uoa_core::load_hierarchy(&config.departments_file)?;

    match cli.command {
        Command::AllGroups { json } => {
            if json {
                print_json(&hierarchy.export())?;
            } else {
                println!();
                print!("{}", hierarchy.render_tree());
                println!();
            }
        }
        Command::Group { group, id } => {
            println!();
            let matches = if id {
                hierarchy.find_by_id(&group, true).into_iter().collect()
            } else {
                hierarchy.find_matching(&group, true)
            };
            print!("{}", render_paths(&hierarchy, &matches));
        }
        Command::Upi {
            upi,
            sections,
            json,
        } => {
            let directory = connect(&mut config).await?;
            let result =
                print_person(directory.as_ref(), &hierarchy, &upi, sections.into(), json).await;
            directory.close().await.map_err(AppError::from)?;
            result?;
        }
        Command::Search { term, sections } => {
            let directory = connect(&mut config).await?;
            let result =
                print_search(directory.as_ref(), &hierarchy, &term, sections.into()).await;
            directory.close().await.map_err(AppError::from)?;
            result?;
        }
    }

    Ok(())
}

async fn print_person(
    directory: &dyn Directory,
    hierarchy: &OrgHierarchy,
    upi: &str,
    sections: Sections,
    json: bool,
) -> Result<()> {
    let resolver = PersonResolver::new(hierarchy);
    let person = lookup_person(directory, &resolver, upi).await?;
    if json {
        print_json(&person.summary())?;
    } else {
        print!("{}", render_person(&person, sections));
    }
    Ok(())
}

async fn print_search(
    directory: &dyn Directory,
    hierarchy: &OrgHierarchy,
    term: &str,
    sections: Sections,
) -> Result<()> {
    let resolver = PersonResolver::new(hierarchy);
    let records = directory.search_by_name(term).await.map_err(AppError::from)?;
    for person in resolve_all(&resolver, &records) {
        print!("{}", render_person(&person, sections));
        println!("{}", SEARCH_SEPARATOR);
    }
    println!();
    Ok(())
}

/// Prompt for whatever credentials the configuration lacks, then bind.
async fn connect(config: &mut Config) -> Result<Arc<dyn Directory>> {
    if config.ldap.username.is_none() {
        let username: String = cliclack::input("LDAP username")
            .required(false)
            .interact()
            .context("Failed to read LDAP username")?;
        if username.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "No ldap username specified, exiting...".to_string(),
            )
            .into());
        }
        config.ldap.username = Some(username.trim().to_string());
    }

    if config.ldap.password.is_none() {
        let password = cliclack::password("LDAP password")
            .mask('▪')
            .interact()
            .context("Failed to read LDAP password")?;
        config.ldap.password = Some(password);
    }

    let directory = create_directory(&config.ldap)
        .await
        .map_err(AppError::from)?;
    tracing::debug!(backend = directory.backend_name(), "Directory connected");
    Ok(directory)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!();
    println!("{}", json);
    println!();
    Ok(())
}
