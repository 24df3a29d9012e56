use basil_web::api::{Backend, HttpBackend};
use basil_web::edit::{EditControls, EditOutcome};
use basil_web::index::ControlStates;
use basil_web::session::LoginCache;
use basil_web::types::TrimmedSeries;
use basil_web::{config, generate, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "basil-web")]
#[command(about = "Static page generator for archived Discord snippet series")]
#[command(long_about = "\
Static page generator for archived Discord snippet series

Pages are built from the backend's JSON API:

  dist/
  ├── index.html                 # Every series, grouped by title and by author
  ├── series/{tag}.html          # One full series (from a series JSON document)
  └── snippet/{id}.html          # One snippet's markdown

Editable series (as reported by the API for the configured session) get
inline edit and delete controls. The 'edit' and 'delete' commands drive the
same controls from the command line and regenerate the index on success.

Run 'basil-web gen-config' to generate a documented basil.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "basil.toml", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Backend base URL (overrides api.base_url)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the series index
    Index,
    /// Write the page for a full series JSON document
    Series {
        /// Series JSON file, as returned by the backend
        file: PathBuf,
    },
    /// Fetch a snippet and write its page
    Snippet {
        /// Discord message id of the snippet
        id: u64,
    },
    /// Show who the configured session is logged in as
    Whoami,
    /// Change a series' tag and/or title
    Edit {
        /// Current tag of the series
        tag: String,
        /// New tag
        #[arg(long = "tag", value_name = "NEW")]
        new_tag: Option<String>,
        /// New title
        #[arg(long, value_name = "NEW")]
        title: Option<String>,
    },
    /// Delete a series
    Delete {
        /// Tag of the series
        tag: String,
    },
    /// Print a stock basil.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut config = config::load_config(&cli.config)?;
    if let Some(api) = &cli.api {
        config.api.base_url = api.clone();
        config.validate()?;
    }
    let backend = HttpBackend::new(&config.api.base_url, config.api.session_cookie.clone());
    let login = LoginCache::new();

    match cli.command {
        Command::Index => {
            let (path, series) =
                generate::generate_index(&config, &backend, &login, &ControlStates::new(), &cli.output)?;
            output::print_index_output(&series, &path);
        }
        Command::Series { file } => {
            let series = generate::load_series(&file)?;
            let path = generate::generate_series(&config, &series, &backend, &login, &cli.output)?;
            output::print_series_output(&series, &path);
        }
        Command::Snippet { id } => {
            let path = generate::generate_snippet(&config, id, &backend, &login, &cli.output)?;
            output::print_snippet_output(id, &path);
        }
        Command::Whoami => {
            output::print_login(login.get_or_fetch(&backend)?);
        }
        Command::Edit {
            tag,
            new_tag,
            title,
        } => {
            let mut controls = editable_series(&backend, &tag)?;
            if new_tag.is_some() {
                controls.start_edit_tag();
            } else {
                controls.start_edit_title();
            }
            if let Some(new_tag) = new_tag {
                controls.set_tag_input(new_tag);
            }
            if let Some(title) = title {
                controls.set_title_input(title);
            }
            let outcome = controls.save(&backend)?;
            finish_edit(&config, &backend, &login, controls, &outcome, &cli.output)?;
        }
        Command::Delete { tag } => {
            let mut controls = editable_series(&backend, &tag)?;
            controls.start_delete();
            let outcome = controls.confirm_delete(&backend)?;
            finish_edit(&config, &backend, &login, controls, &outcome, &cli.output)?;
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Edit controls for the series tagged `tag`, which must be editable.
fn editable_series(
    backend: &dyn Backend,
    tag: &str,
) -> Result<EditControls, Box<dyn std::error::Error>> {
    let listing: Vec<TrimmedSeries> = backend.list_series()?;
    let series = listing
        .iter()
        .find(|s| s.tag == tag)
        .ok_or_else(|| format!("no series tagged {tag:?}"))?;
    if !series.can_edit {
        return Err(format!("series {tag:?} is not editable with this session").into());
    }
    Ok(EditControls::new(series))
}

/// Report the outcome and regenerate the index. A failed change is rendered
/// inline on the entry and ends the process with a non-zero status.
fn finish_edit(
    config: &config::SiteConfig,
    backend: &dyn Backend,
    login: &LoginCache,
    controls: EditControls,
    outcome: &EditOutcome,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let tag = controls.tag().to_string();
    output::print_edit_outcome(&tag, outcome);

    match outcome {
        EditOutcome::Unchanged => Ok(()),
        EditOutcome::Reload => {
            let (path, series) =
                generate::generate_index(config, backend, login, &ControlStates::new(), output_dir)?;
            output::print_index_output(&series, &path);
            Ok(())
        }
        EditOutcome::Failed(_) => {
            let states = ControlStates::from([(tag, controls)]);
            generate::generate_index(config, backend, login, &states, output_dir)?;
            std::process::exit(1);
        }
    }
}
