//! Command-line surface: one subcommand per remote operation, plus a local
//! extraction preview and the interactive shell.

pub mod render;
pub mod shell;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use gfilesearch::files::extract;
use gfilesearch::{Config, GeminiClient, QueryEngine, RemoteFiles, Session};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "gfilesearch",
    version,
    about = "Upload documents to Gemini and search their content in natural language."
)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API key; overrides GOOGLE_API_KEY and the config file
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Starts the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload one or more files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Display name (single file only)
        #[arg(long)]
        name: Option<String>,
        /// Wait until the service finishes processing each file
        #[arg(long)]
        wait: bool,
    },
    /// List files stored on the service
    List,
    /// Show one remote file
    Get { file_id: String },
    /// Ask a question about an uploaded file
    Search {
        file_id: String,
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Print the model's reply without parsing it
        #[arg(long)]
        raw: bool,
        /// Write the search history JSON to this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },
    /// Delete a remote file
    Delete { file_id: String },
    /// Print the text extracted locally from a file
    Extract {
        path: PathBuf,
        /// Only print the first N characters
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Interactive session
    Shell,
    /// Generate shell completions
    Completions { shell: Shell },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())
            .context("failed to load configuration")?
            .with_api_key(self.api_key);

        match self.command {
            None | Some(Commands::Shell) => shell::run(config),
            Some(Commands::Extract { path, limit }) => run_extract(&path, limit),
            Some(Commands::Completions { shell }) => {
                clap_complete::generate(
                    shell,
                    &mut Cli::command(),
                    "gfilesearch",
                    &mut std::io::stdout(),
                );
                Ok(())
            }
            Some(Commands::Upload { paths, name, wait }) => {
                if name.is_some() && paths.len() > 1 {
                    bail!("--name can only be used with a single file");
                }
                run_upload(&connect(&config)?, &config, &paths, name.as_deref(), wait)
            }
            Some(Commands::List) => run_list(&connect(&config)?),
            Some(Commands::Get { file_id }) => {
                let file = connect(&config)?.get(&file_id)?;
                println!("{}", render::file_details(&file));
                Ok(())
            }
            Some(Commands::Search {
                file_id,
                query,
                raw,
                export,
            }) => run_search(
                &connect(&config)?,
                &file_id,
                &query.join(" "),
                raw,
                export.as_deref(),
            ),
            Some(Commands::Delete { file_id }) => {
                connect(&config)?.delete(&file_id)?;
                println!("File deleted successfully: {}", file_id);
                Ok(())
            }
        }
    }
}

/// Non-interactive commands treat a missing credential as fatal.
fn connect(config: &Config) -> Result<GeminiClient> {
    Ok(GeminiClient::from_config(config)?)
}

fn run_list(client: &GeminiClient) -> Result<()> {
    let files = client.list().context("failed to list files")?;
    if files.is_empty() {
        println!("No files found.");
    }
    for file in &files {
        println!("{}", render::file_line(file));
    }
    Ok(())
}

fn run_upload(
    client: &GeminiClient,
    config: &Config,
    paths: &[PathBuf],
    name: Option<&str>,
    wait: bool,
) -> Result<()> {
    let total = paths.len();
    let mut failed = 0;

    for (i, path) in paths.iter().enumerate() {
        println!("[{}/{}] Uploading {}...", i + 1, total, path.display());
        let uploaded = client.upload(path, name).and_then(|handle| {
            if wait {
                client.wait_until_active(&handle.id, config.timeout(), config.poll_interval())
            } else {
                Ok(handle)
            }
        });
        match uploaded {
            Ok(handle) => println!("File uploaded: {}", render::file_line(&handle)),
            Err(e) => {
                failed += 1;
                eprintln!("Error uploading {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} upload(s) failed", failed, total);
    }
    Ok(())
}

fn run_search(
    client: &GeminiClient,
    file_id: &str,
    query: &str,
    raw: bool,
    export: Option<&Path>,
) -> Result<()> {
    let handle = client
        .get(file_id)
        .with_context(|| format!("cannot search {}", file_id))?;

    let mut session = Session::new(true);
    session.add_file(handle);
    let result = QueryEngine::new(client).search(query, session.files());
    let result = session.record(result);

    if raw {
        println!("{}", result.raw_response);
    } else {
        println!("{}", render::result_card(result));
    }
    let error = result.error.clone();

    if let Some(dir) = export {
        let path = session.export_to_dir(dir)?;
        println!("Search history exported to {}", path.display());
    }
    match error {
        Some(error) => bail!("search failed: {}", error),
        None => Ok(()),
    }
}

fn run_extract(path: &Path, limit: Option<usize>) -> Result<()> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    let text = extract::extract_path(path);
    match limit {
        Some(n) => println!("{}", text.chars().take(n).collect::<String>()),
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_collects_query_words() {
        let cli = Cli::try_parse_from([
            "gfilesearch",
            "search",
            "files/abc",
            "what",
            "does",
            "it",
            "say?",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Search { file_id, query, raw, .. }) => {
                assert_eq!(file_id, "files/abc");
                assert_eq!(query.join(" "), "what does it say?");
                assert!(!raw);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["gfilesearch", "search", "files/abc"]).is_err());
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["gfilesearch", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn missing_key_fails_remote_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "model = \"gemini-2.5-flash\"\n").unwrap();
        let config = Config::from_file(&config_path).unwrap();
        assert!(connect(&config).is_err());
    }

    #[test]
    fn extract_runs_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello world").unwrap();
        assert!(run_extract(&path, Some(5)).is_ok());
        assert!(run_extract(&dir.path().join("missing.txt"), None).is_err());
    }
}
