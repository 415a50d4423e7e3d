//! Interactive session. Unlike the one-shot subcommands, a missing API key
//! here is recoverable: the user is prompted for one.

use super::render;
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use gfilesearch::config::API_KEY_ENV;
use gfilesearch::files::extract;
use gfilesearch::{Config, GeminiClient, QueryEngine, RemoteFiles, Session};
use std::path::PathBuf;

/// Characters of extracted text shown after an upload.
const PREVIEW_CHARS: usize = 200;
/// History entries shown by the history action.
const HISTORY_SHOWN: usize = 5;

#[derive(Clone, Copy)]
enum Action {
    Upload,
    Search,
    Files,
    LoadRemote,
    Delete,
    History,
    Export,
    ClearHistory,
    Quit,
}

const ACTIONS: &[(Action, &str)] = &[
    (Action::Upload, "Upload files"),
    (Action::Search, "Search documents"),
    (Action::Files, "Show session files"),
    (Action::LoadRemote, "Load files already on the service"),
    (Action::Delete, "Delete a file"),
    (Action::History, "Recent searches"),
    (Action::Export, "Export search history (JSON)"),
    (Action::ClearHistory, "Clear history"),
    (Action::Quit, "Quit"),
];

pub fn run(mut config: Config) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut session = Session::new(config.has_api_key());

    if !session.api_configured() {
        match prompt_for_key(&theme)? {
            Some(key) => config = config.with_api_key(Some(key)),
            None => {
                println!("No API key configured, leaving.");
                return Ok(());
            }
        }
    }

    let client = GeminiClient::from_config(&config)?;
    session.set_api_configured(true);
    println!(
        "{} {}",
        style("gfilesearch").bold().cyan(),
        style(format!("searching with {}", client.model())).dim()
    );

    let mut shell = Shell {
        client,
        config,
        session,
        theme,
    };
    shell.run_loop()
}

/// Ask for a key until one is given or the user gives up.
fn prompt_for_key(theme: &ColorfulTheme) -> Result<Option<String>> {
    println!(
        "{} No API key found. Set {} or enter one now.",
        style("!").yellow().bold(),
        API_KEY_ENV
    );
    loop {
        let key = Password::with_theme(theme)
            .with_prompt("Google API key")
            .allow_empty_password(true)
            .interact()?;
        if !key.trim().is_empty() {
            return Ok(Some(key.trim().to_string()));
        }
        let retry = Confirm::with_theme(theme)
            .with_prompt("An API key is required. Try again?")
            .default(true)
            .interact()?;
        if !retry {
            return Ok(None);
        }
    }
}

struct Shell {
    client: GeminiClient,
    config: Config,
    session: Session,
    theme: ColorfulTheme,
}

impl Shell {
    fn run_loop(&mut self) -> Result<()> {
        let labels: Vec<&str> = ACTIONS.iter().map(|(_, label)| *label).collect();
        loop {
            println!();
            let choice = Select::with_theme(&self.theme)
                .with_prompt(format!(
                    "{} file(s), {} search(es)",
                    self.session.files().len(),
                    self.session.history().len()
                ))
                .items(&labels)
                .default(0)
                .interact_opt()?;

            let action = match choice {
                Some(i) => ACTIONS[i].0,
                None => Action::Quit,
            };
            match action {
                Action::Upload => self.upload()?,
                Action::Search => self.search()?,
                Action::Files => self.show_files(),
                Action::LoadRemote => self.load_remote(),
                Action::Delete => self.delete()?,
                Action::History => self.show_history(),
                Action::Export => self.export(),
                Action::ClearHistory => {
                    self.session.clear_history();
                    println!("History cleared.");
                }
                Action::Quit => return Ok(()),
            }
        }
    }

    fn upload(&mut self) -> Result<()> {
        let mut paths = Vec::new();
        loop {
            let input: String = Input::with_theme(&self.theme)
                .with_prompt("File path (empty to start uploading)")
                .allow_empty(true)
                .interact_text()?;
            let input = input.trim();
            if input.is_empty() {
                break;
            }
            paths.push(PathBuf::from(input));
        }
        if paths.is_empty() {
            return Ok(());
        }

        let total = paths.len();
        let mut uploaded = 0;
        for (i, path) in paths.iter().enumerate() {
            let name = path.display().to_string();
            if !extract::is_supported(&name) {
                println!(
                    "[{}/{}] {} skipped: supported formats are {}",
                    i + 1,
                    total,
                    name,
                    extract::SUPPORTED_EXTENSIONS.join(", ")
                );
                continue;
            }

            println!("[{}/{}] Uploading {}...", i + 1, total, name);
            let outcome = self.client.upload(path, None).map(|handle| {
                self.client
                    .wait_until_active(
                        &handle.id,
                        self.config.timeout(),
                        self.config.poll_interval(),
                    )
                    .unwrap_or_else(|e| {
                        println!("  {} {}", style("Not ready yet:").yellow(), e);
                        handle
                    })
            });
            match outcome {
                Ok(handle) => {
                    let preview = extract::extract_path(path);
                    let preview: String = preview.chars().take(PREVIEW_CHARS).collect();
                    println!("  {}", render::file_line(&handle));
                    println!("  {}", style(preview.replace('\n', " ")).dim());
                    self.session.add_file(handle);
                    uploaded += 1;
                }
                Err(e) => println!("  {} {}", style("Error uploading:").red(), e),
            }
        }
        println!("Upload complete: {} of {} file(s).", uploaded, total);
        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        if self.session.files().is_empty() {
            println!("Upload some files first to start searching!");
            return Ok(());
        }
        let query: String = Input::with_theme(&self.theme)
            .with_prompt("Search query")
            .allow_empty(true)
            .interact_text()?;
        if query.trim().is_empty() {
            return Ok(());
        }

        println!("{}", style("Searching...").dim());
        let result = QueryEngine::new(&self.client).search(&query, self.session.files());
        let result = self.session.record(result);
        println!("{}", render::result_card(result));
        Ok(())
    }

    fn show_files(&self) {
        if self.session.files().is_empty() {
            println!("No files uploaded yet.");
            return;
        }
        for file in self.session.files() {
            println!("{}", render::file_details(file));
        }
    }

    fn load_remote(&mut self) {
        match self.client.list() {
            Ok(files) => {
                let mut added = 0;
                for file in files {
                    if self.session.add_file(file) {
                        added += 1;
                    }
                }
                println!("Added {} file(s) from the service.", added);
            }
            Err(e) => println!("{} {}", style("Error listing files:").red(), e),
        }
    }

    fn delete(&mut self) -> Result<()> {
        if self.session.files().is_empty() {
            println!("No files uploaded yet.");
            return Ok(());
        }
        let names: Vec<String> = self
            .session
            .files()
            .iter()
            .map(|f| format!("{} ({})", f.display_name, f.id))
            .collect();
        let Some(index) = Select::with_theme(&self.theme)
            .with_prompt("Delete which file? (Esc to cancel)")
            .items(&names)
            .interact_opt()?
        else {
            return Ok(());
        };

        let id = self.session.files()[index].id.clone();
        match self.client.delete(&id) {
            Ok(()) => {
                self.session.remove_file_by_id(&id);
                println!("File deleted successfully: {}", id);
            }
            Err(e) => println!("{} {}", style("Error deleting file:").red(), e),
        }
        Ok(())
    }

    fn show_history(&self) {
        if self.session.history().is_empty() {
            println!("No search history yet.");
            return;
        }
        for result in self.session.recent(HISTORY_SHOWN) {
            println!("{}", render::history_line(result));
        }
    }

    fn export(&self) {
        if self.session.history().is_empty() {
            println!("Nothing to export yet.");
            return;
        }
        match self.session.export_to_dir(&self.config.export_dir()) {
            Ok(path) => println!("Search history exported to {}", path.display()),
            Err(e) => println!("{} {}", style("Export failed:").red(), e),
        }
    }
}
