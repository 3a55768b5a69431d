//! Command dispatch
//!
//! Every remote call runs inside `AuthService::with_token_refresh`; project
//! scoped commands resolve the target project inside that same unit of work.

use std::future::Future;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{
    AliasCommands, Cli, CollectionCommands, Commands, ConfigCommands, DocumentCommands,
    InstanceCommands, ProjectCommands,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{AuthSession, Instance, ResolvedProject, DEFAULT_KEY};
use crate::infrastructure::api::{ApiResult, CreateProject};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Parse-independent entry point used by `main`.
pub async fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
        Commands::Config { command } => config_command(command),
        _ => {
            let container = build_container(cli)?;
            run(cli, &container).await
        }
    }
}

fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load()?;
    let work_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };
    debug!(
        "server={} project_file={}",
        settings.server_url,
        work_dir.join(&settings.project_file).display()
    );
    Ok(ServiceContainer::new(settings, &work_dir)?)
}

/// Run a remote command against an already wired container.
pub async fn run(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Login {
            email,
            password,
            server,
        }) => {
            let password = password.as_deref().ok_or_else(|| {
                CliError::Usage("password required: pass --password or set SKYCTL_PASSWORD".into())
            })?;
            login(container, email, password, server.as_deref()).await
        }
        Some(Commands::Logout) => logout(container),
        Some(Commands::Whoami) => whoami(cli, container),
        Some(Commands::Projects { command }) => projects_command(cli, container, command).await,
        Some(Commands::Alias { command }) => alias_command(cli, container, command).await,
        Some(Commands::Use { project }) => use_project(container, project).await,
        Some(Commands::Instances { command }) => instances_command(cli, container, command).await,
        Some(Commands::Collections { command }) => {
            collections_command(cli, container, command).await
        }
        Some(Commands::Documents { command }) => documents_command(cli, container, command).await,
        Some(Commands::Config { command }) => config_command(command),
        Some(Commands::Completion { shell }) => {
            print_completions(*shell);
            Ok(())
        }
        None => Ok(()),
    }
}

/// Resolve the target project and run `op` against it, refreshing the
/// session once if it has expired.
async fn in_project<T, F, Fut>(
    cli: &Cli,
    container: &ServiceContainer,
    op: F,
) -> CliResult<(ResolvedProject, T)>
where
    F: Fn(AuthSession, ResolvedProject) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let resolver = container.resolver();
    let resolver = &resolver;
    let op = &op;
    let requested = cli.project.as_deref();

    let result = container
        .auth()
        .with_token_refresh(|session| async move {
            let target = resolver.resolve(&session, requested).await?;
            let value = op(session, target.clone())
                .await
                .map_err(ApplicationError::from)?;
            Ok::<_, ApplicationError>((target, value))
        })
        .await?;
    Ok(result)
}

// ============================================================
// AUTH
// ============================================================

#[instrument(skip(container, password))]
async fn login(
    container: &ServiceContainer,
    email: &str,
    password: &str,
    server: Option<&str>,
) -> CliResult<()> {
    let server = server.unwrap_or(&container.settings.server_url);
    let credentials = container.auth().login(server, email, password).await?;
    output::success(&format!(
        "Logged in to {} as {}",
        credentials.server_url, email
    ));
    Ok(())
}

fn logout(container: &ServiceContainer) -> CliResult<()> {
    if container.auth().logout()? {
        output::success("Logged out");
    } else {
        output::info("Not logged in");
    }
    Ok(())
}

fn whoami(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let credentials = container
        .auth()
        .current()?
        .ok_or(ApplicationError::NotLoggedIn)?;
    let email = credentials.email.as_deref().unwrap_or("(unknown)");

    if cli.json {
        return output::json(&serde_json::json!({
            "email": credentials.email,
            "serverUrl": credentials.server_url,
        }));
    }
    output::action("Account", email);
    output::action("Server", &credentials.server_url);
    Ok(())
}

// ============================================================
// PROJECTS
// ============================================================

#[instrument(skip_all)]
async fn projects_command(
    cli: &Cli,
    container: &ServiceContainer,
    command: &ProjectCommands,
) -> CliResult<()> {
    match command {
        ProjectCommands::List => {
            let api = container.projects_api.as_ref();
            let projects = container
                .auth()
                .with_token_refresh(|session| async move {
                    api.list_projects(&session)
                        .await
                        .map_err(ApplicationError::from)
                })
                .await?;

            if cli.json {
                return output::json(&projects);
            }
            let config = container.project_store.read();
            let default = config.default_project();
            let rows: Vec<Vec<String>> = projects
                .iter()
                .map(|p| {
                    let marker = if Some(p.name.as_str()) == default { "*" } else { "" };
                    vec![
                        marker.to_string(),
                        p.name.clone(),
                        p.id.clone(),
                        p.display_name.clone().unwrap_or_default(),
                        timestamp(p.created_at),
                    ]
                })
                .collect();
            output::table(&["", "NAME", "ID", "DISPLAY NAME", "CREATED"], &rows);
            Ok(())
        }
        ProjectCommands::Show => {
            let resolver = container.resolver();
            let resolver = &resolver;
            let requested = cli.project.as_deref();
            let project = container
                .auth()
                .with_token_refresh(|session| async move {
                    resolver.resolve(&session, requested).await
                })
                .await?;
            if cli.json {
                return output::json(&project);
            }
            output::action("Project", &project.name);
            output::action("Id", &project.id);
            Ok(())
        }
        ProjectCommands::Create { name, display_name } => {
            let request = CreateProject {
                name: name.clone(),
                display_name: display_name.clone(),
            };
            let request = &request;
            let api = container.projects_api.as_ref();
            let project = container
                .auth()
                .with_token_refresh(|session| async move {
                    api.create_project(&session, request)
                        .await
                        .map_err(ApplicationError::from)
                })
                .await?;

            if cli.json {
                return output::json(&project);
            }
            output::success(&format!("Created project {} ({})", project.name, project.id));
            Ok(())
        }
    }
}

// ============================================================
// ALIASES
// ============================================================

#[instrument(skip_all)]
async fn alias_command(
    cli: &Cli,
    container: &ServiceContainer,
    command: &AliasCommands,
) -> CliResult<()> {
    let aliases = container.aliases();
    let aliases = &aliases;

    match command {
        AliasCommands::Add { project, alias } => {
            let alias = alias.as_deref();
            let added = container
                .auth()
                .with_token_refresh(|session| async move {
                    aliases.add(&session, project, alias).await
                })
                .await?;

            output::success(&format!("{} -> {}", added.alias, added.project.name));
            if added.became_default {
                output::detail(&format!(
                    "{} is now the default project",
                    added.project.name
                ));
            }
            Ok(())
        }
        AliasCommands::Remove { alias } => {
            let removed = aliases.remove(alias)?;
            if alias == DEFAULT_KEY {
                output::success(&format!("Cleared default project ({})", removed));
            } else {
                output::success(&format!("Removed {} -> {}", alias, removed));
            }
            Ok(())
        }
        AliasCommands::List => {
            let config = aliases.list();
            if cli.json {
                return output::json(&config);
            }
            match config.default_project() {
                Some(default) => output::action("Default", default),
                None => output::warning("no default project set"),
            }
            let rows: Vec<Vec<String>> = config
                .aliases()
                .map(|(alias, project)| vec![alias.to_string(), project.to_string()])
                .collect();
            output::table(&["ALIAS", "PROJECT"], &rows);
            Ok(())
        }
    }
}

#[instrument(skip(container))]
async fn use_project(container: &ServiceContainer, project: &str) -> CliResult<()> {
    let aliases = container.aliases();
    let aliases = &aliases;
    let resolved = container
        .auth()
        .with_token_refresh(|session| async move { aliases.use_project(&session, project).await })
        .await?;
    output::success(&format!("Now using project {} ({})", resolved.name, resolved.id));
    Ok(())
}

// ============================================================
// INSTANCES
// ============================================================

#[instrument(skip_all)]
async fn instances_command(
    cli: &Cli,
    container: &ServiceContainer,
    command: &InstanceCommands,
) -> CliResult<()> {
    let api = container.instances_api.as_ref();

    match command {
        InstanceCommands::List => {
            let (project, instances) = in_project(cli, container, |session, project| async move {
                api.list_instances(&session, &project.id).await
            })
            .await?;

            if cli.json {
                return output::json(&instances);
            }
            output::header(&format!("Instances in {}", project.name));
            let rows: Vec<Vec<String>> = instances.iter().map(instance_row).collect();
            output::table(&["NAME", "STATUS", "MACHINE TYPE", "REGION", "CREATED"], &rows);
            Ok(())
        }
        InstanceCommands::Show { name } => {
            let (_, instance) = in_project(cli, container, |session, project| async move {
                api.get_instance(&session, &project.id, name).await
            })
            .await?;
            print_instance(cli, &instance)
        }
        InstanceCommands::Start { name } => {
            let (project, instance) = in_project(cli, container, |session, project| async move {
                api.start_instance(&session, &project.id, name).await
            })
            .await?;
            if cli.json {
                return output::json(&instance);
            }
            output::success(&format!(
                "{} in {}: {}",
                instance.name, project.name, instance.status
            ));
            Ok(())
        }
        InstanceCommands::Stop { name } => {
            let (project, instance) = in_project(cli, container, |session, project| async move {
                api.stop_instance(&session, &project.id, name).await
            })
            .await?;
            if cli.json {
                return output::json(&instance);
            }
            output::success(&format!(
                "{} in {}: {}",
                instance.name, project.name, instance.status
            ));
            Ok(())
        }
    }
}

fn instance_row(instance: &Instance) -> Vec<String> {
    vec![
        instance.name.clone(),
        instance.status.to_string(),
        instance.machine_type.clone(),
        instance.region.clone(),
        timestamp(instance.created_at),
    ]
}

fn print_instance(cli: &Cli, instance: &Instance) -> CliResult<()> {
    if cli.json {
        return output::json(instance);
    }
    output::header(&instance.name);
    output::detail(&format!("status:       {}", instance.status));
    output::detail(&format!("machine type: {}", instance.machine_type));
    output::detail(&format!("region:       {}", instance.region));
    output::detail(&format!("created:      {}", timestamp(instance.created_at)));
    Ok(())
}

// ============================================================
// COLLECTIONS & DOCUMENTS
// ============================================================

#[instrument(skip_all)]
async fn collections_command(
    cli: &Cli,
    container: &ServiceContainer,
    command: &CollectionCommands,
) -> CliResult<()> {
    let api = container.collections_api.as_ref();

    match command {
        CollectionCommands::List => {
            let (project, collections) =
                in_project(cli, container, |session, project| async move {
                    api.list_collections(&session, &project.id).await
                })
                .await?;

            if cli.json {
                return output::json(&collections);
            }
            output::header(&format!("Collections in {}", project.name));
            let rows: Vec<Vec<String>> = collections
                .iter()
                .map(|c| vec![c.name.clone(), c.document_count.to_string()])
                .collect();
            output::table(&["NAME", "DOCUMENTS"], &rows);
            Ok(())
        }
    }
}

#[instrument(skip_all)]
async fn documents_command(
    cli: &Cli,
    container: &ServiceContainer,
    command: &DocumentCommands,
) -> CliResult<()> {
    let api = container.collections_api.as_ref();

    match command {
        DocumentCommands::List { collection, limit } => {
            let limit = *limit;
            let (_, documents) = in_project(cli, container, |session, project| async move {
                api.list_documents(&session, &project.id, collection, limit)
                    .await
            })
            .await?;

            if cli.json {
                return output::json(&documents);
            }
            let rows: Vec<Vec<String>> = documents
                .iter()
                .map(|d| vec![d.id.clone(), timestamp(d.updated_at)])
                .collect();
            output::table(&["ID", "UPDATED"], &rows);
            Ok(())
        }
        DocumentCommands::Get { collection, id } => {
            let (_, document) = in_project(cli, container, |session, project| async move {
                api.get_document(&session, &project.id, collection, id).await
            })
            .await?;

            if cli.json {
                return output::json(&document);
            }
            output::json(&document.data)
        }
    }
}

// ============================================================
// LOCAL COMMANDS
// ============================================================

fn config_command(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine config directory".to_string())
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            write_config_template(&path)?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::action("Global", &format!("{}{}", path.display(), state));
                }
                None => output::warning("cannot determine config directory"),
            }
            let settings = Settings::load()?;
            output::action("Credentials", &settings.credentials_file.display());
            output::action("Project file", &settings.project_file);
            Ok(())
        }
    }
}

fn write_config_template(path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
