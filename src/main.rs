use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, bail};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use tracing::debug;
use mockserver_admin::AdminConsole;
use mockserver_admin::config::load_config;
use mockserver_admin::form::{AuthType, ResponseFile};
use mockserver_admin::model::{EndpointConfig, HttpMethod};
use mockserver_admin::notification::Notification;
use mockserver_admin::submission::{SubmissionOutcome, SubmitEvent};
use mockserver_admin::ui::UiEffects;
use mockserver_admin::ConsoleError;

#[derive(Parser, Debug)]
#[command(version, about = "Mockserver admin console")]
struct Args {
    #[arg(short, long, default_value = "mockserver-admin.yaml")]
    config: String,
    /// Overrides `server_url` from the config file
    #[arg(short, long)]
    server: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered endpoints
    List,
    /// Register a new endpoint
    Register(RegisterArgs),
    /// Delete an endpoint by path
    Delete {
        path: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
struct RegisterArgs {
    #[arg(long, default_value = "")]
    path: String,
    #[arg(short, long = "method", value_parser = parse_method)]
    methods: Vec<HttpMethod>,
    #[arg(long)]
    status: Option<u16>,
    #[arg(long)]
    delay: Option<u64>,
    /// `requests/window_ms`, passed through as is
    #[arg(long, default_value = "")]
    rate_limit: String,
    #[arg(long, default_value = "none")]
    auth: AuthType,
    #[arg(long, default_value = "")]
    username: String,
    #[arg(long, default_value = "")]
    password: String,
    /// Token payload as JSON
    #[arg(long, default_value = "")]
    token: String,
    #[arg(long)]
    graphql: bool,
    #[arg(long)]
    dynamic_vars: bool,
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn parse_method(method: &str) -> Result<HttpMethod, String> {
    HttpMethod::parse(method).ok_or_else(|| format!("unsupported method: {}", method))
}

struct TerminalEffects {
    assume_yes: bool,
}

impl UiEffects for TerminalEffects {
    fn set_loader_visible(&self, visible: bool) {
        debug!("loader {}", if visible { "on" } else { "off" });
    }

    fn clear_file_input(&self) {}

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn notification_inserted(&self, notification: &Notification) {
        println!("[{}] {}", notification.kind, notification.message);
    }
}

fn print_endpoints(endpoints: &[EndpointConfig]) {
    if endpoints.is_empty() {
        println!("No endpoints registered");
        return;
    }

    for endpoint in endpoints {
        let status = endpoint.status_code.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
        let delay = endpoint.delay_ms.map(|d| format!("{}ms", d)).unwrap_or_else(|| "-".into());
        println!(
            "{:<30} {:<20} status={} delay={} rate_limit={}{}{}",
            endpoint.path,
            endpoint.methods_label(),
            status,
            delay,
            endpoint.rate_limit.as_deref().unwrap_or("-"),
            if endpoint.is_graphql { " graphql" } else { "" },
            if endpoint.is_authenticated() { " 🔒" } else { "" },
        );
        if let Some(header) = endpoint.authorization_header() {
            println!("{:<30} Authorization: {}", "", header);
        }
    }
}

async fn register(console: &AdminConsole, args: RegisterArgs) -> anyhow::Result<()> {
    let form = console.form();

    form.handle_graphql_toggle(args.graphql);
    if !args.graphql {
        form.update(|f| f.path = args.path.clone());
        if !args.methods.is_empty() {
            for method in HttpMethod::ALL {
                form.set_method(method, args.methods.contains(&method));
            }
        }
    }
    form.update(|f| {
        f.status_code = args.status;
        f.delay_ms = args.delay;
        f.rate_limit = args.rate_limit;
        f.username = args.username;
        f.password = args.password;
        f.token_data = args.token;
        f.with_dynamic_vars = args.dynamic_vars;
    });
    form.update_auth_fields(args.auth);

    if let Some(path) = args.file {
        let contents = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "response.json".to_string());
        form.handle_file_input(Some(ResponseFile {
            name,
            contents: Bytes::from(contents),
        }));
    }

    let outcome = console.handle_submit(&mut SubmitEvent::default()).await;
    registration_result(outcome)?;
    print_endpoints(&console.registry().endpoints());
    Ok(())
}

/// The reason was already printed as a notification, so the error only sets the exit status.
fn registration_result(outcome: SubmissionOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmissionOutcome::Succeeded => Ok(()),
        SubmissionOutcome::Aborted(_) => bail!("endpoint registration aborted"),
        SubmissionOutcome::Failed(_) => bail!("endpoint registration failed"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(server) = args.server {
        config.server_url = server;
    }

    let assume_yes = matches!(args.command, Command::Delete { yes: true, .. });
    let console = AdminConsole::new(&config, Arc::new(TerminalEffects { assume_yes }))?;
    debug!("Using mockserver at {}", config.server_url);

    match args.command {
        Command::List => {
            if console.registry().load_endpoints().await.is_err() {
                bail!("listing endpoints failed");
            }
            print_endpoints(&console.registry().endpoints());
        }
        Command::Register(register_args) => register(&console, register_args).await?,
        Command::Delete { path, .. } => match console.registry().delete_endpoint(&path).await {
            Ok(()) | Err(ConsoleError::ConfirmationDeclined) => {}
            Err(_) => bail!("endpoint deletion failed"),
        },
    }

    Ok(())
}
