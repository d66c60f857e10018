//! Terminal rendering of operation outcomes.
//!
//! The manager never prints. Each function here renders one operation's
//! [`Outcome`] and returns the exit code the process should end with.

use crate::{
    configuration::Configuration,
    context::Context,
    exit_codes::AzctxExitCode,
    format::{Formattable, FormattingError, OutputFormat},
    outcome::{
        AddPayload, ContextListing, ContextSummary, DeletePayload, ErrorKind, ListPayload, Outcome,
        StatusPayload, SwitchPayload,
    },
    session::AccountSnapshot,
};
use color_print::{ceprintln, cformat};

const INSTALL_HINT: &str = "Please install Azure CLI: https://aka.ms/azure-cli";
const LOGIN_HINT: &str = "Please run 'az login' to authenticate with Azure first.";

const SWITCH_BENIGN: &[ErrorKind] = &[ErrorKind::AlreadyActive];
const LIST_BENIGN: &[ErrorKind] = &[ErrorKind::EmptyList];
const DELETE_BENIGN: &[ErrorKind] = &[ErrorKind::EmptyList];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Success,
    Warning,
    Failure,
    Info,
}

/// A titled block of lines, coloured by tone.
#[derive(Debug)]
struct Panel {
    tone: Tone,
    title: String,
    lines: Vec<String>,
}

impl Panel {
    fn new(tone: Tone, title: impl Into<String>) -> Self {
        Self {
            tone,
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn text(mut self, text: &str) -> Self {
        self.lines.extend(text.lines().map(str::to_string));
        self
    }

    fn blank(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    fn field(mut self, label: &str, value: &str) -> Self {
        self.lines.push(cformat!("<bold>{}:</bold> {}", label, value));
        self
    }

    fn detail(mut self, label: &str, value: &str) -> Self {
        self.lines.push(cformat!("<dim>{}:</dim> {}", label, value));
        self
    }

    fn hint(mut self, text: &str) -> Self {
        self.lines.push(cformat!("<dim>{}</dim>", text));
        self
    }

    fn render(&self) -> String {
        let title = match self.tone {
            Tone::Success => cformat!("<bold><green>{}</green></bold>", self.title),
            Tone::Warning => cformat!("<bold><yellow>{}</yellow></bold>", self.title),
            Tone::Failure => cformat!("<bold><red>{}</red></bold>", self.title),
            Tone::Info => cformat!("<bold><cyan>{}</cyan></bold>", self.title),
        };

        let mut rendered = title;
        for line in &self.lines {
            rendered.push('\n');
            if !line.is_empty() {
                rendered.push_str("  ");
                rendered.push_str(line);
            }
        }
        rendered
    }

    fn print(&self) {
        println!("{}\n", self.render());
    }
}

fn context_panel(tone: Tone, title: String, context: &Context) -> Panel {
    Panel::new(tone, title)
        .field("Name", context.context_name())
        .field("ID", context.context_id())
        .field("Subscription", context.subscription_name())
        .field("Tenant", context.tenant_name())
        .field("Account", context.username())
}

fn timestamp(context: &Context) -> String {
    context.created_at().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Shows the session that `add` is about to save.
pub fn current_account(account: &AccountSnapshot) {
    Panel::new(Tone::Info, "Current Azure Context")
        .field("Subscription", &account.name)
        .field("Tenant", &account.tenant_id)
        .field("Account", &account.user.name)
        .print();
}

pub fn switch(outcome: &Outcome<SwitchPayload>) -> AzctxExitCode {
    switch_panel(outcome).print();
    AzctxExitCode::for_outcome(outcome, SWITCH_BENIGN)
}

fn switch_panel(outcome: &Outcome<SwitchPayload>) -> Panel {
    if outcome.success {
        if let Some(context) = &outcome.payload.context {
            return context_panel(
                Tone::Success,
                format!("✓ Successfully Switched to {}", context.context_name()),
                context,
            );
        }
        return Panel::new(Tone::Success, "✓ Context Switched").text(&outcome.message);
    }

    match outcome.error {
        Some(ErrorKind::Cancelled) => {
            Panel::new(Tone::Warning, "Context Switch Cancelled").text(&outcome.message)
        }
        Some(ErrorKind::AlreadyActive) => {
            Panel::new(Tone::Warning, "⚠ Already Active").text(&outcome.message)
        }
        Some(ErrorKind::NotFound) => {
            let mut panel = Panel::new(Tone::Failure, "✗ Context Not Found").text(&outcome.message);
            if !outcome.payload.available_ids.is_empty() {
                panel = panel.blank().text(&format!(
                    "Available contexts: {}",
                    outcome.payload.available_ids.join(", ")
                ));
            }
            panel
        }
        Some(ErrorKind::EmptyList) | Some(ErrorKind::SingleContext) => {
            Panel::new(Tone::Warning, "⚠ Cannot Switch Context").text(&outcome.message)
        }
        Some(ErrorKind::NoSession) => Panel::new(Tone::Failure, "✗ No Active Azure Session")
            .text(&outcome.message)
            .blank()
            .text(LOGIN_HINT),
        _ => Panel::new(Tone::Failure, "✗ Failed to Switch Context").text(&outcome.message),
    }
}

pub fn add(outcome: &Outcome<AddPayload>) -> AzctxExitCode {
    add_panel(outcome).print();
    AzctxExitCode::for_outcome(outcome, &[])
}

fn add_panel(outcome: &Outcome<AddPayload>) -> Panel {
    if outcome.success {
        if let Some(context) = &outcome.payload.context {
            return context_panel(
                Tone::Success,
                format!("✓ Successfully Added Context: {}", context.context_name()),
                context,
            );
        }
    }

    match outcome.error {
        Some(ErrorKind::Cancelled) => {
            Panel::new(Tone::Warning, "Context Addition Cancelled").text(&outcome.message)
        }
        Some(ErrorKind::AlreadyExists) => {
            Panel::new(Tone::Warning, "⚠ Context Already Managed").text(&outcome.message)
        }
        Some(ErrorKind::NoSession) => Panel::new(Tone::Failure, "✗ No Active Azure Session")
            .text(&outcome.message)
            .blank()
            .text(LOGIN_HINT),
        _ => Panel::new(Tone::Failure, "✗ Failed to Add Context").text(&outcome.message),
    }
}

pub fn status(
    outcome: &Outcome<StatusPayload>,
    format: &OutputFormat,
) -> Result<AzctxExitCode, FormattingError> {
    match format {
        OutputFormat::Text => status_panel(outcome).print(),
        _ => println!("{}", outcome.format(format)?),
    }
    Ok(AzctxExitCode::for_outcome(outcome, &[]))
}

fn status_panel(outcome: &Outcome<StatusPayload>) -> Panel {
    let payload = &outcome.payload;
    let account = match (&payload.current_account, outcome.success) {
        (Some(account), true) => account,
        _ => {
            return match outcome.error {
                Some(ErrorKind::NoSession) => Panel::new(Tone::Failure, "✗ No Active Azure Session")
                    .text(&outcome.message)
                    .blank()
                    .text(LOGIN_HINT),
                _ => Panel::new(Tone::Failure, "✗ Error").text(&outcome.message),
            };
        }
    };

    match &payload.context {
        Some(context) if payload.is_managed => {
            let mut panel = context_panel(
                Tone::Success,
                format!("✓ Managed Context: {}", context.context_name()),
                context,
            );
            if payload.verbose {
                panel = panel
                    .blank()
                    .hint("Detailed Information:")
                    .detail("Subscription ID", context.subscription_id())
                    .detail("Tenant ID", context.tenant_id())
                    .detail("Created", &timestamp(context));
            }
            panel
        }
        _ => {
            let mut panel = Panel::new(Tone::Warning, "⚠ Unmanaged Context")
                .field("Subscription", &account.name)
                .field("Tenant", &account.tenant_id)
                .field("Account", &account.user.name)
                .blank()
                .text(&cformat!("<yellow>This context is not managed by azctx.</yellow>"))
                .text(&cformat!("Run <cyan>azctx add</cyan> to save it with a friendly name."));
            if payload.verbose {
                panel = panel
                    .blank()
                    .hint("Detailed Information:")
                    .detail("Subscription ID", &account.id)
                    .detail("Tenant ID", &account.tenant_id);
            }
            panel
        }
    }
}

pub fn list(
    outcome: &Outcome<ListPayload>,
    format: &OutputFormat,
) -> Result<AzctxExitCode, FormattingError> {
    match format {
        OutputFormat::Text => print!("{}", render_list(outcome)),
        _ => println!("{}", outcome.format(format)?),
    }
    Ok(AzctxExitCode::for_outcome(outcome, LIST_BENIGN))
}

fn render_list(outcome: &Outcome<ListPayload>) -> String {
    let listing = match &outcome.payload.contexts {
        Some(listing) if outcome.success && !listing.is_empty() => listing,
        _ if outcome.is(ErrorKind::EmptyList) => {
            return format!(
                "{}\n\n",
                Panel::new(Tone::Warning, "No Saved Contexts")
                    .text(&outcome.message)
                    .render()
            );
        }
        _ => {
            return format!(
                "{}\n\n",
                Panel::new(Tone::Failure, "✗ Error").text(&outcome.message).render()
            );
        }
    };

    let heading = cformat!("<bold><cyan>Saved Contexts ({}):</cyan></bold>", listing.len());
    match listing {
        ContextListing::Full(contexts) => {
            let mut rendered = format!("{}\n\n", heading);
            for context in contexts {
                let panel = Panel::new(Tone::Info, context.context_id())
                    .field("Name", context.context_name())
                    .field(
                        "Subscription",
                        &format!(
                            "{} ({})",
                            context.subscription_name(),
                            context.subscription_id()
                        ),
                    )
                    .field("Tenant ID", context.tenant_id())
                    .field("Username", context.username())
                    .field("Created", &timestamp(context));
                rendered.push_str(&panel.render());
                rendered.push_str("\n\n");
            }
            rendered
        }
        ContextListing::Summary(summaries) => format!(
            "{}\n\n{}\n{}\n\n",
            heading,
            summary_table(summaries),
            cformat!("<dim>Use 'azctx list --verbose' for detailed information</dim>")
        ),
    }
}

fn summary_table(summaries: &[ContextSummary]) -> String {
    let width = summaries
        .iter()
        .map(|s| s.context_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    let mut table = cformat!(
        "<bold><cyan>{}</cyan></bold>  <bold><cyan>Name</cyan></bold>\n",
        format!("{:<width$}", "ID", width = width)
    );
    for summary in summaries {
        let id = format!("{:<width$}", summary.context_id, width = width);
        table.push_str(&cformat!("<cyan>{}</cyan>  {}\n", id, summary.context_name));
    }
    table
}

pub fn delete(outcome: &Outcome<DeletePayload>) -> AzctxExitCode {
    delete_panel(outcome).print();
    AzctxExitCode::for_outcome(outcome, DELETE_BENIGN)
}

fn delete_panel(outcome: &Outcome<DeletePayload>) -> Panel {
    let payload = &outcome.payload;
    if outcome.success {
        let context_id = payload.context_id.as_deref().unwrap_or_default();
        let context_name = payload.context_name.as_deref().unwrap_or_default();
        return Panel::new(
            Tone::Success,
            format!("✓ Successfully Deleted Context: {}", context_name),
        )
        .field("Context ID", context_id)
        .field("Context Name", context_name)
        .blank()
        .hint("Note: Your active Azure CLI session remains unchanged.");
    }

    match outcome.error {
        Some(ErrorKind::Cancelled) => Panel::new(Tone::Warning, "Deletion Cancelled").text(&outcome.message),
        Some(ErrorKind::EmptyList) => {
            Panel::new(Tone::Warning, "⚠ No Contexts to Delete").text(&outcome.message)
        }
        Some(ErrorKind::NotFound) => Panel::new(Tone::Failure, "✗ Context Not Found").text(&outcome.message),
        _ => Panel::new(Tone::Failure, "✗ Failed to Delete Context").text(&outcome.message),
    }
}

/// Guidance for a missing Azure CLI.
pub fn cli_not_found(error: &dyn std::error::Error) {
    Panel::new(Tone::Failure, "✗ Azure CLI Not Found")
        .text(&error.to_string())
        .blank()
        .text(INSTALL_HINT)
        .print();
}

/// Shown when Ctrl+C arrives outside a prompt.
pub fn interrupted() {
    interrupted_panel().print();
}

fn interrupted_panel() -> Panel {
    Panel::new(Tone::Warning, "Cancelled").text("Operation cancelled")
}

pub fn error(error: &dyn std::error::Error) {
    ceprintln!("<red><bold>✗ Error:</bold></red> {}", error);
}

pub fn config_paths(configuration: &Configuration) {
    println!("{}", configuration.store_path().display());
    println!("{}", configuration.settings_path().display());
}
