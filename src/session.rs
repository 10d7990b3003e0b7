//! The interactive/scripted session loop.
//!
//! One state machine drives every run: select a property, select a report,
//! select a date range, execute, emit output, then decide what to do next.
//! Each selection resolves the same way: take the command-line value when
//! present and valid, otherwise fall back to an interactive prompt loop.
//! Invalid input re-prompts; it is never fatal.

use anyhow::Result;
use chrono::Utc;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::cli::RunArgs;
use crate::client::{AdminClient, DataClient};
use crate::config::Config;
use crate::dates::{self, NamedRange, ResolvedRange};
use crate::executor::ReportExecutor;
use crate::output::{self, OutputMode};
use crate::registry::ReportRegistry;
use crate::report::ReportHandler;

/// A selectable GA4 property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub display_name: String,
    pub property_id: String,
}

/// What the operator wants after seeing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextAction {
    RunAnother,
    ChangeProperty,
    Quit,
}

pub struct Session<'a> {
    registry: &'a ReportRegistry,
    executor: &'a ReportExecutor,
    admin: &'a dyn AdminClient,
    data: &'a dyn DataClient,
    config: &'a Config,
    args: RunArgs,
    /// True while the run can still complete without a single prompt; any
    /// fallback clears it and the session becomes interactive.
    scripted: bool,
}

impl<'a> Session<'a> {
    pub fn new(
        registry: &'a ReportRegistry,
        executor: &'a ReportExecutor,
        admin: &'a dyn AdminClient,
        data: &'a dyn DataClient,
        config: &'a Config,
        args: RunArgs,
    ) -> Self {
        let scripted = args.is_complete();
        Self {
            registry,
            executor,
            admin,
            data,
            config,
            args,
            scripted,
        }
    }

    /// Drive the session until the operator quits (or the single scripted
    /// iteration completes).
    pub fn run(&mut self) -> Result<()> {
        if self.registry.is_empty() {
            println!("No reports are registered.");
            return Ok(());
        }

        'property: loop {
            let Some(property) = self.resolve_property()? else {
                // Nothing accessible; there is no session to run.
                return Ok(());
            };

            loop {
                let handler = self.resolve_report()?;
                let range = self.resolve_range()?;

                println!(
                    "Running {} for {} ({})...",
                    style(handler.name()).bold(),
                    property.display_name,
                    range.verbose()
                );

                match self.executor.execute(
                    handler,
                    &property.property_id,
                    &range.start_str(),
                    &range.end_str(),
                    self.data,
                ) {
                    Ok(result) => {
                        let mode = self.resolve_output()?;
                        if let Err(e) = output::render(
                            mode,
                            &result,
                            &property.display_name,
                            &self.config.output_dir(),
                        ) {
                            println!("Failed to write output: {e:#}");
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Report execution failed: {e:#}");
                        println!("Report generation failed: {e:#}");
                    }
                }

                if self.scripted {
                    return Ok(());
                }

                match self.prompt_next_action()? {
                    NextAction::RunAnother => continue,
                    NextAction::ChangeProperty => {
                        println!("\nReturning to property selection...");
                        continue 'property;
                    }
                    NextAction::Quit => {
                        println!("Exiting...");
                        return Ok(());
                    }
                }
            }
        }
    }

    // ── Property selection ──────────────────────────────────────

    fn resolve_property(&mut self) -> Result<Option<PropertyInfo>> {
        let groups = match grouped_properties(self.admin) {
            Ok(groups) => groups,
            Err(e) => {
                tracing::warn!("Account enumeration failed: {e:#}");
                println!("Failed to list GA4 accounts: {e:#}");
                return Ok(None);
            }
        };
        let properties: Vec<PropertyInfo> =
            groups.into_iter().flat_map(|(_, props)| props).collect();
        if properties.is_empty() {
            println!("No GA4 properties are accessible with this token.");
            return Ok(None);
        }

        if let Some(id) = self.args.property_id.take() {
            match properties.iter().find(|p| p.property_id == id) {
                Some(property) => return Ok(Some(property.clone())),
                None => {
                    println!("Property id '{id}' did not match any accessible property.");
                    self.scripted = false;
                }
            }
        }

        let items: Vec<String> = properties
            .iter()
            .map(|p| format!("{} (ID: {})", p.display_name, p.property_id))
            .collect();
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a property")
            .items(&items)
            .default(0)
            .interact()?;
        let selected = properties[index].clone();
        println!(
            "You selected: {} (ID: {})",
            selected.display_name, selected.property_id
        );
        Ok(Some(selected))
    }

    // ── Report selection ────────────────────────────────────────

    fn resolve_report(&mut self) -> Result<&'a dyn ReportHandler> {
        let registry = self.registry;
        if let Some(wanted) = self.args.report.take() {
            match registry.resolve(&wanted) {
                Some(handler) => return Ok(handler),
                None => {
                    println!("No report matches '{wanted}'.");
                    self.scripted = false;
                }
            }
        }

        let descriptors = registry.discover();
        let items: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        loop {
            let index = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select a report")
                .items(&items)
                .default(0)
                .interact()?;
            if let Some(handler) = registry.get(index) {
                return Ok(handler);
            }
        }
    }

    // ── Date-range selection ────────────────────────────────────

    fn resolve_range(&mut self) -> Result<ResolvedRange> {
        let today = Utc::now().date_naive();

        if let Some(flag) = self.args.range.take() {
            match NamedRange::from_flag(&flag) {
                Some(named) => return Ok(named.resolve(today)),
                None => {
                    println!("Unknown range '{flag}'.");
                    self.scripted = false;
                }
            }
        }

        let start = self.args.start_date.take();
        let end = self.args.end_date.take();
        if start.is_some() || end.is_some() {
            match custom_from_args(start.as_deref(), end.as_deref()) {
                Ok(range) => return Ok(range),
                Err(e) => {
                    println!("{e:#}");
                    self.scripted = false;
                }
            }
        }

        self.prompt_range(today)
    }

    fn prompt_range(&self, today: chrono::NaiveDate) -> Result<ResolvedRange> {
        let mut items: Vec<&str> = NamedRange::ALL.iter().map(|r| r.label()).collect();
        items.push("Custom Range");
        let default_index = NamedRange::ALL
            .iter()
            .position(|r| *r == NamedRange::LastMonth)
            .unwrap_or(0);

        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a date range")
            .items(&items)
            .default(default_index)
            .interact()?;

        if let Some(named) = NamedRange::ALL.get(index) {
            return Ok(named.resolve(today));
        }

        // Custom: re-prompt until both dates parse and the order holds.
        loop {
            let start = self.prompt_date("Start date (YYYY-MM-DD)")?;
            let end = self.prompt_date("End date (YYYY-MM-DD)")?;
            match dates::custom(start, end) {
                Ok(range) => return Ok(range),
                Err(e) => println!("{e:#}"),
            }
        }
    }

    fn prompt_date(&self, prompt: &str) -> Result<chrono::NaiveDate> {
        loop {
            let raw: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .interact_text()?;
            match dates::parse_iso(&raw) {
                Ok(date) => return Ok(date),
                Err(e) => println!("{e:#}"),
            }
        }
    }

    // ── Output selection ────────────────────────────────────────

    fn resolve_output(&mut self) -> Result<OutputMode> {
        if let Some(flag) = self.args.output.take() {
            match OutputMode::from_flag(&flag) {
                Some(mode) => return Ok(mode),
                None => {
                    println!("Unknown output mode '{flag}'.");
                    self.scripted = false;
                }
            }
        }

        let items: Vec<&str> = OutputMode::ALL.iter().map(|m| m.label()).collect();
        loop {
            let index = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select an output format")
                .items(&items)
                .default(0)
                .interact()?;
            if let Some(mode) = OutputMode::ALL.get(index) {
                return Ok(*mode);
            }
        }
    }

    // ── Next action ─────────────────────────────────────────────

    fn prompt_next_action(&self) -> Result<NextAction> {
        let items = [
            "Run another report for this property",
            "Change property",
            "Quit",
        ];
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do next?")
            .items(&items)
            .default(0)
            .interact()?;
        Ok(match index {
            0 => NextAction::RunAnother,
            1 => NextAction::ChangeProperty,
            _ => NextAction::Quit,
        })
    }
}

/// Both dates are required for a custom window.
fn custom_from_args(start: Option<&str>, end: Option<&str>) -> Result<ResolvedRange> {
    let (Some(start), Some(end)) = (start, end) else {
        anyhow::bail!("A custom range needs both --start-date and --end-date");
    };
    dates::custom(dates::parse_iso(start)?, dates::parse_iso(end)?)
}

/// Accessible properties grouped per account: accounts alphabetical,
/// properties with `www`-prefixed names first, then alphabetical.
///
/// An account whose property listing fails is skipped with a warning so
/// one bad account cannot hide the rest.
pub fn grouped_properties(admin: &dyn AdminClient) -> Result<Vec<(String, Vec<PropertyInfo>)>> {
    let mut accounts = admin.list_accounts()?;
    accounts.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    let mut groups = Vec::new();
    for account in &accounts {
        let mut properties = match admin.list_properties(&account.name) {
            Ok(properties) => properties,
            Err(e) => {
                tracing::warn!(
                    "Failed to list properties for {}: {e:#}",
                    account.display_name
                );
                continue;
            }
        };
        properties.sort_by_key(|p| {
            let www = p.display_name.to_ascii_lowercase().starts_with("www");
            (if www { 0 } else { 1 }, p.display_name.clone())
        });
        groups.push((
            account.display_name.clone(),
            properties
                .iter()
                .map(|p| PropertyInfo {
                    display_name: p.display_name.clone(),
                    property_id: p.property_id().to_string(),
                })
                .collect(),
        ));
    }
    Ok(groups)
}
