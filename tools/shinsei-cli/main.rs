use clap::{Parser, Subcommand, ValueEnum};
use shinsei::prelude::*;
use shinsei::render::RenderedField;
use shinsei::service::{Record, SubmissionsPage};
use shinsei::table::cell_text;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;

/// Status filter values accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusCli {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusCli> for ApplicationStatus {
    fn from(status: StatusCli) -> Self {
        match status {
            StatusCli::Pending => ApplicationStatus::Pending,
            StatusCli::Approved => ApplicationStatus::Approved,
            StatusCli::Rejected => ApplicationStatus::Rejected,
        }
    }
}

/// Drive insurance application forms and browse submissions from the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Optional path to a portal config JSON file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available forms
    Forms,
    /// Print the render tree of a form
    Render {
        form_id: String,
        /// Values to apply first, as id=value
        #[arg(long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,
    },
    /// Fill a form from the command line and optionally submit it
    Fill {
        form_id: String,
        /// Values to apply, as id=value (checkboxes take a comma-separated list)
        #[arg(long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,
        /// Directory to keep drafts in; drafts are not persisted without it
        #[arg(long)]
        drafts: Option<String>,
        /// Validate and submit after applying the values
        #[arg(long)]
        submit: bool,
    },
    /// Filter, sort and page the submissions table
    Table {
        /// JSON file with rows (an array, or an object with `columns` and `data`)
        #[arg(long)]
        data: Option<String>,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum)]
        status: Option<StatusCli>,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PortalConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => PortalConfig::default(),
    };
    let portal = InMemoryPortal::with_demo_data()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load form catalog: {}", e)));

    if cli.human {
        run_interactive(&portal, &config);
        return;
    }

    match cli.command {
        Some(Command::Forms) | None => list_forms(&portal),
        Some(Command::Render { form_id, set }) => {
            let mut session = open_session(&portal, &form_id, MemoryStorage::new(), &config);
            apply_assignments(&mut session, &portal, &set);
            print!("{}", TreeFormatter::format(&session.render()));
        }
        Some(Command::Fill {
            form_id,
            set,
            drafts,
            submit,
        }) => match drafts {
            Some(dir) => {
                let storage = FileStorage::open(&dir).unwrap_or_else(|e| {
                    exit_with_error(&format!("Failed to open draft directory '{}': {}", dir, e))
                });
                run_fill(&portal, &form_id, storage, &config, &set, submit);
            }
            None => run_fill(&portal, &form_id, MemoryStorage::new(), &config, &set, submit),
        },
        Some(Command::Table {
            data,
            search,
            status,
            sort,
            desc,
            page,
        }) => {
            let mut query = TableQuery::with_page_size(config.page_size);
            query.search = search;
            query.status_filter = status.map(Into::into);
            query.page = page;
            if let Some(key) = sort {
                query.toggle_sort(&key);
                if desc {
                    query.toggle_sort(&key);
                }
            }
            run_table(&portal, data.as_deref(), &query, &config);
        }
    }
}

fn list_forms(portal: &InMemoryPortal) {
    let forms = portal
        .fetch_forms()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to fetch forms: {}", e)));
    println!("Available forms:");
    for form in forms {
        println!(
            "  - {} ({}, {} sections): {}",
            form.title,
            form.form_id,
            form.section_count(),
            shinsei::data::form_description(&form.form_id)
        );
    }
}

fn open_session<S: DraftStorage>(
    portal: &InMemoryPortal,
    form_id: &str,
    storage: S,
    config: &PortalConfig,
) -> FormSession<S> {
    let form = portal
        .fetch_form(form_id)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load form: {}", e)));
    let mut session = FormSession::start(form, storage, config);
    session.resolve_options(portal);
    if session.draft_saved() {
        println!("Restored draft with {} values.", session.values().len());
    }
    session
}

/// Applies `id=value` pairs in order, loading dependent options as they come up.
fn apply_assignments<S: DraftStorage>(
    session: &mut FormSession<S>,
    portal: &InMemoryPortal,
    assignments: &[String],
) {
    for assignment in assignments {
        let Some((id, raw)) = assignment.split_once('=') else {
            exit_with_error(&format!("Expected id=value, got '{}'", assignment));
        };
        let value = parse_input(session.form(), id, raw);
        session
            .set_value(id, value, Instant::now())
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        session.resolve_options(portal);
        report_notice(session);
    }
}

/// Checkbox answers are comma-separated lists; everything else is plain text.
fn parse_input(form: &FormSpec, field_id: &str, raw: &str) -> FieldValue {
    match form.field(field_id).map(|f| &f.kind) {
        Some(FieldKind::Checkbox { .. }) => FieldValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => FieldValue::from(raw.trim()),
    }
}

fn run_fill<S: DraftStorage>(
    portal: &InMemoryPortal,
    form_id: &str,
    storage: S,
    config: &PortalConfig,
    assignments: &[String],
    submit: bool,
) {
    let mut session = open_session(portal, form_id, storage, config);
    apply_assignments(&mut session, portal, assignments);

    if submit {
        submit_and_report(&mut session, portal);
        return;
    }

    print!("{}", TreeFormatter::format(&session.render()));
    match session.save_draft() {
        Ok(()) => println!("Draft saved."),
        Err(e) => eprintln!("Warning: draft not saved: {}", e),
    }
}

/// Returns `true` once the application is stored.
fn submit_and_report<S: DraftStorage>(
    session: &mut FormSession<S>,
    portal: &InMemoryPortal,
) -> bool {
    let outcome = session
        .submit(portal)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    report_notice(session);
    match outcome {
        SubmitOutcome::Submitted(receipt) => {
            println!("  -> Application id: {}", receipt.id);
            true
        }
        SubmitOutcome::Invalid(errors) => {
            println!("\nThe form has {} invalid fields:", errors.len());
            print!("{}", TreeFormatter::format(&session.render()));
            false
        }
        SubmitOutcome::Failed(_) => false,
    }
}

fn report_notice<S: DraftStorage>(session: &mut FormSession<S>) {
    if let Some(notice) = session.take_notice() {
        if notice.is_error() {
            eprintln!("Error: {}", notice.message());
        } else {
            println!("{}", notice.message());
        }
    }
}

fn run_table(portal: &InMemoryPortal, data: Option<&str>, query: &TableQuery, config: &PortalConfig) {
    let listing = match data {
        Some(path) => load_listing(path),
        None => portal
            .fetch_submissions(Some(query.page), Some(query.page_size))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to fetch submissions: {}", e))),
    };

    let mut columns = ColumnSet::new(config.default_visible_columns.iter().cloned());
    columns.initialize(&listing.columns);
    let visible: Vec<&str> = columns.visible().map(|c| c.label.as_str()).collect();

    let page = TableView::apply(&listing.data, query);
    print_rows(&visible, &page.rows);
    println!(
        "\nPage {} of {} ({} matching applications)",
        page.page,
        page.page_count.max(1),
        page.total
    );
}

fn load_listing(path: &str) -> SubmissionsPage {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    if let Ok(listing) = serde_json::from_str::<SubmissionsPage>(&content) {
        return listing;
    }
    let data: Vec<Record> = serde_json::from_str(&content)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse rows in '{}': {}", path, e)));
    let columns = data
        .first()
        .map(|row| row.keys().filter(|k| *k != "id").cloned().collect())
        .unwrap_or_default();
    SubmissionsPage { columns, data }
}

fn print_rows(columns: &[&str], rows: &[Record]) {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    println!("{}", line(columns.to_vec()));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1)));
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
    if rows.is_empty() {
        println!("No applications found.");
    }
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(portal: &InMemoryPortal, config: &PortalConfig) {
    println!("--- Shinsei Interactive Mode ---");
    list_forms(portal);

    let form_id = prompt_for_input("Enter form id", Some("health_insurance_application"));
    let drafts_dir = prompt_for_input("Enter draft directory (optional)", Some(""));
    if drafts_dir.is_empty() {
        fill_interactively(portal, &form_id, MemoryStorage::new(), config);
    } else {
        let storage = FileStorage::open(&drafts_dir)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to open draft directory: {}", e)));
        fill_interactively(portal, &form_id, storage, config);
    }
}

fn fill_interactively<S: DraftStorage>(
    portal: &InMemoryPortal,
    form_id: &str,
    storage: S,
    config: &PortalConfig,
) {
    let mut session = open_session(portal, form_id, storage, config);
    let mut asked: HashSet<String> = HashSet::new();

    loop {
        // Visibility can change with every answer, so the next question comes from a fresh render.
        while let Some(field) = next_question(&session.render(), &asked) {
            asked.insert(field.id.clone());
            if !field.options.is_empty() {
                println!("  Options: {}", field.options.join(", "));
            }
            let current = field.value.as_ref().map(|v| v.as_text().into_owned());
            let answer = prompt_for_input(&field.label, current.as_deref());
            if answer.is_empty() {
                continue;
            }
            let value = parse_input(session.form(), &field.id, &answer);
            if let Err(e) = session.set_value(&field.id, value, Instant::now()) {
                println!("  ! {}", e);
                asked.remove(&field.id);
                continue;
            }
            session.resolve_options(portal);
            report_notice(&mut session);
            if session.tick(Instant::now()) {
                println!("  (draft saved)");
            }
        }

        if let Err(e) = session.save_draft() {
            eprintln!("Warning: draft not saved: {}", e);
        }
        if submit_and_report(&mut session, portal) {
            break;
        }
        let again = prompt_for_input("Correct the form and try again? (y/n)", Some("y"));
        if !again.eq_ignore_ascii_case("y") {
            println!("Your answers are kept as a draft.");
            break;
        }
        asked.retain(|id| session.error(id).is_none());
    }
}

/// The first rendered field that has not been asked about yet.
fn next_question(nodes: &[RenderNode], asked: &HashSet<String>) -> Option<RenderedField> {
    nodes.iter().find_map(|node| match node {
        RenderNode::Group { children, .. } => next_question(children, asked),
        RenderNode::Field(field) if !asked.contains(&field.id) => Some(field.clone()),
        RenderNode::Field(_) => None,
    })
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default
        .filter(|d| !d.is_empty())
        .map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }

    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
