//! Command-line definitions for the JobAssist console.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Args, Parser, Subcommand};
use shared_types::{ApplicationPayload, CompanyPayload, DocumentType};
use uuid::Uuid;

use jobassist_console::views::applications::ApplicationColumn;
use jobassist_console::views::companies::CompanyColumn;
use jobassist_console::views::documents::DocumentColumn;
use jobassist_console::views::sidebar::TargetFilter;

#[derive(Parser)]
#[command(
    name = "jobassist",
    version,
    about = "JobAssist - track companies, contacts, applications and documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// API base URL (overrides JOBASSIST_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token (overrides JOBASSIST_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// File containing the bearer token (overrides JOBASSIST_TOKEN_FILE).
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the API and its database are reachable.
    Health,

    /// Company profiles.
    #[command(subcommand)]
    Companies(CompanyCommand),

    /// Company summaries for quick navigation.
    Sidebar {
        /// Case-insensitive name filter.
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = TargetFilter::All)]
        filter: TargetFilter,
    },

    /// Imported contacts with their resolved company.
    Contacts,

    /// Resolve raw company names from imported contacts.
    Reconcile {
        #[command(subcommand)]
        action: Option<ReconcileCommand>,
    },

    /// Job applications.
    #[command(subcommand)]
    Applications(ApplicationCommand),

    /// Uploaded documents.
    #[command(subcommand)]
    Documents(DocumentCommand),
}

#[derive(Subcommand)]
pub enum CompanyCommand {
    /// List companies with application and contact counts.
    List {
        /// Sort column; repeat to toggle, as if clicking a header.
        #[arg(long, value_enum, action = ArgAction::Append)]
        sort: Vec<CompanyColumn>,
    },
    /// Show a profile with its mapped raw names, contacts and applications.
    Show { company_id: i32 },
    /// Create a company.
    Create(CompanyArgs),
    /// Replace a company record. Omitted fields are cleared.
    Update {
        company_id: i32,
        #[command(flatten)]
        fields: CompanyArgs,
    },
    /// Delete a company. Its raw names return to the reconciliation queue.
    Delete { company_id: i32 },
}

#[derive(Args)]
pub struct CompanyArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub target: bool,
    #[arg(long)]
    pub headquarters: Option<String>,
    #[arg(long)]
    pub size: Option<i32>,
    #[arg(long)]
    pub revenue: Option<f64>,
    /// Revenue unit, e.g. M or B.
    #[arg(long)]
    pub revenue_scale: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl CompanyArgs {
    pub fn into_payload(self) -> CompanyPayload {
        CompanyPayload {
            company_name_clean: Some(self.name),
            target_interest: Some(self.target),
            headquarters: self.headquarters,
            size_employees: self.size,
            annual_revenue: self.revenue,
            revenue_scale: self.revenue_scale,
            notes: self.notes,
        }
    }
}

#[derive(Subcommand)]
pub enum ReconcileCommand {
    /// Work through the queue interactively (default).
    Interactive,
    /// Print the unmapped raw names.
    List,
    /// Map every remaining raw name to a company of the same name.
    Batch {
        /// Create the companies without the target flag.
        #[arg(long)]
        no_target: bool,
    },
    /// Rebuild queue rows for contact company names not yet tracked.
    Regenerate,
}

#[derive(Subcommand)]
pub enum ApplicationCommand {
    /// Applications dashboard, or one company's applications.
    List {
        #[arg(long)]
        company: Option<i32>,
        /// Sort column; repeat to toggle, as if clicking a header.
        #[arg(long, value_enum, action = ArgAction::Append)]
        sort: Vec<ApplicationColumn>,
    },
    /// Review one application with its documents.
    Show { application_id: Uuid },
    /// Create an application and upload its documents.
    Create {
        #[command(flatten)]
        fields: ApplicationArgs,
        /// Company name; created when no company has this name.
        #[arg(long, conflicts_with = "company_id")]
        company_name: Option<String>,
        /// Document to attach as TYPE=PATH, e.g. resume=./cv.pdf. Repeatable.
        #[arg(long = "document", value_name = "TYPE=PATH")]
        documents: Vec<DocumentArg>,
    },
    /// Replace an application record.
    Update {
        application_id: Uuid,
        #[command(flatten)]
        fields: ApplicationArgs,
    },
    /// Delete an application with its documents.
    Delete { application_id: Uuid },
}

#[derive(Args)]
pub struct ApplicationArgs {
    #[arg(long)]
    pub company_id: Option<i32>,
    #[arg(long)]
    pub title: Option<String>,
    /// YYYY-MM-DD; defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
}

impl ApplicationArgs {
    pub fn into_payload(self, company_name: Option<String>) -> ApplicationPayload {
        ApplicationPayload {
            company_id: self.company_id,
            company_name_clean: company_name,
            title_name: self.title,
            date_applied: Some(
                self.date
                    .unwrap_or_else(|| chrono::Local::now().date_naive().to_string()),
            ),
            current_status: self.status,
            job_posting_url: self.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentArg {
    pub document_type: DocumentType,
    pub path: PathBuf,
}

impl FromStr for DocumentArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected TYPE=PATH, got '{s}'"))?;
        let document_type = kind.parse::<DocumentType>().map_err(|e| e.to_string())?;
        let path = path.trim();
        if path.is_empty() {
            return Err(format!("missing file path in '{s}'"));
        }
        Ok(DocumentArg {
            document_type,
            path: PathBuf::from(path),
        })
    }
}

#[derive(Subcommand)]
pub enum DocumentCommand {
    /// File dashboard.
    List {
        /// Sort column; repeat to toggle, as if clicking a header.
        #[arg(long, value_enum, action = ArgAction::Append)]
        sort: Vec<DocumentColumn>,
    },
    /// Download a document under its original file name.
    Download {
        document_id: Uuid,
        /// Target file or directory (defaults to the current directory).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete a document and its stored file.
    Delete { document_id: Uuid },
}
