//! Command handlers. Each returns the process exit code.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::join_all;
use jobassist_console::api::ApiClient;
use jobassist_console::guard::{Transport, UploadPart};
use jobassist_console::reconcile::{PendingAction, ReconcileError, ReconcileSession};
use jobassist_console::views::sort::SortState;
use jobassist_console::views::{applications, companies, documents, print_error, print_success, sidebar};
use shared_types::{CompanySuggestion, ContactListing, Envelope, MappingOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cli::{
    ApplicationCommand, Command, CompanyCommand, DocumentArg, DocumentCommand, ReconcileCommand,
};

pub async fn run<T: Transport>(command: Command, api: &ApiClient<T>) -> Result<i32> {
    match command {
        Command::Health => health(api).await,
        Command::Companies(cmd) => run_companies(cmd, api).await,
        Command::Sidebar { search, filter } => {
            let summaries = api.sidebar().await?;
            let shown = sidebar::filter_companies(&summaries, search.as_deref(), filter);
            if shown.is_empty() {
                println!("No companies match.");
            } else {
                println!("{}", sidebar::sidebar_table(&shown));
            }
            Ok(0)
        }
        Command::Contacts => {
            let contacts = api.all_contacts().await?;
            print_contacts(&contacts);
            Ok(0)
        }
        Command::Reconcile { action } => {
            run_reconcile(action.unwrap_or(ReconcileCommand::Interactive), api).await
        }
        Command::Applications(cmd) => run_applications(cmd, api).await,
        Command::Documents(cmd) => run_documents(cmd, api).await,
    }
}

async fn health<T: Transport>(api: &ApiClient<T>) -> Result<i32> {
    let body = api.health().await?;
    let message = body
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("API is reachable");
    print_success(message);
    Ok(0)
}

fn sort_state<C: Copy + PartialEq>(mut state: SortState<C>, picks: Vec<C>) -> SortState<C> {
    state.select_all(picks);
    state
}

fn message_or<T>(envelope: &Envelope<T>, fallback: &str) -> String {
    envelope
        .message
        .clone()
        .unwrap_or_else(|| fallback.to_string())
}

// ─── Companies ──────────────────────────────────────────────────────────────

async fn run_companies<T: Transport>(cmd: CompanyCommand, api: &ApiClient<T>) -> Result<i32> {
    match cmd {
        CompanyCommand::List { sort } => {
            let mut rows = api.list_companies().await?;
            if rows.is_empty() {
                println!("No existing profiles found.");
                return Ok(0);
            }
            let state = sort_state(companies::default_sort(), sort);
            println!("{}", companies::company_table(&mut rows, &state));
        }
        CompanyCommand::Show { company_id } => {
            let (company, raw_names, contacts, apps) = futures::try_join!(
                api.get_company(company_id),
                api.company_raw_names(company_id),
                api.company_contacts(company_id),
                api.applications_for_company(company_id),
            )?;
            println!("{}", companies::profile_table(&company));
            if raw_names.is_empty() {
                println!("No raw names are mapped to this company.");
            } else {
                println!("{}", companies::raw_names_table(&raw_names));
            }
            if contacts.is_empty() {
                println!("No contacts found for this company.");
            } else {
                println!("{}", companies::contacts_table(&contacts));
            }
            if apps.is_empty() {
                println!("No applications for this company yet.");
            } else {
                let mut apps = apps;
                println!(
                    "{}",
                    applications::dashboard_table(&mut apps, &applications::default_sort())
                );
            }
        }
        CompanyCommand::Create(fields) => {
            let created = api.create_company(&fields.into_payload()).await?;
            print_success(&format!(
                "{} (id {})",
                message_or(&created, "Company created"),
                created.data.company_id
            ));
        }
        CompanyCommand::Update { company_id, fields } => {
            let updated = api.update_company(company_id, &fields.into_payload()).await?;
            print_success(&message_or(&updated, "Company updated"));
        }
        CompanyCommand::Delete { company_id } => {
            api.delete_company(company_id).await?;
            print_success(&format!("Company {company_id} deleted"));
        }
    }
    Ok(0)
}

fn print_contacts(contacts: &[ContactListing]) {
    use jobassist_console::views::render::{new_table, text_cell};

    if contacts.is_empty() {
        println!("No contacts imported yet.");
        return;
    }
    let mut table = new_table(
        ["Name", "Position", "Raw company", "Company", "Email"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    for contact in contacts {
        table.add_row(vec![
            text_cell(Some(contact.full_name())),
            text_cell(contact.position.as_deref()),
            text_cell(contact.raw_company_name.as_deref()),
            text_cell(contact.company_name_clean.as_deref()),
            text_cell(contact.email_address.as_deref()),
        ]);
    }
    println!("{table}");
}

// ─── Reconciliation ─────────────────────────────────────────────────────────

async fn run_reconcile<T: Transport>(cmd: ReconcileCommand, api: &ApiClient<T>) -> Result<i32> {
    match cmd {
        ReconcileCommand::List => {
            let names = api.unmapped_list().await?;
            if names.is_empty() {
                print_success("All company names are processed.");
            } else {
                for name in &names {
                    println!("{name}");
                }
                println!("{} unmapped", names.len());
            }
            Ok(0)
        }
        ReconcileCommand::Batch { no_target } => {
            let outcome = api.map_batch(!no_target).await?;
            let summary = format!(
                "{} (processed {}, failed {})",
                message_or(&outcome, "Batch mapping finished"),
                outcome.data.processed_count,
                outcome.data.failed_count
            );
            if outcome.data.failed_count > 0 {
                print_error(&summary);
                Ok(1)
            } else {
                print_success(&summary);
                Ok(0)
            }
        }
        ReconcileCommand::Regenerate => {
            let outcome = api.regenerate_unmapped().await?;
            print_success(&format!(
                "{} ({} new)",
                message_or(&outcome, "Unmapped names regenerated"),
                outcome.data.inserted_count
            ));
            Ok(0)
        }
        ReconcileCommand::Interactive => reconcile_interactive(api).await,
    }
}

const RECONCILE_HELP: &str = "\
Commands:
  search <text>     suggest existing companies
  pick <n>          select suggestion n
  existing          map to the selected company
  new <name>        map to a new company with this clean name
  target <name>     same as new, flagged as a target company
  self              map to a company named after the raw name
  goto <n>          work on queue entry n instead
  list              show the queue
  help              show this help
  quit              stop";

async fn reconcile_interactive<T: Transport>(api: &ApiClient<T>) -> Result<i32> {
    let mut session = ReconcileSession::load(api).await?;
    let mut suggestions: Vec<CompanySuggestion> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{RECONCILE_HELP}");
    loop {
        let Some(current) = session.current().map(str::to_string) else {
            print_success("All company names are processed.");
            break;
        };
        let selected = session
            .selected_company()
            .map(|c| format!(" -> {}", c.company_name_clean))
            .unwrap_or_default();
        println!("\n[{} left] {current}{selected}", session.queue().len());

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let (verb, rest) = match line.trim().split_once(' ') {
            Some((verb, rest)) => (verb.to_string(), rest.trim().to_string()),
            None => (line.trim().to_string(), String::new()),
        };

        let action = match verb.as_str() {
            "" => continue,
            "quit" | "q" | "exit" => break,
            "help" | "?" => {
                println!("{RECONCILE_HELP}");
                continue;
            }
            "list" => {
                for (index, name) in session.queue().iter().enumerate() {
                    println!("{:>4}  {name}", index + 1);
                }
                continue;
            }
            "goto" => {
                let target = parse_index(&rest, session.queue().len())
                    .map(|i| session.queue()[i].clone());
                match target {
                    Some(name) => {
                        session.select_raw_name(&name);
                        suggestions.clear();
                    }
                    None => print_error("No such queue entry."),
                }
                continue;
            }
            "search" => {
                match session.suggestions(api, &rest).await {
                    Ok(found) if found.is_empty() => println!("No existing profiles found."),
                    Ok(found) => {
                        for (index, company) in found.iter().enumerate() {
                            println!("{:>4}  {}", index + 1, company.company_name_clean);
                        }
                        suggestions = found;
                    }
                    Err(e) => print_error(&e.to_string()),
                }
                continue;
            }
            "pick" => {
                match parse_index(&rest, suggestions.len()) {
                    Some(i) => session.select_company(suggestions[i].clone()),
                    None => print_error("No such suggestion."),
                }
                continue;
            }
            "existing" => PendingAction::Existing,
            "new" | "target" => PendingAction::New {
                company_name_clean: rest,
                target_interest: verb == "target",
            },
            "self" => PendingAction::SelfMap,
            other => {
                print_error(&format!("Unknown command '{other}'. Type help for a list."));
                continue;
            }
        };

        match session.apply(api, action).await {
            Ok(outcome) => {
                suggestions.clear();
                print_success(&mapping_message(&outcome));
            }
            Err(e) => {
                if let ReconcileError::Guard(guard) = &e {
                    warn!(raw_name = %current, error = %guard, "Mapping failed");
                }
                print_error(&e.to_string());
            }
        }
    }

    info!(resolved = session.resolved().len(), "Reconciliation session ended");
    println!("Resolved {} name(s) this session.", session.resolved().len());
    Ok(0)
}

fn mapping_message(outcome: &Envelope<MappingOutcome>) -> String {
    outcome.message.clone().unwrap_or_else(|| {
        format!(
            "'{}' mapped to {}",
            outcome.data.raw_name, outcome.data.company_name_clean
        )
    })
}

/// One-based index from user input.
fn parse_index(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

// ─── Applications ───────────────────────────────────────────────────────────

async fn run_applications<T: Transport>(cmd: ApplicationCommand, api: &ApiClient<T>) -> Result<i32> {
    match cmd {
        ApplicationCommand::List { company, sort } => {
            let mut rows = match company {
                Some(company_id) => api.applications_for_company(company_id).await?,
                None => api.all_applications().await?,
            };
            if rows.is_empty() {
                println!("No applications found.");
                return Ok(0);
            }
            let state = sort_state(applications::default_sort(), sort);
            println!("{}", applications::dashboard_table(&mut rows, &state));
        }
        ApplicationCommand::Show { application_id } => {
            let app = api.get_application(application_id).await?;
            println!("{}", applications::review_table(&app));
            println!("{}", applications::attached_documents_table(&app));
        }
        ApplicationCommand::Create {
            fields,
            company_name,
            documents,
        } => {
            let created = api
                .create_application(&fields.into_payload(company_name))
                .await?;
            let application_id = created.data.application_id;
            print_success(&format!(
                "{} (id {application_id})",
                message_or(&created, "Application created")
            ));
            return upload_documents(api, application_id, documents).await;
        }
        ApplicationCommand::Update {
            application_id,
            fields,
        } => {
            let updated = api
                .update_application(application_id, &fields.into_payload(None))
                .await?;
            print_success(&message_or(&updated, "Application updated"));
        }
        ApplicationCommand::Delete { application_id } => {
            let deleted = api.delete_application(application_id).await?;
            print_success(&message_or(&deleted, "Application deleted"));
        }
    }
    Ok(0)
}

/// Uploads run concurrently; each file succeeds or fails on its own.
async fn upload_documents<T: Transport>(
    api: &ApiClient<T>,
    application_id: Uuid,
    documents: Vec<DocumentArg>,
) -> Result<i32> {
    if documents.is_empty() {
        return Ok(0);
    }

    let uploads = documents.iter().map(|doc| async move {
        let part = read_upload_part(&doc.path).await?;
        let uploaded = api
            .upload_document(application_id, doc.document_type, part)
            .await?;
        Ok::<_, anyhow::Error>(uploaded)
    });
    let results = join_all(uploads).await;

    let mut failed = 0;
    for (doc, result) in documents.iter().zip(results) {
        match result {
            Ok(_) => print_success(&format!("Uploaded {}", doc.path.display())),
            Err(e) => {
                failed += 1;
                print_error(&format!("Upload of {} failed: {e:#}", doc.path.display()));
            }
        }
    }

    let total = documents.len();
    if failed > 0 {
        print_error(&format!(
            "Application saved, but {failed} of {total} document(s) failed to upload."
        ));
        Ok(1)
    } else {
        print_success(&format!("All {total} document(s) uploaded."));
        Ok(0)
    }
}

async fn read_upload_part(path: &Path) -> Result<UploadPart> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(UploadPart {
        field: "file".to_string(),
        file_name,
        content_type: None,
        bytes: bytes.into(),
    })
}

// ─── Documents ──────────────────────────────────────────────────────────────

async fn run_documents<T: Transport>(cmd: DocumentCommand, api: &ApiClient<T>) -> Result<i32> {
    match cmd {
        DocumentCommand::List { sort } => {
            let mut rows = api.all_documents().await?;
            if rows.is_empty() {
                println!("No documents uploaded yet.");
                return Ok(0);
            }
            let state = sort_state(documents::default_sort(), sort);
            println!("{}", documents::dashboard_table(&mut rows, &state));
        }
        DocumentCommand::Download {
            document_id,
            output,
        } => {
            let download = api.download_document(document_id).await?;
            let file_name = download
                .file_name
                .clone()
                .unwrap_or_else(|| document_id.to_string());
            let target = download_target(output, &file_name);
            tokio::fs::write(&target, &download.bytes)
                .await
                .with_context(|| format!("Failed to write {}", target.display()))?;
            print_success(&format!(
                "Saved {} ({} bytes)",
                target.display(),
                download.bytes.len()
            ));
        }
        DocumentCommand::Delete { document_id } => {
            let deleted = api.delete_document(document_id).await?;
            print_success(&message_or(&deleted, "Document deleted"));
        }
    }
    Ok(0)
}

fn download_target(output: Option<PathBuf>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path,
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_is_one_based_and_bounded() {
        assert_eq!(parse_index("1", 3), Some(0));
        assert_eq!(parse_index(" 3 ", 3), Some(2));
        assert_eq!(parse_index("0", 3), None);
        assert_eq!(parse_index("4", 3), None);
        assert_eq!(parse_index("x", 3), None);
    }

    #[test]
    fn test_download_target_joins_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = download_target(Some(dir.path().to_path_buf()), "cv.pdf");
        assert_eq!(target, dir.path().join("cv.pdf"));
        assert_eq!(download_target(None, "cv.pdf"), PathBuf::from("cv.pdf"));
    }

    #[tokio::test]
    async fn test_read_upload_part_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let part = read_upload_part(&path).await.unwrap();
        assert_eq!(part.field, "file");
        assert_eq!(part.file_name, "letter.txt");
        assert_eq!(&part.bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_read_upload_part_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_upload_part(&dir.path().join("nope.pdf")).await.is_err());
    }
}
