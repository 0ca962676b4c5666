//! `invoicedesk` command-line dashboard.
//!
//! # Responsibility
//! - Build `AppConfig` from flags and environment, then open a seeded store.
//! - Render dashboard, invoice detail, activity feed and audit as plain text.
//!
//! # Invariants
//! - The store lives for one process; changes are lost on exit.
//! - Page load failures print the user-facing message plus a retry hint and
//!   exit non-zero.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};

use invoicedesk_core::service::audit::audit_invoices;
use invoicedesk_core::view::format::{
    format_activity_timestamp, format_currency, format_long_date, format_relative_time,
    truncate_text,
};
use invoicedesk_core::view::grouping::group_invoices_by_date;
use invoicedesk_core::{
    default_log_level, init_logging, load_dashboard, load_invoice_detail, open_seeded_in_memory,
    sqlite_query_service, Activity, AppConfig, DashboardView, InvoiceDetailView, InvoiceId,
    InvoiceStatus, LatencyProfile, LoadError, SqliteQueryService, StatBucket,
};

const DESCRIPTION_WIDTH: usize = 40;

/// Invoice dashboard over the demo data set.
#[derive(Parser)]
#[command(name = "invoicedesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "INVOICEDESK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files; no file logs when absent.
    #[arg(long, env = "INVOICEDESK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Simulated query latency: demo|off.
    #[arg(long, env = "INVOICEDESK_LATENCY", default_value = "demo")]
    latency: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stats, recent invoices and the activity feed.
    Dashboard,

    /// Show one invoice with its activity.
    Invoice {
        /// Invoice id.
        id: InvoiceId,
    },

    /// Change an invoice status, e.g. `set-status 2 paid`.
    SetStatus {
        /// Invoice id.
        id: InvoiceId,

        /// PAID, OVERDUE, DRAFT, PENDING-PAYMENT or PARTIAL-PAYMENT.
        status: String,
    },

    /// List the activity feed.
    Activities {
        /// Only entries linked to this invoice.
        #[arg(long)]
        invoice: Option<InvoiceId>,
    },

    /// Check invoice totals and customer emails.
    Audit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = AppConfig {
        log_level: cli
            .log_level
            .unwrap_or_else(|| default_log_level().to_string()),
        log_dir: cli.log_dir.map(|dir| absolute_dir(&dir)).transpose()?,
        latency: LatencyProfile::from_mode(&cli.latency)?,
    };

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_seeded_in_memory()?;
    let service = sqlite_query_service(&conn, config.latency)?;
    info!("event=cli_start module=cli status=ok latency={}", cli.latency);

    match cli.command {
        Commands::Dashboard => match load_dashboard(&service).await {
            Ok(view) => print_dashboard(&view),
            Err(err) => return Ok(report_load_error(&err)),
        },
        Commands::Invoice { id } => match load_invoice_detail(&service, id).await {
            Ok(view) => print_invoice_detail(&view),
            Err(err) => return Ok(report_load_error(&err)),
        },
        Commands::SetStatus { id, status } => {
            let Some(status) = InvoiceStatus::from_label(&status) else {
                eprintln!("unknown status `{status}`");
                return Ok(ExitCode::FAILURE);
            };
            return set_status(&service, id, status).await;
        }
        Commands::Activities { invoice } => {
            let feed = match invoice {
                Some(id) => service.get_activities_for_invoice(id).await?,
                None => service.get_recent_activities().await?,
            };
            print_activities(&feed.data);
        }
        Commands::Audit => {
            let invoices = service.get_invoices().await?.data;
            let mut dirty = 0;
            for audit in audit_invoices(&invoices) {
                if audit.is_clean() {
                    println!("#{} {}: ok", audit.invoice_id, audit.invoice_number);
                    continue;
                }
                dirty += 1;
                println!("#{} {}:", audit.invoice_id, audit.invoice_number);
                for finding in &audit.findings {
                    println!("  - {finding}");
                }
            }
            if dirty > 0 {
                warn!("event=audit module=cli status=findings invoices={dirty}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn set_status(
    service: &SqliteQueryService<'_>,
    id: InvoiceId,
    status: InvoiceStatus,
) -> Result<ExitCode, Box<dyn Error>> {
    let response = service.update_invoice_status(id, status).await?;
    match response.data {
        Some(invoice) if response.success => {
            println!(
                "Invoice {} is now {} (updated {})",
                invoice.invoice_number,
                invoice.status,
                format_relative_time(&invoice.updated_at, &Utc::now())
            );
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!(
                "{}",
                response.message.as_deref().unwrap_or("Status update failed")
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn absolute_dir(dir: &Path) -> std::io::Result<PathBuf> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

fn report_load_error(err: &LoadError) -> ExitCode {
    if let Some(source) = err.source() {
        warn!("event=page_load module=cli status=error error={source}");
    }
    eprintln!("{}", err.user_message());
    eprintln!("Run the command again to retry.");
    ExitCode::FAILURE
}

fn print_dashboard(view: &DashboardView) {
    println!("== Dashboard ==");
    print_bucket("Paid", &view.stats.total_paid);
    print_bucket("Overdue", &view.stats.total_overdue);
    print_bucket("Draft", &view.stats.total_draft);
    print_bucket("Unpaid", &view.stats.total_unpaid);

    println!();
    println!("== Recent invoices ==");
    for group in group_invoices_by_date(&view.recent_invoices) {
        println!("{}", group.label);
        for invoice in group.invoices {
            println!(
                "  #{:<3} {:<14} {:<22} {:>18}  {}",
                invoice.id,
                invoice.invoice_number,
                truncate_text(&invoice.customer_name, 20),
                format_currency(invoice.total_amount, &invoice.currency),
                invoice.status
            );
        }
    }

    println!();
    println!("== Recent activity ==");
    print_activities(&view.activities);
}

fn print_bucket(label: &str, bucket: &StatBucket) {
    // Dashboard cards show USD amounts.
    println!(
        "{label:<8} {:>3}  {}",
        bucket.count,
        format_currency(bucket.amount, "USD")
    );
}

fn print_invoice_detail(view: &InvoiceDetailView) {
    let invoice = &view.invoice;
    println!("Invoice {} [{}]", invoice.invoice_number, invoice.status);
    println!(
        "Created {}  Issued {}  Due {}",
        format_long_date(&invoice.created_at),
        invoice.issue_date,
        invoice.due_date
    );
    println!("From: {} <{}>", invoice.sender.name, invoice.sender.email);
    println!(
        "To:   {} <{}> {}",
        invoice.customer_name, invoice.customer_email, invoice.customer_phone
    );

    println!();
    for item in &invoice.items {
        println!(
            "  {:<width$} {:>4} x {:>16} = {:>18}",
            truncate_text(&item.description, DESCRIPTION_WIDTH),
            item.quantity,
            format_currency(item.unit_price, &invoice.currency),
            format_currency(item.total, &invoice.currency),
            width = DESCRIPTION_WIDTH + 3
        );
    }
    println!(
        "  Subtotal {:>18}",
        format_currency(invoice.subtotal, &invoice.currency)
    );
    println!(
        "  Discount {:>18} ({}%)",
        format_currency(invoice.discount, &invoice.currency),
        invoice.discount_percentage()
    );
    println!(
        "  Total    {:>18}",
        format_currency(invoice.total_amount, &invoice.currency)
    );

    let active: Vec<&str> = invoice
        .reminders
        .iter()
        .filter(|reminder| reminder.is_active)
        .map(|reminder| reminder.label.as_str())
        .collect();
    if !active.is_empty() {
        println!("Reminders: {}", active.join(", "));
    }
    if let Some(note) = &invoice.note {
        println!("Note: {note}");
    }

    println!();
    println!("== Activity ==");
    print_activities(&view.activities);
}

fn print_activities(activities: &[Activity]) {
    if activities.is_empty() {
        println!("(no activity)");
        return;
    }
    let now = Utc::now();
    for activity in activities {
        let amount = activity
            .amount
            .map(|amount| format!(" {}", format_currency(amount, "USD")))
            .unwrap_or_default();
        println!(
            "{:<22} {}{} by {}",
            format_activity_timestamp(&activity.timestamp, &now),
            activity.description,
            amount,
            activity.user
        );
        if let Some(details) = &activity.details {
            println!("{:<22} {details}", "");
        }
    }
}
