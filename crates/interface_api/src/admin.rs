//! `invoice-admin` commands
//!
//! The binary parses [`Cli`], connects to the database and hands the ports
//! to [`run`]. Each command prints a short report of what it did.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use core_kernel::{ContactId, InvoiceId, UserId};
use domain_invoice::{
    ChargeableTimeReport, InvoiceCreate, InvoiceCreateBatch, InvoiceError, InvoicePort, MailPort,
    TimeSummaryMailer,
};
use invoice_pdf::{render_invoice, InvoicePrint, JpegImage};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "invoice-admin", version, about = "Time billing administration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Invoice every contact's outstanding time
    CreateInvoices {
        /// Last day whose time is billed (YYYY-MM-DD)
        #[arg(long)]
        until: NaiveDate,
        /// Staff member creating the invoices
        #[arg(long)]
        user: i64,
    },
    /// Invoice one contact's outstanding time
    CreateInvoice {
        #[arg(long)]
        contact: i64,
        #[arg(long)]
        until: NaiveDate,
        #[arg(long)]
        user: i64,
    },
    /// Write an invoice PDF
    PrintInvoice {
        #[arg(long)]
        invoice: i64,
        /// JPEG for the header, overriding the configured logo
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Output directory, overriding the configured one
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export chargeable minutes per user per week as tab-separated text
    ReportChargeableTime {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Queue the time summary mail for users who asked for it
    MailTimeSummary {
        /// Days covered, ending today
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
}

/// What the commands run against
pub struct AdminContext {
    pub port: Arc<dyn InvoicePort>,
    pub mail: Arc<dyn MailPort>,
    pub config: AppConfig,
}

impl AdminContext {
    async fn invoice_create(&self, until: NaiveDate) -> Result<InvoiceCreate> {
        let settings = self
            .port
            .get_settings()
            .await?
            .ok_or(InvoiceError::MissingSettings)?;
        Ok(InvoiceCreate::from_settings(self.port.clone(), &settings, until))
    }

    fn print(&self, logo: Option<PathBuf>) -> Result<InvoicePrint> {
        Ok(match logo {
            Some(path) => InvoicePrint::new()
                .with_logo(JpegImage::open(&path).with_context(|| format!("Cannot read {}", path.display()))?),
            None => self.config.invoice_print()?,
        })
    }
}

/// Runs one command
pub async fn run(command: Command, ctx: &AdminContext) -> Result<()> {
    match command {
        Command::CreateInvoices { until, user } => {
            let outcome = InvoiceCreateBatch::new(ctx.invoice_create(until).await?)
                .create(UserId::new(user))
                .await?;
            for invoice in &outcome.invoices {
                println!("{}\t{}\t{}", invoice.invoice_number(), invoice.contact_id, invoice.gross());
            }
            for failure in &outcome.failures {
                eprintln!("{}: {}", failure.contact_name, failure.error);
            }
            println!(
                "Created {} invoices, {} contacts failed",
                outcome.invoices.len(),
                outcome.failures.len()
            );
            if !outcome.is_clean() {
                bail!("{} contacts could not be invoiced", outcome.failures.len());
            }
        }
        Command::CreateInvoice { contact, until, user } => {
            let contact = ctx.port.get_contact(ContactId::new(contact)).await?;
            let created = ctx
                .invoice_create(until)
                .await?
                .create(UserId::new(user), &contact)
                .await?;
            match created {
                Some(invoice) => println!(
                    "Created invoice {} for {}: {}",
                    invoice.invoice_number(),
                    contact.name,
                    invoice.gross()
                ),
                None => println!("Nothing to invoice for {}", contact.name),
            }
        }
        Command::PrintInvoice { invoice, logo, out } => {
            let print = ctx.print(logo)?;
            let rendered = render_invoice(&print, ctx.port.as_ref(), InvoiceId::new(invoice)).await?;
            let dir = out.unwrap_or_else(|| ctx.config.pdf_output_dir.clone());
            let path = rendered.save(&dir)?;
            println!("{} ({} pages)", path.display(), rendered.page_count);
        }
        Command::ReportChargeableTime { out } => {
            let report = ChargeableTimeReport::load(ctx.port.as_ref()).await?;
            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            let path = dir.join(ChargeableTimeReport::file_name(Utc::now()));
            let file = File::create(&path).with_context(|| format!("Cannot create {}", path.display()))?;
            report.write_tsv(BufWriter::new(file))?;
            info!(path = %path.display(), weeks = report.weeks.len(), "Chargeable time report written");
            println!("{}", path.display());
        }
        Command::MailTimeSummary { days } => {
            let users = TimeSummaryMailer::new(ctx.port.clone(), ctx.mail.clone())
                .with_days(days)
                .run(Utc::now())
                .await?;
            for user in &users {
                println!("Queued time summary for {}", user.username);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_invoice() {
        let cli = Cli::try_parse_from([
            "invoice-admin",
            "create-invoice",
            "--contact",
            "3",
            "--until",
            "2012-09-30",
            "--user",
            "1",
        ])
        .unwrap();
        match cli.command {
            Command::CreateInvoice { contact, until, user } => {
                assert_eq!(contact, 3);
                assert_eq!(until, NaiveDate::from_ymd_opt(2012, 9, 30).unwrap());
                assert_eq!(user, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_mail_days_default_to_one() {
        let cli = Cli::try_parse_from(["invoice-admin", "mail-time-summary"]).unwrap();
        assert!(matches!(cli.command, Command::MailTimeSummary { days: 1 }));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let result = Cli::try_parse_from([
            "invoice-admin",
            "create-invoices",
            "--until",
            "30/09/2012",
            "--user",
            "1",
        ]);
        assert!(result.is_err());
    }
}
