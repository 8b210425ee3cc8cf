//! Plain-text and CSV rendering for the command line tools.
//!
//! Everything here only formats values handed in by the store; nothing is
//! derived or looked up.

use booklend_core::{Book, Decimal, FineSummary, FormEntry, Member, Transaction};
use booklend_store::{Settings, StockLine};
use serde::Serialize;
use std::io::{self, Write};

/// Format an amount as ringgit.
pub fn money(amount: Decimal) -> String {
    format!("RM {:.2}", amount.round_dp(2))
}

/// Write the catalog as a table.
pub fn write_books<W: Write>(out: &mut W, books: &[Book]) -> io::Result<()> {
    writeln!(
        out,
        "{:<14} {:<10} {:>4} {:<9} {:>6} {:>10}  TITLE",
        "ID", "CODE", "YEAR", "TYPE", "STOCK", "PRICE"
    )?;
    for book in books {
        writeln!(
            out,
            "{:<14} {:<10} {:>4} {:<9} {:>6} {:>10}  {}",
            book.id,
            book.code,
            book.year,
            book.book_type.to_string(),
            book.stock,
            money(book.price),
            book.title
        )?;
    }
    Ok(())
}

/// Write the roster as a table.
pub fn write_members<W: Write>(out: &mut W, members: &[Member]) -> io::Result<()> {
    writeln!(out, "{:<16} {:<8} {:>4} {:<12} NAME", "ID", "TYPE", "YEAR", "CLASS")?;
    for member in members {
        writeln!(
            out,
            "{:<16} {:<8} {:>4} {:<12} {}",
            member.id,
            member.member_type.to_string(),
            member.year.map_or_else(|| "-".to_string(), |y| y.to_string()),
            member.class_name.as_deref().unwrap_or("-"),
            member.name
        )?;
    }
    Ok(())
}

/// Write ledger records as a table, in the order given.
pub fn write_log<'a, W: Write>(
    out: &mut W,
    entries: impl IntoIterator<Item = &'a Transaction>,
) -> io::Result<()> {
    writeln!(
        out,
        "{:<16} {:<22} {:<14} {:>3} {:<24} {:<20} TITLE",
        "ID", "TIME", "ACTION", "QTY", "NAME", "STATUS"
    )?;
    for tx in entries {
        let status = match (tx.resolution_status, tx.resolution_method) {
            (Some(_), Some(method)) => format!("{} ({method})", tx.status),
            (Some(status), None) => format!("{} ({status:?})", tx.status),
            _ => tx.status.to_string(),
        };
        writeln!(
            out,
            "{:<16} {:<22} {:<14} {:>3} {:<24} {:<20} {}",
            tx.id,
            tx.timestamp,
            tx.action.to_string(),
            tx.quantity,
            tx.user_name,
            status,
            tx.book_title
        )?;
    }
    Ok(())
}

/// Write the stock report.
pub fn write_stock<W: Write>(out: &mut W, lines: &[StockLine]) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:>4} {:<9} {:>8} {:>8}  TITLE",
        "CODE", "YEAR", "TYPE", "ON SHELF", "ON LOAN"
    )?;
    for line in lines {
        writeln!(
            out,
            "{:<10} {:>4} {:<9} {:>8} {:>8}  {}",
            line.book.code,
            line.book.year,
            line.book.book_type.to_string(),
            line.book.stock,
            line.on_loan,
            line.book.title
        )?;
    }
    let shelf: u64 = lines.iter().map(|l| u64::from(l.book.stock)).sum();
    let loaned: u64 = lines.iter().map(|l| u64::from(l.on_loan)).sum();
    writeln!(out, "{} titles, {shelf} on shelf, {loaned} on loan", lines.len())
}

/// Write fine totals followed by the outstanding records.
pub fn write_fines<'a, W: Write>(
    out: &mut W,
    summary: &FineSummary,
    outstanding: impl IntoIterator<Item = &'a Transaction>,
) -> io::Result<()> {
    writeln!(out, "Damage records:    {}", summary.records)?;
    writeln!(
        out,
        "Outstanding:       {} ({} records)",
        money(summary.outstanding),
        summary.outstanding_records
    )?;
    writeln!(out, "Collected in cash: {}", money(summary.collected_cash))?;
    writeln!(out, "Waived (replaced): {}", money(summary.waived))?;
    writeln!(
        out,
        "Total assessed:    {} (incl. waived)",
        money(summary.assessed())
    )?;

    let mut header = false;
    for tx in outstanding {
        if !header {
            writeln!(out)?;
            writeln!(out, "{:<16} {:<12} {:<24} TITLE", "ID", "FINE", "NAME")?;
            header = true;
        }
        writeln!(
            out,
            "{:<16} {:<12} {:<24} {}",
            tx.id,
            money(tx.fine_amount),
            tx.user_name,
            tx.book_title
        )?;
    }
    Ok(())
}

/// One row of the CSV ledger export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogRecord<'a> {
    id: &'a str,
    timestamp: &'a str,
    action: String,
    book_id: &'a str,
    book_title: &'a str,
    user_name: &'a str,
    user_type: String,
    quantity: u32,
    status: String,
    fine_amount: String,
    resolution_status: String,
    resolution_method: String,
}

impl<'a> From<&'a Transaction> for LogRecord<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: &tx.id,
            timestamp: &tx.timestamp,
            action: tx.action.to_string(),
            book_id: &tx.book_id,
            book_title: &tx.book_title,
            user_name: &tx.user_name,
            user_type: tx.user_type.to_string(),
            quantity: tx.quantity,
            status: tx.status.to_string(),
            fine_amount: tx.reported_fine().to_string(),
            resolution_status: tx
                .resolution_status
                .map(|s| format!("{s:?}"))
                .unwrap_or_default(),
            resolution_method: tx
                .resolution_method
                .map(|m| m.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Export ledger records as CSV with a header row.
pub fn write_log_csv<'a, W: Write>(
    out: W,
    entries: impl IntoIterator<Item = &'a Transaction>,
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for tx in entries {
        writer.serialize(LogRecord::from(tx))?;
    }
    writer.flush()?;
    Ok(())
}

/// Render a member's printable loan form.
pub fn write_form<W: Write>(
    out: &mut W,
    settings: &Settings,
    member: &Member,
    rows: &[(&Book, FormEntry)],
) -> io::Result<()> {
    let header = settings.header();
    if !header.is_empty() {
        writeln!(out, "{header}")?;
    }
    writeln!(out, "TEXTBOOK LOAN FORM")?;
    writeln!(out, "Name:  {}", member.name)?;
    match (member.year, member.class_name.as_deref()) {
        (Some(year), class) if member.is_student() => {
            writeln!(out, "Class: {year} {}", class.unwrap_or("-"))?;
        }
        _ => writeln!(out, "Type:  {}", member.member_type)?,
    }
    writeln!(out)?;
    writeln!(
        out,
        "{:>3}  {:<10} {:<14} {:<12} {:<12} {:<12}  TITLE",
        "NO", "CODE", "SERIAL", "RECEIVED", "RETURNED", "CONDITION"
    )?;
    for (i, (book, entry)) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<10} {:<14} {:<12} {:<12} {:<12}  {}",
            i + 1,
            book.code,
            entry.serial,
            entry.received_date,
            entry.return_date,
            entry.status,
            book.title
        )?;
    }
    if !settings.officer_name.is_empty() {
        writeln!(out)?;
        writeln!(out, "Officer in charge: {}", settings.officer_name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::{ledger, BookDraft, LoanAction, MemberDraft, MemberType, ResolutionMethod};
    use rust_decimal_macros::dec;

    fn book() -> Book {
        Book::from_draft(
            "B1",
            BookDraft::new("Sains Tahun 1", "SN1", 1)
                .with_stock(10)
                .with_price(dec!(12.5)),
        )
        .unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_money() {
        assert_eq!(money(dec!(12.5)), "RM 12.50");
        assert_eq!(money(dec!(0)), "RM 0.00");
    }

    #[test]
    fn test_books_table() {
        let text = render(|out| write_books(out, &[book()]));
        assert!(text.starts_with("ID"));
        assert!(text.contains("SN1"));
        assert!(text.contains("RM 12.50"));
        assert!(text.contains("SAINS TAHUN 1"));
    }

    #[test]
    fn test_log_csv() {
        let tx = Transaction::new(
            "T1",
            &book(),
            LoanAction::ReturnDamaged,
            ("Ali", MemberType::Student),
            1,
            0,
        );
        let mut out = Vec::new();
        write_log_csv(&mut out, [&tx]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,timestamp,action,bookId,bookTitle,userName,userType,quantity,status,fineAmount,resolutionStatus,resolutionMethod"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("T1,"));
        assert!(row.contains(",ALI,Student,1,Damaged/Lost,12.5,Outstanding,"));
    }

    #[test]
    fn test_log_csv_shows_replaced_fines_as_zero() {
        let mut log = booklend_core::Ledger::new();
        log.record(Transaction::new(
            "T1",
            &book(),
            LoanAction::ReturnDamaged,
            ("Ali", MemberType::Student),
            1,
            0,
        ));
        log.settle("T1", ResolutionMethod::ReplacementBook);
        let mut out = Vec::new();
        write_log_csv(&mut out, log.entries()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains(",Damaged/Lost,0,Settled,Replacement-Book"));
    }

    #[test]
    fn test_fines_total_is_labelled_with_waived() {
        let mut log = booklend_core::Ledger::new();
        log.record(Transaction::new(
            "T1",
            &book(),
            LoanAction::ReturnDamaged,
            ("Ali", MemberType::Student),
            1,
            0,
        ));
        log.settle("T1", ResolutionMethod::ReplacementBook);
        let summary = ledger::fine_summary(log.entries());
        let text = render(|out| write_fines(out, &summary, Vec::<&Transaction>::new()));
        assert!(text.contains("Outstanding:       RM 0.00 (0 records)"));
        assert!(text.contains("Waived (replaced): RM 12.50"));
        assert!(text.contains("Total assessed:    RM 12.50 (incl. waived)"));
    }

    #[test]
    fn test_form() {
        let member =
            Member::from_draft("M1", MemberDraft::student("Ali", 1, Some("Amanah"))).unwrap();
        let settings = Settings {
            school_name: "SK TAMAN MELATI".to_string(),
            officer_name: "CIKGU LEE".to_string(),
            ..Settings::default()
        };
        let b = book();
        let entry = FormEntry {
            serial: "SN-001".to_string(),
            ..FormEntry::default()
        };
        let text = render(|out| write_form(out, &settings, &member, &[(&b, entry)]));
        assert!(text.starts_with("SK TAMAN MELATI\n"));
        assert!(text.contains("Class: 1 AMANAH"));
        assert!(text.contains("SN-001"));
        assert!(text.ends_with("Officer in charge: CIKGU LEE\n"));
    }
}
