//! Printable Z-report via `printpdf`: the period's financial rollup on a
//! single A4 page, in the terse layout of a cash-register closing slip.

use printpdf::*;
use std::io::BufWriter;

use crate::report::{ExportError, ReportData};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Renders the report as a PDF. Returns PDF bytes.
pub fn zreport_pdf(report: &ReportData) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(report.period.title(), Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))?;

    let mut y = Mm(280.0);

    // Header
    layer.use_text(report.period.title(), 14.0, Mm(20.0), y, &bold);
    y -= Mm(7.0);
    layer.use_text(
        format!(
            "Period: {} - {}",
            report.start.format(TIMESTAMP_FORMAT),
            report.end.format(TIMESTAMP_FORMAT)
        ),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(5.0);
    layer.use_text(
        format!("Referrals in period: {}", report.referrals.len()),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(10.0);

    // Financial summary
    layer.use_text("FINANCIAL SUMMARY", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    let lines = [
        ("Opening Balance", report.opening_balance),
        ("Total Income", report.total_income),
        ("Total Expense", report.total_expense),
        ("Closing Balance", report.closing_balance),
        ("Referral Revenue", report.total_referral_price),
        ("Referral Cost", report.total_referral_cost),
        ("Estimated Profit", report.estimated_profit),
    ];
    for (label, value) in lines {
        layer.use_text(label, 9.0, Mm(25.0), y, &font);
        layer.use_text(format!("{value:.2}"), 9.0, Mm(120.0), y, &font);
        y -= Mm(4.5);
    }
    y -= Mm(4.0);

    // Payment breakdown
    layer.use_text("PAYMENT BREAKDOWN", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    let payments = [
        ("Cash", report.payment_stats.cash),
        ("POS", report.payment_stats.pos),
        ("Invoice", report.payment_stats.invoice),
    ];
    for (label, breakdown) in payments {
        layer.use_text(format!("{} (x{})", label, breakdown.count), 9.0, Mm(25.0), y, &font);
        layer.use_text(format!("{:.2}", breakdown.total), 9.0, Mm(120.0), y, &font);
        y -= Mm(4.5);
    }

    // Institution costs
    if !report.institution_stats.is_empty() {
        y -= Mm(4.0);
        layer.use_text("INSTITUTION COSTS", 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for stat in report.institution_stats.values() {
            let text = format!("{} (x{}): {:.2}", stat.name, stat.count, stat.cost);
            for line in wrap_text(&text, 80) {
                layer.use_text(&line, 9.0, Mm(25.0), y, &font);
                y -= Mm(4.5);
            }
        }
    }

    // Company revenue
    if !report.company_stats.is_empty() {
        y -= Mm(4.0);
        layer.use_text("COMPANY REVENUE", 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for (name, stat) in &report.company_stats {
            let text = format!("{} (x{}): {:.2}", name, stat.count, stat.total);
            for line in wrap_text(&text, 80) {
                layer.use_text(&line, 9.0, Mm(25.0), y, &font);
                y -= Mm(4.5);
            }
        }
    }

    y -= Mm(8.0);
    layer.use_text("*** END OF REPORT ***", 10.0, Mm(80.0), y, &bold);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("PDF buffer error: {e}")))
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
