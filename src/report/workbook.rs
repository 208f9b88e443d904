//! XLSX rendering of a period report: a summary sheet with the financial
//! rollup and breakdown tables, plus one detail row per referral.

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::models::MedicalInstitution;
use crate::report::{institution_display, ExportError, ReportData};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render the report into an in-memory workbook.
pub fn report_workbook(
    report: &ReportData,
    institutions: &[MedicalInstitution],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    write_summary_sheet(workbook.add_worksheet(), report, &bold, &money)?;
    write_detail_sheet(workbook.add_worksheet(), report, institutions, &bold, &money)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    report: &ReportData,
    bold: &Format,
    money: &Format,
) -> Result<(), ExportError> {
    sheet.set_name("Summary")?;
    sheet.set_column_width(0, 30)?;
    sheet.set_column_width(1, 16)?;
    sheet.set_column_width(2, 16)?;

    sheet.write_string_with_format(0, 0, report.period.title(), bold)?;
    sheet.write_string(
        1,
        0,
        format!(
            "Period: {} - {}",
            report.start.format(TIMESTAMP_FORMAT),
            report.end.format(TIMESTAMP_FORMAT)
        ),
    )?;

    let mut row = 3;
    sheet.write_string_with_format(row, 0, "FINANCIAL SUMMARY", bold)?;
    row += 1;
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
        sheet.write_string(row, 0, label)?;
        sheet.write_number_with_format(row, 1, value, money)?;
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "PAYMENT BREAKDOWN", bold)?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Method", bold)?;
    sheet.write_string_with_format(row, 1, "Count", bold)?;
    sheet.write_string_with_format(row, 2, "Total", bold)?;
    row += 1;
    let payments = [
        ("Cash", report.payment_stats.cash),
        ("POS", report.payment_stats.pos),
        ("Invoice", report.payment_stats.invoice),
    ];
    for (label, breakdown) in payments {
        sheet.write_string(row, 0, label)?;
        sheet.write_number(row, 1, breakdown.count as f64)?;
        sheet.write_number_with_format(row, 2, breakdown.total, money)?;
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "INSTITUTION COSTS", bold)?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Institution", bold)?;
    sheet.write_string_with_format(row, 1, "Referrals", bold)?;
    sheet.write_string_with_format(row, 2, "Cost", bold)?;
    row += 1;
    for stat in report.institution_stats.values() {
        sheet.write_string(row, 0, &stat.name)?;
        sheet.write_number(row, 1, stat.count as f64)?;
        sheet.write_number_with_format(row, 2, stat.cost, money)?;
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "COMPANY REVENUE", bold)?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Company", bold)?;
    sheet.write_string_with_format(row, 1, "Referrals", bold)?;
    sheet.write_string_with_format(row, 2, "Revenue", bold)?;
    row += 1;
    for (name, stat) in &report.company_stats {
        sheet.write_string(row, 0, name)?;
        sheet.write_number(row, 1, stat.count as f64)?;
        sheet.write_number_with_format(row, 2, stat.total, money)?;
        row += 1;
    }

    Ok(())
}

fn write_detail_sheet(
    sheet: &mut Worksheet,
    report: &ReportData,
    institutions: &[MedicalInstitution],
    bold: &Format,
    money: &Format,
) -> Result<(), ExportError> {
    sheet.set_name("Referrals")?;
    sheet.set_column_width(0, 17)?;
    sheet.set_column_width(1, 24)?;
    sheet.set_column_width(2, 14)?;
    sheet.set_column_width(3, 28)?;
    sheet.set_column_width(4, 28)?;
    sheet.set_column_width(5, 10)?;

    let headers = [
        "Date",
        "Employee",
        "National ID",
        "Company",
        "Institution",
        "Payment",
        "Price",
        "Cost",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
    }

    for (i, referral) in report.referrals.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(
            row,
            0,
            referral
                .referral_date
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        )?;
        sheet.write_string(row, 1, &referral.employee.full_name)?;
        sheet.write_string(row, 2, &referral.employee.tc_no)?;
        sheet.write_string(row, 3, &referral.employee.company)?;
        sheet.write_string(
            row,
            4,
            institution_display(referral.target_institution_id, institutions),
        )?;
        sheet.write_string(row, 5, referral.payment_method.label())?;
        sheet.write_number_with_format(row, 6, referral.total_price, money)?;
        sheet.write_number_with_format(row, 7, referral.total_cost, money)?;
    }

    Ok(())
}
