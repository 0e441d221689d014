use super::{print_json, print_unresolved, run_analysis, ui};
use crate::core::comparison::FundComparison;
use crate::core::resolver::FundResolver;
use crate::core::service::{self, ApiResponse};
use anyhow::Result;
use comfy_table::{Attribute, Cell, CellAlignment};

pub async fn run(resolver: &dyn FundResolver, fund_ids: Vec<String>, json: bool) -> Result<()> {
    let response = run_analysis(resolver, fund_ids, json, |resolver, request| async move {
        service::compare(resolver, &request).await
    })
    .await?;

    if json {
        return print_json(&response);
    }
    display_comparison(&response);
    Ok(())
}

fn display_comparison(response: &ApiResponse<FundComparison>) {
    let comparison = &response.data;

    println!("\n{}", ui::style_text("Fund Comparison", ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Fund"),
        ui::header_cell("Category"),
        ui::header_cell("NAV"),
        ui::header_cell("NAV Date"),
        ui::header_cell("1Y (%)"),
        ui::header_cell("3Y (%)"),
        ui::header_cell("5Y (%)"),
        ui::header_cell("Expense Ratio (%)"),
        ui::header_cell("AUM (Cr)"),
        ui::header_cell("Risk"),
        ui::header_cell("Score"),
    ]);

    for (rank, fund) in comparison.funds.iter().enumerate() {
        let score_cell = if fund.is_top_performer {
            ui::format_percentage_cell(fund.comparison_score as f64, |v| format!("{v:.0}"))
        } else {
            Cell::new(fund.comparison_score).set_alignment(CellAlignment::Right)
        };

        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&fund.name),
            Cell::new(&fund.category),
            ui::number_cell(fund.current_nav),
            ui::format_optional_cell(fund.nav_date, |d| d.format("%d-%b-%Y").to_string()),
            ui::number_cell(fund.returns.one_year),
            ui::number_cell(fund.returns.three_year),
            ui::number_cell(fund.returns.five_year),
            ui::number_cell(fund.expense_ratio),
            ui::number_cell(fund.aum),
            Cell::new(fund.risk_level),
            score_cell,
        ]);
    }

    let summary = &comparison.summary;
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Average").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        ui::format_percentage_cell(summary.average_one_year_return, |v| format!("{v:.2}")),
        Cell::new(""),
        Cell::new(""),
        ui::format_percentage_cell(summary.average_expense_ratio, |v| format!("{v:.2}")),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);

    println!("{table}");

    if let Some(top) = &summary.top_performer {
        println!(
            "{} {}",
            ui::style_text("Top performer:", ui::StyleType::TotalLabel),
            ui::style_text(top, ui::StyleType::TotalValue)
        );
    }
    print_unresolved(&response.unresolved_ids);
    println!(
        "{}",
        ui::style_text(
            &format!("Generated at {}", response.generated_at.to_rfc3339()),
            ui::StyleType::Subtle
        )
    );
}
