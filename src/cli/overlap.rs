use super::{print_json, print_unresolved, run_analysis, ui};
use crate::core::overlap::{OverlapAnalysis, OverlapLevel};
use crate::core::resolver::FundResolver;
use crate::core::service::{self, ApiResponse};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

/// Common holdings shown in the table; the JSON output carries all of them.
const MAX_COMMON_ROWS: usize = 15;

pub async fn run(resolver: &dyn FundResolver, fund_ids: Vec<String>, json: bool) -> Result<()> {
    let response = run_analysis(resolver, fund_ids, json, |resolver, request| async move {
        service::overlap(resolver, &request).await
    })
    .await?;

    if json {
        return print_json(&response);
    }
    display_overlap(&response);
    Ok(())
}

fn level_text(level: OverlapLevel) -> String {
    let style_type = match level {
        OverlapLevel::High => ui::StyleType::Error,
        OverlapLevel::Moderate => ui::StyleType::Warning,
        OverlapLevel::Low => ui::StyleType::TotalValue,
    };
    ui::style_text(&level.to_string(), style_type)
}

fn display_overlap(response: &ApiResponse<OverlapAnalysis>) {
    let analysis = &response.data;
    let summary = &analysis.summary;

    println!("\n{}", ui::style_text("Portfolio Overlap", ui::StyleType::Title));
    println!(
        "{} {:.2}% ({})",
        ui::style_text("Average overlap:", ui::StyleType::TotalLabel),
        summary.average_overlap,
        level_text(summary.overlap_level)
    );
    println!(
        "{} {:.2}",
        ui::style_text("Diversification score:", ui::StyleType::TotalLabel),
        summary.diversification_score
    );

    let mut funds_table = ui::new_styled_table();
    funds_table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Category"),
        ui::header_cell("Holdings"),
    ]);
    for fund in &analysis.funds {
        funds_table.add_row(vec![
            Cell::new(&fund.name),
            Cell::new(&fund.category),
            Cell::new(fund.holdings_count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{funds_table}");

    let holdings = &analysis.holdings_overlap;
    if !holdings.pairwise_overlaps.is_empty() {
        let mut pairs_table = ui::new_styled_table();
        pairs_table.set_header(vec![
            ui::header_cell("Fund 1"),
            ui::header_cell("Fund 2"),
            ui::header_cell("Overlap"),
            ui::header_cell("Common"),
            ui::header_cell("Weighted (%)"),
        ]);
        for pair in &holdings.pairwise_overlaps {
            pairs_table.add_row(vec![
                Cell::new(&pair.fund1),
                Cell::new(&pair.fund2),
                ui::overlap_cell(pair.overlap_percentage),
                Cell::new(pair.common_stocks).set_alignment(CellAlignment::Right),
                ui::number_cell(pair.weighted_overlap),
            ]);
        }
        println!("\n{}", ui::style_text("Pairwise Overlap", ui::StyleType::Title));
        println!("{pairs_table}");
    }

    if !holdings.common_holdings.is_empty() {
        let mut common_table = ui::new_styled_table();
        common_table.set_header(vec![
            ui::header_cell("Holding"),
            ui::header_cell("Sector"),
            ui::header_cell("Funds"),
            ui::header_cell("Avg Weight (%)"),
        ]);
        for holding in holdings.common_holdings.iter().take(MAX_COMMON_ROWS) {
            common_table.add_row(vec![
                Cell::new(&holding.name),
                Cell::new(&holding.sector),
                Cell::new(holding.appears_in).set_alignment(CellAlignment::Right),
                ui::number_cell(holding.average_percentage),
            ]);
        }
        println!(
            "\n{} {}",
            ui::style_text("Common Holdings", ui::StyleType::Title),
            ui::style_text(
                &format!("({} total)", holdings.common_holdings.len()),
                ui::StyleType::Subtle
            )
        );
        println!("{common_table}");
    }

    if !holdings.duplicate_exposure.is_empty() {
        println!(
            "\n{}",
            ui::style_text("Duplicate Exposure", ui::StyleType::Title)
        );
        for exposure in &holdings.duplicate_exposure {
            println!(
                "  {} {}",
                exposure.name,
                ui::style_text(
                    &format!("{:.2}% combined", exposure.total_weight),
                    ui::StyleType::Warning
                )
            );
        }
    }

    if !analysis.sector_overlap.is_empty() {
        let mut sector_table = ui::new_styled_table();
        sector_table.set_header(vec![
            ui::header_cell("Sector"),
            ui::header_cell("Funds"),
            ui::header_cell("Avg Allocation (%)"),
        ]);
        for sector in &analysis.sector_overlap {
            sector_table.add_row(vec![
                Cell::new(&sector.sector),
                Cell::new(sector.funds_with_sector).set_alignment(CellAlignment::Right),
                ui::number_cell(sector.average_allocation),
            ]);
        }
        println!("\n{}", ui::style_text("Sector Overlap", ui::StyleType::Title));
        println!("{sector_table}");
    }

    ui::print_separator();
    println!("{}", ui::style_text("Recommendations", ui::StyleType::Title));
    for recommendation in &analysis.recommendations {
        println!("  - {recommendation}");
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
