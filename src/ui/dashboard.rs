// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Financial dashboard.
//!
//! Shows the totals, the latest finance features, income and spending per
//! time bucket, and the most recent transactions for the signed-in user.

use crate::models::finance::{group_by_timeframe, totals, Timeframe, TransactionsResponse};

const RECENT_ROWS: usize = 10;
const INCOME_COLOR: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);
const SPENDING_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

/// Where the transactions fetch stands.
#[derive(Debug, Default)]
pub enum DashboardData {
    #[default]
    NotLoaded,
    Loading,
    Loaded(TransactionsResponse),
    Failed(String),
}

pub enum DashboardAction {
    None,
    Refresh,
    OpenLoanApplication,
}

/// "$1,234.56", with a leading minus for negatives.
pub fn format_currency(value: f64) -> String {
    let cents = format!("{:.2}", value.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

/// A ratio as a percentage with one decimal, "-" when missing.
pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

/// Display the dashboard.
pub fn show(ui: &mut egui::Ui, data: &DashboardData, timeframe: &mut Timeframe) -> DashboardAction {
    let mut action = DashboardAction::None;

    ui.horizontal(|ui| {
        ui.heading("Financial Dashboard");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Apply for a Loan").clicked() {
                action = DashboardAction::OpenLoanApplication;
            }
            let loading = matches!(data, DashboardData::Loading);
            if ui.add_enabled(!loading, egui::Button::new("⟳ Refresh")).clicked() {
                action = DashboardAction::Refresh;
            }
        });
    });
    ui.separator();

    let response = match data {
        DashboardData::NotLoaded => {
            ui.label("No data loaded yet.");
            return action;
        }
        DashboardData::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading transactions...");
            });
            return action;
        }
        DashboardData::Failed(message) => {
            ui.colored_label(SPENDING_COLOR, format!("⚠ {message}"));
            return action;
        }
        DashboardData::Loaded(response) => response,
    };

    egui::ScrollArea::vertical().show(ui, |ui| {
        summary_cards(ui, response);
        ui.add_space(12.0);
        features_section(ui, response);
        ui.add_space(12.0);
        buckets_section(ui, response, timeframe);
        ui.add_space(12.0);
        recent_section(ui, response);
    });

    action
}

fn summary_cards(ui: &mut egui::Ui, response: &TransactionsResponse) {
    let t = totals(&response.transactions);
    ui.columns(3, |columns| {
        card(&mut columns[0], "Total Income", format_currency(t.income), INCOME_COLOR);
        card(&mut columns[1], "Total Spending", format_currency(t.spending), SPENDING_COLOR);
        let net_color = if t.net() < 0.0 { SPENDING_COLOR } else { INCOME_COLOR };
        card(&mut columns[2], "Net Balance", format_currency(t.net()), net_color);
    });
}

fn card(ui: &mut egui::Ui, title: &str, value: String, color: egui::Color32) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new(title).weak());
        ui.label(egui::RichText::new(value).size(20.0).strong().color(color));
    });
}

fn features_section(ui: &mut egui::Ui, response: &TransactionsResponse) {
    let features = response.latest_features();
    ui.columns(2, |columns| {
        let ui = &mut columns[0];
        ui.label(egui::RichText::new("Financial Health").strong());
        for (label, value) in [
            ("Debt-to-Income Ratio", features.dti_ratio),
            ("Savings Rate", features.savings_rate),
            ("Credit Utilization", features.credit_utilization),
        ] {
            ui.horizontal(|ui| {
                ui.label(label);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format_ratio(value));
                });
            });
            let fraction = value.unwrap_or(0.0).clamp(0.0, 1.0) as f32;
            ui.add(egui::ProgressBar::new(fraction));
        }

        let ui = &mut columns[1];
        ui.label(egui::RichText::new("Loan Overview").strong());
        egui::Grid::new("loan_overview").num_columns(2).show(ui, |ui| {
            ui.label("Total Loan Payment");
            ui.label(format_currency(features.total_loan_payment.unwrap_or(0.0)));
            ui.end_row();
            ui.label("Number of Active Loans");
            ui.label(format!("{}", features.num_loans_paid.unwrap_or(0.0) as i64));
            ui.end_row();
            ui.label("Average Transaction");
            ui.label(format_currency(features.avg_transaction_amount.unwrap_or(0.0)));
            ui.end_row();
        });
    });
}

fn buckets_section(ui: &mut egui::Ui, response: &TransactionsResponse, timeframe: &mut Timeframe) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Income vs Spending").strong());
        for option in Timeframe::ALL {
            ui.selectable_value(timeframe, option, option.label());
        }
    });

    let buckets = group_by_timeframe(&response.transactions, *timeframe);
    if buckets.is_empty() {
        ui.label(egui::RichText::new("No dated transactions").weak());
        return;
    }
    let peak = buckets
        .iter()
        .map(|b| b.income.max(b.spending))
        .fold(0.0_f64, f64::max);

    egui::Grid::new("buckets")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            for bucket in &buckets {
                ui.monospace(&bucket.key);
                bar(ui, bucket.income, peak, INCOME_COLOR);
                bar(ui, bucket.spending, peak, SPENDING_COLOR);
                ui.end_row();
            }
        });
}

fn bar(ui: &mut egui::Ui, value: f64, peak: f64, color: egui::Color32) {
    let fraction = if peak > 0.0 { (value / peak) as f32 } else { 0.0 };
    ui.add(
        egui::ProgressBar::new(fraction)
            .fill(color)
            .desired_width(200.0)
            .text(format_currency(value)),
    );
}

fn recent_section(ui: &mut egui::Ui, response: &TransactionsResponse) {
    ui.label(egui::RichText::new("Recent Transactions").strong());
    egui::Grid::new("recent_transactions")
        .num_columns(4)
        .striped(true)
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Date").weak());
            ui.label(egui::RichText::new("Description").weak());
            ui.label(egui::RichText::new("Category").weak());
            ui.label(egui::RichText::new("Amount").weak());
            ui.end_row();

            for transaction in response.recent(RECENT_ROWS) {
                ui.label(&transaction.date);
                ui.label(&transaction.description);
                ui.label(&transaction.category);
                let color = if transaction.is_credit() { INCOME_COLOR } else { SPENDING_COLOR };
                ui.colored_label(color, format_currency(transaction.amount));
                ui.end_row();
            }
        });
}
