// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Loan application window.

use crate::models::loan::{LoanApplication, LoanDecision, LoanForm, LOAN_TERMS};

#[derive(Debug, Default)]
pub struct LoanDialog {
    pub open: bool,
    pub form: LoanForm,
    pub pending: bool,
    /// Validation or request error shown under the form
    pub error: Option<String>,
    pub decision: Option<LoanDecision>,
}

impl LoanDialog {
    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
        self.decision = None;
    }

    /// Validate the form; a failure is kept as the inline error.
    pub fn submit(&mut self, user_id: &str) -> Option<LoanApplication> {
        match self.form.validate(user_id) {
            Ok(application) => {
                self.error = None;
                self.decision = None;
                Some(application)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

/// Display the window while it is open. Returns a validated application
/// when the user submits.
pub fn show(ctx: &egui::Context, dialog: &mut LoanDialog, user_id: Option<&str>) -> Option<LoanApplication> {
    let mut submitted = None;
    let mut open = dialog.open;

    egui::Window::new("Loan Application")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            if let Some(decision) = &dialog.decision {
                decision_view(ui, decision);
                ui.separator();
            }

            egui::Grid::new("loan_form").num_columns(2).show(ui, |ui| {
                ui.label("Age");
                ui.text_edit_singleline(&mut dialog.form.age);
                ui.end_row();

                ui.label("Credit Score");
                ui.text_edit_singleline(&mut dialog.form.credit_score);
                ui.end_row();

                ui.label("Loan Term");
                let selected = dialog
                    .form
                    .term
                    .map_or_else(|| "Select term".to_string(), |t| format!("{t} months"));
                egui::ComboBox::from_id_source("loan_term")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for term in LOAN_TERMS {
                            ui.selectable_value(&mut dialog.form.term, Some(term), format!("{term} months"));
                        }
                    });
                ui.end_row();

                ui.label("Loan Amount");
                ui.text_edit_singleline(&mut dialog.form.loan_amount);
                ui.end_row();
            });

            if let Some(error) = &dialog.error {
                ui.colored_label(egui::Color32::from_rgb(220, 38, 38), error);
            }

            ui.horizontal(|ui| {
                let enabled = !dialog.pending && user_id.is_some();
                if ui.add_enabled(enabled, egui::Button::new("Submit Application")).clicked() {
                    if let Some(user_id) = user_id {
                        submitted = dialog.submit(user_id);
                    }
                }
                if dialog.pending {
                    ui.spinner();
                }
            });
            if user_id.is_none() {
                ui.label(egui::RichText::new("Sign in to apply for a loan").weak());
            }
        });

    dialog.open = open;
    submitted
}

fn decision_view(ui: &mut egui::Ui, decision: &LoanDecision) {
    if decision.approved {
        ui.colored_label(egui::Color32::from_rgb(22, 163, 74), "Congratulations! Your loan has been approved.");
        egui::Grid::new("loan_decision").num_columns(2).show(ui, |ui| {
            if let Some(apr) = decision.apr_rate {
                ui.label("APR");
                ui.label(format!("{apr:.2}%"));
                ui.end_row();
            }
            if let Some(income) = decision.annual_income {
                ui.label("Annual Income");
                ui.label(format!("${income:.2}"));
                ui.end_row();
            }
            if let Some(dti) = decision.dti_ratio {
                ui.label("DTI Ratio");
                ui.label(format!("{:.1}%", dti * 100.0));
                ui.end_row();
            }
        });
    } else {
        ui.colored_label(
            egui::Color32::from_rgb(220, 38, 38),
            "Your loan application was not approved at this time.",
        );
    }
}
