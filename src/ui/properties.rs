// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Selected files panel.
//!
//! Lists the picked PDFs with their sizes and box counts, shows the error
//! banner and the submission status.

use crate::models::selection::{SelectedFile, SelectionSet};
use crate::models::store::AnnotationStore;
use crate::models::submission::{SubmissionState, STAGE_DONE};

pub enum PropertiesAction {
    None,
    OpenFiles,
    SelectFile(usize),
    DismissError,
    DismissSubmissionError,
}

/// Display the files panel.
pub fn show(
    ui: &mut egui::Ui,
    selection: &SelectionSet<SelectedFile>,
    store: &AnnotationStore,
    submission: &SubmissionState,
    error: Option<&str>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Files");
    ui.add_space(4.0);

    if ui.button("📂 Open PDF files...").clicked() {
        action = PropertiesAction::OpenFiles;
    }
    ui.label(egui::RichText::new("Multiple PDF files up to 10MB each").small().weak());

    ui.separator();

    if selection.is_empty() {
        ui.label(egui::RichText::new("No files selected").weak());
    } else {
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() * 0.6)
            .show(ui, |ui| {
                for (index, file) in selection.files().iter().enumerate() {
                    let selected = selection.current_index() == Some(index);
                    ui.horizontal(|ui| {
                        if ui.selectable_label(selected, &file.name).clicked() {
                            action = PropertiesAction::SelectFile(index);
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(egui::RichText::new(format!("{:.2} MB", file.size_mb())).small());
                        });
                    });
                    let detail = match &file.document {
                        Ok(doc) => format!(
                            "{} pages · {} boxes",
                            doc.page_count(),
                            store.file_box_count(index)
                        ),
                        Err(_) => "could not be loaded".to_string(),
                    };
                    ui.label(egui::RichText::new(detail).small().weak());
                }
            });
    }

    if let Some(message) = error {
        ui.separator();
        if error_banner(ui, message) {
            action = PropertiesAction::DismissError;
        }
    }

    ui.separator();
    match submission {
        SubmissionState::Idle => {}
        SubmissionState::InFlight { stage } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(stage);
            });
        }
        SubmissionState::Succeeded(result) => {
            ui.colored_label(egui::Color32::from_rgb(22, 163, 74), STAGE_DONE);
            egui::CollapsingHeader::new("Server response").show(ui, |ui| {
                let pretty = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
                ui.monospace(pretty);
            });
        }
        SubmissionState::Failed(message) => {
            if error_banner(ui, message) {
                action = PropertiesAction::DismissSubmissionError;
            }
        }
    }

    action
}

/// Red banner with a dismiss button. Returns true when dismissed.
fn error_banner(ui: &mut egui::Ui, message: &str) -> bool {
    let mut dismissed = false;
    egui::Frame::none()
        .fill(egui::Color32::from_rgb(254, 242, 242))
        .rounding(4.0)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.colored_label(egui::Color32::from_rgb(220, 38, 38), format!("⚠ {message}"));
                dismissed = ui.small_button("✖").clicked();
            });
        });
    dismissed
}
