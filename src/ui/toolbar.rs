// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Navigation and submission toolbar.
//!
//! This module provides the bar for moving between files and pages and for
//! submitting the annotated files.

/// Snapshot of what the toolbar displays.
pub struct ToolbarState {
    pub file_index: Option<usize>,
    pub file_count: usize,
    pub has_previous_file: bool,
    pub has_next_file: bool,
    pub page: u32,
    pub page_count: Option<u32>,
    pub submitting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    PreviousFile,
    NextFile,
    PreviousPage,
    NextPage,
    Submit,
}

/// Display the toolbar and report the clicked control.
pub fn show(ui: &mut egui::Ui, state: &ToolbarState) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let submit_label = if state.submitting {
            "Processing..."
        } else {
            "Submit All Files"
        };
        let can_submit = !state.submitting && state.file_count > 0;
        if ui.add_enabled(can_submit, egui::Button::new(submit_label)).clicked() {
            action = ToolbarAction::Submit;
        }
        if state.submitting {
            ui.spinner();
        }

        ui.separator();

        if ui
            .add_enabled(state.has_previous_file, egui::Button::new("⏴ Previous File"))
            .clicked()
        {
            action = ToolbarAction::PreviousFile;
        }
        if ui
            .add_enabled(state.has_next_file, egui::Button::new("Next File ⏵"))
            .clicked()
        {
            action = ToolbarAction::NextFile;
        }

        ui.separator();

        let page_count = state.page_count.unwrap_or(0);
        if ui
            .add_enabled(state.page > 1, egui::Button::new("⏴ Previous Page"))
            .clicked()
        {
            action = ToolbarAction::PreviousPage;
        }
        if ui
            .add_enabled(state.page < page_count, egui::Button::new("Next Page ⏵"))
            .clicked()
        {
            action = ToolbarAction::NextPage;
        }

        ui.separator();

        ui.label(status_text(state));
    });

    ui.label(
        egui::RichText::new("Hold Alt and drag to draw a box · Click a box to delete it")
            .italics()
            .weak(),
    );

    action
}

/// "File 1 of 3 | Page 2 of 5", with dashes for unknown counts.
pub fn status_text(state: &ToolbarState) -> String {
    let file = state
        .file_index
        .map_or_else(|| "-".to_string(), |i| (i + 1).to_string());
    let pages = state
        .page_count
        .map_or_else(|| "-".to_string(), |n| n.to_string());
    format!(
        "File {} of {} | Page {} of {}",
        file, state.file_count, state.page, pages
    )
}
