// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the annotation store, the file selection,
//! the session and every background worker, and routes UI actions to them.

use crate::config::AppConfig;
use crate::controller::DrawingController;
use crate::io::api::{ApiClient, ApiError, AuthMode, Credentials};
use crate::io::document::{DocumentRenderer, LopdfRenderer};
use crate::io::serialization;
use crate::io::storage::LocalStorage;
use crate::models::{
    finance::{Timeframe, TransactionsResponse},
    loan::{LoanApplication, LoanDecision},
    project::ProjectData,
    selection::{SelectedFile, SelectionSet},
    session::{self, Session, Theme},
    store::{AnnotationStore, PageKey},
    submission::{Submission, SubmissionEvent, STAGE_UPLOADING},
};
use crate::ui::{
    auth::{self, AuthForm},
    canvas,
    dashboard::{self, DashboardData},
    loan::{self, LoanDialog},
    properties, toolbar,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

const LOAD_FAILED: &str = "Failed to load PDF. Please make sure the file is a valid PDF document.";

/// Which screen fills the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Annotate,
    Dashboard,
    Auth,
}

/// Take a finished one-shot result off `slot`.
///
/// Returns `None` while the worker is still running and `Some(None)` when it
/// went away without sending anything.
fn take_result<T>(slot: &mut Option<Receiver<T>>) -> Option<Option<T>> {
    let receiver = slot.as_ref()?;
    match receiver.try_recv() {
        Ok(value) => {
            *slot = None;
            Some(Some(value))
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            *slot = None;
            Some(None)
        }
    }
}

/// Read and parse picked files. Runs on a worker thread.
fn load_selected_files(paths: Vec<PathBuf>) -> Vec<SelectedFile> {
    let renderer = LopdfRenderer;
    paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let document = renderer.load(&bytes).map_err(|e| {
                        log::error!("Failed to load {}: {}", path.display(), e);
                        LOAD_FAILED.to_string()
                    });
                    if let Ok(doc) = &document {
                        log::info!("Loaded {} ({} pages)", name, doc.page_count());
                    }
                    SelectedFile {
                        name,
                        size: bytes.len() as u64,
                        bytes: Arc::new(bytes),
                        document,
                    }
                }
                Err(e) => {
                    log::error!("Failed to read {}: {}", path.display(), e);
                    SelectedFile {
                        name,
                        size: 0,
                        bytes: Arc::new(Vec::new()),
                        document: Err(LOAD_FAILED.to_string()),
                    }
                }
            }
        })
        .collect()
}

/// Main application state.
pub struct PdfBoxApp {
    config: AppConfig,
    /// Backend client, or why it could not be built
    api: Result<ApiClient, String>,
    storage: LocalStorage,
    session: Option<Session>,
    theme: Theme,
    applied_theme: Option<Theme>,
    view: View,

    selection: SelectionSet<SelectedFile>,
    store: AnnotationStore,
    /// Current page of the current file, 1-based
    page: u32,
    controller: DrawingController,
    /// Error banner in the files panel
    banner: Option<String>,

    submission: Submission,
    submission_events: Option<Receiver<SubmissionEvent>>,

    /// Receiver for background PDF loading
    file_loader: Option<Receiver<Vec<SelectedFile>>>,
    /// Loading state message
    loading_message: Option<String>,

    auth_form: AuthForm,
    auth_result: Option<Receiver<Result<Session, ApiError>>>,

    dashboard: DashboardData,
    timeframe: Timeframe,
    dashboard_result: Option<Receiver<Result<TransactionsResponse, ApiError>>>,

    loan: LoanDialog,
    loan_result: Option<Receiver<Result<LoanDecision, ApiError>>>,
}

impl PdfBoxApp {
    /// Create the application and restore the persisted session and theme.
    pub fn new(config: AppConfig) -> Self {
        let mut storage = LocalStorage::open(
            config
                .storage_path
                .clone()
                .unwrap_or_else(LocalStorage::default_path),
        );
        let session = session::restore_session(&mut storage);
        let theme = Theme::load(&storage);
        let api = ApiClient::new(&config).map_err(|e| {
            log::error!("{}", e);
            e.to_string()
        });
        let view = if config.auth_enabled && session.is_none() {
            View::Auth
        } else {
            View::Annotate
        };

        Self {
            config,
            api,
            storage,
            session,
            theme,
            applied_theme: None,
            view,
            selection: SelectionSet::default(),
            store: AnnotationStore::new(),
            page: 1,
            controller: DrawingController::new(),
            banner: None,
            submission: Submission::default(),
            submission_events: None,
            file_loader: None,
            loading_message: None,
            auth_form: AuthForm::default(),
            auth_result: None,
            dashboard: DashboardData::default(),
            timeframe: Timeframe::default(),
            dashboard_result: None,
            loan: LoanDialog::default(),
            loan_result: None,
        }
    }

    fn current_key(&self) -> Option<PageKey> {
        self.selection
            .current_index()
            .map(|file| PageKey::new(file, self.page))
    }

    fn current_page_count(&self) -> Option<u32> {
        self.selection
            .current()
            .and_then(|file| file.document.as_ref().ok())
            .map(|doc| doc.page_count())
    }

    fn is_busy(&self) -> bool {
        self.file_loader.is_some()
            || self.submission_events.is_some()
            || self.auth_result.is_some()
            || self.dashboard_result.is_some()
            || self.loan_result.is_some()
    }

    /// Pick PDF files and load them in the background.
    fn open_files(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .pick_files()
        else {
            return;
        };
        if paths.is_empty() {
            return;
        }

        let (sender, receiver) = channel();
        self.file_loader = Some(receiver);
        self.loading_message = Some(format!("Loading {} file(s)...", paths.len()));

        std::thread::spawn(move || {
            let _ = sender.send(load_selected_files(paths));
        });
    }

    /// Replace the selection. Boxes drawn on the previous files are dropped.
    fn apply_selection(&mut self, files: Vec<SelectedFile>) {
        log::info!("Selected {} file(s)", files.len());
        self.banner = files
            .iter()
            .find(|f| f.document.is_err())
            .map(|_| LOAD_FAILED.to_string());
        self.selection = SelectionSet::replace(files);
        self.store = AnnotationStore::new();
        self.page = 1;
        self.controller.cancel();
        self.submission.reset();
    }

    /// Move the file cursor; the page goes back to 1.
    fn change_file(&mut self, navigate: impl FnOnce(&mut SelectionSet<SelectedFile>)) {
        let before = self.selection.current_index();
        navigate(&mut self.selection);
        if self.selection.current_index() != before {
            self.page = 1;
            self.controller.cancel();
        }
    }

    /// Go to `page`, clamped to the current file's page range.
    fn set_page(&mut self, page: u32) {
        let last = self.current_page_count().unwrap_or(1).max(1);
        let page = page.clamp(1, last);
        if page != self.page {
            self.page = page;
            self.controller.cancel();
        }
    }

    /// Start a submission of every selected file on a worker thread.
    fn submit(&mut self) {
        let payload = match self
            .submission
            .begin(&self.selection, &self.store, self.session.as_ref())
        {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Submission refused: {}", e);
                return;
            }
        };
        let client = match &self.api {
            Ok(client) => client.clone(),
            Err(message) => {
                self.submission.abandon(message);
                return;
            }
        };

        log::info!(
            "Submitting {} file(s) with {} box(es)",
            payload.files.len(),
            self.store.box_count()
        );
        let (sender, receiver) = channel();
        self.submission_events = Some(receiver);

        std::thread::spawn(move || {
            let _ = sender.send(SubmissionEvent::Stage(STAGE_UPLOADING.to_string()));
            let result = client.submit(&payload).map_err(|e| e.to_string());
            let _ = sender.send(SubmissionEvent::Finished(result));
        });
    }

    fn poll_submission(&mut self) {
        let Some(receiver) = self.submission_events.take() else {
            return;
        };
        loop {
            match receiver.try_recv() {
                Ok(SubmissionEvent::Finished(result)) => {
                    match &result {
                        Ok(_) => log::info!("Submission succeeded"),
                        Err(e) => log::error!("Submission failed: {}", e),
                    }
                    self.submission.apply(SubmissionEvent::Finished(result));
                    return;
                }
                Ok(event) => {
                    log::info!("Submission progress: {:?}", event);
                    self.submission.apply(event);
                }
                Err(TryRecvError::Empty) => {
                    self.submission_events = Some(receiver);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    log::error!("Submission worker stopped without a result");
                    self.submission.abandon("Failed to submit PDF and boxes");
                    return;
                }
            }
        }
    }

    fn authenticate(&mut self, mode: AuthMode, credentials: Credentials) {
        let client = match &self.api {
            Ok(client) => client.clone(),
            Err(message) => {
                self.auth_form.error = Some(message.clone());
                return;
            }
        };
        self.auth_form.pending = true;
        let (sender, receiver) = channel();
        self.auth_result = Some(receiver);

        std::thread::spawn(move || {
            let _ = sender.send(client.authenticate(mode, &credentials));
        });
    }

    fn poll_auth(&mut self) {
        let Some(result) = take_result(&mut self.auth_result) else {
            return;
        };
        self.auth_form.pending = false;
        match result {
            Some(Ok(session)) => {
                log::info!("Signed in as {}", session.user_id());
                session::persist_session(&mut self.storage, &session);
                self.session = Some(session);
                self.auth_form.finish();
                self.dashboard = DashboardData::NotLoaded;
                self.view = View::Annotate;
            }
            Some(Err(e)) => {
                log::error!("Authentication failed: {}", e);
                self.auth_form.error = Some(e.to_string());
            }
            None => self.auth_form.error = Some("Authentication failed".to_string()),
        }
    }

    fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("Signed out {}", session.user_id());
        }
        session::clear_session(&mut self.storage);
        // Results still in flight belong to the previous user
        self.dashboard_result = None;
        self.loan_result = None;
        self.dashboard = DashboardData::NotLoaded;
        self.loan = LoanDialog::default();
        self.view = if self.config.auth_enabled {
            View::Auth
        } else {
            View::Annotate
        };
    }

    fn refresh_dashboard(&mut self) {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id().to_string()) else {
            self.dashboard = DashboardData::Failed("Please sign in to view your dashboard".to_string());
            return;
        };
        let client = match &self.api {
            Ok(client) => client.clone(),
            Err(message) => {
                self.dashboard = DashboardData::Failed(message.clone());
                return;
            }
        };
        self.dashboard = DashboardData::Loading;
        let (sender, receiver) = channel();
        self.dashboard_result = Some(receiver);

        std::thread::spawn(move || {
            let _ = sender.send(client.transactions(&user_id));
        });
    }

    fn poll_dashboard(&mut self) {
        let Some(result) = take_result(&mut self.dashboard_result) else {
            return;
        };
        self.dashboard = match result {
            Some(Ok(response)) => {
                log::info!("Fetched {} transactions", response.transactions.len());
                DashboardData::Loaded(response)
            }
            Some(Err(e)) => {
                log::error!("Failed to fetch transactions: {}", e);
                DashboardData::Failed(e.to_string())
            }
            None => DashboardData::Failed("Failed to fetch transactions".to_string()),
        };
    }

    fn apply_for_loan(&mut self, application: LoanApplication) {
        let client = match &self.api {
            Ok(client) => client.clone(),
            Err(message) => {
                self.loan.error = Some(message.clone());
                return;
            }
        };
        self.loan.pending = true;
        let (sender, receiver) = channel();
        self.loan_result = Some(receiver);

        std::thread::spawn(move || {
            let _ = sender.send(client.apply_loan(&application));
        });
    }

    fn poll_loan(&mut self) {
        let Some(result) = take_result(&mut self.loan_result) else {
            return;
        };
        self.loan.pending = false;
        match result {
            Some(Ok(decision)) => {
                log::info!("Loan application decided, approved: {}", decision.approved);
                self.loan.decision = Some(decision);
            }
            Some(Err(e)) => {
                log::error!("Loan application failed: {}", e);
                self.loan.error = Some(e.to_string());
            }
            None => self.loan.error = Some("Failed to submit loan application".to_string()),
        }
    }

    fn poll_file_loader(&mut self) {
        let Some(result) = take_result(&mut self.file_loader) else {
            return;
        };
        self.loading_message = None;
        match result {
            Some(files) => self.apply_selection(files),
            None => self.banner = Some(LOAD_FAILED.to_string()),
        }
    }

    /// Export the selection and its boxes to a file.
    fn export_annotations(&mut self, path: &Path) {
        let data = ProjectData::capture(&self.selection, &self.store);
        match serialization::export(&data, path) {
            Ok(()) => log::info!("Exported {} box(es) to {}", data.box_count(), path.display()),
            Err(e) => {
                log::error!("Failed to export annotations: {}", e);
                self.banner = Some(format!("Failed to export annotations: {e}"));
            }
        }
    }

    /// Load boxes from an earlier export onto the current selection.
    fn import_annotations(&mut self, path: &Path) {
        match serialization::import(path) {
            Ok(data) => {
                if data.files.len() != self.selection.len() {
                    log::warn!(
                        "Imported annotations cover {} file(s), {} selected",
                        data.files.len(),
                        self.selection.len()
                    );
                }
                log::info!("Imported {} box(es) from {}", data.store.box_count(), path.display());
                self.store = data.store;
                self.controller.cancel();
            }
            Err(e) => {
                log::error!("Failed to import annotations: {}", e);
                self.banner = Some(format!("Failed to import annotations: {e}"));
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.theme.save(&mut self.storage);
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open PDFs...").clicked() {
                        self.open_files();
                        ui.close_menu();
                    }
                    let has_files = !self.selection.is_empty();
                    if ui
                        .add_enabled(has_files, egui::Button::new("Import Annotations..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Annotations", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.import_annotations(&path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.add_enabled_ui(has_files, |ui| {
                        ui.menu_button("Export Annotations", |ui| {
                            if ui.button("Export as YAML...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("YAML", &["yaml", "yml"])
                                    .set_file_name("annotations.yaml")
                                    .save_file()
                                {
                                    self.export_annotations(&path);
                                }
                                ui.close_menu();
                            }
                            if ui.button("Export as JSON...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("JSON", &["json"])
                                    .set_file_name("annotations.json")
                                    .save_file()
                                {
                                    self.export_annotations(&path);
                                }
                                ui.close_menu();
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Annotate").clicked() {
                        self.view = View::Annotate;
                        ui.close_menu();
                    }
                    let signed_in = self.session.is_some();
                    if ui
                        .add_enabled(signed_in, egui::Button::new("Dashboard"))
                        .clicked()
                    {
                        self.view = View::Dashboard;
                        if matches!(self.dashboard, DashboardData::NotLoaded) {
                            self.refresh_dashboard();
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    let label = if self.theme.is_dark() {
                        "☀ Light Mode"
                    } else {
                        "🌙 Dark Mode"
                    };
                    if ui.button(label).clicked() {
                        self.toggle_theme();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Account", |ui| {
                    if let Some(session) = &self.session {
                        let who = session.user.email.clone().unwrap_or_else(|| session.user_id().to_string());
                        ui.label(egui::RichText::new(who).weak());
                        if ui.button("Logout").clicked() {
                            self.logout();
                            ui.close_menu();
                        }
                    } else if ui.button("Login / Sign up").clicked() {
                        self.view = View::Auth;
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} box(es) across {} file(s)",
                    self.store.box_count(),
                    self.selection.len()
                ));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match &self.session {
                        Some(session) => ui.label(format!("Signed in: {}", session.user_id())),
                        None => ui.label(egui::RichText::new("Not signed in").weak()),
                    };
                });
            });
        });
    }

    fn annotate_view(&mut self, ctx: &egui::Context) {
        let toolbar_state = toolbar::ToolbarState {
            file_index: self.selection.current_index(),
            file_count: self.selection.len(),
            has_previous_file: self.selection.has_previous(),
            has_next_file: self.selection.has_next(),
            page: self.page,
            page_count: self.current_page_count(),
            submitting: self.submission.is_in_flight(),
        };
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &toolbar_state))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::PreviousFile => self.change_file(|s| s.previous()),
            toolbar::ToolbarAction::NextFile => self.change_file(|s| s.next()),
            toolbar::ToolbarAction::PreviousPage => self.set_page(self.page.saturating_sub(1)),
            toolbar::ToolbarAction::NextPage => self.set_page(self.page + 1),
            toolbar::ToolbarAction::Submit => self.submit(),
            toolbar::ToolbarAction::None => {}
        }

        let properties_action = egui::SidePanel::right("files")
            .default_width(260.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    &self.selection,
                    &self.store,
                    self.submission.state(),
                    self.banner.as_deref(),
                )
            })
            .inner;
        self.handle_properties_action(properties_action);

        let events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(message) = &self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.spinner();
                            ui.label(egui::RichText::new(message).size(16.0));
                        });
                    });
                    return Vec::new();
                }
                let Some(file) = self.selection.current() else {
                    ui.centered_and_justified(|ui| {
                        ui.label("Open PDF files to start annotating");
                    });
                    return Vec::new();
                };
                let document = match &file.document {
                    Ok(document) => document,
                    Err(message) => {
                        ui.colored_label(egui::Color32::from_rgb(220, 38, 38), format!("⚠ {message}"));
                        return Vec::new();
                    }
                };
                let (Some(size), Some(key)) = (document.page_size(self.page), self.current_key()) else {
                    return Vec::new();
                };
                let view = canvas::PageView {
                    file_name: &file.name,
                    page: self.page,
                    size,
                    boxes: self.store.boxes_for(key),
                    preview: self.controller.preview(),
                    drawing: self.controller.is_drawing(),
                };
                canvas::show(ui, &view)
            })
            .inner;

        if let Some(key) = self.current_key() {
            for event in events {
                if let Some(next) = self.controller.handle(event, &self.store, key) {
                    self.store = next;
                }
            }
        }
    }

    fn handle_properties_action(&mut self, action: properties::PropertiesAction) {
        match action {
            properties::PropertiesAction::OpenFiles => self.open_files(),
            properties::PropertiesAction::SelectFile(index) => self.change_file(|s| s.select(index)),
            properties::PropertiesAction::DismissError => self.banner = None,
            properties::PropertiesAction::DismissSubmissionError => self.submission.reset(),
            properties::PropertiesAction::None => {}
        }
    }

    fn auth_view(&mut self, ctx: &egui::Context) {
        let submitted = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let submitted = auth::show(ui, &mut self.auth_form);
                if !self.config.auth_enabled {
                    ui.vertical_centered(|ui| {
                        if ui.link("Continue without signing in").clicked() {
                            self.view = View::Annotate;
                        }
                    });
                }
                submitted
            })
            .inner;
        if let Some((mode, credentials)) = submitted {
            self.authenticate(mode, credentials);
        }
    }

    fn dashboard_view(&mut self, ctx: &egui::Context) {
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| dashboard::show(ui, &self.dashboard, &mut self.timeframe))
            .inner;
        match action {
            dashboard::DashboardAction::Refresh => self.refresh_dashboard(),
            dashboard::DashboardAction::OpenLoanApplication => self.loan.open(),
            dashboard::DashboardAction::None => {}
        }
    }
}

impl eframe::App for PdfBoxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.applied_theme != Some(self.theme) {
            ctx.set_visuals(if self.theme.is_dark() {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            self.applied_theme = Some(self.theme);
        }

        self.poll_file_loader();
        self.poll_submission();
        self.poll_auth();
        self.poll_dashboard();
        self.poll_loan();

        // Keep polling workers and the spinner
        if self.is_busy() {
            ctx.request_repaint();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.cancel();
        }

        if self.config.auth_enabled && self.session.is_none() {
            self.view = View::Auth;
        }

        self.menu_bar(ctx);
        self.status_bar(ctx);

        match self.view {
            View::Annotate => self.annotate_view(ctx),
            View::Dashboard => self.dashboard_view(ctx),
            View::Auth => self.auth_view(ctx),
        }

        if self.loan.open {
            let user_id = self.session.as_ref().map(|s| s.user_id().to_string());
            if let Some(application) = loan::show(ctx, &mut self.loan, user_id.as_deref()) {
                self.apply_for_loan(application);
            }
        }
    }
}
