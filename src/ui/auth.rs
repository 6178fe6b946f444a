// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Login and signup form.

use crate::io::api::{AuthMode, Credentials};

/// Form state; errors stay inline and never touch annotation state.
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub pending: bool,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            email: String::new(),
            password: String::new(),
            error: None,
            pending: false,
        }
    }
}

impl AuthForm {
    /// Credentials to send, or an inline error when a field is blank.
    pub fn credentials(&self) -> Result<Credentials, String> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err("Please enter your email and password".to_string());
        }
        Ok(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        self.error = None;
    }

    /// Clear the form after a successful sign-in.
    pub fn finish(&mut self) {
        self.password.clear();
        self.error = None;
        self.pending = false;
    }
}

/// Display the form. Returns the credentials when the user submits.
pub fn show(ui: &mut egui::Ui, form: &mut AuthForm) -> Option<(AuthMode, Credentials)> {
    let mut submitted = None;

    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.2);
        let title = match form.mode {
            AuthMode::Login => "Sign in",
            AuthMode::Signup => "Create an account",
        };
        ui.heading(title);
        ui.add_space(12.0);

        ui.set_max_width(320.0);
        ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("Email"));
        let password = ui.add(
            egui::TextEdit::singleline(&mut form.password)
                .password(true)
                .hint_text("Password"),
        );
        let enter = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if let Some(error) = &form.error {
            ui.colored_label(egui::Color32::from_rgb(220, 38, 38), error);
        }
        ui.add_space(8.0);

        let label = match form.mode {
            AuthMode::Login => "Login",
            AuthMode::Signup => "Sign up",
        };
        let clicked = ui.add_enabled(!form.pending, egui::Button::new(label)).clicked();
        if form.pending {
            ui.spinner();
        }

        if (clicked || enter) && !form.pending {
            match form.credentials() {
                Ok(credentials) => {
                    form.error = None;
                    submitted = Some((form.mode, credentials));
                }
                Err(message) => form.error = Some(message),
            }
        }

        ui.add_space(8.0);
        let switch = match form.mode {
            AuthMode::Login => "Don't have an account? Sign up",
            AuthMode::Signup => "Already have an account? Login",
        };
        if ui.link(switch).clicked() {
            form.toggle_mode();
        }
    });

    submitted
}
