use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Stroke};

use crate::breathing::BreathingExercise;
use crate::client::ChatClient;
use crate::event::{AppEvent, ConnectionState};
use crate::session::{ChatSession, Provider, ProviderConfig, Role};
use crate::theme::Theme;

const QUICK_PROMPTS: [&str; 6] = [
    "I'm feeling overwhelmed",
    "I can't sleep",
    "I need to talk",
    "I feel lonely",
    "I'm anxious",
    "Help me breathe",
];

const BREATH_WIDGET_SIZE: f32 = 110.0;
const BREATH_TICK: Duration = Duration::from_millis(50);

pub struct SolaceApp {
    rx: Receiver<AppEvent>,
    client: ChatClient,
    session: ChatSession,
    connection_state: ConnectionState,
    theme: Theme,
    theme_applied: bool,

    // Sidebar staging fields; applied to the session on Connect.
    selected_provider: Provider,
    key_entry: String,
    model_entry: String,
    openai_key: String,
    openrouter_key: String,

    input_buffer: String,
    last_error: Option<String>,
    greeting_sent: bool,
    scroll_to_bottom: bool,
    diagnostics_log: Vec<String>,

    breathing: BreathingExercise,
    last_frame: Instant,
}

impl SolaceApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        client: ChatClient,
        openai_key: String,
        openrouter_key: String,
    ) -> Self {
        let selected_provider = Provider::OpenRouter;
        let key_entry = openrouter_key.clone();
        let mut app = Self {
            rx,
            client,
            session: ChatSession::new(ProviderConfig::for_provider(
                selected_provider,
                String::new(),
            )),
            connection_state: ConnectionState::Disconnected,
            theme: Theme::default(),
            theme_applied: false,
            selected_provider,
            key_entry,
            model_entry: selected_provider.default_model().to_string(),
            openai_key,
            openrouter_key,
            input_buffer: String::new(),
            last_error: None,
            greeting_sent: false,
            scroll_to_bottom: false,
            diagnostics_log: Vec::new(),
            breathing: BreathingExercise::default(),
            last_frame: Instant::now(),
        };

        // Auto-connect when a key was preloaded from the environment.
        if !app.key_entry.trim().is_empty() {
            app.connect();
        }

        app
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn connection_label(&self) -> (&'static str, Color32) {
        match self.connection_state {
            ConnectionState::Connected => ("● Connected", self.theme.success),
            ConnectionState::Connecting => ("● Connecting…", self.theme.accent),
            ConnectionState::Disconnected => ("● Not connected", self.theme.text_dim),
            ConnectionState::Error => ("● Error", self.theme.danger),
        }
    }

    fn stored_key_mut(&mut self, provider: Provider) -> &mut String {
        match provider {
            Provider::OpenAi => &mut self.openai_key,
            Provider::OpenRouter => &mut self.openrouter_key,
        }
    }

    fn on_provider_changed(&mut self, previous: Provider) {
        let entry = self.key_entry.clone();
        *self.stored_key_mut(previous) = entry;
        self.key_entry = self.stored_key_mut(self.selected_provider).clone();
        self.model_entry = self.selected_provider.default_model().to_string();
        self.connection_state = ConnectionState::Disconnected;
        self.log_diagnostic(format!(
            "provider switched to {}",
            self.selected_provider.display_name()
        ));
    }

    fn connect(&mut self) {
        let key = self.key_entry.trim().to_string();
        if key.is_empty() {
            self.last_error = Some(format!(
                "Please enter your {} API key.",
                self.selected_provider.display_name()
            ));
            return;
        }
        *self.stored_key_mut(self.selected_provider) = key.clone();

        let config = ProviderConfig {
            provider: self.selected_provider,
            base_url: self.selected_provider.base_url().to_string(),
            model: self.model_entry.trim().to_string(),
            api_key: key,
        };
        if let Err(err) = config.validate() {
            self.last_error = Some(err.to_string());
            return;
        }

        self.session.set_config(config.clone());
        self.connection_state = ConnectionState::Connecting;
        self.last_error = None;
        self.log_diagnostic(format!(
            "verifying {} key",
            self.selected_provider.display_name()
        ));
        self.client.verify_key(config);
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let text = std::mem::take(&mut self.input_buffer);
        match self.session.begin_send(&text) {
            Ok(payload) => {
                self.client.send(self.session.config().clone(), payload);
                self.last_error = None;
                self.scroll_to_bottom = true;
                ctx.request_repaint();
            }
            Err(err) => {
                // Leave the text in place so nothing typed is lost.
                self.input_buffer = text;
                self.last_error = Some(err.to_string());
                self.log_diagnostic(format!("send rejected: {err}"));
            }
        }
    }

    fn send_quick_prompt(&mut self, prompt: &str, ctx: &egui::Context) {
        self.input_buffer = prompt.to_string();
        self.submit_prompt(ctx);
    }

    fn request_greeting(&mut self) {
        if self.greeting_sent || !self.session.transcript().is_empty() {
            return;
        }
        match self.session.begin_greeting() {
            Ok(payload) => {
                self.greeting_sent = true;
                self.client.send(self.session.config().clone(), payload);
            }
            Err(err) => self.log_diagnostic(format!("greeting skipped: {err}")),
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, ctx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: &egui::Context) {
        match event {
            AppEvent::AssistantReply(text) => {
                self.session.complete_reply(text);
                self.scroll_to_bottom = true;
                ctx.request_repaint();
            }
            AppEvent::ChatFailed(err) => {
                self.log_diagnostic(format!("chat turn failed: {err}"));
                self.session.fail(&err);
                self.scroll_to_bottom = true;
                ctx.request_repaint();
            }
            AppEvent::KeyVerified(provider) => {
                self.connection_state = ConnectionState::Connected;
                self.log_diagnostic(format!("{} key accepted", provider.display_name()));
                self.request_greeting();
            }
            AppEvent::KeyRejected(detail) => {
                self.connection_state = ConnectionState::Error;
                self.last_error = Some(detail.clone());
                self.log_diagnostic(format!("key verification failed: {detail}"));
            }
        }
    }

    fn tick_breathing(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.breathing.is_running() {
            self.breathing.advance(dt);
            ctx.request_repaint_after(BREATH_TICK);
        }
    }

    fn section_heading(&self, ui: &mut egui::Ui, text: &str) {
        ui.label(
            RichText::new(text)
                .small()
                .strong()
                .color(self.theme.text_dim),
        );
    }

    fn render_breath_circle(&self, ui: &mut egui::Ui) {
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(BREATH_WIDGET_SIZE, BREATH_WIDGET_SIZE),
            Sense::hover(),
        );
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = 30.0 * self.breathing.scale();

        let accent = self.theme.accent;
        for ring in 1..=4u8 {
            let alpha = 70 - ring * 15;
            let glow = Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), alpha);
            painter.circle_stroke(
                center,
                radius + f32::from(ring) * 4.0,
                Stroke::new(1.0, glow),
            );
        }
        painter.circle_filled(center, radius, self.theme.breath_fill);
        painter.circle_stroke(center, radius, Stroke::new(2.0, accent));

        let label = if self.breathing.is_running() {
            self.breathing.label()
        } else {
            "Ready".to_string()
        };
        painter.text(
            center,
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(11.0),
            self.theme.text_primary,
        );
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        let frame = self.theme.sidebar_frame();
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(230.0)
            .frame(frame)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("✦").heading().color(self.theme.accent));
                    ui.label(
                        RichText::new("Solace")
                            .heading()
                            .color(self.theme.text_primary),
                    );
                });
                ui.add_space(8.0);

                self.section_heading(ui, "API PROVIDER");
                let previous = self.selected_provider;
                egui::ComboBox::from_id_salt("provider_select")
                    .width(ui.available_width())
                    .selected_text(self.selected_provider.display_name())
                    .show_ui(ui, |ui| {
                        for provider in Provider::ALL {
                            ui.selectable_value(
                                &mut self.selected_provider,
                                provider,
                                provider.display_name(),
                            );
                        }
                    });
                if self.selected_provider != previous {
                    self.on_provider_changed(previous);
                }

                ui.add_space(4.0);
                self.section_heading(ui, "MODEL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.model_entry)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(4.0);
                self.section_heading(ui, "API KEY");
                ui.add(
                    egui::TextEdit::singleline(&mut self.key_entry)
                        .password(true)
                        .desired_width(f32::INFINITY),
                );
                if ui.button("Connect").clicked() {
                    self.connect();
                }
                let (status_text, status_color) = self.connection_label();
                ui.label(RichText::new(status_text).small().color(status_color));
                if let Some(error) = &self.last_error {
                    ui.label(
                        RichText::new(error.clone())
                            .small()
                            .color(self.theme.danger),
                    );
                }

                ui.separator();
                self.section_heading(ui, "BOX BREATHING");
                ui.label(
                    RichText::new("Calm your nervous system")
                        .small()
                        .color(self.theme.text_muted),
                );
                let card = self.theme.card_frame();
                card.show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        self.render_breath_circle(ui);
                        let toggle_label = if self.breathing.is_running() {
                            "Stop"
                        } else {
                            "Start Breathing"
                        };
                        if ui.button(toggle_label).clicked() {
                            if self.breathing.is_running() {
                                self.breathing.stop();
                            } else {
                                self.breathing.start();
                            }
                        }
                    });
                });

                ui.separator();
                self.section_heading(ui, "QUICK START");
                let mut clicked_prompt: Option<&str> = None;
                for prompt in QUICK_PROMPTS {
                    if ui
                        .add_sized(
                            [ui.available_width(), 24.0],
                            egui::Button::new(RichText::new(prompt).color(self.theme.accent)),
                        )
                        .clicked()
                    {
                        clicked_prompt = Some(prompt);
                    }
                }
                if let Some(prompt) = clicked_prompt {
                    self.send_quick_prompt(prompt, ctx);
                }

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("⚠ Crisis? Call/text 988")
                            .small()
                            .color(self.theme.danger),
                    );
                });
            });
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("✦").heading().color(self.theme.accent));
                ui.vertical(|ui| {
                    ui.label(
                        RichText::new("Solace")
                            .heading()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("● Here for you")
                            .small()
                            .color(self.theme.success),
                    );
                });
            });
        });
    }

    fn render_transcript(&mut self, ui: &mut egui::Ui, height: f32) {
        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in self.session.transcript() {
                    ui.add_space(6.0);
                    match message.role {
                        Role::User => {
                            ui.label(
                                RichText::new("You ◆")
                                    .strong()
                                    .color(self.theme.accent_strong),
                            );
                            ui.label(
                                RichText::new(&message.content).color(self.theme.text_primary),
                            );
                        }
                        Role::Assistant => {
                            ui.label(
                                RichText::new("✦ Solace").strong().color(self.theme.accent),
                            );
                            ui.label(
                                RichText::new(&message.content).color(self.theme.text_primary),
                            );
                        }
                        Role::System => {
                            ui.label(
                                RichText::new(format!("Something went wrong: {}", message.content))
                                    .italics()
                                    .color(self.theme.danger),
                            );
                        }
                    }
                }

                if self.session.is_pending() {
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new("Solace is listening…")
                            .italics()
                            .color(self.theme.text_dim),
                    );
                }

                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let transcript_height = (ui.available_height() - 150.0).max(120.0);
            self.render_transcript(ui, transcript_height);

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(80.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry).small());
                            }
                        });
                });

            ui.separator();
            let connected = self.connection_state == ConnectionState::Connected;
            let input_enabled = connected && !self.session.is_pending();
            let hint = if !connected {
                "Connect with your API key first"
            } else if self.session.is_pending() {
                "Solace is listening…"
            } else {
                "Share what's on your mind…"
            };

            let mut send_now = false;
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    input_enabled,
                    egui::TextEdit::singleline(&mut self.input_buffer)
                        .desired_width(ui.available_width() - 90.0)
                        .hint_text(hint),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                }

                let clicked = ui
                    .add_enabled(
                        input_enabled && !self.input_buffer.trim().is_empty(),
                        egui::Button::new("Send ➤"),
                    )
                    .clicked();
                send_now |= clicked;
            });
            ui.label(
                RichText::new("Enter to send")
                    .small()
                    .color(self.theme.text_dim),
            );

            if send_now && input_enabled && !self.input_buffer.trim().is_empty() {
                self.submit_prompt(ctx);
            }
        });
    }
}

impl eframe::App for SolaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.theme.apply_visuals(ctx);
            self.theme_applied = true;
        }

        self.drain_events(ctx);
        self.tick_breathing(ctx);
        if self.session.is_pending() || self.connection_state == ConnectionState::Connecting {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.render_header(ctx);
        self.render_sidebar(ctx);
        self.render_center_panel(ctx);
    }
}
