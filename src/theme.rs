use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

/// Dark purple palette for the whole window.
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg_dark: Color32,
    pub bg_sidebar: Color32,
    pub bg_input: Color32,
    pub bg_bubble_user: Color32,
    pub accent: Color32,
    pub accent_strong: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub text_dim: Color32,
    pub border: Color32,
    pub breath_fill: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg_dark: Color32::from_rgb(0x0F, 0x0C, 0x1A),
            bg_sidebar: Color32::from_rgb(0x13, 0x0F, 0x22),
            bg_input: Color32::from_rgb(0x1A, 0x15, 0x30),
            bg_bubble_user: Color32::from_rgb(0x5B, 0x21, 0xB6),
            accent: Color32::from_rgb(0xA7, 0x8B, 0xFA),
            accent_strong: Color32::from_rgb(0x7C, 0x3A, 0xED),
            success: Color32::from_rgb(0x34, 0xD3, 0x99),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            text_primary: Color32::from_rgb(0xF5, 0xF0, 0xFF),
            text_muted: Color32::from_rgb(0x9C, 0xA3, 0xAF),
            text_dim: Color32::from_rgb(0x6B, 0x72, 0x80),
            border: Color32::from_rgb(0x2D, 0x20, 0x50),
            breath_fill: Color32::from_rgb(0x3B, 0x1D, 0x8A),
        }
    }
}

impl Theme {
    const RADIUS: u8 = 10;

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.bg_dark;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.fg_stroke.color = self.text_primary;
        visuals.widgets.noninteractive.bg_fill = self.bg_input;
        visuals.widgets.noninteractive.weak_bg_fill = self.bg_input;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.bg_fill = self.bg_input;
        visuals.widgets.inactive.weak_bg_fill = self.bg_input;
        visuals.widgets.inactive.fg_stroke.color = self.text_primary;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.accent_strong;
        visuals.widgets.hovered.fg_stroke.color = self.text_primary;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.active.bg_fill = self.accent_strong;
        visuals.widgets.active.fg_stroke.color = self.text_primary;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.widgets.open.bg_fill = self.bg_input;
        visuals.widgets.open.bg_stroke = Stroke::NONE;
        visuals.selection.bg_fill = self.accent_strong;
        visuals.hyperlink_color = self.accent;
        visuals.window_fill = self.bg_sidebar;
        visuals.window_stroke = Stroke::new(1.0, self.border);
        visuals.window_corner_radius = CornerRadius::same(Self::RADIUS);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(18.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(11.0));
        ctx.set_style(style);
    }

    pub fn sidebar_frame(&self) -> Frame {
        Frame::new()
            .fill(self.bg_sidebar)
            .inner_margin(Margin::same(12))
    }

    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.bg_input)
            .inner_margin(Margin::same(10))
            .corner_radius(CornerRadius::same(Self::RADIUS))
            .stroke(Stroke::new(1.0, self.border))
    }
}
