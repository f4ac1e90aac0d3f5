// src/ui.rs
use iced::widget::{button, container};
use iced::{Background, Color, Theme};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, PartialEq)]
pub struct Styles {
    pub bg: Color,
    pub fg: Color,
    pub muted_fg: Color,
    pub panel_bg: Color,
    pub footer_bg: Color,
    pub footer_fg: Color,
    pub line: Color,
    pub highlight: Color,
}

pub static DARK_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    bg: Color::from_rgb(0.0, 0.0, 0.0),
    fg: Color::from_rgb(1.0, 1.0, 1.0),
    muted_fg: Color::from_rgb(0.6, 0.6, 0.6),
    panel_bg: Color::from_rgb(0.1, 0.1, 0.1),
    footer_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    footer_fg: Color::from_rgb(1.0, 1.0, 1.0),
    line: Color::from_rgb(0.42, 0.68, 0.84),
    highlight: Color::from_rgb(1.0, 0.76, 0.03),
});

pub static LIGHT_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    bg: Color::from_rgb(1.0, 1.0, 1.0),
    fg: Color::from_rgb(0.0, 0.0, 0.0),
    muted_fg: Color::from_rgb(0.4, 0.4, 0.4),
    panel_bg: Color::from_rgb(0.8784, 0.8784, 0.8784), // #e0e0e0
    footer_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    footer_fg: Color::from_rgb(1.0, 1.0, 1.0),
    line: Color::from_rgb(0.13, 0.44, 0.71),
    highlight: Color::from_rgb(0.85, 0.33, 0.1),
});

pub fn styles(is_dark_mode: bool) -> &'static Styles {
    if is_dark_mode {
        &*DARK_THEME
    } else {
        &*LIGHT_THEME
    }
}

/// ColorBrewer "Blues" stops, light to dark.
pub static BLUES: Lazy<Vec<(f32, Color)>> = Lazy::new(|| {
    vec![
        (0.0, Color::from_rgb8(247, 251, 255)),
        (0.125, Color::from_rgb8(222, 235, 247)),
        (0.25, Color::from_rgb8(198, 219, 239)),
        (0.375, Color::from_rgb8(158, 202, 225)),
        (0.5, Color::from_rgb8(107, 174, 214)),
        (0.625, Color::from_rgb8(66, 146, 198)),
        (0.75, Color::from_rgb8(33, 113, 181)),
        (0.875, Color::from_rgb8(8, 81, 156)),
        (1.0, Color::from_rgb8(8, 48, 107)),
    ]
});

/// Samples the Blues scale at `t`, clamped to `[0, 1]`.
pub fn blues(t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    for pair in BLUES.windows(2) {
        let (start, from) = pair[0];
        let (end, to) = pair[1];
        if t <= end {
            let local = (t - start) / (end - start);
            return Color::from_rgb(
                from.r + (to.r - from.r) * local,
                from.g + (to.g - from.g) * local,
                from.b + (to.b - from.b) * local,
            );
        }
    }

    BLUES[BLUES.len() - 1].1
}

/// Position of `value` between `min` and `max`; 1.0 when the range is empty.
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    if max > min {
        ((value - min) / (max - min)) as f32
    } else {
        1.0
    }
}

pub struct ContainerStyle {
    pub bg: Color,
    pub fg: Option<Color>,
}

impl container::StyleSheet for ContainerStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(self.bg)),
            text_color: self.fg,
            ..Default::default()
        }
    }
}

pub fn filled(bg: Color) -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(ContainerStyle { bg, fg: None }))
}

pub struct ButtonStyle {
    pub bg: Color,
    pub fg: Color,
    pub hover_bg: Color,
}

impl button::StyleSheet for ButtonStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(self.bg)),
            text_color: self.fg,
            ..Default::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(self.hover_bg)),
            ..self.active(style)
        }
    }
}

pub fn footer_button(styles: &Styles) -> iced::theme::Button {
    iced::theme::Button::Custom(Box::new(ButtonStyle {
        bg: styles.footer_bg,
        fg: styles.footer_fg,
        hover_bg: Color::from_rgb(0.0, 0.26, 0.5),
    }))
}
