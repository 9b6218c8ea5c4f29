use ratatui::style::Color;

/// Styling for the calendar view. The palette mirrors the practice's two
/// calendar themes; `KALENDER_THEME` picks the initial one and the view can
/// toggle at runtime.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Surfaces
    pub background: Color,
    pub panel: Color,

    // Text
    pub normal_text: Color,
    pub dimmed: Color,
    pub header: Color,

    // State
    pub today: Color,
    pub selected_bg: Color,
    pub weekend: Color,

    // Accents
    pub accent: Color,
    pub important: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            colors: ThemeColors {
                background: Color::Rgb(22, 40, 65),
                panel: Color::Rgb(35, 56, 88),
                normal_text: Color::Rgb(243, 244, 246),
                dimmed: Color::Rgb(107, 114, 128),
                header: Color::Rgb(229, 231, 235),
                today: Color::Rgb(250, 204, 21),
                selected_bg: Color::Rgb(38, 55, 84),
                weekend: Color::Rgb(148, 163, 184),
                accent: Color::Rgb(56, 182, 255),
                important: Color::Rgb(248, 113, 113),
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            colors: ThemeColors {
                background: Color::White,
                panel: Color::Rgb(243, 244, 246),
                normal_text: Color::Black,
                dimmed: Color::Rgb(156, 163, 175),
                header: Color::Rgb(17, 24, 39),
                today: Color::Rgb(180, 83, 9),
                selected_bg: Color::Rgb(229, 231, 235),
                weekend: Color::Rgb(75, 85, 99),
                accent: Color::Rgb(2, 132, 199),
                important: Color::Rgb(220, 38, 38),
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
