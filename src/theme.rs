use serde::Deserialize;

const DEFAULT_BACKGROUND: &str = "#fdfcf7";
const DEFAULT_TEXT: &str = "#2f3e2e";
const DEFAULT_PANEL: &str = "#f6f4ec";
const DEFAULT_MUTED: &str = "#666666";
const DEFAULT_ACCENT: &str = "#4c7a3d";

const FONT_SIZE_BASE: f32 = 14.0;
const FONT_SIZE_SMALL: f32 = 11.0;

/// Color and type scale for the rendered diagram.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background_color: String,
    pub text_color: String,
    pub panel_color: String,
    pub muted_color: String,
    pub accent_color: String,

    pub font_size_base: f32,
    pub font_size_small: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background_color: DEFAULT_BACKGROUND.to_string(),
            text_color: DEFAULT_TEXT.to_string(),
            panel_color: DEFAULT_PANEL.to_string(),
            muted_color: DEFAULT_MUTED.to_string(),
            accent_color: DEFAULT_ACCENT.to_string(),

            font_size_base: FONT_SIZE_BASE,
            font_size_small: FONT_SIZE_SMALL,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    black: String,
    green: String,
    white: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl Theme {
    /// Parse an Alacritty theme file, trying TOML first and YAML second,
    /// matching how both formats circulate in the wild.
    pub fn from_alacritty(content: &str) -> Result<Self, String> {
        Self::from_alacritty_toml(content).or_else(|_| Self::from_alacritty_yaml(content))
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty YAML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty TOML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;

        Theme {
            background_color: colors.primary.background,
            text_color: colors.primary.foreground,
            panel_color: colors.normal.black,
            muted_color: colors.normal.white,
            accent_color: colors.normal.green,

            font_size_base: FONT_SIZE_BASE,
            font_size_small: FONT_SIZE_SMALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    const ALACRITTY_TOML: &str = r##"
[colors.primary]
background = "#1a1b26"
foreground = "#c0caf5"

[colors.normal]
black = "#15161e"
green = "#9ece6a"
white = "#a9b1d6"
"##;

    const ALACRITTY_YAML: &str = r##"
colors:
  primary:
    background: "#1a1b26"
    foreground: "#c0caf5"
  normal:
    black: "#15161e"
    green: "#9ece6a"
    white: "#a9b1d6"
"##;

    #[test]
    fn toml_and_yaml_forms_map_to_the_same_theme() {
        let from_toml = Theme::from_alacritty(ALACRITTY_TOML).expect("toml theme");
        let from_yaml = Theme::from_alacritty(ALACRITTY_YAML).expect("yaml theme");

        assert_eq!(from_toml.background_color, from_yaml.background_color);
        assert_eq!(from_toml.accent_color, "#9ece6a");
        assert_eq!(from_yaml.panel_color, "#15161e");
    }

    #[test]
    fn garbage_input_is_an_error() {
        assert!(Theme::from_alacritty("not a theme at all {{{").is_err());
    }
}
