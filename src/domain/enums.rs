use serde::{Deserialize, Serialize};

/// Purpose of the running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Parse the stored phase name ("work", "shortBreak", "longBreak")
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "work" => Some(Self::Work),
            "shortBreak" => Some(Self::ShortBreak),
            "longBreak" => Some(Self::LongBreak),
            _ => None,
        }
    }

    /// Stored phase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
        }
    }

    /// Human label for the timer view
    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Self::Work)
    }
}

/// Schedule status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "DONE",
            Self::Overdue => "OVERDUE",
        }
    }
}

/// Top-level view shown by the terminal UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timer,
    Tasks,
    Calendar,
    Settings,
}

impl View {
    pub fn all() -> &'static [View] {
        &[View::Timer, View::Tasks, View::Calendar, View::Settings]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Timer => "Timer",
            View::Tasks => "Tasks",
            View::Calendar => "Calendar",
            View::Settings => "Settings",
        }
    }

    /// Next view in tab order (wraps)
    pub fn next(&self) -> View {
        match self {
            View::Timer => View::Tasks,
            View::Tasks => View::Calendar,
            View::Calendar => View::Settings,
            View::Settings => View::Timer,
        }
    }
}

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
    EditingTask,
}

/// Color theme names offered in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Light,
    #[default]
    Dark,
    Blue,
    Purple,
    Red,
    Green,
    Orange,
}

impl ThemeName {
    pub fn all() -> &'static [ThemeName] {
        &[
            ThemeName::Light,
            ThemeName::Dark,
            ThemeName::Blue,
            ThemeName::Purple,
            ThemeName::Red,
            ThemeName::Green,
            ThemeName::Orange,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
            ThemeName::Blue => "blue",
            ThemeName::Purple => "purple",
            ThemeName::Red => "red",
            ThemeName::Green => "green",
            ThemeName::Orange => "orange",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::all().iter().copied().find(|theme| theme.name() == name)
    }

    /// Following theme in the list (wraps)
    pub fn cycle(&self) -> ThemeName {
        let all = Self::all();
        let idx = all.iter().position(|theme| theme == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}
