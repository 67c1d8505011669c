use colored::Colorize;

pub struct Theme {
    pub title: fn(&str) -> String,
    pub label: fn(&str) -> String,
    pub value: fn(&str) -> String,
    pub line: fn(&str) -> String,
    pub idx: fn(&str) -> String,
    pub note: fn(&str) -> String,
    pub active: fn(&str) -> String,
    pub done: fn(&str) -> String,
    pub failed: fn(&str) -> String,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "classic" | "" => Self::classic(),
            "vivid" => Self::vivid(),
            "plain" => Self::plain(),
            _ => {
                eprintln!("{}", format!("✘ Unknown theme: {}", name).red());
                Self::classic() // Fallback to default
            }
        }
    }

    fn classic() -> Self {
        Self {
            title: |s| s.bright_magenta().bold().underline().to_string(),
            label: |s| s.cyan().to_string(),
            value: |s| s.white().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            note: |s| s.bright_white().dimmed().italic().to_string(),
            active: |s| s.yellow().bold().to_string(),
            done: |s| s.green().bold().to_string(),
            failed: |s| s.red().bold().to_string(),
        }
    }

    fn vivid() -> Self {
        Self {
            title: |s| s.blue().bold().underline().to_string(),
            label: |s| s.magenta().to_string(),
            value: |s| s.bright_white().to_string(),
            line: |s| s.bright_blue().dimmed().to_string(),
            idx: |s| s.cyan().to_string(),
            note: |s| s.bright_yellow().dimmed().italic().to_string(),
            active: |s| s.bright_cyan().bold().to_string(),
            done: |s| s.bright_green().bold().to_string(),
            failed: |s| s.bright_red().bold().to_string(),
        }
    }

    fn plain() -> Self {
        Self {
            title: |s| s.to_string(),
            label: |s| s.to_string(),
            value: |s| s.to_string(),
            line: |s| s.to_string(),
            idx: |s| s.to_string(),
            note: |s| s.to_string(),
            active: |s| s.to_string(),
            done: |s| s.to_string(),
            failed: |s| s.to_string(),
        }
    }
}
