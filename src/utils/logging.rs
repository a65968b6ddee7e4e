use crate::core::message::{Message, Role};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Plain-text transcript log. Messages are appended once they settle.
pub struct LoggingState {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: PathBuf) -> Result<String, Box<dyn std::error::Error>> {
        test_file_access(&path)?;

        let message = format!("Logging enabled to: {}", path.display());
        self.file_path = Some(path);
        self.is_active = true;
        Ok(message)
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                let path = path.display().to_string();
                if self.is_active {
                    self.log_line("## Logging paused")?;
                    self.is_active = false;
                    Ok(format!("Logging paused (file: {path})"))
                } else {
                    self.is_active = true;
                    Ok(format!("Logging resumed to: {path}"))
                }
            }
            None => Err("No log file specified. Use /log <filename> to enable logging first.".into()),
        }
    }

    pub fn log_message(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        match self.active_path() {
            Some(path) => append(path, &format_entry(message)),
            None => Ok(()),
        }
    }

    fn log_line(&self, line: &str) -> Result<(), Box<dyn std::error::Error>> {
        match self.active_path() {
            Some(path) => append(path, line),
            None => Ok(()),
        }
    }

    /// Replaces the log with the given messages, e.g. after the
    /// conversation was cleared.
    pub fn rewrite_log<'a, I>(&self, messages: I) -> Result<(), Box<dyn std::error::Error>>
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let Some(file_path) = self.active_path() else {
            return Ok(());
        };

        let parent = file_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(parent)?;

        for message in messages {
            write_entry(&mut temp_file, &format_entry(message))?;
        }

        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(file_path)?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let file_name = |path: &Path| {
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }

    fn active_path(&self) -> Option<&Path> {
        if self.is_active {
            self.file_path.as_deref()
        } else {
            None
        }
    }
}

fn format_entry(message: &Message) -> String {
    match message.role {
        Role::User => format!("You: {}", message.text_part),
        Role::Model => {
            let mut entry = message.text_part.clone();
            if let Some(node) = &message.ui_part {
                entry.push_str(&format!("\n[UI component: {}]", node.kind));
            }
            for source in &message.sources {
                if let Some(uri) = &source.uri {
                    entry.push_str(&format!("\nSource: {uri}"));
                }
            }
            entry
        }
    }
}

fn append(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    write_entry(&mut writer, content)?;
    writer.flush()?;
    Ok(())
}

fn write_entry<W: Write>(writer: &mut W, content: &str) -> std::io::Result<()> {
    for line in content.lines() {
        writeln!(writer, "{line}")?;
    }
    // Blank line between entries.
    writeln!(writer)
}

fn test_file_access(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()?;
    Ok(())
}
