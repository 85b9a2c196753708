use arboard::Clipboard;
use color_eyre::Result;

/// System clipboard, opened on first use
#[derive(Default)]
pub struct ClipboardService {
    clipboard: Option<Clipboard>,
}

impl ClipboardService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_text(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        let clipboard = self
            .clipboard
            .as_mut()
            .ok_or_else(|| color_eyre::eyre::eyre!("Clipboard unavailable"))?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
