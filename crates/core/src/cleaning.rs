use crate::error::IngestError;
use regex::Regex;

const PAGE_BREAK: &str = r"--- HALAMAN \d+ ---";
const PAGE_NUMBER_LINE: &str = r"(?m)^[^\S\n]*-\d+-[^\S\n]*$";
const SITE_FOOTER: &str = r"www\.peraturan\.go\.id";
const RUNNING_HEADER: &str = r"\d+, No\.\d+";
const BLANK_RUN: &str = r"\n\s*\n";

/// Strips rendering artifacts left behind by the PDF-to-text export of
/// peraturan.go.id documents.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    page_break: Regex,
    page_number_line: Regex,
    site_footer: Regex,
    running_header: Regex,
    blank_run: Regex,
}

impl NoiseFilter {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            page_break: Regex::new(PAGE_BREAK)?,
            page_number_line: Regex::new(PAGE_NUMBER_LINE)?,
            site_footer: Regex::new(SITE_FOOTER)?,
            running_header: Regex::new(RUNNING_HEADER)?,
            blank_run: Regex::new(BLANK_RUN)?,
        })
    }

    /// Runs the cleanup passes until the text stops changing.
    ///
    /// Every pass that changes the text makes it shorter, so the loop ends.
    pub fn clean(&self, raw: &str) -> String {
        let mut current = self.clean_once(raw);
        loop {
            let next = self.clean_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn clean_once(&self, text: &str) -> String {
        let text = self.page_break.replace_all(text, "");
        let text = self.page_number_line.replace_all(&text, "");
        let text = self.site_footer.replace_all(&text, "");
        let text = self.running_header.replace_all(&text, "");
        self.blank_run.replace_all(&text, "\n").into_owned()
    }
}
