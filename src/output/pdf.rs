use anyhow::{anyhow, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};

use crate::output::formatter::format_summary;
use crate::output::truncate_description;
use crate::pulls::{PrState, PullRequestRecord};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
/// Start a new page once the cursor drops below this height
const PAGE_BREAK_AT: f32 = 47.0;

/// Millimetres per point
const PT_TO_MM: f32 = 0.3528;

/// Built-in fonts only cover Latin-1; anything else is replaced
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' | '\r' => ' ',
            c if c == '\n' || (' '..='~').contains(&c) || ('\u{a0}'..='\u{ff}').contains(&c) => c,
            _ => '?',
        })
        .collect()
}

/// Break text into lines of at most `max_chars` characters, at spaces where
/// possible. Explicit newlines are kept.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();
            // Words longer than a line are hard-split
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    lines
}

/// Rough character budget for one line of Helvetica at `size` points
fn chars_per_line(size: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    (usable / (size * PT_TO_MM * 0.5)) as usize
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

fn state_color(state: PrState) -> Color {
    match state {
        PrState::Merged => rgb(34, 139, 34),
        PrState::Open => rgb(40, 167, 69),
        PrState::Closed => rgb(108, 117, 125),
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Writes top to bottom, adding pages with a header and numbered footer
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    fonts: &'a Fonts,
    layer: PdfLayerReference,
    y: f32,
    page: usize,
    username: String,
    repositories: String,
}

impl<'a> Cursor<'a> {
    fn start_page(&mut self, layer: PdfLayerReference) {
        self.layer = layer;
        self.page += 1;
        self.y = PAGE_HEIGHT - MARGIN - 4.0;

        self.layer.set_fill_color(rgb(0, 0, 0));
        let title = format!("Pull Requests by {}", self.username);
        self.layer.use_text(sanitize(&title), 12.0, Mm(MARGIN), Mm(self.y), &self.fonts.bold);
        self.y -= 6.0;
        let repos = format!("Repositories: {}", self.repositories);
        self.layer.use_text(sanitize(&repos), 8.0, Mm(MARGIN), Mm(self.y), &self.fonts.italic);
        self.y -= 8.0;

        let footer = format!("Page {}", self.page);
        self.layer
            .use_text(footer, 8.0, Mm(PAGE_WIDTH / 2.0 - 5.0), Mm(MARGIN), &self.fonts.italic);
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = self.doc.get_page(page).get_layer(layer);
        self.start_page(layer);
    }

    /// Wrapped text block; `line_height` in millimetres
    fn text(&mut self, text: &str, size: f32, line_height: f32, font: &IndirectFontRef, color: Color) {
        self.layer.set_fill_color(color);
        for line in wrap(&sanitize(text), chars_per_line(size)) {
            if self.y < MARGIN + 10.0 {
                self.new_page();
                self.layer.set_fill_color(rgb(0, 0, 0));
            }
            self.layer.use_text(line, size, Mm(MARGIN), Mm(self.y), font);
            self.y -= line_height;
        }
    }

    fn record(&mut self, record: &PullRequestRecord) {
        if self.y < PAGE_BREAK_AT {
            self.new_page();
        }
        let fonts = self.fonts;

        let badge = format!("[{}]  {}", record.state, record.relation.label());
        self.text(&badge, 9.0, 6.0, &fonts.bold, state_color(record.state));

        let title = format!("#{} - {}", record.number, record.title);
        self.text(&title, 10.0, 5.0, &fonts.bold, rgb(0, 0, 0));

        let date = format!("{}  {}", record.effective_date.format("%Y-%m-%d"), record.repository);
        self.text(&date, 8.0, 4.0, &fonts.regular, rgb(100, 100, 100));

        self.text(&record.url, 7.0, 4.0, &fonts.regular, rgb(0, 0, 255));

        let description = truncate_description(&record.description);
        if !description.trim().is_empty() {
            self.y -= 1.0;
            self.text(&description, 8.0, 4.0, &fonts.regular, rgb(0, 0, 0));
        }
        self.y -= 6.0;
    }
}

/// Render the records as a PDF document
pub fn render_pdf(records: &[PullRequestRecord], username: &str, repositories: &[String]) -> Result<Vec<u8>> {
    let title = format!("Pull Requests by {}", username);
    let (doc, page, layer) = PdfDocument::new(
        sanitize(&title),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1".to_string(),
    );

    let font = |builtin| {
        doc.add_builtin_font(builtin)
            .map_err(|e| anyhow!("Failed to load PDF font: {:?}", e))
    };
    let fonts = Fonts {
        regular: font(BuiltinFont::Helvetica)?,
        bold: font(BuiltinFont::HelveticaBold)?,
        italic: font(BuiltinFont::HelveticaOblique)?,
    };

    let first_layer = doc.get_page(page).get_layer(layer);
    let mut cursor = Cursor {
        doc: &doc,
        fonts: &fonts,
        layer: first_layer.clone(),
        y: 0.0,
        page: 0,
        username: username.to_string(),
        repositories: repositories.join(", "),
    };
    cursor.start_page(first_layer);

    cursor.text(&format_summary(records), 9.0, 8.0, &fonts.bold, rgb(0, 0, 0));
    for record in records {
        cursor.record(record);
    }
    drop(cursor);

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to render PDF: {:?}", e))
}
