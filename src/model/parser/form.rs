// File: ./src/model/parser/form.rs
// The structured stand-up form and its plain-text note rendering.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectBlock {
    pub name: String,
    pub tasks: String,
}

/// One stand-up as typed into the form. Every section is raw multi-line text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredForm {
    pub projects: Vec<ProjectBlock>,
    pub shipments: String,
    pub shipments_plan: String,
    pub installation: String,
    pub painting: String,
    pub assembly: String,
    pub carpentry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Shipments,
    ShipmentsPlan,
    Installation,
    Painting,
    Assembly,
    Carpentry,
}

// Note order.
const SECTIONS: [Section; 6] = [
    Section::Shipments,
    Section::ShipmentsPlan,
    Section::Installation,
    Section::Painting,
    Section::Assembly,
    Section::Carpentry,
];

impl Section {
    fn header(self) -> &'static str {
        match self {
            Section::Shipments => "ОТГРУЗКИ",
            Section::ShipmentsPlan => "ПЛАН ОТГРУЗКИ",
            Section::Installation => "МОНТАЖИ",
            Section::Painting => "ПОКРАСКА",
            Section::Assembly => "СБОРЩИКИ",
            Section::Carpentry => "СТОЛЯРЫ",
        }
    }

    fn from_header(word: &str) -> Option<Self> {
        let normalized = word.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        SECTIONS.into_iter().find(|s| s.header() == normalized)
    }
}

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(план\s+отгрузки|отгрузки|монтажи|покраска|сборщики|столяры)\s*:?\s*$")
        .unwrap()
});
static PROJECT_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^:]+):\s*$").unwrap());

impl StructuredForm {
    fn section(&self, section: Section) -> &String {
        match section {
            Section::Shipments => &self.shipments,
            Section::ShipmentsPlan => &self.shipments_plan,
            Section::Installation => &self.installation,
            Section::Painting => &self.painting,
            Section::Assembly => &self.assembly,
            Section::Carpentry => &self.carpentry,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Shipments => &mut self.shipments,
            Section::ShipmentsPlan => &mut self.shipments_plan,
            Section::Installation => &mut self.installation,
            Section::Painting => &mut self.painting,
            Section::Assembly => &mut self.assembly,
            Section::Carpentry => &mut self.carpentry,
        }
    }

    /// True when at least one project block or section carries text.
    pub fn has_data(&self) -> bool {
        self.projects.iter().any(|p| !p.tasks.trim().is_empty())
            || SECTIONS
                .into_iter()
                .any(|s| !self.section(s).trim().is_empty())
    }

    /// Renders the form as a daily note: project blocks first ("Имя:\nзадачи"), then the
    /// non-empty sections under their upper-case headers.
    pub fn to_note(&self) -> String {
        let mut text = String::new();

        // Unnamed blocks first so they read back as headerless text.
        let (unnamed, named): (Vec<_>, Vec<_>) = self
            .projects
            .iter()
            .filter(|p| !p.tasks.trim().is_empty())
            .partition(|p| p.name.trim().is_empty());
        for block in unnamed {
            text.push_str(&format!("{}\n\n", block.tasks.trim()));
        }
        for block in named {
            text.push_str(&format!("{}:\n{}\n\n", block.name.trim(), block.tasks.trim()));
        }

        for section in SECTIONS {
            let body = self.section(section).trim();
            if !body.is_empty() {
                text.push_str(&format!("{}:\n{}\n\n", section.header(), body));
            }
        }

        text.trim().to_string()
    }

    /// Splits note text back into a form.
    ///
    /// Before the first section header, a "Имя:" line at the start of the text or right
    /// after a blank line opens a project block; other lines belong to the open block (or
    /// to an unnamed one). After a header, lines go to that section until the next header.
    /// Blank lines are dropped.
    pub fn from_note(text: &str) -> Self {
        let mut form = StructuredForm::default();
        let mut current: Option<Section> = None;
        let mut block_start = true;

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                block_start = true;
                continue;
            }
            let at_block_start = std::mem::replace(&mut block_start, false);

            if let Some(section) = SECTION_HEADER
                .captures(line)
                .and_then(|c| Section::from_header(&c[1]))
            {
                current = Some(section);
                continue;
            }

            match current {
                Some(section) => append_line(form.section_mut(section), line),
                None => {
                    if at_block_start && let Some(caps) = PROJECT_HEADER.captures(line) {
                        form.projects.push(ProjectBlock {
                            name: caps[1].trim().to_string(),
                            tasks: String::new(),
                        });
                        continue;
                    }
                    if form.projects.is_empty() {
                        form.projects.push(ProjectBlock::default());
                    }
                    if let Some(block) = form.projects.last_mut() {
                        append_line(&mut block.tasks, line);
                    }
                }
            }
        }

        form.projects.retain(|p| !p.tasks.is_empty());
        form
    }
}

fn append_line(buf: &mut String, line: &str) {
    if !buf.is_empty() {
        buf.push('\n');
    }
    buf.push_str(line);
}
