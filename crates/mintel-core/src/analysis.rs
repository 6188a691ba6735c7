//! Tolerant reader for the model's markdown reply.
//!
//! Keyed on the literal `## ` headers the analysis prompt asks for. Nothing here fails: a
//! reply that ignores the template just yields empty sections and no pillar.

use crate::profile::PillarTaxonomy;

pub const PILLAR_HEADER: &str = "## Pillar Assignment";
const RATIONALE_PREFIX: &str = "rationale:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSection {
    /// Header text without the leading `## `.
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingAnalysis {
    pub sections: Vec<AnalysisSection>,
    /// Chosen pillar with bracket/quote decoration removed.
    pub pillar: Option<String>,
    pub rationale: Option<String>,
}

impl MeetingAnalysis {
    pub fn parse(reply: &str) -> Self {
        let sections = split_sections(reply);
        let pillar_section = sections
            .iter()
            .find(|s| is_pillar_heading(&s.heading));

        let pillar = pillar_section.and_then(|s| {
            s.body
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .filter(|l| !l.starts_with('#') && strip_prefix_ci(l, RATIONALE_PREFIX).is_none())
                .map(strip_decoration)
                .filter(|p| !p.is_empty())
        });
        let rationale = pillar_section.and_then(|s| {
            s.body
                .lines()
                .map(str::trim)
                .find_map(|l| strip_prefix_ci(l, RATIONALE_PREFIX))
                .map(|r| r.trim().to_string())
        });

        Self {
            sections,
            pillar,
            rationale,
        }
    }

    pub fn section(&self, heading: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.heading.eq_ignore_ascii_case(heading))
            .map(|s| s.body.as_str())
    }

    /// The model's pillar, else the first configured one.
    pub fn resolve_pillar(&self, pillars: &PillarTaxonomy) -> String {
        self.pillar.clone().unwrap_or_else(|| pillars.primary())
    }
}

fn is_pillar_heading(heading: &str) -> bool {
    PILLAR_HEADER
        .trim_start_matches("## ")
        .eq_ignore_ascii_case(heading.trim())
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .and_then(|_| line.get(prefix.len()..))
}

fn strip_decoration(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
        .collect::<String>()
        .trim()
        .to_string()
}

fn split_sections(reply: &str) -> Vec<AnalysisSection> {
    let mut sections: Vec<AnalysisSection> = Vec::new();
    for line in reply.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            sections.push(AnalysisSection {
                heading: heading.trim().to_string(),
                body: String::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.body.push_str(line);
            current.body.push('\n');
        }
    }
    for s in &mut sections {
        s.body = s.body.trim().to_string();
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "## Summary\n\nRenewal is on track.\n\n## Key Discussion Points\n\n### Pricing\nDiscount agreed.\n\n## Pillar Assignment\n\n[\"Deal Support\"]\n\nRationale: It is about the renewal.\n";

    #[test]
    fn extracts_sections_pillar_and_rationale() {
        let analysis = MeetingAnalysis::parse(REPLY);
        assert_eq!(analysis.section("summary"), Some("Renewal is on track."));
        assert!(analysis
            .section("Key Discussion Points")
            .unwrap()
            .contains("### Pricing"));
        assert_eq!(analysis.pillar.as_deref(), Some("Deal Support"));
        assert_eq!(analysis.rationale.as_deref(), Some("It is about the renewal."));
    }

    #[test]
    fn non_compliant_reply_falls_back_to_first_pillar() {
        let pillars = PillarTaxonomy::from_names(["Deals", "Product"]);
        let analysis = MeetingAnalysis::parse("Sorry, here is a free-form summary.");
        assert!(analysis.sections.is_empty());
        assert_eq!(analysis.resolve_pillar(&pillars), "Deals");

        let analysis = MeetingAnalysis::parse("## Pillar Assignment\n\nRationale: unsure\n");
        assert_eq!(analysis.pillar, None);
        assert_eq!(analysis.resolve_pillar(&pillars), "Deals");
    }

    #[test]
    fn pillar_header_is_case_insensitive() {
        let analysis = MeetingAnalysis::parse("## pillar assignment\n'Product'\n");
        assert_eq!(analysis.pillar.as_deref(), Some("Product"));
    }
}
