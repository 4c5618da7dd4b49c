//! Per-tag rule templates.
//!
//! A [`TemplateTable`] maps pattern tags to the category, priority, and
//! phrasing of the rule synthesized for them. The table is passed into
//! synthesis explicitly, so engines with different vocabularies can coexist.

pub const HEALTH_STATUS: &str = "health_status";
pub const UPDATE_TRACKING: &str = "update_tracking";
pub const HISTORICAL_DATA: &str = "historical_data";
pub const STATISTICS_OVERVIEW: &str = "statistics_overview";
pub const PACKAGE_TRACKING: &str = "package_tracking";
pub const HOST_MANAGEMENT: &str = "host_management";
pub const REPORT_GENERATION: &str = "report_generation";

/// Priority given to rules synthesized for tags missing from the table.
pub const UNKNOWN_TAG_PRIORITY: i32 = 30;

/// Blueprint for the rule synthesized from one pattern tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    pub category: String,
    pub priority: i32,
    pub keywords: Vec<String>,
    pub intent_patterns: Vec<String>,
    pub negative_keywords: Vec<String>,
    /// Narrow, well-understood categories earn a confidence bonus.
    pub specific: bool,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl RuleTemplate {
    pub fn new(category: impl Into<String>, priority: i32) -> Self {
        Self {
            category: category.into(),
            priority,
            keywords: Vec::new(),
            intent_patterns: Vec::new(),
            negative_keywords: Vec::new(),
            specific: false,
        }
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = owned(keywords);
        self
    }

    pub fn patterns(mut self, patterns: &[&str]) -> Self {
        self.intent_patterns = owned(patterns);
        self
    }

    pub fn negatives(mut self, negatives: &[&str]) -> Self {
        self.negative_keywords = owned(negatives);
        self
    }

    pub fn specific(mut self) -> Self {
        self.specific = true;
        self
    }

    /// Minimal template for a tag with no table entry: the tag is its own
    /// category and only keyword.
    pub fn for_unknown_tag(tag: &str) -> Self {
        Self {
            category: tag.to_string(),
            priority: UNKNOWN_TAG_PRIORITY,
            keywords: vec![tag.to_string()],
            intent_patterns: vec![format!("* {tag}"), format!("{tag} *")],
            negative_keywords: Vec::new(),
            specific: false,
        }
    }
}

/// Mapping from pattern tag to rule template, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    entries: Vec<(String, RuleTemplate)>,
}

impl TemplateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `template` under each of `tags`, replacing earlier entries.
    pub fn insert(&mut self, tags: &[&str], template: RuleTemplate) {
        for tag in tags {
            let tag = tag.to_lowercase();
            match self.entries.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, existing)) => *existing = template.clone(),
                None => self.entries.push((tag, template.clone())),
            }
        }
    }

    pub fn with(mut self, tags: &[&str], template: RuleTemplate) -> Self {
        self.insert(tags, template);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&RuleTemplate> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, template)| template)
    }

    /// Template for `tag`, or the minimal fallback when the tag is unknown.
    pub fn resolve(&self, tag: &str) -> RuleTemplate {
        self.get(tag)
            .cloned()
            .unwrap_or_else(|| RuleTemplate::for_unknown_tag(tag))
    }

    /// Distinct templates by category, first registration wins.
    pub fn templates(&self) -> Vec<&RuleTemplate> {
        let mut seen: Vec<&RuleTemplate> = Vec::new();
        for (_, template) in &self.entries {
            if !seen.iter().any(|t| t.category == template.category) {
                seen.push(template);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The vocabulary of the FleetPulse fleet update API.
    pub fn fleet_defaults() -> Self {
        Self::new()
            .with(
                &["health", "status", "monitoring"],
                RuleTemplate::new(HEALTH_STATUS, 100)
                    .keywords(&[
                        "health",
                        "status",
                        "up",
                        "running",
                        "operational",
                        "working",
                        "alive",
                    ])
                    .patterns(&[
                        "is * working",
                        "check * status",
                        "* health",
                        "is * up",
                        "system status",
                    ])
                    .negatives(&["update", "upgrade", "package"])
                    .specific(),
            )
            .with(
                &["updates", "update", "last-updates"],
                RuleTemplate::new(UPDATE_TRACKING, 90)
                    .keywords(&[
                        "update",
                        "updates",
                        "updated",
                        "upgrade",
                        "upgraded",
                        "patch",
                        "patched",
                        "recent",
                        "latest",
                        "changes",
                    ])
                    .patterns(&[
                        "what * updated",
                        "when was * updated",
                        "recent *",
                        "latest *",
                        "* updates",
                    ])
                    .specific(),
            )
            .with(
                &["history"],
                RuleTemplate::new(HISTORICAL_DATA, 85)
                    .keywords(&[
                        "history",
                        "historical",
                        "timeline",
                        "past",
                        "previous",
                        "yesterday",
                        "last week",
                        "last month",
                    ])
                    .patterns(&["history of *", "* history", "what happened *"])
                    .negatives(&["statistics", "stats"]),
            )
            .with(
                &["statistics", "stats", "metrics"],
                RuleTemplate::new(STATISTICS_OVERVIEW, 80)
                    .keywords(&[
                        "statistics",
                        "stats",
                        "summary",
                        "overview",
                        "total",
                        "how many",
                        "count",
                        "breakdown",
                        "metrics",
                        "top",
                    ])
                    .patterns(&["show * statistics", "* overview", "how many *", "top * packages"])
                    .specific(),
            )
            .with(
                &["packages", "package"],
                RuleTemplate::new(PACKAGE_TRACKING, 75)
                    .keywords(&["package", "packages", "version", "versions", "installed", "software"])
                    .patterns(&["which * version", "what version *", "* package"]),
            )
            .with(
                &["hosts", "host"],
                RuleTemplate::new(HOST_MANAGEMENT, 70)
                    .keywords(&[
                        "host",
                        "hosts",
                        "server",
                        "servers",
                        "machine",
                        "machines",
                        "node",
                        "nodes",
                        "inventory",
                    ])
                    .patterns(&["list * hosts", "show * hosts", "which hosts *", "all hosts"])
                    .specific(),
            )
            .with(
                &["reports", "report"],
                RuleTemplate::new(REPORT_GENERATION, 60)
                    .keywords(&["report", "reports", "export", "digest"])
                    .patterns(&["generate * report", "* report"]),
            )
    }
}
