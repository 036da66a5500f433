//! Rule description lookup and Markdown → HTML rendering.

use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{html, Parser};
use tracing::warn;

use erroraway_rules::repository::{AUTODISPOSE2_REPOSITORY, NULLAWAY_REPOSITORY};
use erroraway_rules::CheckerInfo;

use crate::{MetadataError, Result};

/// Topic sub-directories searched for a bundled description, in order. The
/// root is searched first. Rule names are not guaranteed unique across
/// sub-directories, so the order is a policy, not an accident.
const DESCRIPTION_FOLDERS: [Option<&str>; 8] = [
    None,
    Some("android"),
    Some("argumentselectiondefects"),
    Some("flogger"),
    Some("inject"),
    Some("javadoc"),
    Some("nullness"),
    Some("time"),
];

/// Looks up bundled Markdown descriptions by rule name and renders them (or a
/// fallback built from the checker's own message) to HTML.
pub struct DescriptionStore {
    root: PathBuf,
}

impl DescriptionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The bundled description file for `rule_key`, if one exists.
    pub fn find(&self, rule_key: &str) -> Option<PathBuf> {
        DESCRIPTION_FOLDERS.iter().find_map(|folder| {
            let path = match folder {
                None => self.root.join(format!("{rule_key}.md")),
                Some(folder) => self.root.join(folder).join(format!("{rule_key}.md")),
            };
            path.is_file().then_some(path)
        })
    }

    /// Renders the HTML description for `checker`.
    ///
    /// Prefers the bundled Markdown description; falls back to the checker's
    /// own message plus a documentation link. Read failures are logged with
    /// rule context and then propagated: a broken description must fail the
    /// build, not silently ship.
    pub fn render(&self, repository: &str, checker: &CheckerInfo) -> Result<String> {
        let rule = &checker.canonical_name;
        match self.find(rule) {
            Some(path) => {
                let markdown = fs::read_to_string(&path).map_err(|source| {
                    warn!("error reading description for {rule} from {}", path.display());
                    MetadataError::Description {
                        rule: rule.clone(),
                        source,
                    }
                })?;
                Ok(render_markdown(&markdown))
            }
            None => {
                let mut html = render_markdown(&checker.message);
                let link = checker_link(repository, checker);
                html.push_str(&format!(
                    "\n<b>See: </b><a href=\"{link}\" target=\"_blank\">{link}</a>"
                ));
                Ok(html)
            }
        }
    }
}

pub(crate) fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Some plugins do not declare a documentation link on their checkers.
fn checker_link(repository: &str, checker: &CheckerInfo) -> String {
    match repository {
        NULLAWAY_REPOSITORY => "https://github.com/uber/NullAway/wiki/Error-Messages".to_string(),
        AUTODISPOSE2_REPOSITORY => {
            "https://github.com/uber/AutoDispose/wiki/Error-Prone-Checker".to_string()
        }
        _ => checker.link_url.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erroraway_rules::repository::ERRORPRONE_REPOSITORY;
    use erroraway_rules::CheckerSeverity;

    fn checker(name: &str, message: &str, link: Option<&str>) -> CheckerInfo {
        CheckerInfo {
            class_name: format!("com.google.errorprone.bugpatterns.{name}"),
            canonical_name: name.to_string(),
            severity: CheckerSeverity::Warning,
            tags: Vec::new(),
            message: message.to_string(),
            link_url: link.map(str::to_string),
        }
    }

    fn store() -> DescriptionStore {
        DescriptionStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/bugpattern"))
    }

    #[test]
    fn finds_description_in_root_before_sub_directories() {
        let path = store().find("BadImport").unwrap();
        assert!(path.ends_with("bugpattern/BadImport.md"));
    }

    #[test]
    fn finds_description_in_topic_sub_directory() {
        let path = store().find("DurationTemporalUnit").unwrap();
        assert!(path.ends_with("time/DurationTemporalUnit.md"));
    }

    #[test]
    fn renders_bundled_markdown_to_html() {
        let html = store()
            .render(ERRORPRONE_REPOSITORY, &checker("BadImport", "unused", None))
            .unwrap();
        assert!(html.contains("<h1>"), "{html}");
        assert!(!html.contains("See: "), "bundled description should not get a link: {html}");
    }

    #[test]
    fn falls_back_to_checker_message_with_link() {
        let html = store()
            .render(
                ERRORPRONE_REPOSITORY,
                &checker(
                    "NoSuchRule",
                    "Some *important* message",
                    Some("https://errorprone.info/bugpattern/NoSuchRule"),
                ),
            )
            .unwrap();
        assert!(html.contains("<em>important</em>"), "{html}");
        assert!(html.contains(
            "<b>See: </b><a href=\"https://errorprone.info/bugpattern/NoSuchRule\" target=\"_blank\">"
        ));
    }

    #[test]
    fn nullaway_link_is_overridden() {
        let nullaway = CheckerInfo {
            class_name: "com.uber.nullaway.NullAway".to_string(),
            canonical_name: "NullAway".to_string(),
            severity: CheckerSeverity::Warning,
            tags: Vec::new(),
            message: "Nullability type checking for Java".to_string(),
            link_url: None,
        };
        let html = store().render("nullaway", &nullaway).unwrap();
        assert!(html.contains("https://github.com/uber/NullAway/wiki/Error-Messages"));
    }

    #[test]
    fn autodispose_link_is_overridden() {
        let autodispose = CheckerInfo {
            class_name: "autodispose2.UseAutoDispose".to_string(),
            canonical_name: "UseAutoDispose".to_string(),
            severity: CheckerSeverity::Error,
            tags: Vec::new(),
            message: "Apply an AutoDispose scope".to_string(),
            link_url: None,
        };
        let html = store().render("autodispose2", &autodispose).unwrap();
        assert!(html.contains("https://github.com/uber/AutoDispose/wiki/Error-Prone-Checker"));
    }
}
