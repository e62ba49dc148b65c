use crate::app::models::Scope;
use crate::app::tally::Tally;
use crate::app::traverse::LeafFailure;

pub struct OutputGenerator;

impl OutputGenerator {
    /// The one message printed per invocation.
    pub fn format_report(
        tally: &Tally,
        scope: Scope,
        failures: &[LeafFailure],
        dry_run: bool,
    ) -> String {
        let mut out = tally.to_string();

        let container_label = match scope {
            Scope::Folder => Some(("folder", "folders")),
            Scope::Project | Scope::Solution => Some(("project", "projects")),
            Scope::Selection | Scope::File => None,
        };
        if let Some((singular, plural)) = container_label {
            if tally.containers > 0 {
                let label = if tally.containers == 1 { singular } else { plural };
                out.push_str(&format!(" ({} {} affected)", tally.containers, label));
            }
        }

        if dry_run && !tally.is_zero() {
            out.push_str("\nDry run: nothing was saved.");
        }

        if !failures.is_empty() {
            out.push_str(&format!("\nFailed to process {}:", failures.len()));
            for failure in failures {
                out.push_str(&format!("\n    {}: {}", failure.name, failure.error));
            }
        }

        out
    }
}
