use crate::Analysis;
use committer_coverage::Identity;
use std::fmt::{Result, Write};

/// Renders the analysis as the Markdown report.
pub fn markdown(analysis: &Analysis) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();
    render(&mut out, analysis)?;
    Ok(out)
}

fn render(out: &mut impl Write, analysis: &Analysis) -> Result {
    writeln!(out, "# GitHub Analysis Report\n")?;

    if let Some(entitlements) = &analysis.entitlements {
        let counters = &entitlements.counters;
        writeln!(out, "## GHAS Usage")?;
        writeln!(
            out,
            "Total Advanced Security Committers: {}\n",
            counters.total_advanced_security_committers
        )?;
        writeln!(
            out,
            "Total purchased Advanced Security Committers available: {}\n",
            counters.purchased_seats
        )?;
        writeln!(
            out,
            "Total remaining Advanced Security Committers: {}\n",
            counters.remaining_seats()
        )?;
    }

    if let Some(coverage) = &analysis.coverage {
        writeln!(out, "## Committer Coverage Analysis")?;
        writeln!(out, "Total committers in specified repositories: {}\n", coverage.total_committers)?;
        writeln!(out, "Total GitHub Advanced Security active committers: {}\n", coverage.total_entitled)?;
        writeln!(
            out,
            "New committers without a GitHub Advanced Security license: {}\n",
            coverage.uncovered.len()
        )?;
        if !coverage.uncovered.is_empty() {
            writeln!(out, "### Committers Not Covered by GHAS")?;
            list(out, &coverage.uncovered)?;
            writeln!(out)?;
        }
        writeln!(out, "<details>")?;
        writeln!(out, "<summary>Existing Committers with GHAS License</summary>\n")?;
        list(out, &coverage.entitled)?;
        writeln!(out, "</details>\n")?;
    }

    writeln!(out, "<details>")?;
    writeln!(out, "<summary>Repository Committer Analysis</summary>\n")?;
    for (repo, committers) in &analysis.repositories {
        writeln!(out, "<details>")?;
        writeln!(out, "<summary> {} (Active committers: {})</summary>\n", repo, committers.len())?;
        for (_, identity) in committers.iter() {
            writeln!(out, "- {}", label(identity))?;
        }
        writeln!(out, "</details>\n")?;
    }
    writeln!(out, "</details>\n")
}

fn list(out: &mut impl Write, identities: &[Identity]) -> Result {
    for identity in identities {
        writeln!(out, "- {}", label(identity))?;
    }
    Ok(())
}

/// The resolved key, followed by the email when the key is a login.
fn label(identity: &Identity) -> String {
    let key = identity.key();
    match (identity.email(), key.is_login()) {
        (Some(email), true) => format!("{} ({})", key, email),
        _ => key.to_string(),
    }
}
