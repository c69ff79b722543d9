use anyhow::Context;
use committer_coverage::api::{Error, Result};
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

const REQUIRED_COLUMNS: [&str; 2] = ["owner", "repo"];

/// Repository explicitly requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoTarget {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => Ok(RepoTarget {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(format!("{} is not in owner/repo form.", value)),
        }
    }
}

impl Display for RepoTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Reads repositories from a CSV file with at least `owner` and `repo` columns.
pub fn read_repositories(path: &Path) -> Result<Vec<RepoTarget>> {
    if !path.exists() {
        return Err(Error::Configuration(format!("CSV file not found: {}", path.display())));
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?;
    if !REQUIRED_COLUMNS.iter().all(|column| headers.iter().any(|header| header == *column)) {
        return Err(Error::Configuration("CSV must contain 'owner' and 'repo' columns".to_string()));
    }

    let mut targets = Vec::new();
    for (row, record) in reader.deserialize::<RepoTarget>().enumerate() {
        let target = record.with_context(|| format!("Failed to read row {} of {}", row + 1, path.display()))?;
        if target.owner.is_empty() || target.repo.is_empty() {
            return Err(Error::Configuration(format!(
                "Row {} of {} has an empty owner or repo",
                row + 1,
                path.display()
            )));
        }
        targets.push(target);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_owner_and_repo_columns() {
        let file = csv_file("team,owner,repo\nweb, acme ,widgets\nops,octo,tools\n");
        let targets = read_repositories(file.path()).unwrap();
        assert_eq!(
            targets,
            vec!["acme/widgets".parse().unwrap(), "octo/tools".parse::<RepoTarget>().unwrap()]
        );
    }

    #[test]
    fn missing_columns_are_rejected() {
        let file = csv_file("owner,name\nacme,widgets\n");
        assert!(matches!(read_repositories(file.path()), Err(Error::Configuration(_))));
    }

    #[test]
    fn empty_cells_are_rejected() {
        let file = csv_file("owner,repo\nacme,\n");
        assert!(matches!(read_repositories(file.path()), Err(Error::Configuration(_))));
    }

    #[test]
    fn missing_file_is_rejected() {
        let result = read_repositories(Path::new("/nonexistent/repositories.csv"));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn parses_owner_repo_pairs() {
        let target: RepoTarget = "acme/widgets".parse().unwrap();
        assert_eq!(target.to_string(), "acme/widgets");
        assert!("acme".parse::<RepoTarget>().is_err());
        assert!("/widgets".parse::<RepoTarget>().is_err());
        assert!("acme/widgets/extra".parse::<RepoTarget>().is_err());
    }
}
