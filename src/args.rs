use crate::input::RepoTarget;
use clap::Parser;
use github_client::DEFAULT_API_URL;
use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// API access token
    #[clap(short, long, env = "GITHUB_TOKEN")]
    pub token: SecretString,

    /// Enterprise name (required for Advanced Security billing analysis)
    #[clap(short, long, env = "GITHUB_ENTERPRISE")]
    pub enterprise: Option<String>,

    /// CSV file listing repositories, with `owner` and `repo` columns
    #[clap(short, long, parse(from_os_str))]
    pub csv: Option<PathBuf>,

    /// Organization whose active repositories are analyzed. May be repeated.
    #[clap(long = "org")]
    pub orgs: Vec<String>,

    /// Repository given as `owner/repo`. May be repeated.
    #[clap(long = "repo")]
    pub repos: Vec<RepoTarget>,

    /// Report file path
    #[clap(short, long, parse(from_os_str), default_value = "github_analysis_report.md")]
    pub output: PathBuf,

    /// REST API URL
    #[clap(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// GraphQL API URL, `<api-url>/graphql` when omitted
    #[clap(long, env = "GITHUB_GRAPHQL_URL")]
    pub graphql_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parses_repeated_targets() {
        let args = Args::try_parse_from([
            "ghas_coverage",
            "--token",
            "abc",
            "--org",
            "acme",
            "--org",
            "globex",
            "--repo",
            "octo/tools",
        ])
        .unwrap();
        assert_eq!(args.token.expose_secret(), "abc");
        assert_eq!(args.orgs, vec!["acme", "globex"]);
        assert_eq!(args.repos, vec!["octo/tools".parse::<RepoTarget>().unwrap()]);
        assert_eq!(args.output, PathBuf::from("github_analysis_report.md"));
    }

    #[test]
    fn command_line_overrides_environment() {
        let args = Args::try_parse_from([
            "ghas_coverage",
            "--token",
            "abc",
            "--enterprise",
            "acme-corp",
            "--api-url",
            DEFAULT_API_URL,
            "--repo",
            "octo/tools",
        ])
        .unwrap();
        assert_eq!(args.enterprise.as_deref(), Some("acme-corp"));
        assert_eq!(args.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn rejects_malformed_repo() {
        let result = Args::try_parse_from(["ghas_coverage", "--token", "abc", "--repo", "octo"]);
        assert!(result.is_err());
    }
}
