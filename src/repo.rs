use std::io;
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Asks the `gh` CLI which repository the working directory belongs to.
pub fn resolve() -> Result<String> {
    let output = Command::new("gh").args(["repo", "view"]).output().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            Error::EnvironmentResolution("could not find gh, is it installed?".into())
        } else {
            Error::EnvironmentResolution(format!("failed to run gh: {err}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::EnvironmentResolution(format!(
            "gh repo view failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let repo = parse_repo_view(&stdout)
        .ok_or_else(|| Error::EnvironmentResolution("unexpected gh repo view output".into()))?;
    debug!(repo = %repo, "resolved repository");
    Ok(repo)
}

// First line looks like `name:\towner/repo`
fn parse_repo_view(output: &str) -> Option<String> {
    let first = output.lines().next()?;
    let (_, name) = first.split_once(':')?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_name_from_first_line() {
        let out = "name:\tcli/cli\ndescription:\tGitHub's official command line tool\n";
        assert_eq!(parse_repo_view(out).as_deref(), Some("cli/cli"));
    }

    #[test]
    fn rejects_unexpected_output() {
        assert_eq!(parse_repo_view(""), None);
        assert_eq!(parse_repo_view("no colon here\n"), None);
        assert_eq!(parse_repo_view("name:   \n"), None);
    }
}
