use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{self, WORKSPACE_DIR};
use crate::logging;

/// Infer a workspace name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Owner for a new workspace: `--owner`, else `$USER`, else "local".
fn default_owner(explicit: Option<String>) -> String {
    explicit
        .or_else(|| std::env::var("USER").ok())
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| "local".to_string())
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_cli(None);
    let cwd = super::start_dir()?;

    // Nested workspaces are allowed, but worth pointing out
    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(WORKSPACE_DIR).display()
        );
        eprintln!("Creating new workspace in ./{}/", WORKSPACE_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });
    let owner = default_owner(args.owner);

    workspace_io::init_workspace(&cwd, &name, &owner)?;
    println!("Initialized taskdeck workspace: {} (owner: {})", name, owner);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("home-chores"), "Home Chores");
        assert_eq!(infer_name("work_notes"), "Work Notes");
        assert_eq!(infer_name("deck"), "Deck");
        assert_eq!(infer_name("--"), "");
    }

    #[test]
    fn explicit_owner_wins() {
        assert_eq!(default_owner(Some("sam".into())), "sam");
        assert_eq!(default_owner(Some("  ".into())), "local");
    }
}
