use tracing::debug;

/// Launcher flag asking the runtime not to fork; the launcher decides that.
pub const NO_FORK_FLAG: &str = "--no-fork";

/// Identity used when no argument names an application descriptor.
pub const UNKNOWN_APP: &str = "unknown-app";

const DESCRIPTOR_SUFFIX: &str = ".jnlp";

/// Drops every no-fork flag, keeping the other arguments in order.
pub fn filter_args<S: AsRef<str>>(raw_args: &[S]) -> Vec<String> {
    let relevant: Vec<String> = raw_args
        .iter()
        .map(|arg| arg.as_ref())
        .filter(|arg| *arg != NO_FORK_FLAG)
        .map(str::to_string)
        .collect();

    debug!("Relevant launcher args: {:?}", relevant);
    relevant
}

/// Application name taken from the first argument ending in `.jnlp`
/// (case-insensitive): the last `/` segment with the suffix removed.
pub fn extract_app_identity<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref())
        .find(|arg| has_descriptor_suffix(arg))
        .and_then(|arg| {
            let stem = &arg[..arg.len() - DESCRIPTOR_SUFFIX.len()];
            stem.rsplit('/').next().filter(|name| !name.is_empty())
        })
        .unwrap_or(UNKNOWN_APP)
        .to_string()
}

fn has_descriptor_suffix(arg: &str) -> bool {
    arg.len() >= DESCRIPTOR_SUFFIX.len()
        && arg.is_char_boundary(arg.len() - DESCRIPTOR_SUFFIX.len())
        && arg[arg.len() - DESCRIPTOR_SUFFIX.len()..].eq_ignore_ascii_case(DESCRIPTOR_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_removes_every_no_fork_flag() {
        assert_eq!(filter_args(&["a", "--no-fork", "b", NO_FORK_FLAG]), vec!["a", "b"]);
    }

    #[test]
    fn test_filter_without_flag_is_identity() {
        assert_eq!(filter_args(&["-verbose", "App.jnlp"]), vec!["-verbose", "App.jnlp"]);
        assert!(filter_args::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_identity_from_url() {
        assert_eq!(extract_app_identity(&["x", "http://host/path/App.jnlp"]), "App");
    }

    #[test]
    fn test_identity_is_case_insensitive() {
        assert_eq!(extract_app_identity(&["x", "App.JNLP"]), "App");
    }

    #[test]
    fn test_identity_defaults_to_unknown() {
        assert_eq!(extract_app_identity(&["noMatch"]), UNKNOWN_APP);
        assert_eq!(extract_app_identity::<&str>(&[]), UNKNOWN_APP);
    }

    #[test]
    fn test_identity_with_empty_last_segment() {
        assert_eq!(extract_app_identity(&["http://host/path/.jnlp"]), UNKNOWN_APP);
        assert_eq!(extract_app_identity(&[".jnlp", "Other.jnlp"]), UNKNOWN_APP);
    }

    #[test]
    fn test_identity_uses_first_match_only() {
        assert_eq!(extract_app_identity(&["First.jnlp", "http://h/Second.jnlp"]), "First");
    }

    #[test]
    fn test_identity_handles_multibyte_args() {
        assert_eq!(extract_app_identity(&["äöü", "/tmp/Bücher.jnlp"]), "Bücher");
    }
}
