//! Hook matching
//!
//! Selects the configured hooks that apply to an action.

use actionhooks_core::ActionHook;

/// Select the hooks that apply to the action `key` triggered from `context`
///
/// Rules, applied in configuration order:
/// - keys are compared trimmed and case-insensitively; a blank key never matches
/// - a non-blank hook context must equal `context` case-insensitively; a blank
///   hook context matches every context
/// - hooks with neither a before nor an after command are skipped
#[must_use]
pub fn match_hooks(hooks: &[ActionHook], context: &str, key: &str) -> Vec<ActionHook> {
    let key = normalize(key);
    if key.is_empty() {
        return Vec::new();
    }
    let context = context.to_lowercase();

    hooks
        .iter()
        .filter(|hook| {
            let hook_key = normalize(&hook.key);
            if hook_key.is_empty() || hook_key != key {
                return false;
            }

            let hook_context = normalize(&hook.context);
            if !hook_context.is_empty() && hook_context != context {
                return false;
            }

            !hook.is_inert()
        })
        .cloned()
        .collect()
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn hook(context: &str, key: &str, before: &str, after: &str) -> ActionHook {
        ActionHook {
            context: context.to_string(),
            key: key.to_string(),
            before: before.to_string(),
            after: after.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_must_match_case_insensitively() {
        let hooks = vec![
            hook("files", " C ", "echo a", ""),
            hook("files", "p", "echo b", ""),
            hook("files", "", "echo c", ""),
        ];

        let matched = match_hooks(&hooks, "files", "c");
        assert_eq!(matched, vec![hooks[0].clone()]);
    }

    #[test]
    fn test_blank_query_key_matches_nothing() {
        let hooks = vec![hook("", "", "echo a", "")];
        assert!(match_hooks(&hooks, "files", "  ").is_empty());
    }

    #[test]
    fn test_context_filter_and_wildcard() {
        let hooks = vec![
            hook("Files", "c", "echo files", ""),
            hook("branches", "c", "echo branches", ""),
            hook("  ", "c", "echo any", ""),
        ];

        let matched = match_hooks(&hooks, "files", "c");
        let befores: Vec<_> = matched.iter().map(|h| h.before.as_str()).collect();
        assert_eq!(befores, vec!["echo files", "echo any"]);

        let matched = match_hooks(&hooks, "commits", "c");
        let befores: Vec<_> = matched.iter().map(|h| h.before.as_str()).collect();
        assert_eq!(befores, vec!["echo any"]);
    }

    #[test]
    fn test_inert_hooks_never_match() {
        let hooks = vec![hook("files", "c", "  ", "\t"), hook("files", "c", "", "echo after")];
        let matched = match_hooks(&hooks, "files", "c");
        assert_eq!(matched, vec![hooks[1].clone()]);
    }

    #[test]
    fn test_configuration_order_preserved() {
        let hooks = vec![
            hook("", "c", "echo 1", ""),
            hook("files", "c", "echo 2", ""),
            hook("", "C", "echo 3", ""),
        ];

        let matched = match_hooks(&hooks, "FILES", "c");
        let befores: Vec<_> = matched.iter().map(|h| h.before.as_str()).collect();
        assert_eq!(befores, vec!["echo 1", "echo 2", "echo 3"]);
    }
}
