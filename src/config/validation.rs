use regex::Regex;
use std::sync::OnceLock;

fn env_reference() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"))
}

/// Expand `${VAR_NAME}` references using `lookup`. Unknown variables are
/// left in place.
pub fn expand_env_var_in_string(value: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    env_reference()
        .replace_all(value, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Parse a boolean flag the way every `MICHI_*` switch is parsed.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}
