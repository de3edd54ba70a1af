//! Normalization of the command name, language and platform arguments.

use crate::index::{COMMON_PLATFORM, DEFAULT_LANGUAGE};

/// Platforms accepted on the command line and in the config file.
pub const PLATFORMS: &[&str] = &[
    "android",
    COMMON_PLATFORM,
    "linux",
    "osx",
    "macos",
    "sunos",
    "windows",
];

/// Join a multi-word command into a page name: `["GIT", "Log"]` → `git-log`.
pub fn parse_command(words: &[String]) -> String {
    words.join("-").to_lowercase()
}

/// `zh_cn` → `zh_CN`, `DE` → `de`.
pub fn normalize_language(language: &str) -> String {
    match language.split_once('_') {
        Some((lang, country)) => format!("{}_{}", lang.to_lowercase(), country.to_uppercase()),
        None => language.to_lowercase(),
    }
}

/// Build the ordered language preference list.
///
/// An explicit or configured language is the only choice. Otherwise the
/// locale (`LC_ALL`, then `LANG`) decides: without one only `en` is used,
/// with one the `LANGUAGE` priority list comes first, then the locale
/// language, then `en`.
pub fn parse_language(
    explicit: Option<&str>,
    configured: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Vec<String> {
    let chosen = explicit.filter(|l| !l.is_empty()).unwrap_or(configured);
    if !chosen.is_empty() {
        return vec![normalize_language(chosen)];
    }

    let locale = ["LC_ALL", "LANG"]
        .into_iter()
        .filter_map(&env)
        .find(|value| !value.is_empty())
        .unwrap_or_default();
    // zh_CN.UTF-8 → zh
    let lang = locale
        .split(['_', '.'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if lang.is_empty() || lang == "c" || lang == "posix" {
        return vec![DEFAULT_LANGUAGE.to_string()];
    }

    let mut languages: Vec<String> = Vec::new();
    let priority = env("LANGUAGE").unwrap_or_default();
    let candidates = priority
        .split(':')
        .filter(|item| !item.is_empty())
        .map(normalize_language)
        .chain([lang, DEFAULT_LANGUAGE.to_string()]);
    for language in candidates {
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    languages
}

/// Resolve the platform: explicit, then configured, then the host OS.
///
/// Unknown values are ignored; `macos` is an alias of `osx`.
pub fn parse_platform(explicit: Option<&str>, configured: &str) -> String {
    let known = |p: &&str| PLATFORMS.contains(&p.to_lowercase().as_str());
    let platform = explicit
        .filter(known)
        .or(Some(configured).filter(known))
        .map(str::to_lowercase)
        .unwrap_or_else(|| guess_os().to_string());

    if platform == "macos" {
        "osx".to_string()
    } else {
        platform
    }
}

/// Platform name of the host operating system.
pub fn guess_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "osx",
        "windows" => "windows",
        "android" => "android",
        "solaris" | "illumos" => "sunos",
        _ => "linux",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn command_names() {
        let cases = [
            (&["git"][..], "git"),
            (&["git", "log"][..], "git-log"),
            (&["git-log"][..], "git-log"),
            (&["apt-get"][..], "apt-get"),
            (&["Git"][..], "git"),
            (&["GIT", "Log"][..], "git-log"),
            (&["gIt-loG"][..], "git-log"),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_command(&words(input)), expected, "input: {input:?}");
        }
    }

    #[test]
    fn explicit_language_has_no_fallback() {
        let env = env_of(&[("LANG", "it_IT.UTF-8"), ("LANGUAGE", "it:de")]);
        assert_eq!(parse_language(Some("zh"), "", &env), vec!["zh"]);
        assert_eq!(parse_language(Some("ZH"), "de", &env), vec!["zh"]);
        assert_eq!(parse_language(Some("pt_br"), "", &env), vec!["pt_BR"]);
    }

    #[test]
    fn configured_language_has_no_fallback() {
        let env = env_of(&[("LANG", "it")]);
        assert_eq!(parse_language(None, "zh", &env), vec!["zh"]);
        assert_eq!(parse_language(Some(""), "ZH", &env), vec!["zh"]);
    }

    #[test]
    fn languages_from_environment() {
        let cases = [
            (("cz", "it:cz:de"), vec!["it", "cz", "de", "en"]),
            (("cz", "it:de:fr"), vec!["it", "de", "fr", "cz", "en"]),
            (("it", ""), vec!["it", "en"]),
            (("", "it:cz"), vec!["en"]),
            (("", ""), vec!["en"]),
            (("Cz", "IT:cz:DE"), vec!["it", "cz", "de", "en"]),
        ];
        for ((lang, language), expected) in cases {
            let env = env_of(&[("LC_ALL", lang), ("LANG", lang), ("LANGUAGE", language)]);
            assert_eq!(parse_language(None, "", &env), expected, "LANG={lang} LANGUAGE={language}");
        }
    }

    #[test]
    fn lc_all_takes_precedence_over_lang() {
        let env = env_of(&[("LC_ALL", "zh_CN.GB2312"), ("LANG", "en_US.UTF-8")]);
        assert_eq!(parse_language(None, "", &env), vec!["zh", "en"]);

        let env = env_of(&[("LANG", "en_US.UTF-8")]);
        assert_eq!(parse_language(None, "", &env), vec!["en"]);
    }

    #[test]
    fn c_locale_means_default_language() {
        let env = env_of(&[("LANG", "C.UTF-8"), ("LANGUAGE", "de")]);
        assert_eq!(parse_language(None, "", &env), vec!["en"]);
    }

    #[test]
    fn platform_aliases() {
        assert_eq!(parse_platform(Some("OSX"), ""), "osx");
        assert_eq!(parse_platform(Some("macos"), ""), "osx");
        assert_eq!(parse_platform(Some("macOS"), ""), "osx");
        assert_eq!(parse_platform(Some("common"), "linux"), "common");
    }

    #[test]
    fn platform_falls_back_to_config_then_host() {
        assert_eq!(parse_platform(None, "windows"), "windows");
        assert_eq!(parse_platform(Some("beos"), "sunos"), "sunos");
        assert_eq!(parse_platform(None, "beos"), guess_os());
        assert_eq!(parse_platform(None, ""), guess_os());
    }
}
