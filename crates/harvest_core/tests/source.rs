use harvest_core::{Locator, LocatorError, Source};

#[test]
fn url_source_keeps_configured_text_for_naming() {
    let source = Source::new("https://example.com/a", "models").unwrap();
    assert!(matches!(source.locator(), Locator::Web(url) if url.host_str() == Some("example.com")));
    assert_eq!(source.locator_text(), "https://example.com/a");
    assert_eq!(source.logical_name(), "https___example.com_a");
    assert_eq!(source.category().as_str(), "models");
    assert!(!source.summarize());
}

#[test]
fn subreddit_prefix_is_parsed() {
    let source = Source::new("r/LocalLLaMA", "reddit").unwrap();
    assert_eq!(
        source.locator(),
        &Locator::Subreddit("LocalLLaMA".to_string())
    );
    assert_eq!(source.logical_name(), "r_LocalLLaMA");

    let slashed = Locator::parse("/r/OpenAI/").unwrap();
    assert_eq!(slashed, Locator::Subreddit("OpenAI".to_string()));
}

#[test]
fn invalid_locators_are_rejected() {
    assert_eq!(Locator::parse("  "), Err(LocatorError::Empty));
    assert!(matches!(
        Locator::parse("ftp://example.com/file"),
        Err(LocatorError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
    assert!(matches!(
        Locator::parse("not a url"),
        Err(LocatorError::InvalidUrl(_))
    ));
    assert!(matches!(
        Locator::parse("r/bad name"),
        Err(LocatorError::InvalidSubreddit(_))
    ));
    assert_eq!(
        Source::new("https://example.com", " "),
        Err(LocatorError::EmptyCategory)
    );
}

#[test]
fn summary_flag_is_opt_in() {
    let source = Source::new("https://huggingface.co/models", "models")
        .unwrap()
        .with_summary(true);
    assert!(source.summarize());
    assert_eq!(source.to_string(), "https://huggingface.co/models [models]");
}

#[test]
fn sanitized_names_only_use_safe_characters() {
    let locators = [
        "https://www.investors.com/news/",
        "https://example.com/path?query=a&b=c#frag",
        "https://例え.jp/ページ",
        "r/Machine_Learning",
    ];
    for locator in locators {
        let name = Source::new(locator, "misc").unwrap().logical_name();
        assert!(
            name.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')),
            "unsafe character in {name}"
        );
    }
}
