use super::*;

#[test]
fn empty_ruleset_allows_everything() {
    let rules = RobotsRules::parse("");
    assert!(rules.is_empty());
    assert!(rules.is_allowed("AnyBot", "/anything"));
}

#[test]
fn basic_allow_disallow() {
    let txt = "User-agent: *\nDisallow: /private\n";
    let rules = RobotsRules::parse(txt);
    assert!(!rules.is_allowed("AnyBot", "/private/x"));
    assert!(rules.is_allowed("AnyBot", "/public"));
}

#[test]
fn agent_selection_prefers_exact_over_wildcard() {
    let txt = "User-agent: FerrisCrawler\nAllow: /ocean\nDisallow: /\nUser-agent: *\nDisallow: /\n";
    let rules = RobotsRules::parse(txt);
    assert!(rules.is_allowed("FerrisCrawler/1.0", "/ocean"));
    assert!(!rules.is_allowed("FerrisCrawler/1.0", "/forest"));
    assert!(!rules.is_allowed("SomeOtherBot", "/ocean"));
}

#[test]
fn allow_wins_ties_over_disallow_at_equal_specificity() {
    let txt = "User-agent: *\nAllow: /page\nDisallow: /page\n";
    let rules = RobotsRules::parse(txt);
    assert!(rules.is_allowed("AnyBot", "/page"));
}

#[test]
fn longest_match_wins() {
    let txt = "User-agent: *\nAllow: /page/sub\nDisallow: /page\n";
    let rules = RobotsRules::parse(txt);
    assert!(rules.is_allowed("AnyBot", "/page/sub"));
    assert!(!rules.is_allowed("AnyBot", "/page/other"));
}

#[test]
fn wildcard_and_end_anchor() {
    let txt = "User-agent: *\nDisallow: /*.py$\n";
    let rules = RobotsRules::parse(txt);
    assert!(!rules.is_allowed("AnyBot", "/forest/script.py"));
    assert!(rules.is_allowed("AnyBot", "/forest/script.py.bak"));
}

#[test]
fn crawl_delay_parsed_fractional() {
    let txt = "User-agent: *\nCrawl-delay: 1.5\n";
    let rules = RobotsRules::parse(txt);
    assert_eq!(
        rules.crawl_delay_for("AnyBot"),
        Some(Duration::from_secs_f64(1.5))
    );
}

#[test]
fn comments_and_blanks_are_skipped() {
    let txt = "# comment\n\nUser-agent: *\n# another\nDisallow: /x\n";
    let rules = RobotsRules::parse(txt);
    assert!(!rules.is_allowed("AnyBot", "/x"));
}

#[test]
fn unknown_directives_ignored() {
    let txt = "User-agent: *\nSitemap: https://example.com/sitemap.xml\nDisallow: /x\n";
    let rules = RobotsRules::parse(txt);
    assert!(!rules.is_allowed("AnyBot", "/x"));
}

#[test]
fn new_user_agent_after_rule_line_starts_new_group() {
    let txt = "User-agent: A\nUser-agent: B\nDisallow: /a\nUser-agent: C\nDisallow: /c\n";
    let rules = RobotsRules::parse(txt);
    // A and B share a group disallowing /a; C has its own group disallowing /c.
    assert!(!rules.is_allowed("A", "/a"));
    assert!(!rules.is_allowed("B", "/a"));
    assert!(rules.is_allowed("A", "/c"));
    assert!(!rules.is_allowed("C", "/c"));
}

#[test]
fn disallow_all_identity() {
    let rules = disallow_all();
    assert!(!rules.is_allowed("AnyBot", "/anything"));
}

#[test]
fn missing_group_match_defaults_allow() {
    let txt = "User-agent: OnlyThisBot\nDisallow: /\n";
    let rules = RobotsRules::parse(txt);
    assert!(rules.is_allowed("SomeOtherBot", "/anything"));
}
