use super::*;

#[test]
fn defaults_to_keyword_run_over_recent_posts() {
    let cli = Cli::try_parse_from(["instamon", "--token", "t", "--account", "1", "--keywords", "cea"])
        .expect("expected valid cli args");

    assert_eq!(cli.analysis, Analysis::Keywords);
    assert_eq!(cli.count_policy, Policy::Occurrences);
    assert!(!cli.replies && !cli.no_like_sums && !cli.insights);

    let req = cli.into_request(None);
    assert_eq!(req.selection_mode, SelectionMode::ByCount);
    assert_eq!(req.post_count, 10);
    assert!(req.accumulate_likes);
}

#[test]
fn months_switch_selection_to_month_list() {
    let cli = Cli::try_parse_from([
        "instamon",
        "--months",
        "03/2024,04/2024",
        "--analysis",
        "monthly",
        "--insights",
    ])
    .unwrap();

    let req = cli.into_request(Some("env-token".into()));
    assert_eq!(req.selection_mode, SelectionMode::ByMonthList);
    assert_eq!(req.months, vec!["03/2024", "04/2024"]);
    assert_eq!(req.analysis, AnalysisKind::MonthlyIndicators);
    assert!(req.fetch_insights);
    assert_eq!(req.access_token, "env-token");
}

#[test]
fn count_and_months_conflict() {
    let result = Cli::try_parse_from(["instamon", "--count", "5", "--months", "03/2024"]);
    assert!(result.is_err());
}

#[test]
fn flag_token_wins_over_fallback() {
    let cli = Cli::try_parse_from(["instamon", "--token", "flag"]).unwrap();
    assert_eq!(cli.into_request(Some("env".into())).access_token, "flag");
}

#[test]
fn per_comment_policy_and_like_sums_off() {
    let cli = Cli::try_parse_from([
        "instamon",
        "--count-policy",
        "per-comment",
        "--no-like-sums",
        "--replies",
    ])
    .unwrap();

    let req = cli.into_request(None);
    assert_eq!(req.count_policy, CountPolicy::PerComment);
    assert!(!req.accumulate_likes);
    assert!(req.include_replies);
}

#[test]
fn missing_account_fails_validation() {
    let cli = Cli::try_parse_from(["instamon", "--token", "t", "--keywords", "cea"]).unwrap();
    let err = cli.into_request(None).validate().unwrap_err();
    assert_eq!(err, instamon_core::ValidationError::MissingAccountId);
}

#[test]
fn rejects_unknown_analysis() {
    assert!(Cli::try_parse_from(["instamon", "--analysis", "weekly"]).is_err());
}
