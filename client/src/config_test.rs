use super::*;

#[test]
fn empty_query_uses_defaults() {
    assert_eq!(ClientConfig::from_query(""), ClientConfig::default());
    assert_eq!(ClientConfig::from_query("?"), ClientConfig::default());
}

#[test]
fn debug_flag_accepts_both_keys() {
    for query in ["?debug=1", "?debug=true", "?log=1", "?x=2&log=true"] {
        let config = ClientConfig::from_query(query);
        assert!(config.debug, "{query}");
        assert_eq!(config.log_level(), log::Level::Debug);
    }
    assert!(!ClientConfig::from_query("?debug=0").debug);
    assert_eq!(ClientConfig::default().log_level(), log::Level::Info);
}

#[test]
fn cores_are_at_least_one() {
    assert_eq!(ClientConfig::from_query("?cores=6").cores, 6);
    assert_eq!(ClientConfig::from_query("?cores=0").cores, 1);
    assert_eq!(ClientConfig::from_query("?cores=lots").cores, 1);
}

#[test]
fn speed_step_clamps_to_ladder() {
    assert_eq!(ClientConfig::from_query("?speed=3").speed_step, 3);
    assert_eq!(
        ClientConfig::from_query("?speed=99").speed_step,
        SPEED_STEPS_MICROS.len() - 1
    );
}
