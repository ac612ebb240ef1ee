// Environment variables are process wide, so these overrides live in their own test binary.
use std::io::Write;

use surveygraph::settings::{Settings, Visualization};

#[test]
fn environment_overrides_lists_and_nested_colors() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"visualization = \"table\"\ninfer_types = true\n").unwrap();

    // SAFETY: this is the only test in this binary, no other thread reads the environment
    unsafe {
        std::env::set_var("SURVEYGRAPH_CATEGORY_ORDER", "low,mid,high");
        std::env::set_var("SURVEYGRAPH_CATEGORY_COLORS__STARTUP", "red");
        std::env::set_var("SURVEYGRAPH_VISUALIZATION", "maturity_map");
        std::env::set_var("SURVEYGRAPH_INFER_TYPES", "false");
    }
    let settings = Settings::load(Some(file.path())).expect("settings");
    assert_eq!(settings.category_order, vec!["low", "mid", "high"]);
    assert_eq!(settings.category_colors.get("startup").map(String::as_str), Some("red"));
    assert_eq!(settings.category_colors.get("formative").map(String::as_str), Some("orange"));
    assert_eq!(settings.visualization, Visualization::MaturityMap);
    assert!(!settings.infer_types);
    assert_eq!(settings.country_column, "Country");
}
