//! The scaffold filter set.
//!
//! Each submodule groups filters by topic. Filters are plain functions; the
//! [`catalog`] pairs every one with its public template name so the registrar can
//! install them in a fixed order.
//!
//! Parameters can be given positionally or by keyword, and unknown keyword
//! arguments are rejected:
//!
//! ```text
//! {{ "test2" | hash("md5") }}
//! {{ "test2" | hash(algorithm="md5") }}
//! {{ items | to_nice_yaml(indent=2, sort_keys=false) }}
//! ```

pub(crate) mod args;
pub mod datetime;
pub mod encoding;
pub mod hash;
pub mod json;
pub mod path;
pub mod random;
pub mod regex;
pub mod shell;
pub mod types;
pub mod utils;
pub mod uuid;
pub mod yaml;

use minijinja::Value;

/// Every scaffold filter as `(name, callable)`, in registration order.
pub fn catalog() -> Vec<(&'static str, Value)> {
    vec![
        ("ans_groupby", Value::from_function(utils::ans_groupby)),
        ("ans_random", Value::from_function(random::ans_random)),
        ("b64decode", Value::from_function(encoding::b64decode)),
        ("b64encode", Value::from_function(encoding::b64encode)),
        ("basename", Value::from_function(path::basename_filter)),
        ("bool", Value::from_function(types::to_bool)),
        ("checksum", Value::from_function(hash::checksum)),
        ("dirname", Value::from_function(path::dirname_filter)),
        ("expanduser", Value::from_function(path::expanduser_filter)),
        ("expandvars", Value::from_function(path::expandvars_filter)),
        ("extract", Value::from_function(utils::extract)),
        ("fileglob", Value::from_function(path::fileglob_filter)),
        ("flatten", Value::from_function(utils::flatten)),
        ("from_json", Value::from_function(json::from_json)),
        ("from_yaml", Value::from_function(yaml::from_yaml)),
        ("from_yaml_all", Value::from_function(yaml::from_yaml_all)),
        ("hash", Value::from_function(hash::hash)),
        ("mandatory", Value::from_function(utils::mandatory)),
        ("md5", Value::from_function(hash::md5)),
        ("quote", Value::from_function(shell::quote)),
        ("random_mac", Value::from_function(random::random_mac_filter)),
        ("realpath", Value::from_function(path::realpath_filter)),
        ("regex_escape", Value::from_function(regex::regex_escape)),
        ("regex_findall", Value::from_function(regex::regex_findall)),
        ("regex_replace", Value::from_function(regex::regex_replace)),
        ("regex_search", Value::from_function(regex::regex_search)),
        ("relpath", Value::from_function(path::relpath_filter)),
        ("sha1", Value::from_function(hash::sha1)),
        ("shuffle", Value::from_function(random::shuffle_filter)),
        ("splitext", Value::from_function(path::splitext_filter)),
        ("strftime", Value::from_function(datetime::strftime)),
        ("ternary", Value::from_function(utils::ternary)),
        ("to_datetime", Value::from_function(datetime::to_datetime)),
        ("to_json", Value::from_function(json::to_json)),
        ("to_nice_json", Value::from_function(json::to_nice_json)),
        ("to_nice_yaml", Value::from_function(yaml::to_nice_yaml)),
        ("to_uuid", Value::from_function(uuid::to_uuid)),
        ("to_yaml", Value::from_function(yaml::to_yaml)),
        ("type_debug", Value::from_function(types::type_debug)),
        ("win_basename", Value::from_function(path::win_basename)),
        ("win_dirname", Value::from_function(path::win_dirname)),
        ("win_splitdrive", Value::from_function(path::win_splitdrive_filter)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_sorted_by_name() {
        let names: Vec<&str> = catalog().into_iter().map(|(name, _)| name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_every_entry_is_callable() {
        for (name, filter) in catalog() {
            assert!(filter.as_object().is_some(), "{name} is not a callable");
        }
    }
}
