#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tomltree_core::ParseConfig;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    config: ParseConfig,
    source: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let mut config = input.config;
    config.max_recursion_depth = config.max_recursion_depth.min(256);

    let toml = tomltree::parse_with_config(input.source, config);
    let _ = toml.to_json();
    let _ = toml.to_string();

    let again = tomltree::parse_with_config(input.source, config);
    assert_eq!(toml.errors(), again.errors());
});
