#![no_main]
use covtree::ident::QualifiedName;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|name: &str| {
    if let Ok(parsed) = QualifiedName::parse(name) {
        assert_eq!(parsed.to_string(), name);
    }
});
