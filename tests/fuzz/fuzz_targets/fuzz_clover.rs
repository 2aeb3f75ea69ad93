#![no_main]
use covtree::ReportOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Neither the parser nor aggregation may panic on any input.
    if let Ok(facts) = covtree::parsers::clover::parse(data) {
        let _ = covtree::build_treemap(&facts, &ReportOptions::default());
    }
});
