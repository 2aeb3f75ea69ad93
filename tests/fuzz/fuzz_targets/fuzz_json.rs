#![no_main]
use covtree::report::CoverageReport;
use covtree::ReportOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(facts) = covtree::parsers::json::parse(data) {
        if let Ok(report) = CoverageReport::build(&facts, &ReportOptions::default(), true) {
            assert_eq!(report.totals(), report.treemap.totals());
        }
    }
});
