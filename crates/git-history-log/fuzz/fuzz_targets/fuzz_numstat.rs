#![no_main]

use git_history_log::augment::parse_numstat_output;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        for entry in parse_numstat_output(text) {
            assert!(!entry.path.is_empty());
        }
    }
});
