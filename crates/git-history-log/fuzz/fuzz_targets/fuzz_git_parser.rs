#![no_main]

use git_history_log::parser::parse_log;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let commits = parse_log(&text, true);
    // every commit in file mode carries a file list
    assert!(commits.iter().all(|c| c.file_changes.is_some()));
});
