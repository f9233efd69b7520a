#![no_main]

use libfuzzer_sys::fuzz_target;
use partialmock::ScopeConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<ScopeConfig>(text) {
            let _ = config.backup_patterns();
        }
    }
});
