#![no_main]
use blockfrag::Scenario;
use libfuzzer_sys::fuzz_target;

// Malformed scenario documents must be rejected, never panic
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(mut scenario) = Scenario::from_toml_str(text) {
        // Keep runs cheap
        scenario.config.total_blocks = scenario.config.total_blocks.min(4096);
        scenario.operations.truncate(64);
        let _ = scenario.run();
    }
});
