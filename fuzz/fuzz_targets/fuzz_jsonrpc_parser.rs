#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parse only; a panic is the failure
    let _: Result<notesmith::transport::jsonrpc::JsonRpcMessage, _> =
        serde_json::from_slice(data);
});
