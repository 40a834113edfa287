#![no_main]

use libfuzzer_sys::fuzz_target;
use strato_types::{bech32, Address, PubKey};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(addr) = s.parse::<Address>() {
        assert_eq!(addr.to_string().parse::<Address>().ok(), Some(addr));
    }
    let _ = s.parse::<PubKey>();

    // Decoding is canonical, so whatever decodes encodes back unchanged.
    if let Some((hrp, _)) = s.split_once('_') {
        if let Ok(payload) = bech32::decode(hrp, s) {
            assert_eq!(bech32::encode(hrp, &payload), s);
        }
    }
});
