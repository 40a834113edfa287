#![no_main]

use libfuzzer_sys::fuzz_target;
use strato_register::codec::{decode_command, encode_command};

// Arbitrary bytes must decode to a command or an error, never a panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = decode_command(data) {
        let _ = cmd.validate_basic();
        let encoded = encode_command(&cmd).expect("decoded command re-encodes");
        let again = decode_command(&encoded).expect("re-encoded command decodes");
        assert_eq!(again, cmd);
    }

    let _ = strato_pot::VolumeReport::from_json(data);
});
